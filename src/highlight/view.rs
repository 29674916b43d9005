use super::spans::{SpanKind, scan};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub kind: SpanKind,
    pub text: String,
}

/// Presentation-side copy of the document, split into decorated text nodes.
///
/// This is a cache derived from the plain text. Offsets are never computed
/// against it except through `caret_plain_offset` / `restore_caret`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecoratedView {
    nodes: Vec<TextNode>,
}

impl DecoratedView {
    pub fn nodes(&self) -> &[TextNode] {
        &self.nodes
    }

    /// Collapses the decoration back to the undecorated text.
    pub fn plain_text(&self) -> String {
        self.nodes.iter().map(|node| node.text.as_str()).collect()
    }

    /// Plain-text length in bytes.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|node| node.text.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub fn decorate(plain: &str) -> DecoratedView {
    let nodes = scan(plain)
        .into_iter()
        .map(|span| TextNode {
            kind: span.kind,
            text: plain[span.range].to_string(),
        })
        .collect();
    DecoratedView { nodes }
}

/// A caret inside the decorated view: node index plus byte offset in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePosition {
    pub node: usize,
    pub offset: usize,
}

/// Converts a position in the view back to an offset into the plain text.
pub fn caret_plain_offset(view: &DecoratedView, position: NodePosition) -> usize {
    let before: usize = view
        .nodes
        .iter()
        .take(position.node)
        .map(|node| node.text.len())
        .sum();

    match view.nodes.get(position.node) {
        Some(node) => before + position.offset.min(node.text.len()),
        None => before,
    }
}

/// Finds the node holding plain offset `target`.
///
/// Nodes are walked in order and the first one whose cumulative length
/// reaches the target wins, so a caret on a decoration boundary sits at the
/// end of the earlier node. Returns `None` past the end of the text.
pub fn restore_caret(view: &DecoratedView, target: usize) -> Option<NodePosition> {
    let mut count = 0;
    for (index, node) in view.nodes.iter().enumerate() {
        let next = count + node.text.len();
        if target <= next {
            return Some(NodePosition {
                node: index,
                offset: target - count,
            });
        }
        count = next;
    }
    None
}

/// The currently displayed view together with its selection.
#[derive(Debug, Default)]
pub struct HighlightSurface {
    view: DecoratedView,
    selection: Option<NodePosition>,
}

impl HighlightSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &DecoratedView {
        &self.view
    }

    pub fn selection(&self) -> Option<NodePosition> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<NodePosition>) {
        self.selection = selection;
    }

    /// Plain offset of the current selection, if any.
    pub fn caret_offset(&self) -> Option<usize> {
        self.selection
            .map(|position| caret_plain_offset(&self.view, position))
    }

    /// Re-decorates `plain` and puts the caret back at `caret`.
    ///
    /// When the result matches what is already displayed nothing is touched
    /// (selection included) and `false` is returned.
    pub fn refresh(&mut self, plain: &str, caret: usize) -> bool {
        let fresh = decorate(plain);
        if fresh == self.view {
            debug!("Decoration unchanged, skipping render");
            return false;
        }

        self.view = fresh;
        self.selection = restore_caret(&self.view, caret);
        true
    }
}
