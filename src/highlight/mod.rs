/// Highlight subsystem - decoration of plain text and caret round-tripping
///
/// The plain text stays the source of truth. `decorate` derives a view of
/// typed text nodes from it, the renderers turn that view into markup, and
/// caret offsets always travel through plain-text coordinates.

pub mod render;
pub mod spans;
pub mod view;

// Re-export public interface
pub use render::{render_ansi, render_html};
pub use spans::{Span, SpanKind, scan};
pub use view::{
    DecoratedView, HighlightSurface, NodePosition, TextNode, caret_plain_offset, decorate,
    restore_caret,
};
