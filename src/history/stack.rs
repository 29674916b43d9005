use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub text: String,
    pub caret: usize,
}

impl HistoryEntry {
    pub fn new(text: impl Into<String>, caret: usize) -> Self {
        Self {
            text: text.into(),
            caret,
        }
    }
}

/// Bounded linear undo log with a movable pointer.
///
/// `pointer` is `None` exactly when the log is empty. Pushing while the
/// pointer is not at the end discards the redo branch.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    pointer: Option<usize>,
    capacity: usize,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            pointer: None,
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        match self.pointer {
            Some(pointer) => self.entries.truncate(pointer + 1),
            None => self.entries.clear(),
        }

        self.entries.push(entry);

        // Limit the log size
        if self.entries.len() > self.capacity {
            let overflow = self.entries.len() - self.capacity;
            self.entries.drain(..overflow);
        }

        self.pointer = Some(self.entries.len() - 1);
        debug!(status = %self.status(), "History push");
    }

    /// Steps back one entry. At the oldest entry the current one is returned
    /// again; on an empty log `current_text` is echoed with caret 0.
    pub fn undo(&mut self, current_text: &str) -> HistoryEntry {
        if let Some(pointer) = self.pointer.filter(|&p| p > 0) {
            self.pointer = Some(pointer - 1);
        }
        self.current_or(current_text)
    }

    pub fn redo(&mut self, current_text: &str) -> HistoryEntry {
        if let Some(pointer) = self.pointer.filter(|&p| p + 1 < self.entries.len()) {
            self.pointer = Some(pointer + 1);
        }
        self.current_or(current_text)
    }

    fn current_or(&self, current_text: &str) -> HistoryEntry {
        self.current()
            .cloned()
            .unwrap_or_else(|| HistoryEntry::new(current_text, 0))
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.pointer.and_then(|p| self.entries.get(p))
    }

    pub fn can_undo(&self) -> bool {
        self.pointer.is_some_and(|p| p > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.pointer.is_some_and(|p| p + 1 < self.entries.len())
    }

    /// `"position/length"` for display, e.g. `"3/7"`.
    pub fn status(&self) -> String {
        let position = self.pointer.map_or(0, |p| p + 1);
        format!("{}/{}", position, self.entries.len())
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.pointer = None;
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new()
    }
}
