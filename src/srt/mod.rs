/// SRT subsystem - subtitle block parsing, timing checks and entry edits
///
/// Entries carry the byte span of their block, so edits splice by range
/// and never search the document for block text.

pub mod edit;
pub mod parser;
pub mod validate;

// Re-export public interface
pub use edit::{apply_tag_to_range, update_entry};
pub use parser::{
    SubtitleEntry, entry_indicator, entry_span, is_srt, locate_entry_at, ms_to_time, parse,
    time_to_ms,
};
pub use validate::{DEFAULT_GAP_THRESHOLD_MS, SrtIssue, SrtReport, validate, validate_with};
