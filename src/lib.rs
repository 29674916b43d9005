//! Inline tag annotation engine for TTS scripts and SRT subtitles.
//!
//! Text carries `[lang:Character|param:value]` tags. The crate parses and
//! rewrites those tags around a caret, decorates the text for display,
//! keeps an undo log, and understands SRT subtitle blocks.

pub mod config;
pub mod error;
pub mod highlight;
pub mod history;
pub mod session;
pub mod srt;
pub mod tags;

pub use error::{Error, Result};
pub use session::EditorSession;

/// Clamps `offset` into `text` and moves it back onto a char boundary.
pub(crate) fn clamp_offset(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
