use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static SRT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\x{FEFF}?[0-9]+\s*\n[0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}\s+-->\s+[0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}\s*\n").unwrap()
});
static BLOCK_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static TIMING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3})\s+-->\s+([0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3})").unwrap()
});
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{2}):([0-9]{2}):([0-9]{2}),([0-9]{3})").unwrap());

/// One index + timing + body unit of a subtitle document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    pub index: u64,
    pub start_time: String,
    pub end_time: String,
    pub body: String,
    /// Byte range of the trimmed block in the source text.
    pub span: Range<usize>,
}

impl SubtitleEntry {
    pub fn start_ms(&self) -> u64 {
        time_to_ms(&self.start_time)
    }

    pub fn end_ms(&self) -> u64 {
        time_to_ms(&self.end_time)
    }

    /// The block text as it would be written back with `body`.
    pub fn render_with_body(&self, body: &str) -> String {
        format!(
            "{}\n{} --> {}\n{}",
            self.index, self.start_time, self.end_time, body
        )
    }
}

/// True if some line is a bare index directly followed by a timing line.
pub fn is_srt(text: &str) -> bool {
    SRT_RE.is_match(text)
}

/// Splits `text` into blocks on blank lines and keeps the well-formed ones.
///
/// A block needs at least three lines: a bare integer, a line containing a
/// timing range, then the body. Anything else is dropped without comment.
pub fn parse(text: &str) -> Vec<SubtitleEntry> {
    let mut entries = Vec::new();
    let mut cursor = 0;

    let separators = BLOCK_SEPARATOR_RE
        .find_iter(text)
        .map(|m| m.range())
        .chain(std::iter::once(text.len()..text.len()));

    for separator in separators {
        let raw = cursor..separator.start;
        cursor = separator.end;

        let span = trimmed_range(text, raw);
        if span.is_empty() {
            continue;
        }
        if let Some(entry) = parse_block(&text[span.clone()], span) {
            entries.push(entry);
        }
    }

    entries
}

/// Whitespace for block trimming. A byte order mark counts too.
fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

fn trimmed_range(text: &str, raw: Range<usize>) -> Range<usize> {
    let slice = &text[raw.clone()];
    let leading = slice.len() - slice.trim_start_matches(is_blank).len();
    let trimmed = slice.trim_matches(is_blank);
    let start = raw.start + leading;
    start..start + trimmed.len()
}

fn parse_block(block: &str, span: Range<usize>) -> Option<SubtitleEntry> {
    let lines: Vec<&str> = block.split('\n').collect();
    if lines.len() < 3 {
        return None;
    }

    let index_line = lines[0];
    if index_line.is_empty() || !index_line.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = index_line.parse().ok()?;

    let timing = TIMING_RE.captures(lines[1])?;

    Some(SubtitleEntry {
        index,
        start_time: timing[1].to_string(),
        end_time: timing[2].to_string(),
        body: lines[2..].join("\n"),
        span,
    })
}

/// Milliseconds for the first `HH:MM:SS,mmm` in `time`, or 0 if there is none.
pub fn time_to_ms(time: &str) -> u64 {
    let Some(caps) = TIME_RE.captures(time) else {
        return 0;
    };
    let field = |i: usize| caps[i].parse::<u64>().unwrap_or(0);
    field(1) * 3_600_000 + field(2) * 60_000 + field(3) * 1000 + field(4)
}

pub fn ms_to_time(ms: u64) -> String {
    format!(
        "{:02}:{:02}:{:02},{:03}",
        ms / 3_600_000,
        (ms % 3_600_000) / 60_000,
        (ms % 60_000) / 1000,
        ms % 1000
    )
}

/// Position (in parse order) of the entry whose block contains `offset`.
/// Both ends of a block count as inside it.
pub fn locate_entry_at(text: &str, offset: usize) -> Option<usize> {
    parse(text)
        .iter()
        .position(|entry| entry.span.start <= offset && offset <= entry.span.end)
}

/// Byte range of the entry at `position`, for selecting or jumping to it.
pub fn entry_span(text: &str, position: usize) -> Option<Range<usize>> {
    parse(text).get(position).map(|entry| entry.span.clone())
}

/// Navigation label, `Entry 2/5`, or `Entry -/-` with no current entry.
pub fn entry_indicator(current: Option<usize>, total: usize) -> String {
    match current {
        Some(position) if position < total => format!("Entry {}/{}", position + 1, total),
        _ => "Entry -/-".to_string(),
    }
}
