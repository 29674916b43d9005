use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// What a stretch of plain text is decorated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    /// Index line of a subtitle block (digits only).
    Number,
    /// `HH:MM:SS,mmm --> HH:MM:SS,mmm`
    Timing,
    Tag,
    Comma,
    Period,
    /// `?`, `!` or `;`
    Punct,
    /// Two or more consecutive spaces.
    MultiSpace,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub range: Range<usize>,
}

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A([0-9]+)\s*\n[0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}\s+-->\s+[0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}").unwrap()
});
static TIMING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A[0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}\s+-->\s+[0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}").unwrap()
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A\[[^\]]+\]").unwrap());

/// Splits `text` into an ordered, gap-free list of spans.
///
/// At every position the matchers run in fixed priority: subtitle index,
/// timing, tag, comma, period, other punctuation, multi-space. A match is
/// atomic, so punctuation inside a tag or timing is not split out. Anything
/// unmatched accumulates into `Plain` spans.
pub fn scan(text: &str) -> Vec<Span> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut plain_start: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        if let Some((kind, end)) = match_at(text, i) {
            if let Some(start) = plain_start.take() {
                spans.push(Span {
                    kind: SpanKind::Plain,
                    range: start..i,
                });
            }
            spans.push(Span { kind, range: i..end });
            i = end;
            continue;
        }

        plain_start.get_or_insert(i);
        i += utf8_width(bytes[i]);
    }

    if let Some(start) = plain_start {
        spans.push(Span {
            kind: SpanKind::Plain,
            range: start..bytes.len(),
        });
    }

    spans
}

fn match_at(text: &str, i: usize) -> Option<(SpanKind, usize)> {
    let bytes = text.as_bytes();
    let rest = &text[i..];

    match bytes[i] {
        b'0'..=b'9' => {
            let line_start = i == 0 || bytes[i - 1] == b'\n' || &text[..i] == "\u{FEFF}";
            if line_start {
                if let Some(caps) = HEADER_RE.captures(rest) {
                    return Some((SpanKind::Number, i + caps.get(1)?.end()));
                }
            }
            TIMING_RE
                .find(rest)
                .map(|m| (SpanKind::Timing, i + m.end()))
        }
        b'[' => TAG_RE.find(rest).map(|m| (SpanKind::Tag, i + m.end())),
        b',' => Some((SpanKind::Comma, i + 1)),
        b'.' => Some((SpanKind::Period, i + 1)),
        b'?' | b'!' | b';' => Some((SpanKind::Punct, i + 1)),
        b' ' if bytes.get(i + 1) == Some(&b' ') => {
            let run = bytes[i..].iter().take_while(|&&b| b == b' ').count();
            Some((SpanKind::MultiSpace, i + run))
        }
        _ => None,
    }
}

fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}
