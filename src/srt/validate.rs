use super::parser::{is_srt, parse};
use std::fmt;

pub const DEFAULT_GAP_THRESHOLD_MS: u64 = 5000;

/// A single problem found by `validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SrtIssue {
    NotSrt,
    NoEntries,
    Overlap { first: u64, second: u64 },
    Gap { first: u64, second: u64, gap_ms: u64 },
}

impl fmt::Display for SrtIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SrtIssue::NotSrt => write!(f, "Not valid SRT format"),
            SrtIssue::NoEntries => write!(f, "No valid SRT entries found"),
            SrtIssue::Overlap { first, second } => {
                write!(f, "Entry {first} overlaps with entry {second}")
            }
            SrtIssue::Gap {
                first,
                second,
                gap_ms,
            } => {
                // Tenths of a second, rounded half up
                let tenths = (gap_ms + 50) / 100;
                write!(
                    f,
                    "Large gap between entry {} and {} ({}.{}s)",
                    first,
                    second,
                    tenths / 10,
                    tenths % 10
                )
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SrtReport {
    pub issues: Vec<SrtIssue>,
}

impl SrtReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for SrtReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "SRT format is valid");
        }
        write!(f, "SRT issues:")?;
        for issue in &self.issues {
            write!(f, "\n{issue}")?;
        }
        Ok(())
    }
}

pub fn validate(text: &str) -> SrtReport {
    validate_with(text, DEFAULT_GAP_THRESHOLD_MS)
}

/// Checks timing between consecutive entries.
///
/// All overlaps are reported first, then all gaps longer than
/// `gap_threshold_ms`. Start/end order within an entry and index
/// numbering are not checked.
pub fn validate_with(text: &str, gap_threshold_ms: u64) -> SrtReport {
    if !is_srt(text) {
        return SrtReport {
            issues: vec![SrtIssue::NotSrt],
        };
    }

    let entries = parse(text);
    if entries.is_empty() {
        return SrtReport {
            issues: vec![SrtIssue::NoEntries],
        };
    }

    let pairs = || entries.windows(2).map(|pair| (&pair[0], &pair[1]));
    let mut issues = Vec::new();

    issues.extend(pairs().filter_map(|(current, next)| {
        (current.end_ms() > next.start_ms()).then(|| SrtIssue::Overlap {
            first: current.index,
            second: next.index,
        })
    }));

    issues.extend(pairs().filter_map(|(current, next)| {
        let gap_ms = next.start_ms().saturating_sub(current.end_ms());
        (gap_ms > gap_threshold_ms).then(|| SrtIssue::Gap {
            first: current.index,
            second: next.index,
            gap_ms,
        })
    }));

    SrtReport { issues }
}
