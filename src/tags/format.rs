use once_cell::sync::Lazy;
use regex::Regex;

static SPACE_BEFORE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\[").unwrap());
static SPACE_AFTER_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[ \t]+").unwrap());
static SPACE_BEFORE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\]").unwrap());
static SPACE_AFTER_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\][ \t]+").unwrap());
static GLUED_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^\s\[])\[").unwrap());
static GLUED_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\](\S)").unwrap());

/// Normalises whitespace around tags so every tag is separated from its
/// neighbours by exactly one space. Newlines are never touched.
pub fn format_tags(text: &str) -> String {
    let text = SPACE_BEFORE_OPEN.replace_all(text, " [");
    let text = SPACE_AFTER_OPEN.replace_all(&text, "[");
    let text = SPACE_BEFORE_CLOSE.replace_all(&text, "]");
    let text = SPACE_AFTER_CLOSE.replace_all(&text, "]");
    let text = GLUED_OPEN.replace_all(&text, "$1 [");
    let text = GLUED_CLOSE.replace_all(&text, "] $1");

    text.split('\n')
        .map(|line| line.trim_end_matches([' ', '\t']))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_spacing_around_tags() {
        assert_eq!(format_tags("Hi   [ Alice ]   there"), "Hi [Alice] there");
    }

    #[test]
    fn test_separates_glued_tags() {
        assert_eq!(format_tags("Hi[Alice]there"), "Hi [Alice] there");
        assert_eq!(format_tags("[A][B]"), "[A] [B]");
    }

    #[test]
    fn test_preserves_newlines_and_trims_line_ends() {
        let text = "[Alice]\t\nline two   \n\n[Bob] end ";
        assert_eq!(format_tags(text), "[Alice]\nline two\n\n[Bob] end");
    }

    #[test]
    fn test_plain_text_only_loses_trailing_space() {
        assert_eq!(format_tags("nothing  to do  "), "nothing  to do");
    }
}
