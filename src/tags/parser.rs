use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

/// `[` followed by at least one non-`]` byte and the first `]`.
///
/// Tags never nest: `[a [b] c]` yields the tag `[a [b]` and leaves ` c]` as
/// plain text. That is the limit of the grammar, not something to repair.
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub full_text: String,
    /// Byte offset of the opening `[`.
    pub start: usize,
    pub character: String,
    pub language: Option<String>,
    pub parameters: BTreeMap<String, String>,
}

impl Tag {
    /// Byte offset one past the closing `]`.
    pub fn end(&self) -> usize {
        self.start + self.full_text.len()
    }

    pub fn interior(&self) -> &str {
        &self.full_text[1..self.full_text.len() - 1]
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(&name.to_lowercase())
            .map(String::as_str)
    }
}

/// Splits the first segment into `(language, character)`.
///
/// A `.` anywhere in the segment disables the split so that a leading
/// `temperature:0.5` is read as a character token rather than as a language.
fn split_first_segment(segment: &str) -> (Option<String>, String) {
    let segment = segment.trim();
    if segment.contains(':') && !segment.contains('.') {
        if let Some((lang, character)) = segment.split_once(':') {
            return (Some(lang.trim().to_string()), character.trim().to_string());
        }
    }
    (None, segment.to_string())
}

pub fn parse_tags(text: &str) -> Vec<Tag> {
    let mut tags = Vec::new();

    for caps in TAG_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let interior = &caps[1];
        let mut parts = interior.split('|');

        let (language, character) = split_first_segment(parts.next().unwrap_or_default());

        let mut parameters = BTreeMap::new();
        for part in parts {
            if let Some((name, value)) = part.split_once(':') {
                // Later duplicates win
                parameters.insert(name.trim().to_lowercase(), value.trim().to_string());
            }
        }

        tags.push(Tag {
            full_text: whole.as_str().to_string(),
            start: whole.start(),
            character,
            language,
            parameters,
        });
    }

    tags
}

/// Returns the tag whose brackets contain `offset`, if any.
pub fn tag_at(text: &str, offset: usize) -> Option<Tag> {
    parse_tags(text)
        .into_iter()
        .find(|tag| tag.start <= offset && offset <= tag.end())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSyntaxError {
    MismatchedBrackets { tag: String },
    MissingColon { segment: String },
    EmptyParameterName { segment: String },
}

impl fmt::Display for TagSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagSyntaxError::MismatchedBrackets { tag } => {
                write!(f, "Mismatched brackets in tag: {tag}")
            }
            TagSyntaxError::MissingColon { segment } => write!(
                f,
                "Invalid parameter syntax: {segment} (expected format: param:value)"
            ),
            TagSyntaxError::EmptyParameterName { segment } => {
                write!(f, "Empty parameter name in {segment}")
            }
        }
    }
}

impl std::error::Error for TagSyntaxError {}

/// Checks every tag in order and reports the first problem found.
pub fn validate_tag_syntax(text: &str) -> Result<(), TagSyntaxError> {
    for caps in TAG_RE.captures_iter(text) {
        let interior = &caps[1];

        // The closing bracket is never part of the interior, so any `[`
        // inside it is unbalanced.
        if interior.contains('[') {
            return Err(TagSyntaxError::MismatchedBrackets {
                tag: caps[0].to_string(),
            });
        }

        for segment in interior.split('|').skip(1) {
            match segment.split_once(':') {
                None => {
                    return Err(TagSyntaxError::MissingColon {
                        segment: segment.to_string(),
                    });
                }
                Some((name, _)) if name.trim().is_empty() => {
                    return Err(TagSyntaxError::EmptyParameterName {
                        segment: segment.to_string(),
                    });
                }
                Some(_) => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_character() {
        let tags = parse_tags("Hello [Alice] there");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].full_text, "[Alice]");
        assert_eq!(tags[0].start, 6);
        assert_eq!(tags[0].end(), 13);
        assert_eq!(tags[0].character, "Alice");
        assert_eq!(tags[0].language, None);
        assert!(tags[0].parameters.is_empty());
    }

    #[test]
    fn test_parse_language_and_parameters() {
        let tags = parse_tags("[en:Bob|Seed: 42 |temperature:0.5] Hi");
        let tag = &tags[0];
        assert_eq!(tag.language.as_deref(), Some("en"));
        assert_eq!(tag.character, "Bob");
        assert_eq!(tag.parameter("seed"), Some("42"));
        assert_eq!(tag.parameter("SEED"), Some("42"));
        assert_eq!(tag.parameter("temperature"), Some("0.5"));
    }

    #[test]
    fn test_period_disables_language_split() {
        let tags = parse_tags("[temperature:0.5]");
        assert_eq!(tags[0].language, None);
        assert_eq!(tags[0].character, "temperature:0.5");

        let tags = parse_tags("[pause:1s]");
        assert_eq!(tags[0].language.as_deref(), Some("pause"));
        assert_eq!(tags[0].character, "1s");
    }

    #[test]
    fn test_first_colon_split_keeps_remainder() {
        let tags = parse_tags("[en:Bob:x|pause:00:01]");
        assert_eq!(tags[0].language.as_deref(), Some("en"));
        assert_eq!(tags[0].character, "Bob:x");
        assert_eq!(tags[0].parameter("pause"), Some("00:01"));
    }

    #[test]
    fn test_duplicate_parameters_last_wins() {
        let tags = parse_tags("[Alice|seed:1|SEED:2]");
        assert_eq!(tags[0].parameters.len(), 1);
        assert_eq!(tags[0].parameter("seed"), Some("2"));
    }

    #[test]
    fn test_segments_without_colon_are_ignored() {
        let tags = parse_tags("[Alice|loud|seed:3]");
        assert_eq!(tags[0].parameters.len(), 1);
    }

    #[test]
    fn test_no_nesting_first_close_wins() {
        let tags = parse_tags("[a [b] c]");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].full_text, "[a [b]");
    }

    #[test]
    fn test_empty_brackets_are_not_tags() {
        assert!(parse_tags("[] text").is_empty());
    }

    #[test]
    fn test_multiple_tags_in_order() {
        let tags = parse_tags("[Alice] hi [Bob] yo [pause:1s]");
        let names: Vec<_> = tags.iter().map(|t| t.character.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "1s"]);
    }

    #[test]
    fn test_tag_at() {
        let text = "one [Alice] two";
        assert_eq!(tag_at(text, 5).map(|t| t.character), Some("Alice".into()));
        assert!(tag_at(text, 1).is_none());
    }

    #[test]
    fn test_validate_ok() {
        assert!(validate_tag_syntax("[Alice|seed:1] hi [Bob]").is_ok());
        assert!(validate_tag_syntax("no tags at all").is_ok());
    }

    #[test]
    fn test_validate_missing_colon() {
        let err = validate_tag_syntax("[Alice|seed] [Bob|x]").unwrap_err();
        assert_eq!(
            err,
            TagSyntaxError::MissingColon {
                segment: "seed".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid parameter syntax: seed (expected format: param:value)"
        );
    }

    #[test]
    fn test_validate_empty_name() {
        let err = validate_tag_syntax("[Alice| :3]").unwrap_err();
        assert_eq!(err.to_string(), "Empty parameter name in  :3");
    }

    #[test]
    fn test_validate_mismatched_brackets() {
        let err = validate_tag_syntax("[a [b]").unwrap_err();
        assert!(matches!(err, TagSyntaxError::MismatchedBrackets { .. }));
    }

    #[test]
    fn test_validate_reports_first_violation_only() {
        let err = validate_tag_syntax("[A| :1] [B|nocolon]").unwrap_err();
        assert!(matches!(err, TagSyntaxError::EmptyParameterName { .. }));
    }
}
