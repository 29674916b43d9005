use super::parser::parse;
use tracing::debug;

/// Replaces the body of the entry at `position` (parse order), keeping its
/// index and timing. Out-of-range positions leave the text untouched.
pub fn update_entry(text: &str, position: usize, body: &str) -> String {
    let entries = parse(text);
    let Some(entry) = entries.get(position) else {
        return text.to_string();
    };

    let mut result = text.to_string();
    result.replace_range(entry.span.clone(), &entry.render_with_body(body));
    debug!(position, index = entry.index, "Updated subtitle entry");
    result
}

/// Prefixes the body of every entry in `from..=to` with `"{tag} "`.
///
/// `to` defaults to `from` and is clamped to the last entry. Blocks are
/// spliced back to front so the captured spans of earlier entries stay
/// valid.
pub fn apply_tag_to_range(text: &str, tag: &str, from: usize, to: Option<usize>) -> String {
    let entries = parse(text);
    let Some(last) = entries.len().checked_sub(1) else {
        return text.to_string();
    };
    let to = to.unwrap_or(from).min(last);
    if from > to {
        return text.to_string();
    }

    let mut result = text.to_string();
    for entry in entries[from..=to].iter().rev() {
        let body = format!("{} {}", tag, entry.body);
        result.replace_range(entry.span.clone(), &entry.render_with_body(&body));
    }

    debug!(from, to, tag, "Applied tag to subtitle entries");
    result
}
