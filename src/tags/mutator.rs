use super::catalog::LanguageSet;
use crate::clamp_offset;
use tracing::debug;

/// New text plus where the caret should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub text: String,
    pub caret: usize,
}

impl Edit {
    pub fn new(text: impl Into<String>, caret: usize) -> Self {
        Self {
            text: text.into(),
            caret,
        }
    }
}

/// Byte range over the plain text. Always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn clamped(self, text: &str) -> Self {
        Self::new(clamp_offset(text, self.start), clamp_offset(text, self.end))
    }
}

pub struct TagMutator;

impl TagMutator {
    /// Rewrites the interior of the tag the caret belongs to.
    ///
    /// The caret belongs to a tag when it sits right after its `]` (optionally
    /// followed by one space) or anywhere between its brackets. Returns `None`
    /// when there is no such tag; the caller then inserts a new literal.
    pub fn apply<F>(text: &str, caret: usize, transform: F) -> Option<Edit>
    where
        F: FnOnce(&str) -> String,
    {
        let caret = clamp_offset(text, caret);
        let (open, close) = locate_tag(text.as_bytes(), caret)?;

        let interior = &text[open + 1..close];
        let replaced = transform(interior);
        if replaced == interior {
            return Some(Edit::new(text, caret));
        }

        let mut new_text = String::with_capacity(text.len() + replaced.len());
        new_text.push_str(&text[..=open]);
        new_text.push_str(&replaced);
        new_text.push(']');
        new_text.push_str(&text[close + 1..]);

        let new_caret = open + 1 + replaced.len() + 1;
        debug!(open, close, new_caret, "Rewrote tag interior");
        Some(Edit::new(new_text, new_caret))
    }

    /// Inserts `literal` and a separating space at the caret, or in front of
    /// a non-empty selection. The caret lands after the space.
    pub fn insert_literal(
        text: &str,
        caret: usize,
        selection: Option<Selection>,
        literal: &str,
    ) -> Edit {
        let at = match selection.map(|s| s.clamped(text)) {
            Some(sel) if !sel.is_empty() => sel.start,
            _ => clamp_offset(text, caret),
        };

        let mut new_text = String::with_capacity(text.len() + literal.len() + 1);
        new_text.push_str(&text[..at]);
        new_text.push_str(literal);
        new_text.push(' ');
        new_text.push_str(&text[at..]);

        Edit::new(new_text, at + literal.len() + 1)
    }
}

/// Finds `(open, close)` byte indices of the brackets for the caret's tag.
fn locate_tag(bytes: &[u8], caret: usize) -> Option<(usize, usize)> {
    let after_close = if caret >= 1 && bytes[caret - 1] == b']' {
        Some(caret - 1)
    } else if caret >= 2 && bytes[caret - 1] == b' ' && bytes[caret - 2] == b']' {
        Some(caret - 2)
    } else {
        None
    };

    if let Some(close) = after_close {
        let open = find_open_before(bytes, close)?;
        return (open < close).then_some((open, close));
    }

    let mut depth = 0usize;
    for i in (0..caret).rev() {
        match bytes[i] {
            b']' => depth += 1,
            b'[' if depth == 0 => {
                let close = find_close_after(bytes, i)?;
                return (close >= caret).then_some((i, close));
            }
            b'[' => depth -= 1,
            _ => {}
        }
    }

    None
}

fn find_open_before(bytes: &[u8], close: usize) -> Option<usize> {
    let mut depth = 1usize;
    for i in (0..close).rev() {
        match bytes[i] {
            b']' => depth += 1,
            b'[' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn find_close_after(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (j, byte) in bytes.iter().enumerate().skip(open + 1) {
        match byte {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
    }
    None
}

/// Sets the character of a tag interior, keeping language and parameters.
pub fn character_transform(interior: &str, name: &str, languages: &dyn LanguageSet) -> String {
    let (first, rest) = split_first(interior);

    match first.split_once(':') {
        Some((prefix, _)) if languages.is_supported(prefix.trim()) => {
            format!("{prefix}:{name}{rest}")
        }
        // `seed:5` and friends: the character becomes a new first segment
        Some(_) => format!("{name}|{interior}"),
        None => format!("{name}{rest}"),
    }
}

/// Splits off the first `|` segment; the remainder keeps its leading pipe.
fn split_first(interior: &str) -> (&str, &str) {
    match interior.find('|') {
        Some(pipe) => interior.split_at(pipe),
        None => (interior, ""),
    }
}

/// Sets the language prefix of a tag interior.
pub fn language_transform(interior: &str, lang: &str, languages: &dyn LanguageSet) -> String {
    let (first, rest) = split_first(interior);

    match first.split_once(':') {
        Some((prefix, _)) if prefix == lang && languages.is_supported(prefix) => {
            interior.to_string()
        }
        Some((prefix, character)) if languages.is_supported(prefix.trim()) => {
            format!("{lang}:{character}{rest}")
        }
        Some(_) => format!("{lang}:|{interior}"),
        None => format!("{lang}:{interior}"),
    }
}

/// Sets `name:value`, replacing an existing segment in place or appending.
pub fn parameter_transform(interior: &str, name: &str, value: &str) -> String {
    let assignment = format!("{name}:{value}");
    let mut parts: Vec<&str> = interior.split('|').collect();

    let existing = parts.iter().position(|part| {
        part.split_once(':')
            .is_some_and(|(key, _)| key.trim().eq_ignore_ascii_case(name))
    });

    match existing {
        Some(index) => {
            parts[index] = &assignment;
            parts.join("|")
        }
        None => format!("{interior}|{assignment}"),
    }
}

/// Tag insert/modify operations bound to an injected language set.
pub struct TagEditor<L> {
    languages: L,
}

impl<L: LanguageSet> TagEditor<L> {
    pub fn new(languages: L) -> Self {
        Self { languages }
    }

    pub fn languages(&self) -> &L {
        &self.languages
    }

    pub fn languages_mut(&mut self) -> &mut L {
        &mut self.languages
    }

    pub fn assign_character(
        &self,
        text: &str,
        caret: usize,
        selection: Option<Selection>,
        name: &str,
    ) -> Edit {
        let name = name.trim();
        if name.is_empty() {
            return Edit::new(text, caret);
        }

        let target = target_caret(text, caret, selection);
        TagMutator::apply(text, target, |interior| {
            character_transform(interior, name, &self.languages)
        })
        .unwrap_or_else(|| {
            TagMutator::insert_literal(text, target, selection, &format!("[{name}]"))
        })
    }

    pub fn assign_language(
        &self,
        text: &str,
        caret: usize,
        selection: Option<Selection>,
        lang: &str,
    ) -> Edit {
        let lang = lang.trim();
        if lang.is_empty() {
            return Edit::new(text, caret);
        }

        let target = target_caret(text, caret, selection);
        TagMutator::apply(text, target, |interior| {
            language_transform(interior, lang, &self.languages)
        })
        .unwrap_or_else(|| {
            TagMutator::insert_literal(text, target, selection, &format!("[{lang}:]"))
        })
    }

    pub fn assign_parameter(
        &self,
        text: &str,
        caret: usize,
        selection: Option<Selection>,
        name: &str,
        value: &str,
    ) -> Edit {
        let name = name.trim();
        if name.is_empty() || value.is_empty() {
            return Edit::new(text, caret);
        }

        let target = target_caret(text, caret, selection);
        TagMutator::apply(text, target, |interior| {
            parameter_transform(interior, name, value)
        })
        .unwrap_or_else(|| {
            TagMutator::insert_literal(text, target, selection, &format!("[{name}:{value}]"))
        })
    }

    /// Drops a saved tag literal at the caret.
    pub fn insert_preset(&self, text: &str, caret: usize, preset: &str) -> Edit {
        TagMutator::insert_literal(text, caret, None, preset)
    }
}

/// The offset tag lookup should start from.
///
/// A selection that begins (after optional whitespace) with `[` targets that
/// tag from just inside its bracket; any other selection targets its start.
fn target_caret(text: &str, caret: usize, selection: Option<Selection>) -> usize {
    match selection.map(|s| s.clamped(text)) {
        Some(sel) if !sel.is_empty() => {
            let selected = &text[sel.start..sel.end];
            let trimmed = selected.trim_start();
            if trimmed.starts_with('[') {
                sel.start + (selected.len() - trimmed.len()) + 1
            } else {
                sel.start
            }
        }
        _ => clamp_offset(text, caret),
    }
}
