use crate::clamp_offset;
use crate::config::RcConfig;
use crate::error::Result;
use crate::highlight::{DecoratedView, HighlightSurface, restore_caret};
use crate::history::{Clock, HistoryRecorder, SystemClock};
use crate::srt::{self, SrtReport};
use crate::tags::{
    CatalogSource, CharacterRoster, Edit, LanguageCatalog, Selection, TagEditor, TagSyntaxError,
    format_tags, normalize_value, tag_at, validate_tag_syntax,
};
use std::time::Duration;
use tracing::{debug, info};

pub const PRESET_SLOTS: usize = 3;

/// One open document plus everything an editing shell needs around it.
///
/// The plain text is the source of truth. Every mutation updates it, re-renders
/// the decorated view and feeds history: typing through the quiet-window
/// scheduler, everything else as an immediate commit. Caret placement after
/// a programmatic replacement is deferred to the next `tick` (or the next
/// input, whichever comes first).
pub struct EditorSession<C: Clock = SystemClock> {
    text: String,
    caret: usize,
    selection: Option<Selection>,
    editor: TagEditor<LanguageCatalog>,
    characters: CharacterRoster,
    history: HistoryRecorder<C>,
    surface: HighlightSurface,
    pending_caret: Option<usize>,
    srt_mode: bool,
    gap_threshold_ms: u64,
    presets: [Option<String>; PRESET_SLOTS],
}

impl EditorSession {
    pub fn new(config: &RcConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> EditorSession<C> {
    pub fn with_clock(config: &RcConfig, clock: C) -> Self {
        let languages = if config.languages.is_empty() {
            LanguageCatalog::new()
        } else {
            LanguageCatalog::from_codes(config.languages.iter().cloned())
        };

        Self {
            text: String::new(),
            caret: 0,
            selection: None,
            editor: TagEditor::new(languages),
            characters: CharacterRoster::new(config.characters.clone()),
            history: HistoryRecorder::new(
                config.history_capacity,
                clock,
                Duration::from_millis(config.quiet_window_ms),
            ),
            surface: HighlightSurface::new(),
            pending_caret: None,
            srt_mode: false,
            gap_threshold_ms: config.gap_threshold_ms,
            presets: Default::default(),
        }
    }

    /// Replaces the whole document and records it as the first snapshot.
    pub fn load(&mut self, text: &str) {
        self.text = text.to_string();
        self.caret = 0;
        self.selection = None;
        self.pending_caret = None;
        self.render();
        self.history.reset();
        self.history.commit_now(&self.text, 0);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn pending_caret(&self) -> Option<usize> {
        self.pending_caret
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn view(&self) -> &DecoratedView {
        self.surface.view()
    }

    pub fn surface(&self) -> &HighlightSurface {
        &self.surface
    }

    pub fn languages(&self) -> &LanguageCatalog {
        self.editor.languages()
    }

    pub fn characters(&self) -> &CharacterRoster {
        &self.characters
    }

    pub fn history_status(&self) -> String {
        self.history.status()
    }

    pub fn is_srt_mode(&self) -> bool {
        self.srt_mode
    }

    pub fn set_caret(&mut self, offset: usize) {
        self.pending_caret = None;
        self.caret = clamp_offset(&self.text, offset);
        self.selection = None;
        self.surface
            .set_selection(restore_caret(self.surface.view(), self.caret));
    }

    /// Selects `a..b` (either order) and puts the caret at its end.
    pub fn select(&mut self, a: usize, b: usize) {
        let selection = Selection::new(clamp_offset(&self.text, a), clamp_offset(&self.text, b));
        self.set_caret(selection.end);
        self.selection = (!selection.is_empty()).then_some(selection);
    }

    /// Runs deferred work: the pending caret restore, then a due history commit.
    pub fn tick(&mut self) -> bool {
        self.settle_caret();
        self.history.tick(&self.text, self.caret)
    }

    fn settle_caret(&mut self) {
        if let Some(caret) = self.pending_caret.take() {
            self.caret = clamp_offset(&self.text, caret);
            self.surface
                .set_selection(restore_caret(self.surface.view(), self.caret));
        }
    }

    fn render(&mut self) {
        self.surface.refresh(&self.text, self.caret);

        let srt_mode = srt::is_srt(&self.text);
        if srt_mode != self.srt_mode {
            if srt_mode {
                info!("SRT mode activated");
            } else {
                info!("Switched to plain text mode");
            }
            self.srt_mode = srt_mode;
        }
    }

    /// Removes the selected text, returning where it started and what it was.
    fn take_selection(&mut self) -> Option<(usize, String)> {
        let selection = self.selection.take()?;
        let removed: String = self.text.drain(selection.start..selection.end).collect();
        Some((selection.start, removed))
    }

    /// Free typing. The snapshot is committed once the quiet window passes.
    pub fn type_text(&mut self, input: &str) {
        self.settle_caret();
        let at = self.take_selection().map_or(self.caret, |(start, _)| start);
        self.text.insert_str(at, input);
        self.caret = at + input.len();
        self.history.note_keystroke();
        self.render();
    }

    pub fn backspace(&mut self) {
        self.settle_caret();
        if let Some((start, _)) = self.take_selection() {
            self.caret = start;
        } else if let Some(ch) = self.text[..self.caret].chars().next_back() {
            self.caret -= ch.len_utf8();
            self.text.remove(self.caret);
        } else {
            return;
        }
        self.history.note_keystroke();
        self.render();
    }

    pub fn paste(&mut self, clip: &str) {
        self.settle_caret();
        let at = self.take_selection().map_or(self.caret, |(start, _)| start);
        self.text.insert_str(at, clip);
        self.caret = at + clip.len();
        self.render();
        self.history.commit_now(&self.text, self.caret);
    }

    /// Removes and returns the selected text.
    pub fn cut(&mut self) -> Option<String> {
        self.settle_caret();
        let (start, removed) = self.take_selection()?;
        self.caret = start;
        self.render();
        self.history.commit_now(&self.text, self.caret);
        Some(removed)
    }

    fn apply_edit(&mut self, edit: Edit) {
        if edit.text == self.text {
            self.set_caret(edit.caret);
            return;
        }

        debug!(caret = edit.caret, "Applying programmatic edit");
        self.text = edit.text;
        self.selection = None;
        self.caret = clamp_offset(&self.text, self.caret);
        self.pending_caret = Some(edit.caret);
        self.render();
        self.history.commit_now(&self.text, edit.caret);
    }

    pub fn assign_character(&mut self, name: &str) {
        self.settle_caret();
        let edit = self
            .editor
            .assign_character(&self.text, self.caret, self.selection, name);
        self.apply_edit(edit);
    }

    pub fn assign_language(&mut self, lang: &str) {
        self.settle_caret();
        let edit = self
            .editor
            .assign_language(&self.text, self.caret, self.selection, lang);
        self.apply_edit(edit);
    }

    /// Sets a parameter on the caret's tag after checking the value.
    pub fn assign_parameter(&mut self, name: &str, value: &str) -> Result<()> {
        let value = normalize_value(name, value)?;
        self.settle_caret();
        let edit = self.editor.assign_parameter(
            &self.text,
            self.caret,
            self.selection,
            &name.trim().to_lowercase(),
            &value,
        );
        self.apply_edit(edit);
        Ok(())
    }

    pub fn format(&mut self) {
        self.settle_caret();
        let formatted = format_tags(&self.text);
        self.apply_edit(Edit::new(formatted, 0));
    }

    pub fn undo(&mut self) {
        self.settle_caret();
        let entry = self.history.undo(&self.text);
        self.restore(entry.text, entry.caret);
    }

    pub fn redo(&mut self) {
        self.settle_caret();
        let entry = self.history.redo(&self.text);
        self.restore(entry.text, entry.caret);
    }

    fn restore(&mut self, text: String, caret: usize) {
        self.text = text;
        self.selection = None;
        self.caret = clamp_offset(&self.text, self.caret);
        self.pending_caret = Some(caret);
        self.render();
    }

    /// Stores the selected text, or else the tag at the caret, in `slot`.
    pub fn save_preset(&mut self, slot: usize) -> bool {
        if slot >= PRESET_SLOTS {
            return false;
        }

        let literal = match self.selection {
            Some(sel) => self.text[sel.start..sel.end].to_string(),
            None => match tag_at(&self.text, self.caret) {
                Some(tag) => tag.full_text,
                None => return false,
            },
        };

        debug!(slot, preset = %literal, "Saved preset");
        self.presets[slot] = Some(literal);
        true
    }

    pub fn preset(&self, slot: usize) -> Option<&str> {
        self.presets.get(slot)?.as_deref()
    }

    pub fn clear_preset(&mut self, slot: usize) -> bool {
        self.presets
            .get_mut(slot)
            .and_then(Option::take)
            .is_some()
    }

    pub fn insert_preset(&mut self, slot: usize) -> bool {
        let Some(preset) = self.preset(slot).map(str::to_string) else {
            return false;
        };
        self.settle_caret();
        let edit = self.editor.insert_preset(&self.text, self.caret, &preset);
        self.apply_edit(edit);
        true
    }

    /// Pulls fresh language and character lists. Failures keep the old ones.
    pub fn refresh_catalogs(&mut self, source: &dyn CatalogSource) {
        self.editor.languages_mut().refresh(source);
        self.characters.refresh(source);
    }

    pub fn validate_tags(&self) -> std::result::Result<(), TagSyntaxError> {
        validate_tag_syntax(&self.text)
    }

    pub fn validate_srt(&self) -> SrtReport {
        srt::validate_with(&self.text, self.gap_threshold_ms)
    }

    /// Entry under the caret, in SRT mode only.
    pub fn current_entry(&self) -> Option<usize> {
        if !self.srt_mode {
            return None;
        }
        srt::locate_entry_at(&self.text, self.pending_caret.unwrap_or(self.caret))
    }

    pub fn entry_indicator(&self) -> String {
        srt::entry_indicator(self.current_entry(), srt::parse(&self.text).len())
    }

    /// Selects the block of the entry at `position`.
    pub fn jump_to_entry(&mut self, position: usize) -> bool {
        let Some(span) = srt::entry_span(&self.text, position) else {
            return false;
        };
        self.pending_caret = None;
        self.select(span.start, span.end);
        true
    }

    pub fn next_entry(&mut self) -> bool {
        match self.current_entry() {
            Some(position) => self.jump_to_entry(position + 1),
            None => false,
        }
    }

    pub fn previous_entry(&mut self) -> bool {
        match self.current_entry() {
            Some(position) if position > 0 => self.jump_to_entry(position - 1),
            _ => false,
        }
    }

    /// Prefixes the current entry, or every entry, with `tag`.
    ///
    /// The caret moves with the text it sits in: every prefix inserted at or
    /// before it pushes it right.
    pub fn apply_tag_to_entries(&mut self, tag: &str, all: bool) -> bool {
        let Some(current) = self.current_entry() else {
            return false;
        };
        let (from, to) = if all { (0, usize::MAX) } else { (current, current) };
        let caret = self.pending_caret.unwrap_or(self.caret);

        let prefix_len = tag.len() + 1;
        let shifted = srt::parse(&self.text)
            .iter()
            .enumerate()
            .filter(|(position, entry)| {
                (from..=to).contains(position) && entry.span.end - entry.body.len() <= caret
            })
            .count();

        let tagged = srt::apply_tag_to_range(&self.text, tag, from, Some(to));
        self.apply_edit(Edit::new(tagged, caret + shifted * prefix_len));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::history::ManualClock;
    use std::rc::Rc;

    const SRT: &str = "1\n00:00:00,000 --> 00:00:02,000\nFirst\n\n2\n00:00:02,000 --> 00:00:04,000\nSecond\n";

    fn session() -> (Rc<ManualClock>, EditorSession<Rc<ManualClock>>) {
        let clock = Rc::new(ManualClock::new());
        let session = EditorSession::with_clock(&RcConfig::default(), Rc::clone(&clock));
        (clock, session)
    }

    #[test]
    fn test_typing_commits_after_quiet_window() {
        let (clock, mut session) = session();
        session.load("");
        for ch in ["H", "i", "!"] {
            session.type_text(ch);
            clock.advance(Duration::from_millis(100));
            assert!(!session.tick());
        }
        assert_eq!(session.history_status(), "1/1");

        clock.advance(Duration::from_millis(500));
        assert!(session.tick());
        assert_eq!(session.text(), "Hi!");
        assert_eq!(session.history_status(), "2/2");
    }

    #[test]
    fn test_assign_character_defers_caret() {
        let (_clock, mut session) = session();
        session.load("Hello");
        session.assign_character("Alice");

        assert_eq!(session.text(), "[Alice] Hello");
        assert_eq!(session.pending_caret(), Some(8));
        session.tick();
        assert_eq!(session.caret(), 8);
        assert_eq!(session.pending_caret(), None);
        assert_eq!(session.surface().caret_offset(), Some(8));
        assert_eq!(session.history_status(), "2/2");
    }

    #[test]
    fn test_tag_edits_chain_on_same_tag() {
        let (_clock, mut session) = session();
        session.load("Hello");
        session.assign_character("Alice");
        session.assign_language("de");
        session.assign_parameter("seed", "42").unwrap();
        session.tick();

        assert_eq!(session.text(), "[de:Alice|seed:42] Hello");
        assert_eq!(session.caret(), "[de:Alice|seed:42]".len());
    }

    #[test]
    fn test_assign_parameter_rejects_bad_value() {
        let (_clock, mut session) = session();
        session.load("[Alice] hi");
        session.set_caret(7);
        let result = session.assign_parameter("temperature", "9");
        assert!(matches!(result, Err(Error::OutOfRange { .. })));
        assert_eq!(session.text(), "[Alice] hi");
    }

    #[test]
    fn test_undo_redo_restores_text_and_caret() {
        let (_clock, mut session) = session();
        session.load("Hello");
        session.assign_character("Bob");
        session.tick();

        session.undo();
        assert_eq!(session.text(), "Hello");
        session.tick();
        assert_eq!(session.caret(), 0);

        session.redo();
        session.tick();
        assert_eq!(session.text(), "[Bob] Hello");
        assert_eq!(session.caret(), 6);
    }

    #[test]
    fn test_undo_does_not_commit_restored_text() {
        let (clock, mut session) = session();
        session.load("a");
        session.set_caret(1);
        session.type_text("b");
        clock.advance(Duration::from_secs(1));
        session.tick();
        assert_eq!(session.history_status(), "2/2");

        session.undo();
        clock.advance(Duration::from_secs(1));
        assert!(!session.tick());
        assert_eq!(session.history_status(), "1/2");
    }

    #[test]
    fn test_cut_and_paste() {
        let (_clock, mut session) = session();
        session.load("one two three");
        session.select(4, 8);
        assert_eq!(session.cut().as_deref(), Some("two "));
        assert_eq!(session.text(), "one three");

        session.paste("2 ");
        assert_eq!(session.text(), "one 2 three");
        assert_eq!(session.caret(), 6);
        assert_eq!(session.history_status(), "3/3");
        assert_eq!(session.cut(), None);
    }

    #[test]
    fn test_typing_replaces_selection() {
        let (_clock, mut session) = session();
        session.load("cat");
        session.select(0, 3);
        session.type_text("dog");
        assert_eq!(session.text(), "dog");
        session.backspace();
        assert_eq!(session.text(), "do");
        assert_eq!(session.caret(), 2);
    }

    #[test]
    fn test_backspace_multibyte() {
        let (_clock, mut session) = session();
        session.load("né");
        session.set_caret(3);
        session.backspace();
        assert_eq!(session.text(), "n");
        assert_eq!(session.caret(), 1);
    }

    #[test]
    fn test_format_commits_with_caret_at_start() {
        let (_clock, mut session) = session();
        session.load("Hi[ Alice ]there  ");
        session.format();
        session.tick();
        assert_eq!(session.text(), "Hi [Alice] there");
        assert_eq!(session.caret(), 0);
    }

    #[test]
    fn test_presets() {
        let (_clock, mut session) = session();
        session.load("[de:Alice|seed:42] Hello");
        session.set_caret(3);
        assert!(session.save_preset(0));
        assert_eq!(session.preset(0), Some("[de:Alice|seed:42]"));

        session.set_caret(session.text().len());
        session.type_text(" ");
        assert!(session.insert_preset(0));
        session.tick();
        assert_eq!(session.text(), "[de:Alice|seed:42] Hello [de:Alice|seed:42] ");

        assert!(session.clear_preset(0));
        assert!(!session.clear_preset(0));
        assert!(!session.insert_preset(0));
        assert!(!session.save_preset(PRESET_SLOTS));
    }

    #[test]
    fn test_srt_mode_and_navigation() {
        let (_clock, mut session) = session();
        session.load("plain");
        assert!(!session.is_srt_mode());
        assert_eq!(session.entry_indicator(), "Entry -/-");

        session.load(SRT);
        assert!(session.is_srt_mode());
        assert_eq!(session.current_entry(), Some(0));
        assert_eq!(session.entry_indicator(), "Entry 1/2");

        assert!(session.next_entry());
        assert_eq!(session.current_entry(), Some(1));
        let selection = session.selection().unwrap();
        assert!(session.text()[selection.start..selection.end].starts_with("2\n"));

        assert!(!session.next_entry());
        assert!(session.previous_entry());
        assert_eq!(session.current_entry(), Some(0));
    }

    #[test]
    fn test_apply_tag_to_current_and_all_entries() {
        let (_clock, mut session) = session();
        session.load(SRT);
        assert!(session.apply_tag_to_entries("[Alice]", false));
        let bodies: Vec<_> = srt::parse(session.text()).into_iter().map(|e| e.body).collect();
        assert_eq!(bodies, vec!["[Alice] First", "Second"]);

        session.tick();
        assert!(session.apply_tag_to_entries("[en:Bob]", true));
        let bodies: Vec<_> = srt::parse(session.text()).into_iter().map(|e| e.body).collect();
        assert_eq!(bodies, vec!["[en:Bob] [Alice] First", "[en:Bob] Second"]);
    }

    #[test]
    fn test_apply_tag_to_entries_keeps_caret_on_its_letter() {
        let (_clock, mut session) = session();
        session.load(SRT);
        let first = SRT.find("First").unwrap_or_default() + 2;
        session.set_caret(first);

        assert!(session.apply_tag_to_entries("[Alice]", false));
        session.tick();
        assert_eq!(&session.text()[session.caret()..session.caret() + 3], "rst");

        assert!(session.apply_tag_to_entries("[en:Bob]", true));
        session.tick();
        assert_eq!(&session.text()[session.caret()..session.caret() + 3], "rst");

        let second = session.text().find("Second").unwrap_or_default() + 1;
        session.set_caret(second);
        assert!(session.apply_tag_to_entries("[Carol]", true));
        session.tick();
        assert_eq!(&session.text()[session.caret()..session.caret() + 3], "eco");
    }

    #[test]
    fn test_load_starts_fresh_history() {
        let (_clock, mut session) = session();
        session.load("first document");
        session.load("second document");
        assert_eq!(session.history_status(), "1/1");

        session.undo();
        session.tick();
        assert_eq!(session.text(), "second document");
        assert_eq!(session.history_status(), "1/1");
    }

    #[test]
    fn test_validation_helpers() {
        let (_clock, mut session) = session();
        session.load("[Alice|seed] hi");
        assert!(session.validate_tags().is_err());
        assert!(!session.validate_srt().is_valid());

        session.load(SRT);
        assert!(session.validate_tags().is_ok());
        assert!(session.validate_srt().is_valid());
    }

    #[test]
    fn test_config_languages_drive_transforms() {
        let config = RcConfig {
            languages: vec!["xx".to_string()],
            ..RcConfig::default()
        };
        let mut session = EditorSession::with_clock(&config, ManualClock::new());
        session.load("[xx:Alice] hi");
        session.set_caret(10);
        session.assign_character("Bob");
        assert_eq!(session.text(), "[xx:Bob] hi");
        assert!(!session.languages().codes().contains(&"en".to_string()));
    }
}
