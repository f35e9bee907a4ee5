//! Structured editing session.
//!
//! A session owns the document, the focused element index and the history.
//! Every transition that changes the document pushes the previous state onto
//! the history and re-renders the markup, so `markup()` always reflects the
//! document the user sees.

use unicode_segmentation::UnicodeSegmentation;

use crate::classify::{strip_centered_markers, Classifier, ClassifierOptions};
use crate::element::{Document, Element, ElementKind};
use crate::history::{History, DEFAULT_HISTORY_CAPACITY};
use crate::names::CharacterNames;
use crate::render::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub classifier: ClassifierOptions,
    pub history_capacity: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            classifier: ClassifierOptions::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// State restored by undo and redo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub document: Document,
    pub cursor: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Session {
    document: Document,
    cursor: Option<usize>,
    active_kind: ElementKind,
    // Text of the focused element as typed, before trimming.
    draft: String,
    classifier: Classifier,
    names: CharacterNames,
    history: History<Snapshot>,
    markup: String,
}

impl Session {
    pub fn new(markup: &str, options: SessionOptions) -> Self {
        Self::with_names(markup, options, CharacterNames::new())
    }

    /// Starts a session whose name registry is seeded with `names`.
    pub fn with_names(markup: &str, options: SessionOptions, mut names: CharacterNames) -> Self {
        let classifier = Classifier::new(options.classifier);
        let document = classifier.parse_recording(markup, &mut names);
        log::debug!(
            "Session started with {} elements and {} known names",
            document.len(),
            names.len()
        );
        Self::build(document, classifier, names, options.history_capacity)
    }

    pub fn from_document(document: Document, options: SessionOptions) -> Self {
        let classifier = Classifier::new(options.classifier);
        Self::build(
            document,
            classifier,
            CharacterNames::new(),
            options.history_capacity,
        )
    }

    fn build(
        document: Document,
        classifier: Classifier,
        names: CharacterNames,
        history_capacity: usize,
    ) -> Self {
        let mut session = Self {
            document,
            cursor: Some(0),
            active_kind: ElementKind::Action,
            draft: String::new(),
            classifier,
            names,
            history: History::new(history_capacity),
            markup: String::new(),
        };
        session.finish();
        session
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn active_kind(&self) -> ElementKind {
        self.active_kind
    }

    pub fn current_element(&self) -> Option<&Element> {
        self.cursor.and_then(|index| self.document.get(index))
    }

    /// The focused element's text as typed, including trailing spaces.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Markup for the document as of the last transition.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn into_markup(self) -> String {
        self.markup
    }

    pub fn history(&self) -> &History<Snapshot> {
        &self.history
    }

    pub fn character_names(&self) -> &CharacterNames {
        &self.names
    }

    /// Name completions for the focused character cue.
    pub fn suggestions(&self) -> Vec<&str> {
        match self.current_element() {
            Some(element) if element.kind == ElementKind::Character && !element.is_blank() => {
                self.names.suggest(element.text())
            }
            _ => Vec::new(),
        }
    }

    /// Replaces the focused character cue with its first suggestion.
    pub fn complete_name(&mut self) -> bool {
        let Some(name) = self.suggestions().first().map(|name| name.to_string()) else {
            return false;
        };
        self.edit_text(&name)
    }

    // Navigation

    pub fn focus(&mut self, index: usize) -> bool {
        if index >= self.document.len() {
            return false;
        }
        self.cursor = Some(index);
        self.sync_focus();
        true
    }

    pub fn focus_next(&mut self) -> bool {
        match self.cursor {
            Some(index) => self.focus(index + 1),
            None => self.focus(0),
        }
    }

    pub fn focus_previous(&mut self) -> bool {
        match self.cursor {
            Some(index) if index > 0 => self.focus(index - 1),
            _ => false,
        }
    }

    pub fn blur(&mut self) {
        self.cursor = None;
        self.sync_focus();
    }

    // Transitions

    /// Confirms the focused element and opens the conventional next one.
    pub fn commit_and_advance(&mut self) -> bool {
        let next = self
            .current_element()
            .map(|element| element.kind.next_kind())
            .unwrap_or_default();
        log::debug!("Commit: opening {} element", next);
        self.insert_after_cursor(Element::placeholder(next))
    }

    pub fn insert_element(&mut self, kind: ElementKind) -> bool {
        log::debug!("Inserting {} element", kind);
        self.insert_after_cursor(Element::placeholder(kind))
    }

    /// Advances the focused element through the kind cycle. Text is untouched.
    pub fn cycle_kind(&mut self) -> bool {
        let Some(index) = self.cursor_index() else {
            return false;
        };
        self.record();
        if let Some(element) = self.document.get_mut(index) {
            element.kind = element.kind.cycled();
            log::debug!("Cycled element {} to {}", index, element.kind);
        }
        self.finish();
        true
    }

    /// Sets the focused element's kind. A blank element shows the new placeholder.
    pub fn change_kind(&mut self, kind: ElementKind) -> bool {
        let Some(index) = self.cursor_index() else {
            return false;
        };
        if self.document.get(index).map(|element| element.kind) == Some(kind) {
            return false;
        }
        self.record();
        if let Some(element) = self.document.get_mut(index) {
            let blank = element.is_blank();
            element.kind = kind;
            if blank {
                element.set_text(kind.placeholder());
            }
        }
        self.finish();
        true
    }

    /// Replaces the focused element's text and reclassifies it.
    pub fn edit_text(&mut self, text: &str) -> bool {
        let draft = single_line(text);
        self.apply_draft(draft)
    }

    /// Appends to the focused element. Typing into a placeholder replaces it,
    /// and a line break commits the element.
    pub fn insert_char(&mut self, c: char) -> bool {
        if c == '\n' || c == '\r' {
            return self.commit_and_advance();
        }
        let mut draft = self.editable_draft();
        draft.push(c);
        self.apply_draft(draft)
    }

    /// Pastes text at the end of the focused element. Additional lines become
    /// new elements, classified the way markup lines are.
    pub fn insert_str(&mut self, text: &str) -> bool {
        let Some((first, rest)) = text.split_once('\n') else {
            let mut draft = self.editable_draft();
            draft.push_str(text);
            return self.apply_draft(draft);
        };
        let Some(index) = self.cursor_index() else {
            return false;
        };

        let mut draft = self.editable_draft();
        draft.push_str(first.trim_end_matches('\r'));
        let pasted = self.classifier.lines_recording(rest, &mut self.names);

        self.record();
        self.draft = draft;
        self.store_draft(index);
        let mut last = index;
        for element in pasted {
            last = self.document.insert(last + 1, element);
        }
        self.cursor = Some(last);
        log::debug!("Pasted {} lines after element {}", last - index, index);
        self.finish();
        true
    }

    /// Deletes one grapheme, or removes the focused element when it is blank.
    pub fn delete_backward(&mut self) -> bool {
        let Some(blank) = self.current_element().map(Element::is_blank) else {
            return false;
        };
        if blank {
            return self.delete_empty_backward();
        }
        let mut draft = self.draft.clone();
        if let Some((offset, _)) = draft.grapheme_indices(true).next_back() {
            draft.truncate(offset);
        }
        self.apply_draft(draft)
    }

    /// Removes a blank focused element and focuses the one before it.
    /// The first element is never removed.
    pub fn delete_empty_backward(&mut self) -> bool {
        let Some(index) = self.cursor_index() else {
            return false;
        };
        let blank = self
            .document
            .get(index)
            .is_some_and(|element| element.is_blank());
        if index == 0 || !blank {
            return false;
        }
        self.record();
        self.document.remove(index);
        self.cursor = Some(index - 1);
        log::debug!("Removed empty element {}", index);
        self.finish();
        true
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.snapshot()) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.snapshot()) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    // Internals

    fn cursor_index(&self) -> Option<usize> {
        self.cursor.filter(|index| *index < self.document.len())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            document: self.document.clone(),
            cursor: self.cursor,
        }
    }

    fn record(&mut self) {
        self.history.push(self.snapshot());
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.document = snapshot.document;
        self.cursor = snapshot.cursor;
        self.finish();
    }

    fn insert_after_cursor(&mut self, element: Element) -> bool {
        let position = match self.cursor_index() {
            Some(index) => index + 1,
            None => self.document.len(),
        };
        self.record();
        let index = self.document.insert(position, element);
        self.cursor = Some(index);
        self.finish();
        true
    }

    // The draft with a placeholder treated as empty.
    fn editable_draft(&self) -> String {
        match self.current_element() {
            Some(element) if element.is_placeholder() => String::new(),
            _ => self.draft.clone(),
        }
    }

    // Keeps the draft; only a change to the trimmed text touches the document.
    fn apply_draft(&mut self, draft: String) -> bool {
        let Some(index) = self.cursor_index() else {
            return false;
        };
        let unchanged = self
            .document
            .get(index)
            .is_some_and(|element| element.text() == draft.trim());
        if unchanged {
            self.draft = draft;
            return false;
        }

        self.record();
        self.draft = draft;
        self.store_draft(index);
        self.markup = render(&self.document);
        self.active_kind = self.document.get(index).map(|e| e.kind).unwrap_or_default();
        true
    }

    fn store_draft(&mut self, index: usize) {
        if let Some(element) = self.document.get_mut(index) {
            element.set_text(&self.draft);
        }
        self.reclassify(index);
    }

    // Only action elements are promoted. Cues typed into a character element
    // are still recorded.
    fn reclassify(&mut self, index: usize) {
        let Some((kind, text)) = self
            .document
            .get(index)
            .filter(|element| !element.is_blank())
            .map(|element| (element.kind, element.text().to_string()))
        else {
            return;
        };
        match kind {
            ElementKind::Action => {}
            ElementKind::Character => {
                self.classifier.classify_recording(&text, &mut self.names);
                return;
            }
            _ => return,
        }

        let detected = self.classifier.classify_recording(&text, &mut self.names);
        if detected == ElementKind::Action {
            return;
        }
        log::debug!("Reclassified element {} from {} to {}", index, kind, detected);
        if let Some(element) = self.document.get_mut(index) {
            element.kind = detected;
            if detected == ElementKind::Centered {
                let inner = strip_centered_markers(&text).to_string();
                element.set_text(&inner);
                if self.cursor == Some(index) {
                    self.draft = inner;
                }
            }
        }
    }

    // Restores the invariants after a structural change and resynchronizes.
    fn finish(&mut self) {
        if self.document.is_empty() {
            self.document.push(Element::placeholder(ElementKind::Action));
        }
        if let Some(index) = self.cursor {
            self.cursor = Some(index.min(self.document.len() - 1));
        }
        self.sync_focus();
        self.markup = render(&self.document);
    }

    fn sync_focus(&mut self) {
        match self
            .current_element()
            .map(|element| (element.kind, element.text().to_string()))
        {
            Some((kind, text)) => {
                self.active_kind = kind;
                self.draft = text;
            }
            None => self.draft.clear(),
        }
    }
}

fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn session(markup: &str) -> Session {
        Session::new(markup, SessionOptions::default())
    }

    fn kinds(session: &Session) -> Vec<ElementKind> {
        session.document().iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_new_session_focuses_first_element() {
        let session = session("INT. BARN - NIGHT\n\nRain.");
        assert_eq!(session.cursor(), Some(0));
        assert_eq!(session.active_kind(), ElementKind::SceneHeading);
        assert_eq!(session.draft(), "INT. BARN - NIGHT");
        assert_eq!(session.markup(), "INT. BARN - NIGHT\n\nRain.\n\n");
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_commit_from_character_opens_dialogue() {
        let mut session = session("JOHN");
        assert!(session.commit_and_advance());
        assert_eq!(kinds(&session), vec![ElementKind::Character, ElementKind::Dialogue]);
        assert_eq!(session.cursor(), Some(1));
        assert_eq!(session.active_kind(), ElementKind::Dialogue);
        assert_eq!(
            session.current_element().unwrap().text(),
            ElementKind::Dialogue.placeholder()
        );
        // The placeholder never reaches the markup.
        assert_eq!(session.markup(), "JOHN\n");
    }

    #[test]
    fn test_commit_inserts_directly_after_focus() {
        let mut session = session("JOHN\nHello.\n\nSARAH");
        session.focus(1);
        session.commit_and_advance();
        assert_eq!(
            kinds(&session),
            vec![
                ElementKind::Character,
                ElementKind::Dialogue,
                ElementKind::Character,
                ElementKind::Character,
            ]
        );
        assert_eq!(session.cursor(), Some(2));
    }

    #[test]
    fn test_commit_follows_table_for_every_kind() {
        for kind in ElementKind::ALL {
            let document: Document = vec![Element::new(kind, "x")].into_iter().collect();
            let mut session = Session::from_document(document, SessionOptions::default());
            session.commit_and_advance();
            assert_eq!(session.active_kind(), kind.next_kind(), "after {}", kind);
        }
    }

    #[test]
    fn test_commit_without_focus_appends() {
        let mut session = session("Rain.\n\nThunder.");
        session.blur();
        assert!(session.commit_and_advance());
        assert_eq!(session.cursor(), Some(2));
        assert_eq!(session.active_kind(), ElementKind::Action);
    }

    #[test]
    fn test_cycle_kind_keeps_text() {
        let mut session = session("CUT TO:");
        for _ in 0..6 {
            assert!(session.cycle_kind());
        }
        assert_eq!(session.active_kind(), ElementKind::Transition);
        assert_eq!(session.current_element().unwrap().text(), "CUT TO:");
        assert_eq!(session.history().undo_len(), 6);
    }

    #[test]
    fn test_cycle_does_not_replace_placeholder() {
        let mut session = session("JOHN");
        session.commit_and_advance();
        session.cycle_kind();
        assert_eq!(session.active_kind(), ElementKind::Parenthetical);
        assert_eq!(
            session.current_element().unwrap().text(),
            ElementKind::Dialogue.placeholder()
        );
    }

    #[test]
    fn test_cycle_without_focus_is_noop() {
        let mut session = session("Rain.");
        session.blur();
        assert!(!session.cycle_kind());
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_change_kind_refreshes_placeholder() {
        let mut session = session("JOHN");
        session.commit_and_advance();
        assert!(session.change_kind(ElementKind::Parenthetical));
        assert_eq!(session.current_element().unwrap().text(), "(parenthetical)");
        assert!(!session.change_kind(ElementKind::Parenthetical));

        session.edit_text("(softly)");
        session.change_kind(ElementKind::Dialogue);
        assert_eq!(session.current_element().unwrap().text(), "(softly)");
    }

    #[test]
    fn test_typing_promotes_action_to_scene_heading() {
        let mut session = session("");
        for c in "int. lab - night".chars() {
            session.insert_char(c);
        }
        assert_eq!(session.active_kind(), ElementKind::SceneHeading);
        assert_eq!(session.markup(), "INT. LAB - NIGHT\n\n");
    }

    #[test]
    fn test_typing_replaces_placeholder() {
        let mut session = session("JOHN");
        session.commit_and_advance();
        session.insert_char('H');
        session.insert_char('i');
        assert_eq!(session.current_element().unwrap().text(), "Hi");
        assert_eq!(session.active_kind(), ElementKind::Dialogue);
    }

    #[test]
    fn test_reclassify_never_demotes_to_action() {
        let mut session = session("JOHN");
        session.commit_and_advance();
        session.edit_text("where were you?");
        assert_eq!(session.active_kind(), ElementKind::Dialogue);
    }

    #[test]
    fn test_reclassify_records_character_names() {
        let mut session = session("Rain.");
        session.edit_text("MARGARET");
        assert_eq!(session.active_kind(), ElementKind::Character);
        assert!(session.character_names().contains("MARGARET"));
    }

    #[test]
    fn test_centered_survives_editing() {
        let mut session = session(">THE END<");
        session.insert_char('!');
        assert_eq!(session.active_kind(), ElementKind::Centered);
        assert_eq!(session.markup(), ">THE END!<\n\n");
    }

    #[test]
    fn test_typed_centered_markers_are_stripped() {
        let mut session = session("Rain.");
        assert!(session.edit_text(">THE END<"));
        assert_eq!(session.active_kind(), ElementKind::Centered);
        assert_eq!(session.current_element().unwrap().text(), "THE END");
        assert_eq!(session.markup(), ">THE END<\n\n");

        session.insert_char('!');
        assert_eq!(session.current_element().unwrap().text(), "THE END!");
        assert_eq!(session.markup(), ">THE END!<\n\n");
        assert_eq!(parse(session.markup()).get(0).unwrap().text(), "THE END!");
    }

    #[test]
    fn test_shouted_dialogue_stays_dialogue() {
        let mut session = session("JOHN");
        session.commit_and_advance();
        for c in "NO WAY".chars() {
            session.insert_char(c);
        }
        assert_eq!(session.active_kind(), ElementKind::Dialogue);
        assert_eq!(session.markup(), "JOHN\nNO WAY\n");
        assert!(!session.character_names().contains("NO WAY"));
    }

    #[test]
    fn test_only_action_is_promoted() {
        let mut session = session("JOHN");
        session.commit_and_advance();
        session.edit_text("(quietly)");
        assert_eq!(session.active_kind(), ElementKind::Dialogue);

        session.change_kind(ElementKind::Transition);
        session.edit_text("INT. HALL - DAY");
        assert_eq!(session.active_kind(), ElementKind::Transition);
    }

    #[test]
    fn test_cue_typed_into_character_element_is_recorded() {
        let mut session = session("Rain.");
        session.insert_element(ElementKind::Character);
        session.edit_text("OLGA");
        assert!(session.character_names().contains("OLGA"));
    }

    #[test]
    fn test_trailing_space_is_kept_in_draft() {
        let mut session = session("Rain.");
        session.edit_text("");
        for c in "MARY JANE".chars() {
            session.insert_char(c);
        }
        assert_eq!(session.current_element().unwrap().text(), "MARY JANE");
        assert_eq!(session.active_kind(), ElementKind::Character);
    }

    #[test]
    fn test_whitespace_only_change_skips_history() {
        let mut session = session("Rain.");
        assert!(!session.insert_char(' '));
        assert_eq!(session.draft(), "Rain. ");
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_delete_backward_removes_grapheme() {
        let mut accented = session("Café");
        assert!(accented.delete_backward());
        assert_eq!(accented.current_element().unwrap().text(), "Caf");

        let mut emoji = session("ok👍🏽");
        emoji.delete_backward();
        assert_eq!(emoji.current_element().unwrap().text(), "ok");
    }

    #[test]
    fn test_delete_backward_on_blank_element_removes_it() {
        let mut session = session("JOHN");
        session.commit_and_advance();
        assert!(session.delete_backward());
        assert_eq!(session.document().len(), 1);
        assert_eq!(session.cursor(), Some(0));
        assert_eq!(session.active_kind(), ElementKind::Character);
    }

    #[test]
    fn test_delete_backward_on_first_element_is_noop() {
        let mut session = session("");
        session.edit_text("");
        let before = session.history().undo_len();
        assert!(!session.delete_backward());
        assert_eq!(session.document().len(), 1);
        assert_eq!(session.history().undo_len(), before);
    }

    #[test]
    fn test_delete_empty_backward_requires_blank_element() {
        let mut session = session("Rain.\n\nThunder.");
        session.focus(1);
        assert!(!session.delete_empty_backward());
        assert_eq!(session.document().len(), 2);
    }

    #[test]
    fn test_paste_splits_lines_into_elements() {
        let mut session = session("Rain.");
        assert!(session.insert_str(" Wind.\r\nJOHN\n\n(shouting)\nRun!"));
        assert_eq!(
            kinds(&session),
            vec![
                ElementKind::Action,
                ElementKind::Character,
                ElementKind::Parenthetical,
                ElementKind::Dialogue,
            ]
        );
        assert_eq!(session.document().get(0).unwrap().text(), "Rain. Wind.");
        assert_eq!(session.cursor(), Some(3));
        assert!(session.character_names().contains("JOHN"));

        // The whole paste is a single undo step.
        assert!(session.undo());
        assert_eq!(session.document().len(), 1);
        assert_eq!(session.document().get(0).unwrap().text(), "Rain.");
    }

    #[test]
    fn test_undo_redo_restores_document_and_markup() {
        let mut session = session("JOHN");
        session.commit_and_advance();
        session.edit_text("Hello.");
        assert_eq!(session.markup(), "JOHN\nHello.\n");

        assert!(session.undo());
        assert_eq!(session.markup(), "JOHN\n");
        assert!(session.current_element().unwrap().is_placeholder());

        assert!(session.undo());
        assert_eq!(session.document().len(), 1);
        assert_eq!(session.cursor(), Some(0));
        assert!(!session.undo());

        assert!(session.redo());
        assert!(session.redo());
        assert_eq!(session.markup(), "JOHN\nHello.\n");
        assert!(!session.redo());
    }

    #[test]
    fn test_new_edit_invalidates_redo() {
        let mut session = session("Rain.");
        session.edit_text("Snow.");
        session.undo();
        assert!(session.history().can_redo());
        session.edit_text("Hail.");
        assert!(!session.history().can_redo());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut session = session("Rain.");
        for i in 0..60 {
            session.edit_text(&format!("Rain {}.", i));
        }
        assert_eq!(session.history().undo_len(), 50);

        let mut undone = 0;
        while session.undo() {
            undone += 1;
        }
        assert_eq!(undone, 50);
        // The ten oldest states, including the original text, are gone.
        assert_eq!(session.current_element().unwrap().text(), "Rain 9.");
    }

    #[test]
    fn test_focus_out_of_range() {
        let mut session = session("Rain.");
        assert!(!session.focus(4));
        assert!(!session.focus_previous());
        assert!(!session.focus_next());
        assert_eq!(session.cursor(), Some(0));
    }

    #[test]
    fn test_suggestions_and_completion() {
        let names = CharacterNames::with_names(["SARAH", "SAMUEL"]);
        let mut session = Session::with_names("SARAH\nHi.", SessionOptions::default(), names);
        session.focus(1);
        session.insert_element(ElementKind::Character);
        assert_eq!(session.active_kind(), ElementKind::Character);
        assert!(session.suggestions().is_empty());

        session.edit_text("SAM");
        assert_eq!(session.suggestions(), vec!["SAMUEL"]);
        assert!(session.complete_name());
        assert_eq!(session.current_element().unwrap().text(), "SAMUEL");
        assert!(session.suggestions().is_empty());
    }
}
