use crate::classify::{strip_centered_markers, Classifier};
use crate::element::{Document, Element, ElementKind};
use crate::names::CharacterNames;

impl Classifier {
    /// Converts markup into a document, recording character cues in `names`.
    ///
    /// Blank lines are layout only and never become elements. A markup text
    /// with no content yields the starter document.
    pub fn parse_recording(&self, markup: &str, names: &mut CharacterNames) -> Document {
        let document: Document = self
            .lines_recording(markup, names)
            .into_iter()
            .collect();

        if document.is_empty() {
            log::debug!("Markup has no content, starting with placeholder document");
            Document::starter()
        } else {
            document
        }
    }

    /// Classified elements for each non-blank line, without the starter fallback.
    ///
    /// A line that reads as action directly under a character cue or a
    /// parenthetical is that character's dialogue.
    pub fn lines_recording(&self, markup: &str, names: &mut CharacterNames) -> Vec<Element> {
        let mut elements: Vec<Element> = Vec::new();
        let mut after_blank = false;

        for line in markup.lines().map(str::trim) {
            if line.is_empty() {
                after_blank = true;
                continue;
            }

            let mut kind = self.classify_recording(line, names);
            let in_dialogue = !after_blank
                && elements
                    .last()
                    .is_some_and(|previous| opens_dialogue(previous.kind));
            if kind == ElementKind::Action && in_dialogue {
                kind = ElementKind::Dialogue;
            }
            after_blank = false;

            let text = match kind {
                ElementKind::Centered => strip_centered_markers(line),
                _ => line,
            };
            elements.push(Element::new(kind, text));
        }
        elements
    }

    pub fn parse(&self, markup: &str) -> Document {
        self.parse_recording(markup, &mut CharacterNames::new())
    }
}

fn opens_dialogue(kind: ElementKind) -> bool {
    matches!(kind, ElementKind::Character | ElementKind::Parenthetical)
}

/// Converts markup into a document with the default classifier.
pub fn parse(markup: &str) -> Document {
    Classifier::default().parse(markup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::STARTER_TEXT;

    #[test]
    fn test_blank_lines_are_dropped() {
        let document = parse("\n\nJOHN\n   \nHello.\n\n");
        assert_eq!(document.len(), 2);
        assert_eq!(document.get(0).unwrap().kind, ElementKind::Character);
        assert_eq!(document.get(1).unwrap().text(), "Hello.");
    }

    #[test]
    fn test_crlf_lines() {
        let document = parse("INT. HOUSE - DAY\r\n\r\nShe sits.\r\n");
        assert_eq!(document.len(), 2);
        assert_eq!(document.get(0).unwrap().text(), "INT. HOUSE - DAY");
        assert_eq!(document.get(1).unwrap().text(), "She sits.");
    }

    #[test]
    fn test_empty_markup_yields_starter() {
        for markup in ["", "   \n\n  \t\n"] {
            let document = parse(markup);
            assert_eq!(document.len(), 1);
            let element = document.get(0).unwrap();
            assert_eq!(element.kind, ElementKind::Action);
            assert_eq!(element.text(), STARTER_TEXT);
        }
    }

    #[test]
    fn test_centered_markers_are_removed() {
        let document = parse(">  THE END  <");
        let element = document.get(0).unwrap();
        assert_eq!(element.kind, ElementKind::Centered);
        assert_eq!(element.text(), "THE END");
    }

    #[test]
    fn test_lines_are_trimmed() {
        let document = parse("      (quietly)   ");
        let element = document.get(0).unwrap();
        assert_eq!(element.kind, ElementKind::Parenthetical);
        assert_eq!(element.text(), "(quietly)");
    }

    #[test]
    fn test_dialogue_follows_cue_and_parenthetical() {
        let document = parse("JOHN\nWhere were you?\n\n(pause)\nI was waiting.");
        let kinds: Vec<ElementKind> = document.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::Character,
                ElementKind::Dialogue,
                ElementKind::Parenthetical,
                ElementKind::Dialogue,
            ]
        );
    }

    #[test]
    fn test_blank_line_ends_dialogue_context() {
        let document = parse("BOOM\n\nThe door explodes.");
        assert_eq!(document.get(1).unwrap().kind, ElementKind::Action);

        let document = parse("JOHN\nHello.\nHe leaves.");
        assert_eq!(document.get(2).unwrap().kind, ElementKind::Action);
    }

    #[test]
    fn test_parse_records_names() {
        let mut names = CharacterNames::new();
        Classifier::default().parse_recording("JOHN\nHi.\n\nSARAH\nHey.", &mut names);
        assert!(names.contains("JOHN"));
        assert!(names.contains("SARAH"));
        assert_eq!(names.len(), 2);
    }
}
