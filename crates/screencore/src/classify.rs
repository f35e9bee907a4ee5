//! Line classification.
//!
//! Rules are checked in a fixed order and the first match wins. The order
//! matters because the patterns overlap: `CUT TO:` is all uppercase and would
//! otherwise read as a character cue.
//!
//! 1. Scene heading (`INT.`, `EXT.`, `EST.`)
//! 2. Transition (`FADE IN:`, `FADE OUT:`, `CUT TO:`, `DISSOLVE TO:`)
//! 3. Parenthetical (one matching pair of parentheses around the line)
//! 4. Centered text (`>` ... `<`)
//! 5. Character cue (uppercase letters and spaces, bounded length)
//! 6. Action

use lazy_static::lazy_static;
use regex::Regex;

use crate::element::ElementKind;
use crate::names::CharacterNames;

pub const DEFAULT_CHARACTER_MAX_LEN: usize = 40;
pub const CHARACTER_MIN_LEN: usize = 2;

lazy_static! {
    static ref SCENE_HEADING: Regex =
        Regex::new(r"(?i)^(INT\.|EXT\.|EST\.)").expect("Invalid SCENE_HEADING regex pattern");
    static ref TRANSITION: Regex = Regex::new(r"(?i)^(FADE IN:|FADE OUT:|CUT TO:|DISSOLVE TO:)")
        .expect("Invalid TRANSITION regex pattern");
    static ref PARENTHETICAL: Regex =
        Regex::new(r"^\(.+\)$").expect("Invalid PARENTHETICAL regex pattern");
    static ref CENTERED: Regex = Regex::new(r"^>.+<$").expect("Invalid CENTERED regex pattern");
    static ref CHARACTER: Regex =
        Regex::new(r"^[A-Z\s]+$").expect("Invalid CHARACTER regex pattern");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierOptions {
    /// Character cues must be shorter than this many characters.
    pub character_max_len: usize,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            character_max_len: DEFAULT_CHARACTER_MAX_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classifier {
    options: ClassifierOptions,
}

impl Classifier {
    pub fn new(options: ClassifierOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ClassifierOptions {
        self.options
    }

    pub fn classify(&self, line: &str) -> ElementKind {
        let line = line.trim();

        if SCENE_HEADING.is_match(line) {
            ElementKind::SceneHeading
        } else if TRANSITION.is_match(line) {
            ElementKind::Transition
        } else if is_parenthetical(line) {
            ElementKind::Parenthetical
        } else if CENTERED.is_match(line) {
            ElementKind::Centered
        } else if self.is_character_cue(line) {
            ElementKind::Character
        } else {
            ElementKind::Action
        }
    }

    /// Classifies `line` and records it in `names` when it is a character cue.
    pub fn classify_recording(&self, line: &str, names: &mut CharacterNames) -> ElementKind {
        let kind = self.classify(line);
        if kind == ElementKind::Character && names.record(line) {
            log::debug!("Recorded character name: {}", line.trim());
        }
        kind
    }

    fn is_character_cue(&self, line: &str) -> bool {
        let len = line.chars().count();
        CHARACTER.is_match(line) && len >= CHARACTER_MIN_LEN && len < self.options.character_max_len
    }
}

/// Classifies with the default options.
pub fn classify(line: &str) -> ElementKind {
    Classifier::default().classify(line)
}

// `(a)(b)` has parentheses at both ends but is two pairs, not one.
fn is_parenthetical(line: &str) -> bool {
    if !PARENTHETICAL.is_match(line) {
        return false;
    }
    let last = line.len() - 1;
    let mut depth = 0usize;
    for (index, c) in line.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return index == last;
                }
            }
            _ => {}
        }
    }
    false
}

/// Strips the `>` / `<` centering markers, if present.
pub fn strip_centered_markers(line: &str) -> &str {
    let line = line.trim();
    if CENTERED.is_match(line) {
        line[1..line.len() - 1].trim()
    } else {
        line
    }
}
