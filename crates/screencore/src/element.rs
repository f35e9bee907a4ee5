use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text given to the starter element when parsed markup has no content.
pub const STARTER_TEXT: &str = "Start writing your screenplay...";

/// Order used when the user cycles an element's kind.
pub const CYCLE_ORDER: [ElementKind; 6] = [
    ElementKind::Action,
    ElementKind::SceneHeading,
    ElementKind::Character,
    ElementKind::Dialogue,
    ElementKind::Parenthetical,
    ElementKind::Transition,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    SceneHeading,
    Character,
    Dialogue,
    Parenthetical,
    Transition,
    Centered,
    #[default]
    Action,
}

impl ElementKind {
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Action,
        ElementKind::SceneHeading,
        ElementKind::Character,
        ElementKind::Dialogue,
        ElementKind::Parenthetical,
        ElementKind::Transition,
        ElementKind::Centered,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::SceneHeading => "scene-heading",
            ElementKind::Character => "character",
            ElementKind::Dialogue => "dialogue",
            ElementKind::Parenthetical => "parenthetical",
            ElementKind::Transition => "transition",
            ElementKind::Centered => "centered",
            ElementKind::Action => "action",
        }
    }

    /// Human readable label for selectors and status lines.
    pub fn label(self) -> &'static str {
        match self {
            ElementKind::SceneHeading => "Scene Heading",
            ElementKind::Character => "Character",
            ElementKind::Dialogue => "Dialogue",
            ElementKind::Parenthetical => "Parenthetical",
            ElementKind::Transition => "Transition",
            ElementKind::Centered => "Centered Text",
            ElementKind::Action => "Action",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            ElementKind::SceneHeading => "INT. LOCATION - DAY",
            ElementKind::Character => "CHARACTER NAME",
            ElementKind::Dialogue => "Character dialogue...",
            ElementKind::Parenthetical => "(parenthetical)",
            ElementKind::Transition => "CUT TO:",
            ElementKind::Centered => "CENTERED TEXT",
            ElementKind::Action => "Action description...",
        }
    }

    /// The kind that conventionally follows this one when an element is committed.
    pub fn next_kind(self) -> ElementKind {
        match self {
            ElementKind::SceneHeading => ElementKind::Action,
            ElementKind::Action => ElementKind::Action,
            ElementKind::Character => ElementKind::Dialogue,
            ElementKind::Dialogue => ElementKind::Character,
            ElementKind::Parenthetical => ElementKind::Dialogue,
            ElementKind::Transition => ElementKind::SceneHeading,
            ElementKind::Centered => ElementKind::Action,
        }
    }

    /// Next entry in [`CYCLE_ORDER`]. Kinds outside the cycle restart it.
    pub fn cycled(self) -> ElementKind {
        match CYCLE_ORDER.iter().position(|kind| *kind == self) {
            Some(index) => CYCLE_ORDER[(index + 1) % CYCLE_ORDER.len()],
            None => CYCLE_ORDER[0],
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        ElementKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| anyhow::anyhow!("unknown element kind: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub kind: ElementKind,
    text: String,
}

impl Element {
    pub fn new(kind: ElementKind, text: impl AsRef<str>) -> Self {
        Self {
            kind,
            text: normalize_text(text.as_ref()),
        }
    }

    /// A new element showing its kind's placeholder.
    pub fn placeholder(kind: ElementKind) -> Self {
        Self::new(kind, kind.placeholder())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl AsRef<str>) {
        self.text = normalize_text(text.as_ref());
    }

    /// Showing its kind's placeholder, or the starter text on an action.
    pub fn is_placeholder(&self) -> bool {
        self.text == self.kind.placeholder()
            || (self.kind == ElementKind::Action && self.text == STARTER_TEXT)
    }

    /// Empty or still showing the placeholder.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() || self.is_placeholder()
    }
}

// Element text is a single trimmed line.
fn normalize_text(text: &str) -> String {
    if text.contains(['\n', '\r']) {
        text.split(['\n', '\r'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        text.trim().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document holding only the starter action element.
    pub fn starter() -> Self {
        Self {
            elements: vec![Element::new(ElementKind::Action, STARTER_TEXT)],
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.elements.get_mut(index)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Inserts at `index`, clamped to the end of the document.
    pub fn insert(&mut self, index: usize, element: Element) -> usize {
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
        index
    }

    pub fn remove(&mut self, index: usize) -> Option<Element> {
        if index < self.elements.len() {
            Some(self.elements.remove(index))
        } else {
            None
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FromIterator<Element> for Document {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
