use crate::element::{Document, Element, ElementKind};

/// Converts a document back into markup.
///
/// Placeholder-only elements are skipped; everything else keeps document order.
pub fn render(document: &Document) -> String {
    let mut markup = String::new();
    for element in document {
        if let Some(line) = render_element(element) {
            markup.push_str(&line);
            markup.push_str(separator(element.kind));
        }
    }
    markup
}

/// The markup line for one element, without its trailing separator.
/// `None` when the element carries no real content.
pub fn render_element(element: &Element) -> Option<String> {
    if element.is_blank() {
        return None;
    }

    let text = element.text();
    let line = match element.kind {
        ElementKind::SceneHeading | ElementKind::Character | ElementKind::Transition => {
            text.to_uppercase()
        }
        ElementKind::Centered => format!(">{}<", text.to_uppercase()),
        ElementKind::Dialogue | ElementKind::Parenthetical | ElementKind::Action => {
            text.to_string()
        }
    };
    Some(line)
}

fn separator(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Character | ElementKind::Dialogue | ElementKind::Parenthetical => "\n",
        ElementKind::SceneHeading
        | ElementKind::Action
        | ElementKind::Transition
        | ElementKind::Centered => "\n\n",
    }
}
