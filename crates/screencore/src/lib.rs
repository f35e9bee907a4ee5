pub mod classify;
pub mod element;
pub mod history;
pub mod mode;
pub mod names;
pub mod parse;
pub mod render;
pub mod session;

pub use classify::{classify, Classifier, ClassifierOptions};
pub use element::{Document, Element, ElementKind};
pub use history::History;
pub use mode::{StructuredMode, TextWidget};
pub use names::CharacterNames;
pub use parse::parse;
pub use render::render;
pub use session::{Session, SessionOptions};
