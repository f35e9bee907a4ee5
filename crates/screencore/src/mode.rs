//! Switching between plain markup editing and structured editing.

use anyhow::Result;

use crate::names::CharacterNames;
use crate::session::{Session, SessionOptions};

/// The host's plain-text input.
///
/// Writing is expected to fire whatever change notification the host
/// normally raises for its own widget.
pub trait TextWidget {
    fn read_text(&self) -> String;
    fn write_text(&mut self, text: &str);
}

/// Owns the editing session while structured mode is active.
#[derive(Debug, Clone, Default)]
pub struct StructuredMode {
    options: SessionOptions,
    known_names: Vec<String>,
    session: Option<Session>,
}

impl StructuredMode {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            known_names: Vec::new(),
            session: None,
        }
    }

    /// Names every new session starts out knowing.
    pub fn with_known_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn is_structured(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Parses the widget's text into a new session.
    ///
    /// Returns `Ok(false)` when already structured. Fails when the host has no
    /// widget to read from; the mode then stays plain.
    pub fn enter(&mut self, widget: Option<&dyn TextWidget>) -> Result<bool> {
        if self.is_structured() {
            return Ok(false);
        }
        let Some(widget) = widget else {
            anyhow::bail!("could not locate the text input to edit");
        };

        let names = CharacterNames::with_names(&self.known_names);
        let session = Session::with_names(&widget.read_text(), self.options, names);
        log::info!(
            "Entered structured mode with {} elements",
            session.document().len()
        );
        self.session = Some(session);
        Ok(true)
    }

    /// Writes the session's current markup to the widget.
    pub fn sync(&self, widget: &mut dyn TextWidget) -> bool {
        match &self.session {
            Some(session) => {
                widget.write_text(session.markup());
                true
            }
            None => false,
        }
    }

    /// Writes the final markup back and ends the session.
    pub fn exit(&mut self, widget: &mut dyn TextWidget) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        let markup = session.into_markup();
        log::info!("Leaving structured mode ({} bytes of markup)", markup.len());
        widget.write_text(&markup);
        true
    }
}
