use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use screencore::{ElementKind, Session, StructuredMode};
use std::path::PathBuf;

use crate::buffer::TextBuffer;
use crate::config::Config;
use crate::file_manager::FileManager;
use crate::status::StatusManager;

pub struct App {
    pub buffer: TextBuffer,
    pub mode: StructuredMode,
    pub config: Config,
    pub file_manager: FileManager,
    pub status: StatusManager,
    should_quit: bool,
    // Set by a first quit request on unsaved changes.
    quit_armed: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let mode = StructuredMode::new(config.session_options())
            .with_known_names(config.editor.known_characters.iter().cloned());
        Self {
            buffer: TextBuffer::new(),
            mode,
            config,
            file_manager: FileManager::new(),
            status: StatusManager::new(),
            should_quit: false,
            quit_armed: false,
        }
    }

    pub async fn open(&mut self, path: PathBuf) -> Result<()> {
        let content = self.file_manager.open_file(path.clone()).await?;
        self.buffer.set_content(&content);
        if content.is_empty() {
            self.status.info(format!("New file: {}", path.display()));
        } else {
            self.status
                .info(format!("Opened {} ({} lines)", path.display(), self.buffer.line_count()));
        }
        Ok(())
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    pub fn is_structured(&self) -> bool {
        self.mode.is_structured()
    }

    pub fn session(&self) -> Option<&Session> {
        self.mode.session()
    }

    pub fn update_status(&mut self) {
        self.status.update();
    }

    pub fn enter_structured(&mut self) -> bool {
        match self.mode.enter(Some(&self.buffer)) {
            Ok(entered) => {
                if entered {
                    self.status.info("Structured mode");
                }
                entered
            }
            Err(e) => {
                log::error!("Failed to enter structured mode: {}", e);
                self.status.error(format!("Structured mode unavailable: {}", e));
                false
            }
        }
    }

    pub fn exit_structured(&mut self) -> bool {
        let exited = self.mode.exit(&mut self.buffer);
        if exited {
            self.status.info("Plain markup");
        }
        exited
    }

    pub fn toggle_structured(&mut self) {
        if self.is_structured() {
            self.exit_structured();
        } else {
            self.enter_structured();
        }
    }

    /// Saves the markup, synchronizing the buffer first in structured mode.
    pub async fn save(&mut self) {
        self.mode.sync(&mut self.buffer);
        match self.file_manager.save_file(&mut self.buffer).await {
            Ok(message) => self.status.success(message),
            Err(e) => {
                log::error!("Save failed: {}", e);
                self.status.error(format!("Save failed: {}", e));
            }
        }
    }

    fn request_quit(&mut self) {
        self.exit_structured();
        if self.buffer.is_modified() && !self.quit_armed {
            self.quit_armed = true;
            self.status
                .warning("Unsaved changes. Ctrl+S to save, Ctrl+Q again to quit");
        } else {
            log::info!("Quit requested");
            self.quit();
        }
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') if ctrl => {
                self.request_quit();
                return Ok(());
            }
            KeyCode::Char('s') if ctrl => self.save().await,
            KeyCode::Char('t') if ctrl => self.toggle_structured(),
            _ if self.is_structured() => self.handle_structured_key(key),
            _ => self.handle_plain_key(key),
        }
        self.quit_armed = false;
        Ok(())
    }

    /// Pasted text goes through the session so each line is classified.
    pub fn handle_paste(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n");
        if let Some(session) = self.mode.session_mut() {
            if session.insert_str(&text) {
                self.mode.sync(&mut self.buffer);
            }
        } else {
            for c in text.chars() {
                match c {
                    '\n' | '\r' => self.buffer.insert_newline(),
                    c => self.buffer.insert_char(c),
                }
            }
        }
        self.quit_armed = false;
    }

    fn handle_structured_key(&mut self, key: KeyEvent) {
        let Some(session) = self.mode.session_mut() else {
            return;
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        let changed = match key.code {
            KeyCode::Char('z') if ctrl => session.undo(),
            KeyCode::Char('y') if ctrl => session.redo(),
            KeyCode::Char('n') if ctrl => session.complete_name(),
            KeyCode::Char(c) if alt => match kind_for_digit(c) {
                Some(kind) => session.change_kind(kind),
                None => false,
            },
            KeyCode::Char(c) if !ctrl => session.insert_char(c),
            KeyCode::Enter => session.commit_and_advance(),
            KeyCode::Tab => session.cycle_kind(),
            KeyCode::Backspace => session.delete_backward(),
            KeyCode::Up => {
                session.focus_previous();
                false
            }
            KeyCode::Down => {
                session.focus_next();
                false
            }
            KeyCode::Esc => {
                session.blur();
                false
            }
            _ => false,
        };

        if changed {
            self.mode.sync(&mut self.buffer);
        }
    }

    fn handle_plain_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char(c) if !ctrl => self.buffer.insert_char(c),
            KeyCode::Enter => self.buffer.insert_newline(),
            KeyCode::Backspace => self.buffer.delete_char_backward(),
            KeyCode::Left => self.buffer.move_cursor_left(),
            KeyCode::Right => self.buffer.move_cursor_right(),
            KeyCode::Up => self.buffer.move_cursor_up(),
            KeyCode::Down => self.buffer.move_cursor_down(),
            _ => {}
        }
    }
}

/// Alt+1..7 select kinds in selector order.
fn kind_for_digit(c: char) -> Option<ElementKind> {
    let index = c.to_digit(10)?.checked_sub(1)?;
    ElementKind::ALL.get(index as usize).copied()
}
