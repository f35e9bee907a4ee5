use ropey::Rope;
use screencore::TextWidget;

/// Plain markup text as the host edits it outside structured mode.
///
/// The cursor is a line index plus a char offset into that line.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
    cursor_line: usize,
    cursor_col: usize,
    modified: bool,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            ..Self::default()
        }
    }

    /// Replaces the whole text and moves the cursor home. Clears the modified flag.
    pub fn set_content(&mut self, content: &str) {
        self.rope = Rope::from_str(content);
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.modified = false;
    }

    pub fn content(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn line(&self, index: usize) -> Option<String> {
        self.rope.get_line(index).map(|line| {
            line.to_string()
                .trim_end_matches(['\n', '\r'])
                .to_string()
        })
    }

    pub fn cursor_position(&self) -> (usize, usize) {
        (self.cursor_line, self.cursor_col)
    }

    pub fn insert_char(&mut self, c: char) {
        let index = self.cursor_char_index();
        self.rope.insert_char(index, c);
        self.cursor_col += 1;
        self.modified = true;
    }

    pub fn insert_newline(&mut self) {
        let index = self.cursor_char_index();
        self.rope.insert_char(index, '\n');
        self.cursor_line += 1;
        self.cursor_col = 0;
        self.modified = true;
    }

    pub fn delete_char_backward(&mut self) {
        let index = self.cursor_char_index();
        if index == 0 {
            return;
        }
        if self.cursor_col > 0 {
            self.rope.remove(index - 1..index);
            self.cursor_col -= 1;
        } else {
            // Join with the previous line.
            self.cursor_line -= 1;
            self.cursor_col = self.line_len(self.cursor_line);
            self.rope.remove(index - 1..index);
        }
        self.modified = true;
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.clamp_col();
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_line + 1 < self.rope.len_lines() {
            self.cursor_line += 1;
            self.clamp_col();
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.line_len(self.cursor_line);
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.line_len(self.cursor_line) {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.rope.len_lines() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    // Chars in a line, excluding the line break.
    fn line_len(&self, line: usize) -> usize {
        match self.rope.get_line(line) {
            Some(slice) => {
                let mut len = slice.len_chars();
                while len > 0 && matches!(slice.char(len - 1), '\n' | '\r') {
                    len -= 1;
                }
                len
            }
            None => 0,
        }
    }

    fn clamp_col(&mut self) {
        self.cursor_col = self.cursor_col.min(self.line_len(self.cursor_line));
    }

    fn cursor_char_index(&self) -> usize {
        let line = self.cursor_line.min(self.rope.len_lines().saturating_sub(1));
        self.rope.line_to_char(line) + self.cursor_col.min(self.line_len(line))
    }
}

impl TextWidget for TextBuffer {
    fn read_text(&self) -> String {
        self.content()
    }

    /// Counts as an edit only when the text actually changes.
    fn write_text(&mut self, text: &str) {
        if self.rope != text {
            self.rope = Rope::from_str(text);
            self.modified = true;
            self.cursor_line = self.cursor_line.min(self.rope.len_lines().saturating_sub(1));
            self.clamp_col();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_and_newlines() {
        let mut buffer = TextBuffer::new();
        for c in "JOHN".chars() {
            buffer.insert_char(c);
        }
        buffer.insert_newline();
        buffer.insert_char('H');
        buffer.insert_char('i');
        assert_eq!(buffer.content(), "JOHN\nHi");
        assert_eq!(buffer.cursor_position(), (1, 2));
        assert!(buffer.is_modified());
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buffer = TextBuffer::from_text("AB\nCD");
        buffer.move_cursor_down();
        buffer.delete_char_backward();
        assert_eq!(buffer.content(), "ABCD");
        assert_eq!(buffer.cursor_position(), (0, 2));

        let mut buffer = TextBuffer::new();
        buffer.delete_char_backward();
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_cursor_is_clamped_to_line_length() {
        let mut buffer = TextBuffer::from_text("Long line\nab\n");
        for _ in 0..9 {
            buffer.move_cursor_right();
        }
        buffer.move_cursor_down();
        assert_eq!(buffer.cursor_position(), (1, 2));
        buffer.move_cursor_right();
        assert_eq!(buffer.cursor_position(), (2, 0));
    }

    #[test]
    fn test_write_text_marks_modified_only_on_change() {
        let mut buffer = TextBuffer::new();
        buffer.set_content("JOHN\n");
        buffer.write_text("JOHN\n");
        assert!(!buffer.is_modified());
        buffer.write_text("JOHN\nHi.\n");
        assert!(buffer.is_modified());
        assert_eq!(buffer.read_text(), "JOHN\nHi.\n");
        assert_eq!(buffer.line(1).as_deref(), Some("Hi."));
    }
}
