//! Buffer representation - lines of text with a cursor
//!
//! This is the in-memory host the terminal front end edits, and the
//! reference implementation of [`HostEditor`].

use std::path::{Path, PathBuf};

use crate::line::Line;
use crate::plugin::{CursorPos, HostEditor};

/// A buffer containing text, a cursor and file metadata
#[derive(Debug)]
pub struct Buffer {
    /// Lines of text (always at least one)
    lines: Vec<Line>,
    /// Buffer name (e.g., "notes.md", "*scratch*")
    name: String,
    /// Associated file path (None for unnamed buffers)
    filename: Option<PathBuf>,
    /// Whether buffer has unsaved changes
    modified: bool,
    /// Cursor position (line index, character offset)
    cursor: CursorPos,
    /// Column to aim for when moving vertically
    goal_ch: usize,
}

impl Buffer {
    /// Create a new empty buffer with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            lines: vec![Line::new()],
            name: name.into(),
            filename: None,
            modified: false,
            cursor: CursorPos::default(),
            goal_ch: 0,
        }
    }

    /// Create a buffer holding `text`
    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new("*scratch*");
        buffer.lines = split_lines(text);
        buffer
    }

    /// Create a buffer from file contents
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        Ok(Self {
            lines: split_lines(&content),
            name,
            filename: Some(path.to_path_buf()),
            modified: false,
            cursor: CursorPos::default(),
            goal_ch: 0,
        })
    }

    /// Get buffer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get filename if set
    pub fn filename(&self) -> Option<&PathBuf> {
        self.filename.as_ref()
    }

    /// Set the filename
    pub fn set_filename(&mut self, path: PathBuf) {
        self.filename = Some(path);
    }

    /// Check if buffer is modified
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Get number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get a line by index
    pub fn line(&self, idx: usize) -> Option<&Line> {
        self.lines.get(idx)
    }

    /// The whole document, lines joined with `\n`
    pub fn text(&self) -> String {
        let mut text = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(line.text());
        }
        text
    }

    /// Document character offset where a line starts
    pub fn line_start_offset(&self, line_idx: usize) -> usize {
        self.lines
            .iter()
            .take(line_idx)
            .map(|line| line.len() + 1)
            .sum()
    }

    /// Document character offset of the cursor
    pub fn cursor_offset(&self) -> usize {
        self.line_start_offset(self.cursor.line) + self.cursor.ch
    }

    fn current_line(&self) -> &Line {
        &self.lines[self.cursor.line]
    }

    fn current_line_mut(&mut self) -> &mut Line {
        &mut self.lines[self.cursor.line]
    }

    /// Clamp a position into the buffer
    fn clamp(&self, pos: CursorPos) -> CursorPos {
        let line = pos.line.min(self.lines.len() - 1);
        CursorPos::new(line, self.lines[line].clamp_offset(pos.ch))
    }

    /// Insert a character at the cursor
    pub fn insert_char(&mut self, ch: char) {
        let at = self.cursor.ch;
        self.current_line_mut().insert_char(at, ch);
        self.cursor.ch += 1;
        self.goal_ch = self.cursor.ch;
        self.modified = true;
    }

    /// Split the current line at the cursor
    pub fn insert_newline(&mut self) {
        let at = self.cursor.ch;
        let rest = self.current_line_mut().split_off(at);
        self.lines.insert(self.cursor.line + 1, rest);
        self.cursor = CursorPos::new(self.cursor.line + 1, 0);
        self.goal_ch = 0;
        self.modified = true;
    }

    /// Delete the character before the cursor, joining lines at column 0
    pub fn delete_backward(&mut self) -> bool {
        if self.cursor.ch > 0 {
            let at = self.cursor.ch - 1;
            self.current_line_mut().delete_char(at);
            self.cursor.ch = at;
        } else if self.cursor.line > 0 {
            let current = self.lines.remove(self.cursor.line);
            let prev = &mut self.lines[self.cursor.line - 1];
            let join_at = prev.len();
            prev.append(current);
            self.cursor = CursorPos::new(self.cursor.line - 1, join_at);
        } else {
            return false;
        }
        self.goal_ch = self.cursor.ch;
        self.modified = true;
        true
    }

    /// Delete the character under the cursor, joining lines at end of line
    pub fn delete_forward(&mut self) -> bool {
        let at = self.cursor.ch;
        if at < self.current_line().len() {
            self.current_line_mut().delete_char(at);
        } else if self.cursor.line + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor.line + 1);
            self.current_line_mut().append(next);
        } else {
            return false;
        }
        self.modified = true;
        true
    }

    /// Move cursor left, wrapping to the previous line
    pub fn move_left(&mut self) {
        if self.cursor.ch > 0 {
            self.cursor.ch -= 1;
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.ch = self.current_line().len();
        }
        self.goal_ch = self.cursor.ch;
    }

    /// Move cursor right, wrapping to the next line
    pub fn move_right(&mut self) {
        if self.cursor.ch < self.current_line().len() {
            self.cursor.ch += 1;
        } else if self.cursor.line + 1 < self.lines.len() {
            self.cursor = CursorPos::new(self.cursor.line + 1, 0);
        }
        self.goal_ch = self.cursor.ch;
    }

    /// Move cursor up one line, keeping the goal column
    pub fn move_up(&mut self) {
        if self.cursor.line > 0 {
            self.cursor = self.clamp(CursorPos::new(self.cursor.line - 1, self.goal_ch));
        }
    }

    /// Move cursor down one line, keeping the goal column
    pub fn move_down(&mut self) {
        if self.cursor.line + 1 < self.lines.len() {
            self.cursor = self.clamp(CursorPos::new(self.cursor.line + 1, self.goal_ch));
        }
    }

    /// Move to beginning of line
    pub fn move_to_bol(&mut self) {
        self.cursor.ch = 0;
        self.goal_ch = 0;
    }

    /// Move to end of line
    pub fn move_to_eol(&mut self) {
        self.cursor.ch = self.current_line().len();
        self.goal_ch = self.cursor.ch;
    }

    /// Write buffer to its file
    pub fn save(&mut self) -> std::io::Result<()> {
        let path = self.filename.clone().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No filename set")
        })?;
        self.write_to(&path)?;
        self.modified = false;
        Ok(())
    }

    /// Write buffer to specific path
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.text())
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new("*scratch*")
    }
}

impl HostEditor for Buffer {
    fn cursor(&self) -> CursorPos {
        self.cursor
    }

    fn line_text(&self, line: usize) -> Option<String> {
        self.lines.get(line).map(|l| l.text().to_string())
    }

    fn replace_line(&mut self, line: usize, text: &str) {
        if let Some(target) = self.lines.get_mut(line) {
            if target.text() != text {
                *target = Line::from(text);
                self.modified = true;
            }
        }
        self.cursor = self.clamp(self.cursor);
    }

    fn set_cursor(&mut self, pos: CursorPos) {
        self.cursor = self.clamp(pos);
        self.goal_ch = self.cursor.ch;
    }
}

/// Split text into lines; `split` always yields at least one
fn split_lines(text: &str) -> Vec<Line> {
    text.split('\n')
        .map(|l| Line::from(l.strip_suffix('\r').unwrap_or(l)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_text_and_back() {
        let buffer = Buffer::from_text("one\ntwo\n");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.text(), "one\ntwo\n");
        assert_eq!(Buffer::from_text("").line_count(), 1);
    }

    #[test]
    fn test_crlf_stripped() {
        let buffer = Buffer::from_text("a\r\nb");
        assert_eq!(buffer.line(0).map(Line::text), Some("a"));
        assert_eq!(buffer.text(), "a\nb");
    }

    #[test]
    fn test_typing_and_offsets() {
        let mut buffer = Buffer::from_text("ab\nθ");
        buffer.set_cursor(CursorPos::new(1, 1));
        buffer.insert_char('x');
        assert_eq!(buffer.text(), "ab\nθx");
        assert_eq!(buffer.cursor(), CursorPos::new(1, 2));
        assert_eq!(buffer.line_start_offset(1), 3);
        assert_eq!(buffer.cursor_offset(), 5);
        assert!(buffer.is_modified());
    }

    #[test]
    fn test_newline_and_backspace_join() {
        let mut buffer = Buffer::from_text("hello");
        buffer.set_cursor(CursorPos::new(0, 2));
        buffer.insert_newline();
        assert_eq!(buffer.text(), "he\nllo");
        assert_eq!(buffer.cursor(), CursorPos::new(1, 0));
        assert!(buffer.delete_backward());
        assert_eq!(buffer.text(), "hello");
        assert_eq!(buffer.cursor(), CursorPos::new(0, 2));
    }

    #[test]
    fn test_delete_forward_joins() {
        let mut buffer = Buffer::from_text("a\nb");
        buffer.move_to_eol();
        assert!(buffer.delete_forward());
        assert_eq!(buffer.text(), "ab");
        buffer.move_to_eol();
        assert!(!buffer.delete_forward());
    }

    #[test]
    fn test_vertical_movement_keeps_goal() {
        let mut buffer = Buffer::from_text("long line\nab\nanother line");
        buffer.set_cursor(CursorPos::new(0, 7));
        buffer.move_down();
        assert_eq!(buffer.cursor(), CursorPos::new(1, 2));
        buffer.move_down();
        assert_eq!(buffer.cursor(), CursorPos::new(2, 7));
    }

    #[test]
    fn test_horizontal_wrap() {
        let mut buffer = Buffer::from_text("a\nb");
        buffer.move_right();
        buffer.move_right();
        assert_eq!(buffer.cursor(), CursorPos::new(1, 0));
        buffer.move_left();
        assert_eq!(buffer.cursor(), CursorPos::new(0, 1));
    }

    #[test]
    fn test_host_editor_clamps() {
        let mut buffer = Buffer::from_text("abc");
        buffer.set_cursor(CursorPos::new(5, 10));
        assert_eq!(buffer.cursor(), CursorPos::new(0, 3));
        buffer.replace_line(0, "a");
        assert_eq!(buffer.cursor(), CursorPos::new(0, 1));
        assert_eq!(buffer.line_text(1), None);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut buffer = Buffer::from_text("{{fr:oui}}\nθ");
        buffer.set_filename(path.clone());
        buffer.insert_char('x');
        buffer.save().unwrap();
        assert!(!buffer.is_modified());

        let reopened = Buffer::from_file(&path).unwrap();
        assert_eq!(reopened.text(), "x{{fr:oui}}\nθ");
        assert_eq!(reopened.name(), "notes.txt");
    }
}
