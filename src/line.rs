//! Line representation addressed by character offsets
//!
//! Hosts hand us cursor positions as character offsets, while `regex`
//! and `str` slicing work in bytes. `Line` owns the conversion between
//! the two coordinate spaces.

/// A single line of text with a zero-based character-offset coordinate space
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    /// The text content (without trailing newline)
    text: String,
}

impl Line {
    /// Create a new empty line
    pub fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Create a line from a string
    pub fn from_string(s: String) -> Self {
        Self { text: s }
    }

    /// Get the text content
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the line is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Clamp a character offset into `[0, len]`
    pub fn clamp_offset(&self, offset: usize) -> usize {
        offset.min(self.len())
    }

    /// Byte position of the character at `char_idx`; the line length for
    /// offsets at or past the end
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(pos, _)| pos)
    }

    /// Slice by character offsets, clamped to the line
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let start = self.char_to_byte(start);
        let end = self.char_to_byte(end).max(start);
        &self.text[start..end]
    }

    /// Insert a character at a character offset
    pub fn insert_char(&mut self, offset: usize, ch: char) {
        let pos = self.char_to_byte(offset);
        self.text.insert(pos, ch);
    }

    /// Delete the character at a character offset, returning it
    pub fn delete_char(&mut self, offset: usize) -> Option<char> {
        let pos = self.char_to_byte(offset);
        if pos >= self.text.len() {
            return None;
        }
        Some(self.text.remove(pos))
    }

    /// Split the line at a character offset, returning the remainder
    pub fn split_off(&mut self, offset: usize) -> Line {
        let pos = self.char_to_byte(offset);
        Line::from_string(self.text.split_off(pos))
    }

    /// Append another line's content to this line
    pub fn append(&mut self, other: Line) {
        self.text.push_str(other.text());
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Self::from_string(s.to_string())
    }
}

impl From<String> for Line {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

/// Converts ascending byte offsets of one string into character offsets
/// without rescanning from the start each time.
#[derive(Debug)]
pub struct CharOffsets<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharOffsets<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    /// Character offset of `byte_pos`. Positions must be requested in
    /// non-decreasing order and lie on char boundaries.
    pub fn char_offset(&mut self, byte_pos: usize) -> usize {
        debug_assert!(byte_pos >= self.byte, "offsets must be ascending");
        let byte_pos = byte_pos.min(self.text.len());
        if byte_pos > self.byte {
            self.chars += self.text[self.byte..byte_pos].chars().count();
            self.byte = byte_pos;
        }
        self.chars
    }
}
