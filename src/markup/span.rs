//! Language spans and selection ranges

/// How a span's language was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    /// `{{lang:content}}`
    Explicit,
    /// `{{content}}` resolved through the default language
    Shorthand,
}

/// A `{{...}}` markup region found in a document.
///
/// `start` and `end` are character offsets, `[start, end)`, covering the
/// whole markup including its braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangSpan {
    pub start: usize,
    pub end: usize,
    /// Language code the content is tagged with
    pub language: String,
    /// Text to display in place of the markup
    pub content: String,
    pub kind: SpanKind,
}

impl LangSpan {
    /// Check if this span contains a character offset
    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Length of the markup in characters
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if two spans share any offset
    pub fn overlaps(&self, other: &LangSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// An active selection in the host editor, `[from, to)`.
///
/// A bare cursor is a selection with `from == to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionRange {
    pub from: usize,
    pub to: usize,
}

impl SelectionRange {
    /// Create a range, normalizing so `from <= to`
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
        }
    }

    /// A collapsed selection at the cursor
    pub fn cursor(pos: usize) -> Self {
        Self { from: pos, to: pos }
    }

    /// Whether `[start, end)` is touched by this selection
    pub fn intersects(&self, start: usize, end: usize) -> bool {
        start < self.to && end > self.from
    }
}

/// True when any selection intersects `[start, end)`
pub fn is_range_selected(selections: &[SelectionRange], start: usize, end: usize) -> bool {
    selections.iter().any(|sel| sel.intersects(start, end))
}
