//! Style types for text rendering
//!
//! Used by the display to draw decorated language spans, the mode line
//! and messages.

use praecordi::decoration::RenderAs;

/// Terminal colors (ANSI 16-color palette for compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Yellow,
    Cyan,
    BrightBlack,
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Bold text
    pub bold: bool,
    /// Underlined text
    pub underline: bool,
    /// Reverse video (swap fg/bg)
    pub reverse: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Create a reverse video style
    pub fn reverse() -> Self {
        Self {
            reverse: true,
            ..Default::default()
        }
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: set underline
    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Style for a decorated span
    pub fn for_decoration(render_as: &RenderAs) -> Self {
        match render_as {
            RenderAs::Replace(_) => Style::fg(Color::Cyan).with_bold(),
            RenderAs::Mark { .. } => Style::fg(Color::Yellow).with_underline(),
        }
    }
}
