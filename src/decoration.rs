//! Live decorations for language markup
//!
//! Decorations annotate the editor view without touching the document.
//! Spans the user is editing (touched by a selection or the cursor) are
//! left undecorated so the raw markup stays editable.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::markup::{scan_live, LangSpan, SelectionRange};

/// CSS class carried by every language element
pub const LANG_CLASS: &str = "p-lang";

/// How language spans are presented while editing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorationStyle {
    /// Hide the markup and show a widget with the content
    #[default]
    Replace,
    /// Keep the markup visible and mark it with language attributes
    Mark,
}

impl DecorationStyle {
    /// The other style
    pub fn toggled(self) -> Self {
        match self {
            DecorationStyle::Replace => DecorationStyle::Mark,
            DecorationStyle::Mark => DecorationStyle::Replace,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DecorationStyle::Replace => "replace",
            DecorationStyle::Mark => "mark",
        }
    }
}

/// Inline widget shown in place of a replaced span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangWidget {
    pub language: String,
    pub content: String,
    /// The markup the widget stands in for
    pub original_text: String,
}

/// What to do with a decorated range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderAs {
    Replace(LangWidget),
    Mark { attributes: Vec<(String, String)> },
}

/// A decoration over `[range.start, range.end)` in document character offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub range: Range<usize>,
    pub render_as: RenderAs,
}

impl Decoration {
    fn from_span(text_chars: &[char], span: LangSpan, style: DecorationStyle) -> Self {
        let render_as = match style {
            DecorationStyle::Replace => RenderAs::Replace(LangWidget {
                original_text: text_chars[span.start..span.end].iter().collect(),
                language: span.language,
                content: span.content,
            }),
            DecorationStyle::Mark => RenderAs::Mark {
                attributes: vec![
                    ("class".to_string(), LANG_CLASS.to_string()),
                    ("data-lang".to_string(), span.language),
                ],
            },
        };

        Self {
            range: span.start..span.end,
            render_as,
        }
    }

    /// Language of the decorated span
    pub fn language(&self) -> Option<&str> {
        match &self.render_as {
            RenderAs::Replace(widget) => Some(&widget.language),
            RenderAs::Mark { attributes } => attributes
                .iter()
                .find(|(name, _)| name == "data-lang")
                .map(|(_, value)| value.as_str()),
        }
    }
}

/// Build decorations for the whole document, in document order
pub fn build_decorations(
    text: &str,
    default_language: &str,
    selections: &[SelectionRange],
    style: DecorationStyle,
) -> Vec<Decoration> {
    let spans = scan_live(text, default_language, selections);
    if spans.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    spans
        .into_iter()
        .map(|span| Decoration::from_span(&chars, span, style))
        .collect()
}

/// Change notification from the host view
#[derive(Debug, Clone, Copy)]
pub struct ViewUpdate<'a> {
    pub text: &'a str,
    pub selections: &'a [SelectionRange],
    pub doc_changed: bool,
    pub selection_set: bool,
}

/// Holds the current decorations for one view.
///
/// Decorations are rebuilt from scratch whenever the document or the
/// selection changes; nothing is carried over between rebuilds.
#[derive(Debug, Default)]
pub struct LangDecorator {
    style: DecorationStyle,
    decorations: Vec<Decoration>,
}

impl LangDecorator {
    pub fn new(style: DecorationStyle) -> Self {
        Self {
            style,
            decorations: Vec::new(),
        }
    }

    /// Current decoration style
    pub fn style(&self) -> DecorationStyle {
        self.style
    }

    /// Switch styles; takes effect on the next rebuild
    pub fn set_style(&mut self, style: DecorationStyle) {
        self.style = style;
    }

    /// Current decorations
    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    /// Recompute decorations unconditionally
    pub fn rebuild(&mut self, text: &str, selections: &[SelectionRange], default_language: &str) {
        self.decorations = build_decorations(text, default_language, selections, self.style);
    }

    /// Rebuild if the update changed the document or selection.
    /// Returns whether a rebuild happened.
    pub fn update(&mut self, update: &ViewUpdate<'_>, default_language: &str) -> bool {
        if !(update.doc_changed || update.selection_set) {
            return false;
        }
        self.rebuild(update.text, update.selections, default_language);
        true
    }
}
