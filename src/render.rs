//! Static rendering of language markup
//!
//! Post-processes an already rendered text/element tree: every text leaf
//! is scanned and its `{{...}}` spans become
//! `<span class="p-lang" data-lang="LANG">CONTENT</span>` elements.
//! Element boundaries and attributes are never rewritten.

use std::fmt::Write;

use crate::decoration::LANG_CLASS;
use crate::markup::{scan_static, LangSpan};

/// A node in a rendered document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text(String),
}

impl Node {
    /// Create an element
    pub fn element(tag: impl Into<String>, attrs: Vec<(String, String)>, children: Vec<Node>) -> Self {
        Node::Element {
            tag: tag.into(),
            attrs,
            children,
        }
    }

    /// Create a text leaf
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    /// The inline element a span renders to
    pub fn lang_span(language: &str, content: &str) -> Self {
        Node::element(
            "span",
            vec![
                ("class".to_string(), LANG_CLASS.to_string()),
                ("data-lang".to_string(), language.to_string()),
            ],
            vec![Node::text(content)],
        )
    }

    /// Build a `div` of `p` paragraphs from plain text.
    ///
    /// Paragraphs are separated by blank lines; line breaks inside a
    /// paragraph become `br` elements.
    pub fn from_text(document: &str) -> Self {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in document.lines().chain(std::iter::once("")) {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    paragraphs.push(paragraph(&current));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }

        Node::element("div", Vec::new(), paragraphs)
    }

    /// Whether this node was produced by the language post-processor
    pub fn is_lang_span(&self) -> bool {
        match self {
            Node::Element { tag, attrs, .. } => {
                tag == "span"
                    && attrs
                        .iter()
                        .any(|(name, value)| name == "class" && value.split_whitespace().any(|c| c == LANG_CLASS))
            }
            Node::Text(_) => false,
        }
    }

    /// Concatenated text of this subtree
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element { children, .. } => children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Serialize to HTML, escaping text and attribute values
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&escape(text, false)),
            Node::Element { tag, attrs, children } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
                }
                if is_void(tag) {
                    out.push('>');
                    return;
                }
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", tag);
            }
        }
    }
}

fn paragraph(lines: &[&str]) -> Node {
    let mut children = Vec::with_capacity(lines.len() * 2);
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            children.push(Node::element("br", Vec::new(), Vec::new()));
        }
        children.push(Node::text(*line));
    }
    Node::element("p", Vec::new(), children)
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "br" | "hr" | "img" | "input" | "meta" | "link")
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Split one text leaf into text and language-span nodes
fn split_text(text: &str, spans: &[LangSpan]) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(spans.len() * 2 + 1);
    let mut chars = text.chars();
    let mut pos = 0;

    for span in spans {
        let before: String = chars.by_ref().take(span.start - pos).collect();
        if !before.is_empty() {
            nodes.push(Node::Text(before));
        }
        chars.by_ref().take(span.len()).for_each(drop);
        nodes.push(Node::lang_span(&span.language, &span.content));
        pos = span.end;
    }

    let rest: String = chars.collect();
    if !rest.is_empty() {
        nodes.push(Node::Text(rest));
    }
    nodes
}

/// Rewrite every text leaf under `root` in place.
///
/// Existing language spans are left alone, so running this twice gives
/// the same tree. Returns the number of spans created.
pub fn postprocess(root: &mut Node, default_language: &str) -> usize {
    match root {
        Node::Text(text) => {
            let spans = scan_static(text, default_language);
            if spans.is_empty() {
                return 0;
            }
            let count = spans.len();
            let mut nodes = split_text(text, &spans);
            *root = if nodes.len() == 1 {
                nodes.remove(0)
            } else {
                Node::element("span", Vec::new(), nodes)
            };
            count
        }
        Node::Element { children, .. } => postprocess_children(children, default_language),
    }
}

fn postprocess_children(children: &mut Vec<Node>, default_language: &str) -> usize {
    let mut created = 0;
    let mut rewritten = Vec::with_capacity(children.len());

    for child in children.drain(..) {
        match child {
            Node::Text(text) => {
                let spans = scan_static(&text, default_language);
                if spans.is_empty() {
                    rewritten.push(Node::Text(text));
                } else {
                    created += spans.len();
                    rewritten.extend(split_text(&text, &spans));
                }
            }
            mut element => {
                if !element.is_lang_span() {
                    created += postprocess(&mut element, default_language);
                }
                rewritten.push(element);
            }
        }
    }

    *children = rewritten;
    created
}

/// Render a plain-text document to HTML with language spans applied
pub fn render_document(document: &str, default_language: &str) -> String {
    let mut root = Node::from_text(document);
    let created = postprocess(&mut root, default_language);
    tracing::debug!(created, "rendered document");
    root.to_html()
}
