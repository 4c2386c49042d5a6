//! `{{lang:content}}` / `{{content}}` markup scanner
//!
//! Both grammars are matched in a single left-to-right pass. At every
//! position the explicit form is tried first, so text consumed by an
//! explicit span can never also produce a shorthand span, even when the
//! explicit content itself contains `{{...}}`.

use std::sync::OnceLock;

use regex::Regex;

use super::span::{is_range_selected, LangSpan, SelectionRange, SpanKind};
use crate::line::CharOffsets;

/// Explicit form only; used when no default language is configured
const EXPLICIT_PATTERN: &str = r"\{\{([a-z]{2,}):(.+?)\}\}";

/// Explicit form first, shorthand as the fallback alternative. Neither
/// form crosses a line break: the shorthand class is `[^:{}\n]` rather
/// than `[^:{}]`, so `{{a\nb}}` stays literal text.
const COMBINED_PATTERN: &str = r"\{\{(?:([a-z]{2,}):(.+?)|([^:{}\n]+?))\}\}";

fn explicit_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(EXPLICIT_PATTERN).expect("explicit markup pattern compiles"))
}

fn combined_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(COMBINED_PATTERN).expect("combined markup pattern compiles"))
}

/// Find every language span in `text`, in document order.
///
/// Shorthand `{{content}}` markup only becomes a span when
/// `default_language` is non-empty; otherwise it stays literal text.
/// Spans for which `suppress(start, end)` returns true are dropped but
/// still consume their text.
pub fn scan<F>(text: &str, default_language: &str, suppress: F) -> Vec<LangSpan>
where
    F: Fn(usize, usize) -> bool,
{
    let default_language = default_language.trim();
    let regex = if default_language.is_empty() {
        explicit_regex()
    } else {
        combined_regex()
    };

    let mut offsets = CharOffsets::new(text);
    let mut spans = Vec::new();

    for caps in regex.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };

        let (language, content, kind) = match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(lang), Some(content), _) => (lang.as_str(), content.as_str(), SpanKind::Explicit),
            (_, _, Some(content)) => (default_language, content.as_str(), SpanKind::Shorthand),
            _ => continue,
        };

        let start = offsets.char_offset(whole.start());
        let end = offsets.char_offset(whole.end());
        if suppress(start, end) {
            continue;
        }

        spans.push(LangSpan {
            start,
            end,
            language: language.to_string(),
            content: content.to_string(),
            kind,
        });
    }

    tracing::trace!(spans = spans.len(), default_language, "scanned markup");
    spans
}

/// Scan for live decoration, skipping spans touched by any selection
pub fn scan_live(text: &str, default_language: &str, selections: &[SelectionRange]) -> Vec<LangSpan> {
    scan(text, default_language, |start, end| {
        is_range_selected(selections, start, end)
    })
}

/// Scan for static rendering; selections play no part
pub fn scan_static(text: &str, default_language: &str) -> Vec<LangSpan> {
    scan(text, default_language, |_, _| false)
}

/// Replace each span's markup with its content, leaving other text as is.
///
/// `spans` must come from scanning `text`.
pub fn strip_markup(text: &str, spans: &[LangSpan]) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    let mut pos = 0;

    for span in spans {
        if span.start < pos {
            continue;
        }
        result.extend(chars.by_ref().take(span.start - pos));
        chars.by_ref().take(span.len()).for_each(drop);
        result.push_str(&span.content);
        pos = span.end;
    }
    result.extend(chars);

    result
}
