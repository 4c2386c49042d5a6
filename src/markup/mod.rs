//! Language markup scanning
//!
//! Finds `{{lang:content}}` and `{{content}}` regions and tags them with
//! the language their content should be displayed in.

mod scanner;
mod span;

pub use scanner::{scan, scan_live, scan_static, strip_markup};
pub use span::{is_range_selected, LangSpan, SelectionRange, SpanKind};
