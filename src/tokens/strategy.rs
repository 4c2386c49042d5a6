//! Token matching strategies
//!
//! Two interchangeable ways of finding substitutable tokens in a line:
//!
//! - [`DelimitedStrategy`] looks for `:IDENT;` and replaces the whole
//!   delimited match when `IDENT` is a known token.
//! - [`PrefixStrategy`] walks the line and replaces raw token keys where
//!   they occur, with no delimiters.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::map::TokenMap;
use crate::line::CharOffsets;

/// Delimited token grammar. Identifiers are ASCII word characters and dots.
const DELIMITED_PATTERN: &str = r":([A-Za-z0-9_.]+);";

/// A token occurrence that will be replaced.
///
/// Offsets are character offsets into the scanned line, `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl TokenMatch {
    /// Length of the matched text in characters
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Length change this match causes when replaced
    pub fn delta(&self) -> isize {
        self.replacement.chars().count() as isize - self.len() as isize
    }
}

/// Finds the token occurrences in a line that have a replacement.
///
/// Matches are returned in ascending, non-overlapping order.
pub trait MatchStrategy {
    /// Short name used in logs and settings
    fn name(&self) -> &'static str;

    /// Find every replaceable token in `line`
    fn find_matches(&self, line: &str, tokens: &TokenMap) -> Vec<TokenMatch>;
}

/// `:IDENT;` matching; unknown identifiers are left untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedStrategy;

fn delimited_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(DELIMITED_PATTERN).expect("delimited token pattern compiles"))
}

impl MatchStrategy for DelimitedStrategy {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn find_matches(&self, line: &str, tokens: &TokenMap) -> Vec<TokenMatch> {
        let mut offsets = CharOffsets::new(line);
        let mut matches = Vec::new();

        for caps in delimited_regex().captures_iter(line) {
            let (Some(whole), Some(ident)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(replacement) = tokens.get(ident.as_str()) else {
                continue;
            };
            matches.push(TokenMatch {
                start: offsets.char_offset(whole.start()),
                end: offsets.char_offset(whole.end()),
                replacement: replacement.to_string(),
            });
        }

        matches
    }
}

/// Raw key matching at every character position.
///
/// When several keys match at one position the longest wins, so `th`
/// beats `t` regardless of table order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixStrategy;

impl MatchStrategy for PrefixStrategy {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn find_matches(&self, line: &str, tokens: &TokenMap) -> Vec<TokenMatch> {
        let mut matches = Vec::new();
        let mut byte_pos = 0;
        let mut char_pos = 0;

        while byte_pos < line.len() {
            let rest = &line[byte_pos..];
            let best = tokens
                .iter()
                .filter(|(token, _)| !token.is_empty() && rest.starts_with(token))
                .max_by_key(|(token, _)| token.len());

            match best {
                Some((token, replacement)) => {
                    let token_chars = token.chars().count();
                    matches.push(TokenMatch {
                        start: char_pos,
                        end: char_pos + token_chars,
                        replacement: replacement.to_string(),
                    });
                    byte_pos += token.len();
                    char_pos += token_chars;
                }
                None => {
                    let step = rest.chars().next().map_or(1, char::len_utf8);
                    byte_pos += step;
                    char_pos += 1;
                }
            }
        }

        matches
    }
}

/// Which strategy a plugin instance uses, as stored in settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Delimited,
    Prefix,
}

impl StrategyKind {
    /// Get the strategy implementation
    pub fn strategy(self) -> &'static dyn MatchStrategy {
        match self {
            StrategyKind::Delimited => &DelimitedStrategy,
            StrategyKind::Prefix => &PrefixStrategy,
        }
    }
}
