//! Token substitution with cursor preservation

use super::map::TokenMap;
use super::strategy::{MatchStrategy, TokenMatch};
use crate::line::Line;

/// Result of one substitution pass over a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// The rewritten line
    pub line: String,
    /// Cursor position in the rewritten line (character offset)
    pub cursor: usize,
    /// Number of tokens replaced
    pub replaced: usize,
    changed: bool,
}

impl Substitution {
    fn unchanged(line: &str, cursor: usize) -> Self {
        Self {
            line: line.to_string(),
            cursor,
            replaced: 0,
            changed: false,
        }
    }

    /// Whether the line text differs from the input
    pub fn changed(&self) -> bool {
        self.changed
    }
}

/// Rewrite every replaceable token in `line` and carry the cursor along.
///
/// The cursor keeps its position relative to the text before it:
/// - a match ending at or before the cursor shifts it by the match's length change;
/// - a match straddling the cursor puts it right after the replacement, and
///   later matches no longer affect it;
/// - matches starting at or after the cursor leave it alone.
///
/// An out-of-range cursor is clamped to the line length. Only one pass is
/// made; replacement text that itself looks like a token is not revisited.
pub fn substitute(
    line: &str,
    cursor: usize,
    tokens: &TokenMap,
    strategy: &dyn MatchStrategy,
) -> Substitution {
    let cursor = Line::from(line).clamp_offset(cursor);
    let matches = strategy.find_matches(line, tokens);
    if matches.is_empty() {
        return Substitution::unchanged(line, cursor);
    }

    let bounds: Vec<usize> = line
        .char_indices()
        .map(|(pos, _)| pos)
        .chain(std::iter::once(line.len()))
        .collect();

    let mut rewritten = String::with_capacity(line.len());
    let mut copied = 0;
    for m in &matches {
        rewritten.push_str(&line[bounds[copied]..bounds[m.start]]);
        rewritten.push_str(&m.replacement);
        copied = m.end;
    }
    rewritten.push_str(&line[bounds[copied]..]);

    let new_cursor = shift_cursor(cursor, &matches);
    tracing::trace!(
        strategy = strategy.name(),
        replaced = matches.len(),
        cursor,
        new_cursor,
        "substituted tokens"
    );

    Substitution {
        changed: rewritten != line,
        line: rewritten,
        cursor: new_cursor,
        replaced: matches.len(),
    }
}

/// Recompute the cursor for a line rewritten by `matches`
fn shift_cursor(cursor: usize, matches: &[TokenMatch]) -> usize {
    let mut delta: isize = 0;

    for m in matches {
        if m.end <= cursor {
            delta += m.delta();
        } else if m.start < cursor {
            let landed = m.start as isize + delta + m.replacement.chars().count() as isize;
            return landed.max(0) as usize;
        } else {
            break;
        }
    }

    (cursor as isize + delta).max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::strategy::{DelimitedStrategy, PrefixStrategy};
    use pretty_assertions::assert_eq;

    fn th_map() -> TokenMap {
        [("th", "θ")].into_iter().collect()
    }

    #[test]
    fn test_substitute_example() {
        let result = substitute("say :th; now", 12, &th_map(), &DelimitedStrategy);
        assert_eq!(result.line, "say θ now");
        assert_eq!(result.cursor, 9);
        assert_eq!(result.replaced, 1);
        assert!(result.changed());
    }

    #[test]
    fn test_no_match_is_noop() {
        let lines = ["", "plain text", ":unknown; token", "th without delimiters"];
        for line in lines {
            for cursor in 0..=line.chars().count() {
                let result = substitute(line, cursor, &th_map(), &DelimitedStrategy);
                assert_eq!(result.line, line);
                assert_eq!(result.cursor, cursor);
                assert!(!result.changed());
            }
        }
    }

    #[test]
    fn test_cursor_right_after_token() {
        // Typing the closing ';' leaves the cursor just past it
        let result = substitute("a:th;", 5, &th_map(), &DelimitedStrategy);
        assert_eq!(result.line, "aθ");
        assert_eq!(result.cursor, 2);
    }

    #[test]
    fn test_cursor_before_token_untouched() {
        let result = substitute("ab :th; cd", 2, &th_map(), &DelimitedStrategy);
        assert_eq!(result.line, "ab θ cd");
        assert_eq!(result.cursor, 2);
    }

    #[test]
    fn test_cursor_at_token_start_untouched() {
        let result = substitute("ab :th;", 3, &th_map(), &DelimitedStrategy);
        assert_eq!(result.cursor, 3);
    }

    #[test]
    fn test_deltas_accumulate() {
        let map = TokenMap::builtin();
        let line = ":th; :sh; x";
        let result = substitute(line, 10, &map, &DelimitedStrategy);
        assert_eq!(result.line, "θ ʃ x");
        // Two 4-char tokens became 1 char each
        assert_eq!(result.cursor, 10 - 3 - 3);
        // Text following the cursor is unchanged
        let after: String = result.line.chars().skip(result.cursor).collect();
        assert_eq!(after, "x");
    }

    #[test]
    fn test_straddling_cursor_lands_after_replacement() {
        let map = TokenMap::builtin();
        // Cursor sits inside the second token (between 's' and 'h')
        let result = substitute(":th; :sh;", 7, &map, &DelimitedStrategy);
        assert_eq!(result.line, "θ ʃ");
        assert_eq!(result.cursor, 3);
    }

    #[test]
    fn test_straddle_with_longer_replacement() {
        let map: TokenMap = [("x", "ksi")].into_iter().collect();
        let result = substitute("a:x;b", 2, &map, &DelimitedStrategy);
        assert_eq!(result.line, "aksib");
        assert_eq!(result.cursor, 4);
    }

    #[test]
    fn test_matches_after_cursor_ignored() {
        let map = TokenMap::builtin();
        let result = substitute(":th;|:sh;", 4, &map, &DelimitedStrategy);
        assert_eq!(result.line, "θ|ʃ");
        assert_eq!(result.cursor, 1);
    }

    #[test]
    fn test_out_of_range_cursor_clamped() {
        let result = substitute("say :th;", 99, &th_map(), &DelimitedStrategy);
        assert_eq!(result.line, "say θ");
        assert_eq!(result.cursor, 5);

        let untouched = substitute("abc", 99, &th_map(), &DelimitedStrategy);
        assert_eq!(untouched.cursor, 3);
    }

    #[test]
    fn test_empty_replacement() {
        let map: TokenMap = [("x", "")].into_iter().collect();
        let result = substitute("a:x;b", 5, &map, &DelimitedStrategy);
        assert_eq!(result.line, "ab");
        assert_eq!(result.cursor, 2);
    }

    #[test]
    fn test_replacement_not_rescanned() {
        let map: TokenMap = [("a", ":b;"), ("b", "β")].into_iter().collect();
        let result = substitute(":a;", 3, &map, &DelimitedStrategy);
        assert_eq!(result.line, ":b;");
        assert_eq!(result.cursor, 3);
        // Same text length and content would read as unchanged
        let identity: TokenMap = [("a", ":a;")].into_iter().collect();
        let same = substitute(":a;", 3, &identity, &DelimitedStrategy);
        assert_eq!(same.replaced, 1);
        assert!(!same.changed());
    }

    #[test]
    fn test_prefix_strategy_substitution() {
        let map: TokenMap = [("th", "θ"), ("sh", "ʃ")].into_iter().collect();
        let result = substitute("fish and the", 12, &map, &PrefixStrategy);
        assert_eq!(result.line, "fiʃ and θe");
        assert_eq!(result.cursor, 10);
    }

    #[test]
    fn test_prefix_strategy_straddle() {
        let map: TokenMap = [("th", "θ")].into_iter().collect();
        let result = substitute("xthy", 2, &map, &PrefixStrategy);
        assert_eq!(result.line, "xθy");
        assert_eq!(result.cursor, 2);
    }
}
