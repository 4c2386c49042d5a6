//! Shorthand token substitution
//!
//! Rewrites escape tokens such as `:th;` into their target characters as
//! the user types, keeping the cursor stable relative to the surrounding
//! text.

mod map;
mod strategy;
mod substitute;

pub use map::{TokenMap, DEFAULT_TOKENS};
pub use strategy::{DelimitedStrategy, MatchStrategy, PrefixStrategy, StrategyKind, TokenMatch};
pub use substitute::{substitute, Substitution};
