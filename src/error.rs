//! Error types for praecordi

use thiserror::Error;

/// Result type alias for praecordi operations
pub type Result<T> = std::result::Result<T, PraecordiError>;

/// Plugin error types
///
/// The substitution and markup engines never fail; these cover the
/// settings store, the terminal host and rejected settings input.
#[derive(Error, Debug)]
pub enum PraecordiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Cannot serialize settings: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid language: {0:?} (expected a lowercase letter, then letters, digits, '-' or '_')")]
    InvalidLanguage(String),

    #[error("{0}")]
    Message(String),
}
