//! Plugin settings
//!
//! Settings are persisted as a TOML blob (by default `~/.praecordi.toml`,
//! or `%USERPROFILE%\.praecordi.toml` on Windows). Missing keys fall back
//! to their defaults.
//!
//! Example:
//! ```text
//! enableTokenReplace = true
//! defaultLanguage = "zn"
//! matchStrategy = "delimited"
//! decorationStyle = "replace"
//!
//! [userLookup]
//! th = "θ"
//! sh = "ʃ"
//! ```

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::decoration::DecorationStyle;
use crate::error::{PraecordiError, Result};
use crate::tokens::{StrategyKind, TokenMap};

/// Default language for shorthand markup
pub const DEFAULT_LANGUAGE: &str = "zn";

/// Whether `language` can be a default language. Empty is allowed and
/// turns shorthand markup off.
pub fn is_valid_language(language: &str) -> bool {
    let mut chars = language.chars();
    match chars.next() {
        None => true,
        Some(first) => {
            first.is_ascii_lowercase()
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
    }
}

/// Persisted plugin settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Whether tokens are substituted while typing
    pub enable_token_replace: bool,
    /// Language for `{{content}}` markup; empty leaves it literal
    pub default_language: String,
    /// How tokens are located in a line
    pub match_strategy: StrategyKind,
    /// How spans are shown while editing
    pub decoration_style: DecorationStyle,
    /// Token table (kept last so it serializes as a trailing table)
    pub user_lookup: TokenMap,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_token_replace: true,
            default_language: DEFAULT_LANGUAGE.to_string(),
            match_strategy: StrategyKind::default(),
            decoration_style: DecorationStyle::default(),
            user_lookup: TokenMap::builtin(),
        }
    }
}

impl Settings {
    /// Parse a settings blob, filling missing keys with defaults
    pub fn from_toml(blob: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(blob)?;
        settings.default_language = settings.default_language.trim().to_string();
        if !is_valid_language(&settings.default_language) {
            return Err(PraecordiError::InvalidLanguage(settings.default_language));
        }
        Ok(settings)
    }

    /// Serialize to a settings blob
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from a store; an empty store yields defaults
    pub fn load(store: &dyn SettingsStore) -> Result<Self> {
        match store.load()? {
            Some(blob) => Self::from_toml(&blob),
            None => Ok(Self::default()),
        }
    }

    /// Write to a store
    pub fn save(&self, store: &mut dyn SettingsStore) -> Result<()> {
        store.save(&self.to_toml()?)
    }
}

/// Opaque persisted key-value storage for the settings blob
pub trait SettingsStore {
    /// Read the stored blob, if any
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored blob
    fn save(&mut self, blob: &str) -> Result<()>;
}

/// Settings stored in a file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location in the user's home directory
    pub fn default_location() -> Option<Self> {
        Self::config_path().map(Self::new)
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".praecordi.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".praecordi.toml"))
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SettingsStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn save(&mut self, blob: &str) -> Result<()> {
        fs::write(&self.path, blob)?;
        Ok(())
    }
}

/// Settings held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Option<String>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing blob
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            saves: 0,
        }
    }

    /// The stored blob
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    /// How many times the blob was written
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.blob.clone())
    }

    fn save(&mut self, blob: &str) -> Result<()> {
        self.blob = Some(blob.to_string());
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.enable_token_replace);
        assert_eq!(settings.default_language, "zn");
        assert_eq!(settings.user_lookup, TokenMap::builtin());
        assert_eq!(settings.match_strategy, StrategyKind::Delimited);
        assert_eq!(settings.decoration_style, DecorationStyle::Replace);
    }

    #[test]
    fn test_partial_blob_merges_defaults() {
        let settings = Settings::from_toml("enableTokenReplace = false\ndefaultLanguage = \" fr \"\n").unwrap();
        assert!(!settings.enable_token_replace);
        assert_eq!(settings.default_language, "fr");
        assert_eq!(settings.user_lookup, TokenMap::builtin());
    }

    #[test]
    fn test_user_lookup_replaces_builtin() {
        let blob = r#"
matchStrategy = "prefix"
decorationStyle = "mark"

[userLookup]
ng = "ŋ"
th = "θ"
"#;
        let settings = Settings::from_toml(blob).unwrap();
        let pairs: Vec<_> = settings.user_lookup.iter().collect();
        assert_eq!(pairs, vec![("ng", "ŋ"), ("th", "θ")]);
        assert_eq!(settings.match_strategy, StrategyKind::Prefix);
        assert_eq!(settings.decoration_style, DecorationStyle::Mark);
    }

    #[test]
    fn test_invalid_blob() {
        let err = Settings::from_toml("enableTokenReplace = \"maybe\"").unwrap_err();
        assert!(matches!(err, PraecordiError::ConfigParse(_)));
    }

    #[test]
    fn test_language_validation() {
        assert!(is_valid_language(""));
        assert!(is_valid_language("zn"));
        assert!(is_valid_language("pt-BR"));
        assert!(!is_valid_language("FR"));
        assert!(!is_valid_language("a b"));

        let err = Settings::from_toml("defaultLanguage = \"De\"").unwrap_err();
        assert!(matches!(err, PraecordiError::InvalidLanguage(ref lang) if lang.as_str() == "De"));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut settings = Settings::default();
        settings.default_language = String::new();
        settings.user_lookup.insert("ng", "ŋ");
        let blob = settings.to_toml().unwrap();
        assert!(blob.contains("enableTokenReplace = true"));
        assert_eq!(Settings::from_toml(&blob).unwrap(), settings);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(Settings::load(&store).unwrap(), Settings::default());

        let mut settings = Settings::default();
        settings.enable_token_replace = false;
        settings.save(&mut store).unwrap();
        assert_eq!(store.saves(), 1);
        assert!(store.blob().is_some());
        assert_eq!(Settings::load(&store).unwrap(), settings);
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("praecordi.toml"));
        assert_eq!(store.load().unwrap(), None);

        let mut settings = Settings::default();
        settings.default_language = "de".to_string();
        settings.save(&mut store).unwrap();

        let loaded = Settings::load(&store).unwrap();
        assert_eq!(loaded.default_language, "de");
        assert_eq!(loaded.user_lookup, TokenMap::builtin());
    }
}
