//! Plugin instance - ties settings, the substitutor and the scanner to a host
//!
//! The host calls [`Plugin::on_text_changed`] after every edit. When the
//! cursor line contains tokens, the plugin asks the host to replace the
//! line and move the cursor. Hosts that fire change events synchronously
//! from inside that replacement re-enter `on_text_changed`; a scoped
//! [`ReplaceGuard`] turns those nested calls into no-ops.

use std::cell::Cell;

use crate::config::{is_valid_language, Settings, SettingsStore};
use crate::decoration::{build_decorations, Decoration, DecorationStyle};
use crate::error::{PraecordiError, Result};
use crate::markup::SelectionRange;
use crate::render::{postprocess, Node};
use crate::tokens::substitute;

/// A cursor position in the host editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPos {
    /// Line index (0-based)
    pub line: usize,
    /// Character offset within the line
    pub ch: usize,
}

impl CursorPos {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// The host editor as seen by the plugin: addressable lines and a cursor
pub trait HostEditor {
    /// Current cursor position
    fn cursor(&self) -> CursorPos;

    /// Text of a line, if it exists
    fn line_text(&self, line: usize) -> Option<String>;

    /// Replace the whole text of a line
    fn replace_line(&mut self, line: usize, text: &str);

    /// Move the cursor
    fn set_cursor(&mut self, pos: CursorPos);
}

/// What an edit event led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Token replacement is switched off
    Disabled,
    /// The event came from the plugin's own replacement
    Suppressed,
    /// Nothing to replace
    Unchanged,
    /// The line was rewritten and the cursor moved
    Replaced { cursor: CursorPos, tokens: usize },
}

/// Marks the plugin as mid-replacement for as long as it lives
struct ReplaceGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> ReplaceGuard<'a> {
    /// Take the guard, or `None` if a replacement is already running
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for ReplaceGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// User-invokable plugin commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginCommand {
    ToggleTokenReplacement,
}

impl PluginCommand {
    /// All commands, for hosts that register them
    pub const ALL: &'static [PluginCommand] = &[PluginCommand::ToggleTokenReplacement];

    /// Stable command identifier
    pub fn id(self) -> &'static str {
        match self {
            PluginCommand::ToggleTokenReplacement => "toggle-token-replacement",
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            PluginCommand::ToggleTokenReplacement => "Toggle Token Replacement",
        }
    }

    /// Look up a command by identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|cmd| cmd.id() == id)
    }
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice(pub String);

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One plugin instance
pub struct Plugin {
    settings: Settings,
    store: Box<dyn SettingsStore>,
    replacing: Cell<bool>,
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("settings", &self.settings)
            .field("replacing", &self.replacing.get())
            .finish_non_exhaustive()
    }
}

impl Plugin {
    /// Load settings from the store and create the plugin
    pub fn load(store: Box<dyn SettingsStore>) -> Result<Self> {
        let settings = Settings::load(store.as_ref())?;
        tracing::info!(
            tokens = settings.user_lookup.len(),
            default_language = %settings.default_language,
            strategy = settings.match_strategy.strategy().name(),
            "plugin loaded"
        );
        Ok(Self::with_settings(settings, store))
    }

    /// Create a plugin with explicit settings
    pub fn with_settings(settings: Settings, store: Box<dyn SettingsStore>) -> Self {
        Self {
            settings,
            store,
            replacing: Cell::new(false),
        }
    }

    /// Current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether a programmatic replacement is in progress
    pub fn is_replacing(&self) -> bool {
        self.replacing.get()
    }

    /// Handle an edit in the host: substitute tokens on the cursor line
    pub fn on_text_changed(&self, editor: &mut dyn HostEditor) -> EditOutcome {
        if !self.settings.enable_token_replace {
            return EditOutcome::Disabled;
        }
        if self.replacing.get() {
            return EditOutcome::Suppressed;
        }

        let cursor = editor.cursor();
        let Some(line) = editor.line_text(cursor.line) else {
            return EditOutcome::Unchanged;
        };

        let result = substitute(
            &line,
            cursor.ch,
            &self.settings.user_lookup,
            self.settings.match_strategy.strategy(),
        );
        if !result.changed() {
            return EditOutcome::Unchanged;
        }

        let Some(_guard) = ReplaceGuard::acquire(&self.replacing) else {
            return EditOutcome::Suppressed;
        };
        let new_cursor = CursorPos::new(cursor.line, result.cursor);
        editor.replace_line(cursor.line, &result.line);
        editor.set_cursor(new_cursor);

        tracing::debug!(
            line = cursor.line,
            tokens = result.replaced,
            from = cursor.ch,
            to = result.cursor,
            "replaced tokens"
        );
        EditOutcome::Replaced {
            cursor: new_cursor,
            tokens: result.replaced,
        }
    }

    /// Live decorations for a document and its current selections
    pub fn decorations(&self, text: &str, selections: &[SelectionRange]) -> Vec<Decoration> {
        build_decorations(
            text,
            &self.settings.default_language,
            selections,
            self.settings.decoration_style,
        )
    }

    /// Static render post-processing of a rendered subtree
    pub fn postprocess(&self, root: &mut Node) -> usize {
        postprocess(root, &self.settings.default_language)
    }

    /// Run a command
    pub fn execute(&mut self, command: PluginCommand) -> Result<Notice> {
        tracing::info!(command = command.id(), "executing command");
        match command {
            PluginCommand::ToggleTokenReplacement => {
                let enabled = !self.settings.enable_token_replace;
                self.set_token_replace(enabled)?;
                let state = if enabled { "enabled" } else { "disabled" };
                Ok(Notice(format!("Token replacement {}", state)))
            }
        }
    }

    /// Switch token replacement on or off
    pub fn set_token_replace(&mut self, enabled: bool) -> Result<()> {
        self.update_settings(|settings| settings.enable_token_replace = enabled)
    }

    /// Add a token or change an existing token's replacement
    pub fn set_token(&mut self, token: &str, replacement: &str) -> Result<()> {
        if token.is_empty() || replacement.is_empty() {
            tracing::warn!(token, replacement, "rejected token");
            return Err(PraecordiError::InvalidToken(format!(
                "token and replacement must both be non-empty (got {:?} -> {:?})",
                token, replacement
            )));
        }
        self.update_settings(|settings| {
            settings.user_lookup.insert(token, replacement);
        })?;
        tracing::info!(token, replacement, "token set");
        Ok(())
    }

    /// Remove a token; returns whether it existed
    pub fn remove_token(&mut self, token: &str) -> Result<bool> {
        if !self.settings.user_lookup.contains(token) {
            return Ok(false);
        }
        self.update_settings(|settings| {
            settings.user_lookup.remove(token);
        })?;
        tracing::info!(token, "token removed");
        Ok(true)
    }

    /// Set the default language for shorthand markup; blank disables it.
    ///
    /// Languages start with a lowercase ASCII letter followed by ASCII
    /// letters, digits, `-` or `_`.
    pub fn set_default_language(&mut self, language: &str) -> Result<()> {
        let language = language.trim();
        if !is_valid_language(language) {
            tracing::warn!(language, "rejected default language");
            return Err(PraecordiError::InvalidLanguage(language.to_string()));
        }
        self.update_settings(|settings| settings.default_language = language.to_string())?;
        tracing::info!(language, "default language set");
        Ok(())
    }

    /// Change how spans are decorated while editing
    pub fn set_decoration_style(&mut self, style: DecorationStyle) -> Result<()> {
        self.update_settings(|settings| settings.decoration_style = style)
    }

    /// Apply a change and persist it. The change is undone when the store
    /// rejects the write, so memory never holds unsaved settings.
    fn update_settings(&mut self, change: impl FnOnce(&mut Settings)) -> Result<()> {
        let previous = self.settings.clone();
        change(&mut self.settings);
        if let Err(e) = self.save_settings() {
            tracing::warn!(error = %e, "settings not saved, change reverted");
            self.settings = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Persist the current settings
    pub fn save_settings(&mut self) -> Result<()> {
        self.settings.save(self.store.as_mut())
    }
}
