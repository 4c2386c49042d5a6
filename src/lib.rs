//! praecordi - shorthand token substitution and language markup for editors
//!
//! Two small engines meant to be embedded in an editor host:
//!
//! - [`tokens`] rewrites escape tokens such as `:th;` into `θ` while the
//!   user types, keeping the cursor where the user expects it.
//! - [`markup`] finds `{{lang:content}}` and `{{content}}` spans and tags
//!   them with a language, for live [`decoration`] and static [`render`]ing.
//!
//! [`plugin::Plugin`] wires both to a host through [`plugin::HostEditor`].

pub mod buffer;
pub mod config;
pub mod decoration;
pub mod error;
pub mod line;
pub mod markup;
pub mod plugin;
pub mod render;
pub mod tokens;

pub use config::{FileStore, MemoryStore, Settings, SettingsStore};
pub use error::{PraecordiError, Result};
pub use plugin::{CursorPos, EditOutcome, HostEditor, Notice, Plugin, PluginCommand};
