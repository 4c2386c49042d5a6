//! Editor state and main loop
//!
//! [`Session`] holds everything that reacts to keys and can be driven
//! without a terminal; [`EditorState`] adds the terminal and display.

use praecordi::buffer::Buffer;
use praecordi::decoration::{Decoration, LangDecorator, ViewUpdate};
use praecordi::markup::SelectionRange;
use praecordi::{EditOutcome, HostEditor, Plugin, PluginCommand, PraecordiError, Result, Settings};

use crate::display::Display;
use crate::input::{translate_key, Key};
use crate::terminal::Terminal;

/// Buffer, plugin and decorations for one editing session
#[derive(Debug)]
pub struct Session {
    buffer: Buffer,
    plugin: Plugin,
    decorator: LangDecorator,
    /// Message for the minibuffer
    message: Option<String>,
    /// Set after a first C-q on a modified buffer
    quit_armed: bool,
    running: bool,
}

impl Session {
    pub fn new(buffer: Buffer, plugin: Plugin) -> Self {
        let mut session = Self {
            decorator: LangDecorator::new(plugin.settings().decoration_style),
            buffer,
            plugin,
            message: None,
            quit_armed: false,
            running: true,
        };
        session.refresh(true, true);
        session
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn settings(&self) -> &Settings {
        self.plugin.settings()
    }

    /// Live decorations for the current document and cursor
    pub fn decorations(&self) -> &[Decoration] {
        self.decorator.decorations()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Handle one key
    pub fn handle_key(&mut self, key: Key) -> Result<()> {
        tracing::trace!(key = %key.display_name(), "key");
        if key != Key::Ctrl('q') {
            self.quit_armed = false;
        }

        match key {
            Key::Char(ch) => {
                self.buffer.insert_char(ch);
                self.after_edit();
            }
            Key::Enter => {
                self.buffer.insert_newline();
                self.after_edit();
            }
            Key::Backspace => {
                if self.buffer.delete_backward() {
                    self.after_edit();
                }
            }
            Key::Delete => {
                if self.buffer.delete_forward() {
                    self.after_edit();
                }
            }
            Key::Left => self.after_move(Buffer::move_left),
            Key::Right => self.after_move(Buffer::move_right),
            Key::Up => self.after_move(Buffer::move_up),
            Key::Down => self.after_move(Buffer::move_down),
            Key::Home => self.after_move(Buffer::move_to_bol),
            Key::End => self.after_move(Buffer::move_to_eol),
            Key::Esc => self.message = None,
            Key::Ctrl('t') => match self.plugin.execute(PluginCommand::ToggleTokenReplacement) {
                Ok(notice) => self.message = Some(notice.to_string()),
                Err(e) => self.settings_not_saved(e),
            },
            Key::Ctrl('d') => {
                if let Err(e) = self.cycle_decoration_style() {
                    self.settings_not_saved(e);
                }
            }
            Key::Ctrl('s') => self.save(),
            Key::Ctrl('q') => self.quit(),
            // Redraw is handled by the caller
            Key::Ctrl('l') => {}
            Key::Ctrl(_) => {
                self.message = Some(format!("{} is undefined", key.display_name()));
            }
        }
        Ok(())
    }

    /// Run substitution on the cursor line, then refresh decorations
    fn after_edit(&mut self) {
        if let EditOutcome::Replaced { tokens, .. } = self.plugin.on_text_changed(&mut self.buffer) {
            tracing::debug!(tokens, "tokens replaced while typing");
        }
        self.refresh(true, true);
    }

    fn after_move(&mut self, motion: fn(&mut Buffer)) {
        motion(&mut self.buffer);
        self.refresh(false, true);
    }

    fn refresh(&mut self, doc_changed: bool, selection_set: bool) {
        let text = self.buffer.text();
        let selections = [SelectionRange::cursor(self.buffer.cursor_offset())];
        let update = ViewUpdate {
            text: &text,
            selections: &selections,
            doc_changed,
            selection_set,
        };
        let language = self.plugin.settings().default_language.clone();
        self.decorator.update(&update, &language);
    }

    fn cycle_decoration_style(&mut self) -> Result<()> {
        let style = self.decorator.style().toggled();
        self.plugin.set_decoration_style(style)?;
        self.decorator.set_style(style);
        self.refresh(true, true);
        self.message = Some(format!("Decoration style: {}", style.name()));
        Ok(())
    }

    /// The plugin has already reverted the change; tell the user and carry on
    fn settings_not_saved(&mut self, error: PraecordiError) {
        tracing::warn!(error = %error, "settings not saved");
        self.message = Some(format!("Settings not saved: {}", error));
    }

    fn save(&mut self) {
        if self.buffer.filename().is_none() {
            self.message = Some("No file name".to_string());
            return;
        }
        match self.buffer.save() {
            Ok(()) => {
                tracing::info!(buffer = self.buffer.name(), "saved");
                self.message = Some(format!("Wrote {}", self.buffer.name()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "save failed");
                self.message = Some(format!("Save failed: {}", e));
            }
        }
    }

    fn quit(&mut self) {
        if self.buffer.is_modified() && !self.quit_armed {
            self.quit_armed = true;
            self.message = Some("Modified buffer; C-q again to quit".to_string());
        } else {
            self.running = false;
        }
    }

    /// Cursor position
    pub fn cursor(&self) -> praecordi::CursorPos {
        self.buffer.cursor()
    }
}

/// Session plus terminal and display
pub struct EditorState {
    session: Session,
    terminal: Terminal,
    display: Display,
}

impl EditorState {
    pub fn new(terminal: Terminal, session: Session) -> Self {
        Self {
            session,
            terminal,
            display: Display::new(),
        }
    }

    /// Main editor loop
    pub fn run(&mut self) -> Result<()> {
        while self.session.is_running() {
            self.display.render(&mut self.terminal, &self.session)?;

            let event = self.terminal.read_key()?;
            let Some(key) = translate_key(event) else {
                continue;
            };
            if key == Key::Ctrl('l') {
                self.display.force_redraw();
            }
            self.session.handle_key(key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use praecordi::decoration::{DecorationStyle, RenderAs};
    use praecordi::{CursorPos, MemoryStore, SettingsStore};
    use pretty_assertions::assert_eq;

    fn session(text: &str) -> Session {
        let plugin = Plugin::load(Box::new(MemoryStore::new())).unwrap();
        Session::new(Buffer::from_text(text), plugin)
    }

    fn type_str(session: &mut Session, s: &str) {
        for ch in s.chars() {
            session.handle_key(Key::Char(ch)).unwrap();
        }
    }

    #[test]
    fn test_typing_token_substitutes() {
        let mut s = session("");
        type_str(&mut s, "say :th; now");
        assert_eq!(s.buffer().text(), "say θ now");
        assert_eq!(s.cursor(), CursorPos::new(0, 9));
    }

    #[test]
    fn test_toggle_disables_substitution() {
        let mut s = session("");
        s.handle_key(Key::Ctrl('t')).unwrap();
        assert_eq!(s.message(), Some("Token replacement disabled"));
        type_str(&mut s, ":th;");
        assert_eq!(s.buffer().text(), ":th;");

        s.handle_key(Key::Ctrl('t')).unwrap();
        assert_eq!(s.message(), Some("Token replacement enabled"));
        assert!(s.settings().enable_token_replace);
    }

    #[test]
    fn test_cursor_inside_span_is_not_decorated() {
        let mut s = session("{{fr:oui}} {{ni}}");
        assert_eq!(s.decorations().len(), 2);

        s.handle_key(Key::Right).unwrap();
        s.handle_key(Key::Right).unwrap();
        assert_eq!(s.decorations().len(), 1);
        assert_eq!(s.decorations()[0].range, 11..17);

        s.handle_key(Key::End).unwrap();
        assert_eq!(s.decorations().len(), 2);
    }

    #[test]
    fn test_decorations_follow_edits() {
        let mut s = session("");
        type_str(&mut s, "{{de:ja}} ");
        assert_eq!(s.decorations().len(), 1);
        s.handle_key(Key::Backspace).unwrap();
        // Cursor now sits at the span's end, which does not suppress it
        assert_eq!(s.decorations().len(), 1);
        s.handle_key(Key::Backspace).unwrap();
        assert!(s.decorations().is_empty());
    }

    #[test]
    fn test_cycle_decoration_style() {
        let mut s = session("{{fr:oui}}!");
        s.handle_key(Key::End).unwrap();
        s.handle_key(Key::Ctrl('d')).unwrap();
        assert_eq!(s.settings().decoration_style, DecorationStyle::Mark);
        assert_eq!(s.message(), Some("Decoration style: mark"));
        assert!(matches!(s.decorations()[0].render_as, RenderAs::Mark { .. }));

        s.handle_key(Key::Ctrl('d')).unwrap();
        assert!(matches!(s.decorations()[0].render_as, RenderAs::Replace(_)));
    }

    #[test]
    fn test_quit_requires_confirmation_when_modified() {
        let mut s = session("");
        s.handle_key(Key::Ctrl('q')).unwrap();
        assert!(!s.is_running());

        let mut s = session("");
        type_str(&mut s, "x");
        s.handle_key(Key::Ctrl('q')).unwrap();
        assert!(s.is_running());
        s.handle_key(Key::Left).unwrap();
        s.handle_key(Key::Ctrl('q')).unwrap();
        assert!(s.is_running());
        s.handle_key(Key::Ctrl('q')).unwrap();
        assert!(!s.is_running());
    }

    #[test]
    fn test_save_without_filename() {
        let mut s = session("text");
        s.handle_key(Key::Ctrl('s')).unwrap();
        assert_eq!(s.message(), Some("No file name"));
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut buffer = Buffer::from_text("");
        buffer.set_filename(path.clone());
        let plugin = Plugin::load(Box::new(MemoryStore::new())).unwrap();
        let mut s = Session::new(buffer, plugin);

        type_str(&mut s, ":sh;a");
        s.handle_key(Key::Ctrl('s')).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ʃa");
        assert!(!s.buffer().is_modified());
    }

    /// Settings store whose writes fail, as with `--config` in a missing directory
    struct ReadOnlyStore;

    impl SettingsStore for ReadOnlyStore {
        fn load(&self) -> Result<Option<String>> {
            Ok(None)
        }

        fn save(&mut self, _blob: &str) -> Result<()> {
            Err(PraecordiError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No such file or directory",
            )))
        }
    }

    #[test]
    fn test_settings_write_failure_keeps_editing() {
        let plugin = Plugin::load(Box::new(ReadOnlyStore)).unwrap();
        let mut s = Session::new(Buffer::from_text(""), plugin);
        type_str(&mut s, "x");

        s.handle_key(Key::Ctrl('t')).unwrap();
        assert!(s.is_running());
        assert!(s.buffer().is_modified());
        assert!(s.message().is_some_and(|m| m.starts_with("Settings not saved")));
        // Toggle was reverted, substitution still works
        assert!(s.settings().enable_token_replace);
        type_str(&mut s, ":th;");
        assert_eq!(s.buffer().text(), "xθ");

        s.handle_key(Key::Ctrl('d')).unwrap();
        assert!(s.is_running());
        assert_eq!(s.settings().decoration_style, DecorationStyle::Replace);
        assert!(s.message().is_some_and(|m| m.starts_with("Settings not saved")));
    }

    #[test]
    fn test_undefined_ctrl_key() {
        let mut s = session("");
        s.handle_key(Key::Ctrl('z')).unwrap();
        assert_eq!(s.message(), Some("C-z is undefined"));
        s.handle_key(Key::Esc).unwrap();
        assert_eq!(s.message(), None);
    }

    #[test]
    fn test_enter_substitutes_new_line_only() {
        let mut s = session("");
        type_str(&mut s, ":th");
        s.handle_key(Key::Enter).unwrap();
        type_str(&mut s, ";:dh;");
        assert_eq!(s.buffer().text(), ":th\n;ð");
    }
}
