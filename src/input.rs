//! Input handling - key translation

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A key the editor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable character
    Char(char),
    /// Control-modified letter (C-x), lowercase
    Ctrl(char),
    Enter,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Esc,
}

impl Key {
    /// Convert key to a human-readable string (e.g., "C-t", "Home")
    pub fn display_name(&self) -> String {
        match self {
            Key::Char(ch) => ch.to_string(),
            Key::Ctrl(ch) => format!("C-{}", ch),
            other => format!("{:?}", other),
        }
    }
}

/// Translate a crossterm key event. Releases and repeats report `None`.
pub fn translate_key(event: KeyEvent) -> Option<Key> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let key = match event.code {
        KeyCode::Char(ch) if ctrl => Key::Ctrl(ch.to_ascii_lowercase()),
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Esc => Key::Esc,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_shifted_chars() {
        let event = KeyEvent::new(KeyCode::Char('θ'), KeyModifiers::NONE);
        assert_eq!(translate_key(event), Some(Key::Char('θ')));

        let event = KeyEvent::new(KeyCode::Char(':'), KeyModifiers::SHIFT);
        assert_eq!(translate_key(event), Some(Key::Char(':')));
    }

    #[test]
    fn test_ctrl_keys_lowercased() {
        let event = KeyEvent::new(KeyCode::Char('T'), KeyModifiers::CONTROL);
        assert_eq!(translate_key(event), Some(Key::Ctrl('t')));
    }

    #[test]
    fn test_release_ignored() {
        let mut event = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(translate_key(event), None);
    }

    #[test]
    fn test_unbound_code() {
        let event = KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE);
        assert_eq!(translate_key(event), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Key::Ctrl('s').display_name(), "C-s");
        assert_eq!(Key::Home.display_name(), "Home");
        assert_eq!(Key::Char('x').display_name(), "x");
    }
}
