use std::collections::HashMap;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleMode,
    Submit,
    Insert(char),
    Backspace,
    /// Line-wise scroll of the summary, or of the chat when the panel is hidden.
    ScrollUp,
    ScrollDown,
    /// Page-wise scroll of the detail log, or of the chat when the panel is hidden.
    PageUp,
    PageDown,
    Follow,
    StartMirroring,
    ConnectDevice,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KeyChord {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyChord {
    fn new(mut code: KeyCode, modifiers: KeyModifiers) -> Self {
        if let KeyCode::Char(c) = code {
            code = KeyCode::Char(c.to_ascii_lowercase());
        }
        Self { code, modifiers }
    }
}

#[derive(Debug)]
pub struct Keymap {
    bindings: HashMap<KeyChord, Action>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

impl Keymap {
    pub fn new() -> Self {
        use Action::*;
        let bindings = [
            (KeyCode::Tab, KeyModifiers::NONE, ToggleMode),
            (KeyCode::Enter, KeyModifiers::NONE, Submit),
            (KeyCode::Backspace, KeyModifiers::NONE, Backspace),
            (KeyCode::Up, KeyModifiers::NONE, ScrollUp),
            (KeyCode::Down, KeyModifiers::NONE, ScrollDown),
            (KeyCode::PageUp, KeyModifiers::NONE, PageUp),
            (KeyCode::PageDown, KeyModifiers::NONE, PageDown),
            (KeyCode::End, KeyModifiers::NONE, Follow),
            (KeyCode::F(5), KeyModifiers::NONE, StartMirroring),
            (KeyCode::F(6), KeyModifiers::NONE, ConnectDevice),
            (KeyCode::Esc, KeyModifiers::NONE, Quit),
            (KeyCode::Char('c'), KeyModifiers::CONTROL, Quit),
        ]
        .into_iter()
        .map(|(code, modifiers, action)| (KeyChord::new(code, modifiers), action))
        .collect();
        Self { bindings }
    }

    pub fn resolve(&self, event: KeyEvent) -> Option<Action> {
        if !matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return None;
        }
        if let Some(action) = self
            .bindings
            .get(&KeyChord::new(event.code, event.modifiers))
        {
            return Some(*action);
        }
        match event.code {
            KeyCode::Char(c) if (event.modifiers - KeyModifiers::SHIFT).is_empty() => {
                Some(Action::Insert(c))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn bound_keys_resolve_to_actions() {
        let keymap = Keymap::new();
        assert_eq!(
            keymap.resolve(press(KeyCode::Tab, KeyModifiers::NONE)),
            Some(Action::ToggleMode)
        );
        assert_eq!(
            keymap.resolve(press(KeyCode::Char('C'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(
            keymap.resolve(press(KeyCode::F(6), KeyModifiers::NONE)),
            Some(Action::ConnectDevice)
        );
    }

    #[test]
    fn printable_characters_are_inserted() {
        let keymap = Keymap::new();
        assert_eq!(
            keymap.resolve(press(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(Action::Insert('A'))
        );
        assert_eq!(
            keymap.resolve(press(KeyCode::Char('微'), KeyModifiers::NONE)),
            Some(Action::Insert('微'))
        );
        assert_eq!(
            keymap.resolve(press(KeyCode::Char('x'), KeyModifiers::ALT)),
            None
        );
    }

    #[test]
    fn releases_are_ignored() {
        let keymap = Keymap::new();
        let mut event = press(KeyCode::Enter, KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(keymap.resolve(event), None);
    }
}
