use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(Action),
    TogglePause,
    /// Playback speed level, 1 (slow) to 4 (very fast)
    Speed(u8),
    Restart,
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            // Movement - Arrow keys
            KeyCode::Up => KeyAction::Move(Action::Up),
            KeyCode::Down => KeyAction::Move(Action::Down),
            KeyCode::Left => KeyAction::Move(Action::Left),
            KeyCode::Right => KeyAction::Move(Action::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::Move(Action::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::Move(Action::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => KeyAction::Move(Action::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => KeyAction::Move(Action::Right),
            KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Char('.') => {
                KeyAction::Move(Action::Wait)
            }

            // Playback
            KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => KeyAction::TogglePause,
            KeyCode::Char(c @ '1'..='4') => KeyAction::Speed(c as u8 - b'0'),

            // Controls
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,

            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(handler: &InputHandler, code: KeyCode) -> KeyAction {
        handler.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_arrow_keys() {
        let handler = InputHandler::new();

        assert_eq!(press(&handler, KeyCode::Up), KeyAction::Move(Action::Up));
        assert_eq!(press(&handler, KeyCode::Down), KeyAction::Move(Action::Down));
        assert_eq!(press(&handler, KeyCode::Left), KeyAction::Move(Action::Left));
        assert_eq!(press(&handler, KeyCode::Right), KeyAction::Move(Action::Right));
    }

    #[test]
    fn test_wasd_keys() {
        let handler = InputHandler::new();

        assert_eq!(press(&handler, KeyCode::Char('w')), KeyAction::Move(Action::Up));
        assert_eq!(press(&handler, KeyCode::Char('a')), KeyAction::Move(Action::Left));
        assert_eq!(press(&handler, KeyCode::Char('s')), KeyAction::Move(Action::Down));
        assert_eq!(press(&handler, KeyCode::Char('d')), KeyAction::Move(Action::Right));
    }

    #[test]
    fn test_wasd_uppercase() {
        let handler = InputHandler::new();

        let w_upper = KeyEvent::new(KeyCode::Char('W'), KeyModifiers::SHIFT);
        assert_eq!(handler.handle_key_event(w_upper), KeyAction::Move(Action::Up));
    }

    #[test]
    fn test_wait_keys() {
        let handler = InputHandler::new();

        assert_eq!(press(&handler, KeyCode::Char('x')), KeyAction::Move(Action::Wait));
        assert_eq!(press(&handler, KeyCode::Char('.')), KeyAction::Move(Action::Wait));
    }

    #[test]
    fn test_playback_keys() {
        let handler = InputHandler::new();

        assert_eq!(press(&handler, KeyCode::Char(' ')), KeyAction::TogglePause);
        assert_eq!(press(&handler, KeyCode::Char('1')), KeyAction::Speed(1));
        assert_eq!(press(&handler, KeyCode::Char('4')), KeyAction::Speed(4));
        assert_eq!(press(&handler, KeyCode::Char('5')), KeyAction::None);
    }

    #[test]
    fn test_quit_keys() {
        let handler = InputHandler::new();

        assert_eq!(press(&handler, KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(press(&handler, KeyCode::Esc), KeyAction::Quit);

        let q_upper = KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(handler.handle_key_event(q_upper), KeyAction::Quit);
    }

    #[test]
    fn test_restart_key() {
        let handler = InputHandler::new();

        assert_eq!(press(&handler, KeyCode::Char('r')), KeyAction::Restart);
        assert_eq!(press(&handler, KeyCode::Char('R')), KeyAction::Restart);
    }

    #[test]
    fn test_unknown_key() {
        let handler = InputHandler::new();
        assert_eq!(press(&handler, KeyCode::Char('z')), KeyAction::None);
    }

    #[test]
    fn test_ctrl_c() {
        let handler = InputHandler::new();

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handler.handle_key_event(ctrl_c), KeyAction::Quit);
    }
}
