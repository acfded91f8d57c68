use crossterm::event::KeyCode;

use crate::config::key::{Key, KeyBinding};
use crate::config::keybindings::{FormKeybindings, GlobalKeybindings};

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::new(KeyCode::Char('q')).into(),
            open: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('o')),
                Key::new(KeyCode::Enter),
            ]),
        }
    }
}

impl Default for FormKeybindings {
    fn default() -> Self {
        Self {
            submit: KeyBinding::multiple(vec![
                Key::with_ctrl(KeyCode::Char('s')),
                Key::new(KeyCode::Enter),
            ]),
            cancel: Key::with_ctrl(KeyCode::Char('x')).into(),
            close: Key::with_ctrl(KeyCode::Char('w')).into(),
            dismiss: Key::new(KeyCode::Esc).into(),
            reset: Key::with_ctrl(KeyCode::Char('r')).into(),
            next_field: KeyBinding::multiple(vec![
                Key::new(KeyCode::Tab),
                Key::new(KeyCode::Down),
            ]),
            prev_field: KeyBinding::multiple(vec![
                Key::new(KeyCode::BackTab),
                Key::new(KeyCode::Up),
            ]),
        }
    }
}
