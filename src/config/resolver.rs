use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{FormAction, GlobalAction};
use crate::config::keybindings::KeybindingsConfig;

pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Open => kb.open.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
            GlobalAction::Open => kb.open.display(),
        }
    }

    // Form actions
    pub fn matches_form(&self, event: &KeyEvent, action: FormAction) -> bool {
        let kb = &self.keybindings.form;
        match action {
            FormAction::Submit => kb.submit.matches(event),
            FormAction::Cancel => kb.cancel.matches(event),
            FormAction::Close => kb.close.matches(event),
            FormAction::Dismiss => kb.dismiss.matches(event),
            FormAction::Reset => kb.reset.matches(event),
            FormAction::NextField => kb.next_field.matches(event),
            FormAction::PrevField => kb.prev_field.matches(event),
        }
    }

    pub fn display_form(&self, action: FormAction) -> String {
        let kb = &self.keybindings.form;
        match action {
            FormAction::Submit => kb.submit.display(),
            FormAction::Cancel => kb.cancel.display(),
            FormAction::Close => kb.close.display(),
            FormAction::Dismiss => kb.dismiss.display(),
            FormAction::Reset => kb.reset.display(),
            FormAction::NextField => kb.next_field.display(),
            FormAction::PrevField => kb.prev_field.display(),
        }
    }

    /// First form action bound to `event`, in priority order.
    pub fn form_action(&self, event: &KeyEvent) -> Option<FormAction> {
        [
            FormAction::Submit,
            FormAction::Cancel,
            FormAction::Close,
            FormAction::Dismiss,
            FormAction::Reset,
            FormAction::NextField,
            FormAction::PrevField,
        ]
        .into_iter()
        .find(|action| self.matches_form(event, *action))
    }
}
