//! Visibility reconciliation.
//!
//! The dialog is either uncontrolled (the controller is the source of truth)
//! or controlled (an owner supplies `visible`). Both modes go through
//! [`VisibilityController::apply`], which applies the value to the displayed
//! state and reports whether a change notification is due.

/// Origin of a visibility request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilitySource {
    /// The trigger element was activated.
    Trigger,
    /// The dialog's close icon.
    CloseButton,
    /// A click on the mask behind the dialog.
    MaskClick,
    /// The footer's default cancel button.
    CancelButton,
    /// The host's keyboard dismiss key.
    Keyboard,
    /// The owner supplied a `visible` value.
    ExternalProp,
    /// A submission resolved with "close".
    SubmitSuccess,
    /// The owner asked for the change directly, bypassing the cancel hook.
    Programmatic,
}

impl VisibilitySource {
    /// User dismissal gestures go through the cancel hook and are subject to
    /// the submit timeout window.
    pub const fn is_close_gesture(self) -> bool {
        matches!(
            self,
            Self::CloseButton | Self::MaskClick | Self::CancelButton | Self::Keyboard
        )
    }
}

/// Outcome of a visibility request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Shown,
    Hidden,
    /// The requested value was already displayed. Nothing was notified.
    Unchanged,
    /// A close gesture arrived inside the submit timeout window.
    Rejected,
    /// The cancel hook took over the close gesture.
    Deferred,
}

impl From<bool> for Transition {
    fn from(visible: bool) -> Self {
        if visible { Self::Shown } else { Self::Hidden }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityState {
    pub visible: bool,
    pub controlled: bool,
}

#[derive(Debug, Default)]
pub struct VisibilityController {
    state: VisibilityState,
    /// Incremented on every hidden to visible transition.
    session: u64,
}

impl VisibilityController {
    /// Starts hidden. Passing an external value switches to controlled mode;
    /// the caller then applies it like any other request.
    pub fn new(external: Option<bool>) -> Self {
        Self {
            state: VisibilityState {
                visible: false,
                controlled: external.is_some(),
            },
            session: 0,
        }
    }

    /// Applies `next` to the displayed state.
    ///
    /// Returns `Some(next)` if the displayed value changed and the owner must
    /// be notified, `None` if it was already displayed.
    pub fn apply(&mut self, next: bool, source: VisibilitySource) -> Option<bool> {
        if source == VisibilitySource::ExternalProp {
            self.state.controlled = true;
        }
        if self.state.visible == next {
            return None;
        }

        self.state.visible = next;
        if next {
            self.session += 1;
        }
        Some(next)
    }

    pub const fn visible(&self) -> bool {
        self.state.visible
    }

    pub const fn is_controlled(&self) -> bool {
        self.state.controlled
    }

    pub const fn state(&self) -> VisibilityState {
        self.state
    }

    /// Identifies the current shown session.
    pub const fn session(&self) -> u64 {
        self.session
    }
}
