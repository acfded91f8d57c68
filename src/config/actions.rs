#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    Open,
}

/// Keys handled while the form dialog has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Submit,
    /// The footer's cancel button.
    Cancel,
    /// The dialog's close icon.
    Close,
    /// Keyboard dismissal.
    Dismiss,
    Reset,
    NextField,
    PrevField,
}
