//! Default footer affordances.

use serde::{Deserialize, Serialize};

/// Labels for the default footer buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitterConfig {
    pub submit_text: String,
    pub reset_text: String,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            submit_text: "Confirm".to_string(),
            reset_text: "Cancel".to_string(),
        }
    }
}

/// Whether the dialog renders the default submit/cancel footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitter {
    /// No footer at all. The dialog can only be toggled by the trigger or
    /// the owner.
    Hidden,
    Footer(SubmitterConfig),
}

impl Default for Submitter {
    fn default() -> Self {
        Self::Footer(SubmitterConfig::default())
    }
}

impl From<bool> for Submitter {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::default()
        } else {
            Self::Hidden
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterButton {
    pub label: String,
    pub disabled: bool,
    pub loading: bool,
}

/// Footer state for the chrome to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub submit: FooterButton,
    pub cancel: FooterButton,
}

impl Footer {
    /// Builds the footer for the current submission state.
    ///
    /// Returns `None` when the submitter is hidden.
    pub fn build(submitter: &Submitter, submitting: bool, close_blocked: bool) -> Option<Self> {
        let Submitter::Footer(config) = submitter else {
            return None;
        };

        Some(Self {
            submit: FooterButton {
                label: config.submit_text.clone(),
                disabled: false,
                loading: submitting,
            },
            cancel: FooterButton {
                label: config.reset_text.clone(),
                disabled: close_blocked,
                loading: false,
            },
        })
    }
}
