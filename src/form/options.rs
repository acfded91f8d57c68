use std::time::Duration;

use serde::Deserialize;

use crate::form::footer::{Submitter, SubmitterConfig};
use crate::form::instance::Values;

/// Data-only controller options, loadable from a config file.
///
/// Callbacks and the submit handler cannot be expressed here; set them on
/// [`crate::ModalFormBuilder`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModalFormOptions {
    pub title: String,
    /// Supplying a value puts the dialog in controlled mode.
    pub visible: Option<bool>,
    pub destroy_on_close: bool,
    pub force_render: bool,
    pub submit_timeout_ms: Option<u64>,
    pub initial_values: Values,
    pub submitter: SubmitterSettings,
}

impl Default for ModalFormOptions {
    fn default() -> Self {
        Self {
            title: "Form".to_string(),
            visible: None,
            destroy_on_close: false,
            force_render: false,
            submit_timeout_ms: None,
            initial_values: Values::new(),
            submitter: SubmitterSettings::default(),
        }
    }
}

impl ModalFormOptions {
    pub fn submit_timeout(&self) -> Option<Duration> {
        self.submit_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubmitterSettings {
    pub enabled: bool,
    pub submit_text: String,
    pub reset_text: String,
}

impl Default for SubmitterSettings {
    fn default() -> Self {
        let labels = SubmitterConfig::default();
        Self {
            enabled: true,
            submit_text: labels.submit_text,
            reset_text: labels.reset_text,
        }
    }
}

impl From<&SubmitterSettings> for Submitter {
    fn from(settings: &SubmitterSettings) -> Self {
        if settings.enabled {
            Self::Footer(SubmitterConfig {
                submit_text: settings.submit_text.clone(),
                reset_text: settings.reset_text.clone(),
            })
        } else {
            Self::Hidden
        }
    }
}
