pub mod actions;
mod defaults;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::time::Duration;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::load;
use modal_form::ModalFormOptions;
pub use resolver::KeyResolver;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Behaviour of the built-in submit handler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub submit_delay_ms: u64,
    /// Whether a successful submission asks the dialog to close.
    pub close_on_success: bool,
    /// Make every submission fail.
    pub fail: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: 1500,
            close_on_success: true,
            fail: false,
        }
    }
}

impl DemoConfig {
    pub const fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    #[serde(default)]
    pub form: ModalFormOptions,
    #[serde(default)]
    pub demo: DemoConfig,
}
