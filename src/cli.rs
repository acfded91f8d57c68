use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;

#[derive(Parser, Debug, Default)]
#[command(name = "modal-form", version, about = "Form in a modal dialog, in your terminal")]
pub struct Args {
    /// Config file to load instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Start with the dialog open, in controlled mode
    #[arg(long)]
    pub visible: bool,

    /// Discard field state whenever the dialog closes
    #[arg(long)]
    pub destroy_on_close: bool,

    /// Mount the form before the dialog is first opened
    #[arg(long)]
    pub force_render: bool,

    /// Disable the close affordances for this long after submitting
    #[arg(long, value_name = "MS")]
    pub submit_timeout_ms: Option<u64>,

    /// Hide the default submit/cancel footer
    #[arg(long)]
    pub no_submitter: bool,

    /// How long the demo submit handler takes
    #[arg(long, value_name = "MS")]
    pub submit_delay_ms: Option<u64>,

    /// Make the demo submit handler fail
    #[arg(long)]
    pub fail: bool,
}

impl Args {
    /// Overrides config values with the flags that were given.
    pub fn apply(&self, config: &mut AppConfig) {
        if self.visible {
            config.form.visible = Some(true);
        }
        if self.destroy_on_close {
            config.form.destroy_on_close = true;
        }
        if self.force_render {
            config.form.force_render = true;
        }
        if let Some(timeout) = self.submit_timeout_ms {
            config.form.submit_timeout_ms = Some(timeout);
        }
        if self.no_submitter {
            config.form.submitter.enabled = false;
        }
        if let Some(delay) = self.submit_delay_ms {
            config.demo.submit_delay_ms = delay;
        }
        if self.fail {
            config.demo.fail = true;
        }
    }
}
