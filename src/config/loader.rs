use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "modal-form";
const CONFIG_FILE: &str = "config.toml";

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Loads the config from `path`, or from the default location when `None`.
///
/// A missing file yields the defaults. An explicitly requested file must exist.
pub fn load(path: Option<&Path>) -> color_eyre::Result<AppConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let Some(path) = config_path() else {
                debug!("No config directory found, using defaults");
                return Ok(AppConfig::default());
            };
            if !path.exists() {
                debug!(?path, "Config file not found, using defaults");
                return Ok(AppConfig::default());
            }
            path
        }
    };

    let content = fs::read_to_string(&path)
        .wrap_err_with(|| format!("Failed to read config from {}", path.display()))?;
    let config = parse(&content)
        .wrap_err_with(|| format!("Failed to parse config at {}", path.display()))?;
    debug!(?path, "Loaded config");
    Ok(config)
}

fn parse(content: &str) -> color_eyre::Result<AppConfig> {
    Ok(toml::from_str(content)?)
}
