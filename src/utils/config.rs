use log::warn;
use std::path::{Path, PathBuf};

use crate::models::Settings;

const ENV_DATA_DIR: &str = "WORKLOG_DATA_DIR";

pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Where the database, settings, and default exports live. Overridable via
/// `WORKLOG_DATA_DIR` for tests and portable setups.
pub fn data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::data_dir()
        .map(|base| base.join("worklog"))
        .ok_or_else(|| anyhow::anyhow!("no platform data directory available"))
}

/// Settings from `<data_dir>/config/settings.json`, or defaults when the
/// file is missing or unreadable. A broken settings file must not take the
/// application down.
pub fn read_settings(data_dir: &Path) -> Settings {
    let config_path = data_dir.join("config").join("settings.json");
    if !config_path.exists() {
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("invalid settings file, using defaults: {err}");
                Settings::default()
            }
        },
        Err(err) => {
            warn!("could not read settings file, using defaults: {err}");
            Settings::default()
        }
    }
}
