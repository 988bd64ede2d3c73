use std::path::{Path, PathBuf};

use chrono_tz::Tz;

use crate::error::ConfigError;
use crate::models::Settings;

const ENV_URL: &str = "SUPABASE_URL";
const ENV_ANON_KEY: &str = "SUPABASE_ANON_KEY";
const ENV_TABLE: &str = "CALLBOARD_TABLE";
const ENV_TIMEZONE: &str = "CALLBOARD_TIMEZONE";

pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("callboard").join("config").join("settings.json"))
}

pub fn apply_env_defaults(settings: &mut Settings) {
    apply_overrides(settings, env_value);
}

/// Credentials from the environment fill empty fields; table and timezone
/// variables always win over the file.
pub fn apply_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if settings.backend.url.trim().is_empty() {
        settings.backend.url = lookup(ENV_URL).unwrap_or_default();
    }
    if settings.backend.anon_key.trim().is_empty() {
        settings.backend.anon_key = lookup(ENV_ANON_KEY).unwrap_or_default();
    }
    if let Some(table) = lookup(ENV_TABLE) {
        settings.backend.table = table;
    }
    if let Some(tz) = lookup(ENV_TIMEZONE) {
        settings.display.timezone = tz;
    }
}

pub fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
    let mut settings = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str::<Settings>(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
    } else {
        log::debug!("No settings at {}, using defaults", path.display());
        Settings::default()
    };
    apply_env_defaults(&mut settings);
    Ok(settings)
}

pub fn write_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let io_err = |e: std::io::Error| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = serde_json::to_string_pretty(settings).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    std::fs::write(path, content).map_err(io_err)
}

pub fn resolve_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::Timezone(name.to_string()))
}
