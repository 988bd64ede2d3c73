use std::path::Path;

use anyhow::{bail, Result};

use crate::cli::ConfigAction;
use crate::models::Settings;
use crate::utils::config;

pub fn run(path: &Path, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = config::read_settings(path)?;
            println!("# {}", path.display());
            println!("{}", serde_json::to_string_pretty(&redacted(settings))?);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            config::write_settings(path, &Settings::default())?;
            println!("Wrote default settings to {}", path.display());
        }
    }
    Ok(())
}

/// Hides all but the last four characters of the API key.
pub fn redacted(mut settings: Settings) -> Settings {
    let key = settings.backend.anon_key.trim();
    if !key.is_empty() {
        let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
        settings.backend.anon_key = format!("…{}", tail);
    }
    settings
}
