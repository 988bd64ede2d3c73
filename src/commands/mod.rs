use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono_tz::Tz;

use crate::cli::{Cli, Command};
use crate::database::SqliteSource;
use crate::models::{Settings, SourceKind};
use crate::services::change_feed::PollingChangeFeed;
use crate::services::record_store::RecordSource;
use crate::services::supabase::SupabaseSource;
use crate::utils::config;

pub mod calls;
pub mod dashboard;
pub mod settings;
pub mod snapshot;

/// Everything a data command needs: resolved settings, the record source and
/// the display timezone.
pub struct AppContext {
    pub settings: Settings,
    pub source: Arc<dyn RecordSource>,
    pub timezone: Tz,
}

impl AppContext {
    pub fn load(settings_path: &Path, sqlite_override: Option<&Path>) -> Result<Self> {
        let settings = config::read_settings(settings_path)?;
        Self::from_settings(settings, sqlite_override)
    }

    pub fn from_settings(settings: Settings, sqlite_override: Option<&Path>) -> Result<Self> {
        let timezone = config::resolve_timezone(&settings.display.timezone)?;
        let source = build_source(&settings, sqlite_override)?;
        log::info!("Reading transcriptions from {}", source.describe());
        Ok(Self {
            settings,
            source,
            timezone,
        })
    }

    pub fn change_feed(&self) -> PollingChangeFeed {
        PollingChangeFeed::new(
            Arc::clone(&self.source),
            Duration::from_secs(self.settings.live.poll_interval_secs),
        )
    }
}

pub fn build_source(settings: &Settings, sqlite_override: Option<&Path>) -> Result<Arc<dyn RecordSource>> {
    if let Some(path) = sqlite_override {
        return Ok(Arc::new(SqliteSource::new(path)));
    }
    match settings.source.kind {
        SourceKind::Supabase => Ok(Arc::new(SupabaseSource::from_settings(&settings.backend)?)),
        SourceKind::Sqlite => {
            let path = settings
                .source
                .sqlite_path
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .context("source.kind is sqlite but source.sqlite_path is not set")?;
            Ok(Arc::new(SqliteSource::new(path)))
        }
    }
}

/// Resolves once Ctrl-C is pressed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let settings_path = match cli.config {
        Some(path) => path,
        None => config::default_settings_path()
            .context("no user config directory available; pass --config")?,
    };
    let sqlite = cli.sqlite.as_deref();

    match cli.command {
        Command::Config { action } => settings::run(&settings_path, action),
        Command::Dashboard(args) => {
            let ctx = AppContext::load(&settings_path, sqlite)?;
            dashboard::run(&ctx, args).await
        }
        Command::Calls(args) => {
            let ctx = AppContext::load(&settings_path, sqlite)?;
            calls::run(&ctx, args).await
        }
        Command::Snapshot(args) => {
            let ctx = AppContext::load(&settings_path, sqlite)?;
            snapshot::run(&ctx, args).await
        }
    }
}
