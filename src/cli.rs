//! Command-line interface for callboard

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::models::SortKey;

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    Text,
    /// JSON for scripting
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "callboard")]
#[command(version)]
#[command(about = "Call analytics over a hosted transcriptions table", long_about = None)]
pub struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read from a local SQLite file instead of the hosted backend
    #[arg(long, global = true, value_name = "PATH")]
    pub sqlite: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summary metrics and chart series
    Dashboard(DashboardArgs),
    /// Sortable, searchable call table
    Calls(CallsArgs),
    /// Copy the whole table into a local SQLite file
    Snapshot(SnapshotArgs),
    /// Inspect or create the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last day to include, whole day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Stay open and refresh on every table change
    #[arg(long)]
    pub watch: bool,
}

#[derive(Args, Debug)]
pub struct CallsArgs {
    /// Column to sort by; repeat to toggle direction (starts newest first)
    #[arg(long = "sort", value_enum, value_name = "KEY")]
    pub sort: Vec<SortKey>,

    /// Case-insensitive text matched against every column
    #[arg(short, long, default_value = "")]
    pub search: String,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Stay open and refresh on every table change
    #[arg(long)]
    pub watch: bool,
}

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Destination SQLite file (created if missing)
    pub output: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Write a default settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}
