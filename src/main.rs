use clap::Parser;

use callboard::cli::Cli;
use callboard::{commands, utils};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::config::load_dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    commands::run(cli).await
}
