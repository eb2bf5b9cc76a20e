mod scrape;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::scrape::ScrapeArgs;

#[derive(Debug, Parser)]
#[command(name = "quakefeed-cli")]
#[command(about = "Read earthquake records from the seismological bulletin")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch (or read) a bulletin and print its records as JSON.
    Scrape(ScrapeArgs),
    /// Print the resolved configuration and exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = quakefeed_core::load_app_config()?;

    // stdout carries the JSON output; logs go to stderr.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scrape(args) => scrape::run_scrape(&config, &args).await?,
        Commands::CheckConfig => println!("{config:#?}"),
    }

    Ok(())
}
