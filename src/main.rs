//! Around the Grounds main entry point
//!
//! This is the command-line interface for the event schedule aggregator.

use anyhow::{bail, Context};
use clap::Parser;
use grounds_events::output::{format_events_text, write_preview, WebPayload};
use grounds_events::{load_sources, ParserRegistry, ScrapeReport, ScraperCoordinator};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Around the Grounds: brewery and venue event schedules
///
/// Scrapes every configured source concurrently and prints the events of
/// the coming week. Exit code 0 means every source succeeded, 2 means some
/// sources failed, and 1 means nothing could be scraped.
#[derive(Parser, Debug)]
#[command(name = "grounds-events")]
#[command(version)]
#[command(about = "Aggregates brewery and venue event schedules", long_about = None)]
struct Cli {
    /// Path to the sources file (JSON, or TOML with a .toml extension)
    #[arg(short, long, value_name = "PATH", default_value = "config/sources.json")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Scrape only the source with this key
    #[arg(long, value_name = "KEY")]
    source: Option<String>,

    /// Print the web payload as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also write the web payload to DIR/data.json
    #[arg(long, value_name = "DIR")]
    preview: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Critical error: {:#}", e);
            eprintln!("Critical Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("grounds_events=info,warn"),
            1 => EnvFilter::new("grounds_events=debug,info"),
            _ => EnvFilter::new("grounds_events=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads sources, runs the scrape, and reports the results
async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    tracing::info!("Loading sources from: {}", cli.config.display());
    let file = load_sources(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let sources = file.sources();
    let config = file.scraper;

    let coordinator = ScraperCoordinator::new(config.clone(), Arc::new(ParserRegistry::with_builtin()));

    let report: ScrapeReport = match &cli.source {
        Some(key) => {
            let Some(source) = sources.iter().find(|s| &s.key == key) else {
                bail!("no source with key '{}' in {}", key, cli.config.display());
            };
            coordinator.scrape_one(source).await?
        }
        None => coordinator.scrape_all(&sources).await?,
    };

    let payload = WebPayload::from_report(&report, &config);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", format_events_text(&report.events, report.errors()));
    }

    if let Some(dir) = &cli.preview {
        match write_preview(dir, &payload)? {
            Some(path) if !cli.json => println!("\nPreview written to {}", path.display()),
            Some(_) => {}
            None if !cli.json => println!("\nNo events found, preview not written"),
            None => {}
        }
    }

    let outcome = report.outcome();
    tracing::debug!("Run outcome: {:?}", outcome);
    Ok(ExitCode::from(outcome.exit_code() as u8))
}
