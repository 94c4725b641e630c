// ABOUTME: CLI for scraping a catalog listing into syndication entries.
// ABOUTME: Loads a site config JSON file, runs the pipeline, and prints entries as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use vitrine_catalog::{Scraper, SiteConfig};

/// Scrape one catalog listing page and emit normalized entries as JSON,
/// ready for a downstream feed writer.
#[derive(Parser, Debug)]
#[command(name = "vitrine-cli")]
#[command(about = "Scrape a catalog listing into normalized entries", long_about = None)]
struct Args {
    /// Path to the site configuration JSON file.
    config: PathBuf,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let raw = fs::read_to_string(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    let config: SiteConfig =
        serde_json::from_str(&raw).context("parsing site configuration")?;

    let scraper = Scraper::new(config)?;
    let entries = scraper.run().await?;

    let output = json!({
        "total_entries": entries.len(),
        "entries": entries,
    });

    if args.compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
