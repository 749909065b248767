//! CLI entry point for the harvester tool.

use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use harvester_core::{
    ApiStore, FetchConfig, JsonListingScraper, Orchestrator, ScraperRegistry,
};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Harvester starting");

    let options = args.run_options()?;
    debug!(?options, "run options resolved");

    let mut registry = build_registry(&args);
    let scraper = take_scraper(&mut registry, &args.scraper)?;

    let store = ApiStore::new(&options.api_host, &options.api_user, &options.api_password);

    let fetch_config = FetchConfig {
        pace_delay: Duration::from_millis(args.pace_ms),
        ..FetchConfig::default()
    };

    let dry_run = options.dry_run;
    let orchestrator = Orchestrator::new(options, scraper, Box::new(store))?
        .with_fetch_config(fetch_config);

    let records = orchestrator.run().await?;

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }
    info!(count = records.len(), "harvester finished");

    Ok(())
}

/// Registers the built-in scrapers. Site-specific scrapers plug in here.
fn build_registry(args: &Args) -> ScraperRegistry {
    let mut registry = ScraperRegistry::new();
    if let Some(listing_url) = &args.listing_url {
        registry.register(Box::new(JsonListingScraper::new(
            listing_url,
            &args.provenance,
        )));
    }
    registry
}

/// Takes the named scraper out of the registry, with an actionable error
/// when it is not there. The built-in json-listing scraper is only
/// registered once --listing-url is given, so a bare invocation lands in
/// the empty-registry branch.
fn take_scraper(
    registry: &mut ScraperRegistry,
    name: &str,
) -> Result<Box<dyn harvester_core::SiteScraper>> {
    match registry.remove(name) {
        Some(scraper) => Ok(scraper),
        None if registry.is_empty() => bail!(
            "no scrapers registered; pass --listing-url to enable the built-in json-listing scraper"
        ),
        None => bail!(
            "unknown scraper '{}'; registered: {}",
            name,
            registry.names().join(", ")
        ),
    }
}
