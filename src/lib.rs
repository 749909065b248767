//! Harvester Core Library
//!
//! This library provides a pluggable web-scraping pipeline: it fetches
//! documents from a remote resource over HTTP, converts them into
//! normalized article records, validates and enriches those records, and
//! hands them to a storage backend.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Resilient HTTP client with pacing, retry and strict
//!   redirect resolution
//! - [`record`] - Open-schema article records
//! - [`scraper`] - The site-scraper contract, work units and the registry
//! - [`pipeline`] - Composable producer/annotator stages (unit iteration,
//!   authentication gating, date-range checking, property validation)
//! - [`orchestrator`] - The scrape/postprocess/persist run driver
//! - [`store`] - The batch persistence boundary and its HTTP adapter
//! - [`config`] - Explicit run configuration
//! - [`progress`] - Operator-facing per-unit progress markers

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod fetch;
pub mod orchestrator;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod scraper;
pub mod store;

// Re-export commonly used types
pub use config::RunOptions;
pub use fetch::{DEFAULT_RETRIES, Document, FetchClient, FetchConfig, FetchError};
pub use orchestrator::Orchestrator;
pub use pipeline::{
    Annotator, AuthProducer, DateRange, DateRangeAnnotator, PipelineError, Producer,
    PropertyAnnotator, PropertySpec, ProvenanceAnnotator, UnitProducer,
};
pub use progress::{ConsoleProgress, CountingProgress, ProgressSink, SilentProgress};
pub use record::{ArticleRecord, DATE_FIELD, METADATA_FIELD, PROVENANCE_FIELD};
pub use scraper::{JsonListingScraper, ScraperRegistry, SiteScraper, WorkUnit};
pub use store::{ApiStore, ArticleStore, StoreError, StoredArticle};
