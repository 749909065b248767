//! Run orchestration: scrape, postprocess, persist.
//!
//! The orchestrator drives one run through a linear state machine with no
//! branching back-edges:
//!
//! ```text
//! INIT -> SCRAPING -> POSTPROCESSING -> (TEST_EXIT | PERSISTING) -> DONE
//! ```
//!
//! - INIT validates [`RunOptions`] and constructs the fetch client,
//! - SCRAPING drains the producer chain (unit iteration, optionally behind
//!   the authentication gate), one progress marker per unit,
//! - POSTPROCESSING runs the annotator chain (provenance stamping,
//!   optionally wrapped by date-range checking and property validation),
//! - TEST_EXIT returns the batch without persisting on a dry run,
//! - PERSISTING hands the batch to the store and accounts for partial
//!   failure: nothing saved is fatal, partially saved is a warning.
//!
//! The orchestrator owns the record batch and the fetch client for the
//! whole run; nothing is shared or accessed concurrently.

use tracing::{info, instrument, warn};

use crate::config::RunOptions;
use crate::fetch::{FetchClient, FetchConfig};
use crate::pipeline::{
    Annotator, AuthProducer, DateRangeAnnotator, PipelineError, Producer, PropertyAnnotator,
    ProvenanceAnnotator, UnitProducer,
};
use crate::progress::{ConsoleProgress, ProgressSink};
use crate::record::ArticleRecord;
use crate::scraper::SiteScraper;
use crate::store::ArticleStore;

/// Drives one scraper through scrape, postprocess and persist.
pub struct Orchestrator {
    options: RunOptions,
    scraper: Box<dyn SiteScraper>,
    store: Box<dyn ArticleStore>,
    progress: Box<dyn ProgressSink>,
    client: FetchClient,
}

impl Orchestrator {
    /// Creates an orchestrator for one run.
    ///
    /// Validates the options and builds the fetch client - the INIT state.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] when the options are inconsistent.
    pub fn new(
        options: RunOptions,
        scraper: Box<dyn SiteScraper>,
        store: Box<dyn ArticleStore>,
    ) -> Result<Self, PipelineError> {
        options.validate()?;
        Ok(Self {
            options,
            scraper,
            store,
            progress: Box::new(ConsoleProgress),
            client: FetchClient::new(FetchConfig::default()),
        })
    }

    /// Replaces the fetch client configuration (pacing, retries, charset).
    #[must_use]
    pub fn with_fetch_config(mut self, config: FetchConfig) -> Self {
        self.client = FetchClient::new(config);
        self
    }

    /// Replaces the progress sink (console markers by default).
    #[must_use]
    pub fn with_progress(mut self, progress: Box<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Runs the pipeline to completion.
    ///
    /// Returns the postprocessed batch on a dry run, otherwise the subset
    /// of records the store accepted (each stamped with its backend
    /// identifier).
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`PipelineError`]: login failure, unit
    /// enumeration failure, a validation or date-contract violation, a
    /// failed store call, or a batch of which nothing was saved.
    #[instrument(skip(self), fields(scraper = self.scraper.name()))]
    pub async fn run(&self) -> Result<Vec<ArticleRecord>, PipelineError> {
        info!("scraping articles");
        let records = self.scrape().await?;

        info!(count = records.len(), "found articles; postprocessing");
        let records = self.postprocess(records)?;

        if self.options.dry_run {
            info!(count = records.len(), "dry run; returning without saving");
            return Ok(records);
        }

        info!(count = records.len(), "saving");
        self.persist(records).await
    }

    /// SCRAPING: drain the producer chain into a batch.
    async fn scrape(&self) -> Result<Vec<ArticleRecord>, PipelineError> {
        let unit_producer = UnitProducer::new(self.scraper.as_ref(), self.options.log_errors);

        let producer: Box<dyn Producer + '_> = match self.options.credentials() {
            Some((username, password)) => Box::new(AuthProducer::new(
                Box::new(unit_producer),
                self.scraper.as_ref(),
                username,
                password,
            )),
            None => Box::new(unit_producer),
        };

        let records = producer.produce(&self.client, self.progress.as_ref()).await;
        self.progress.finish();
        records
    }

    /// POSTPROCESSING: compose and run the annotator chain.
    fn postprocess(
        &self,
        records: Vec<ArticleRecord>,
    ) -> Result<Vec<ArticleRecord>, PipelineError> {
        let mut annotator: Box<dyn Annotator> =
            Box::new(ProvenanceAnnotator::new(self.scraper.provenance()));

        if let Some(range) = self.options.date_range()? {
            annotator = Box::new(DateRangeAnnotator::new(annotator, range));
        }

        if let Some(spec) = self.scraper.property_spec() {
            annotator = Box::new(PropertyAnnotator::new(
                annotator,
                spec,
                self.options.project,
            ));
        }

        annotator.annotate(records)
    }

    /// PERSISTING: one batch to the store, per-record accounting on the
    /// way back.
    async fn persist(
        &self,
        records: Vec<ArticleRecord>,
    ) -> Result<Vec<ArticleRecord>, PipelineError> {
        let total = records.len();
        let responses = self
            .store
            .create_articles(self.options.project, self.options.articleset, &records)
            .await?;

        let saved = responses
            .iter()
            .filter(|response| response.id.is_some())
            .count();

        // An empty batch saving nothing is not a failure; a non-empty one
        // is, even when the store's response list itself comes back empty.
        if saved == 0 && total > 0 {
            return Err(PipelineError::NothingSaved { total });
        }
        if saved < total {
            warn!(
                saved,
                total, "only {saved}/{total} articles were saved"
            );
        }

        let persisted: Vec<ArticleRecord> = records
            .into_iter()
            .zip(responses)
            .filter_map(|(mut record, response)| {
                response.id.map(|id| {
                    record.set("id", id);
                    record
                })
            })
            .collect();

        info!(saved, total, "run complete");
        Ok(persisted)
    }
}
