//! Composable pipeline stages.
//!
//! The pipeline splits into two seams, each a small object-safe trait:
//!
//! - [`Producer`] turns the remote resource into a batch of raw records
//!   (unit iteration, optionally gated by authentication),
//! - [`Annotator`] postprocesses the batch (provenance stamping, optionally
//!   wrapped by date-range checking and property validation).
//!
//! Concrete pipelines are assembled by decoration - each concern wraps the
//! next, so ordering is explicit at construction time:
//!
//! ```text
//! AuthProducer(UnitProducer(scraper))
//! PropertyAnnotator(DateRangeAnnotator(ProvenanceAnnotator))
//! ```

mod dates;
mod error;
mod properties;

pub use dates::{DateRange, DateRangeAnnotator};
pub use error::PipelineError;
pub use properties::{PropertyAnnotator, PropertySpec};

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::fetch::FetchClient;
use crate::progress::ProgressSink;
use crate::record::{ArticleRecord, PROVENANCE_FIELD};
use crate::scraper::SiteScraper;

/// Produces the raw record batch from the remote resource.
#[async_trait]
pub trait Producer: Send + Sync {
    /// Drives scraping and returns everything the resource yielded.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`PipelineError`] (login failure, unit enumeration
    /// failure); per-unit scrape errors are isolated and never surface
    /// here.
    async fn produce(
        &self,
        client: &FetchClient,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<ArticleRecord>, PipelineError>;
}

/// Postprocesses a scraped batch before persistence.
pub trait Annotator: Send + Sync {
    /// Annotates, checks or filters the batch.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`PipelineError`] on contract or validation
    /// violations; persistence must not proceed past one.
    fn annotate(&self, records: Vec<ArticleRecord>) -> Result<Vec<ArticleRecord>, PipelineError>;
}

/// Iterates a scraper's work units, isolating per-unit failures.
///
/// A single unit's failure never aborts the run: depending on
/// `log_errors` it is either logged with full detail or surfaced as a
/// terse `x` marker, and iteration continues with the next unit.
pub struct UnitProducer<'a> {
    scraper: &'a dyn SiteScraper,
    log_errors: bool,
}

impl<'a> UnitProducer<'a> {
    /// Creates a unit producer over `scraper`.
    #[must_use]
    pub fn new(scraper: &'a dyn SiteScraper, log_errors: bool) -> Self {
        Self {
            scraper,
            log_errors,
        }
    }
}

#[async_trait]
impl Producer for UnitProducer<'_> {
    async fn produce(
        &self,
        client: &FetchClient,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<ArticleRecord>, PipelineError> {
        let units = self.scraper.units(client).await?;
        info!(
            scraper = self.scraper.name(),
            units = units.len(),
            "derived work units"
        );

        let mut records = Vec::new();
        for unit in units {
            match self.scraper.scrape_unit(client, unit).await {
                Ok(Some(record)) => {
                    records.push(record);
                    progress.tick();
                }
                Ok(None) => {
                    debug!(scraper = self.scraper.name(), "unit yielded no record");
                    progress.tick();
                }
                Err(unit_error) => {
                    if self.log_errors {
                        error!(
                            scraper = self.scraper.name(),
                            error = %unit_error,
                            "unit scrape failed; continuing with next unit"
                        );
                    } else {
                        progress.failure();
                    }
                }
            }
        }

        Ok(records)
    }
}

/// Gates a producer behind a login call.
///
/// Login runs before any unit is processed; `false` or an error aborts
/// the whole run with no partial results. Credentials are held here and
/// never logged.
pub struct AuthProducer<'a> {
    inner: Box<dyn Producer + 'a>,
    scraper: &'a dyn SiteScraper,
    username: String,
    password: String,
}

impl<'a> AuthProducer<'a> {
    /// Wraps `inner` with a login gate using the scraper's `login`.
    #[must_use]
    pub fn new(
        inner: Box<dyn Producer + 'a>,
        scraper: &'a dyn SiteScraper,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            scraper,
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl Producer for AuthProducer<'_> {
    async fn produce(
        &self,
        client: &FetchClient,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<ArticleRecord>, PipelineError> {
        info!(scraper = self.scraper.name(), "logging in");
        let logged_in = self
            .scraper
            .login(client, &self.username, &self.password)
            .await?;
        if !logged_in {
            return Err(PipelineError::login(self.scraper.name()));
        }
        self.inner.produce(client, progress).await
    }
}

/// Base annotator: stamps provenance and drops empty records.
///
/// Every surviving record carries the provenance identifier its scraper
/// declared at construction.
pub struct ProvenanceAnnotator {
    provenance: String,
}

impl ProvenanceAnnotator {
    /// Creates the base annotator for the given provenance identifier.
    #[must_use]
    pub fn new(provenance: impl Into<String>) -> Self {
        Self {
            provenance: provenance.into(),
        }
    }
}

impl Annotator for ProvenanceAnnotator {
    fn annotate(&self, records: Vec<ArticleRecord>) -> Result<Vec<ArticleRecord>, PipelineError> {
        Ok(records
            .into_iter()
            .filter(|record| !record.is_empty())
            .map(|mut record| {
                record.set(PROVENANCE_FIELD, self.provenance.clone());
                record
            })
            .collect())
    }
}

/// Identity annotator; the innermost link when a stage is tested alone.
pub struct PassthroughAnnotator;

impl Annotator for PassthroughAnnotator {
    fn annotate(&self, records: Vec<ArticleRecord>) -> Result<Vec<ArticleRecord>, PipelineError> {
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::CountingProgress;
    use crate::scraper::WorkUnit;
    use serde_json::json;

    /// Scraper yielding 5 units; unit 3 (1-indexed) fails, unit 5 yields
    /// nothing.
    struct FlakySite;

    #[async_trait]
    impl SiteScraper for FlakySite {
        fn name(&self) -> &str {
            "flaky-site"
        }

        fn provenance(&self) -> &str {
            "tests.flaky_site"
        }

        async fn units(&self, _client: &FetchClient) -> Result<Vec<WorkUnit>, PipelineError> {
            Ok((1..=5).map(|index| WorkUnit::new(json!(index))).collect())
        }

        async fn scrape_unit(
            &self,
            _client: &FetchClient,
            unit: WorkUnit,
        ) -> Result<Option<ArticleRecord>, PipelineError> {
            match unit.payload().as_i64() {
                Some(3) => Err(PipelineError::scrape("unit 3 exploded")),
                Some(5) => Ok(None),
                Some(index) => {
                    let mut record = ArticleRecord::new();
                    record.set("title", format!("article {index}"));
                    Ok(Some(record))
                }
                None => Err(PipelineError::scrape("bad unit payload")),
            }
        }
    }

    #[tokio::test]
    async fn test_unit_failure_is_isolated() {
        let scraper = FlakySite;
        let producer = UnitProducer::new(&scraper, false);
        let client = FetchClient::default();
        let progress = CountingProgress::new();

        let records = producer.produce(&client, &progress).await.unwrap();

        // Units 1, 2, 4 yield records; 3 fails, 5 yields None. No null
        // substitution for the failed unit.
        assert_eq!(records.len(), 3);
        assert_eq!(progress.ticks(), 4);
        assert_eq!(progress.failures(), 1);
    }

    struct RejectingLogin;

    #[async_trait]
    impl SiteScraper for RejectingLogin {
        fn name(&self) -> &str {
            "rejecting"
        }

        fn provenance(&self) -> &str {
            "tests.rejecting"
        }

        async fn units(&self, _client: &FetchClient) -> Result<Vec<WorkUnit>, PipelineError> {
            panic!("units must not be derived when login fails");
        }

        async fn scrape_unit(
            &self,
            _client: &FetchClient,
            _unit: WorkUnit,
        ) -> Result<Option<ArticleRecord>, PipelineError> {
            panic!("no unit may be scraped when login fails");
        }

        async fn login(
            &self,
            _client: &FetchClient,
            _username: &str,
            _password: &str,
        ) -> Result<bool, PipelineError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_rejected_login_aborts_before_any_unit() {
        let scraper = RejectingLogin;
        let producer = AuthProducer::new(
            Box::new(UnitProducer::new(&scraper, true)),
            &scraper,
            "user",
            "secret",
        );
        let client = FetchClient::default();
        let progress = CountingProgress::new();

        let error = producer.produce(&client, &progress).await.unwrap_err();
        assert!(matches!(error, PipelineError::Login { .. }));
        assert_eq!(progress.ticks(), 0);
    }

    #[test]
    fn test_provenance_stamped_and_empty_records_dropped() {
        let mut full = ArticleRecord::new();
        full.set("title", "A");

        let stage = ProvenanceAnnotator::new("tests.site");
        let result = stage.annotate(vec![full, ArticleRecord::new()]).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].get(PROVENANCE_FIELD), Some(&json!("tests.site")));
    }
}
