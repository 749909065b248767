//! Site-scraper boundary: the contract concrete scrapers implement.
//!
//! A [`SiteScraper`] turns one remote resource into work units and each
//! unit into at most one article record. The pipeline owns all control
//! flow (iteration, failure isolation, login gating, validation); a
//! scraper only supplies the site-specific extraction logic plus two
//! declarations: its provenance identifier and its [`PropertySpec`].
//!
//! # Architecture
//!
//! - [`SiteScraper`] - Async trait that concrete scrapers implement
//! - [`WorkUnit`] - Opaque handle for one scrapable sub-resource
//! - [`ScraperRegistry`] - Named collection the CLI selects from
//! - [`JsonListingScraper`] - Reference implementation (JSON listing)

mod json_listing;
mod registry;

pub use json_listing::JsonListingScraper;
pub use registry::ScraperRegistry;

use async_trait::async_trait;
use serde_json::Value;

use crate::fetch::FetchClient;
use crate::pipeline::{PipelineError, PropertySpec};
use crate::record::ArticleRecord;

/// An opaque handle identifying one fetchable sub-resource.
///
/// Produced by [`SiteScraper::units`], consumed exactly once by
/// [`SiteScraper::scrape_unit`]. The payload shape is private to the
/// scraper that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkUnit(Value);

impl WorkUnit {
    /// Wraps a scraper-defined payload.
    pub fn new(payload: impl Into<Value>) -> Self {
        Self(payload.into())
    }

    /// Borrows the payload.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.0
    }

    /// Consumes the unit, returning the payload.
    #[must_use]
    pub fn into_payload(self) -> Value {
        self.0
    }
}

/// Contract for a concrete, site-specific scraper.
///
/// Implementations hold no pipeline state: `units` re-derives the unit
/// sequence from the resource on every call, and units share no mutable
/// state with each other.
#[async_trait]
pub trait SiteScraper: Send + Sync {
    /// Short name used for registry lookup and logging.
    fn name(&self) -> &str;

    /// Provenance identifier stamped onto every record this scraper
    /// produces. Declared explicitly; never derived by introspection.
    fn provenance(&self) -> &str;

    /// Declared defaults/required/expected fields for validation.
    ///
    /// `None` (the default) leaves property validation out of the
    /// postprocess chain entirely.
    fn property_spec(&self) -> Option<PropertySpec> {
        None
    }

    /// Derives the finite sequence of work units from the resource.
    ///
    /// # Errors
    ///
    /// A failure here is fatal to the run - without units there is
    /// nothing to iterate.
    async fn units(&self, client: &FetchClient) -> Result<Vec<WorkUnit>, PipelineError>;

    /// Scrapes a single unit into at most one record.
    ///
    /// `Ok(None)` means the unit yielded nothing (dropped silently).
    ///
    /// # Errors
    ///
    /// Errors are isolated by unit iteration and never abort the run.
    async fn scrape_unit(
        &self,
        client: &FetchClient,
        unit: WorkUnit,
    ) -> Result<Option<ArticleRecord>, PipelineError>;

    /// Authenticates against the resource before scraping starts.
    ///
    /// Must return `Ok(true)` on success; `Ok(false)` or an error aborts
    /// the whole run. The default implementation accepts without doing
    /// anything, for sites without a login wall.
    ///
    /// # Errors
    ///
    /// Implementations surface transport or protocol failures here.
    async fn login(
        &self,
        client: &FetchClient,
        username: &str,
        password: &str,
    ) -> Result<bool, PipelineError> {
        let _ = (client, username, password);
        Ok(true)
    }
}

impl std::fmt::Debug for dyn SiteScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteScraper")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_work_unit_round_trips_payload() {
        let unit = WorkUnit::new(json!({"url": "https://example.com/a"}));
        assert_eq!(unit.payload()["url"], "https://example.com/a");
        assert_eq!(unit.into_payload()["url"], "https://example.com/a");
    }
}
