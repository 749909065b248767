//! Reference scraper for JSON listing endpoints.
//!
//! Serves as the registry's reference implementation and exercises the
//! fetch client end to end without any site-specific markup knowledge.
//! The listing endpoint must answer with a JSON array; each element
//! becomes one work unit:
//!
//! - an object is taken as a ready-made record (fields pass through),
//! - a string is treated as an article URL: the page is fetched and a
//!   minimal record is built from its `<title>` element.

use async_trait::async_trait;
use scraper::Selector;
use serde_json::Value;
use tracing::debug;

use super::{SiteScraper, WorkUnit};
use crate::fetch::{Document, FetchClient};
use crate::pipeline::{PipelineError, PropertySpec};
use crate::record::ArticleRecord;

/// Scraper over a JSON listing of article entries.
pub struct JsonListingScraper {
    listing_url: String,
    provenance: String,
}

impl JsonListingScraper {
    /// Creates a scraper for `listing_url`, tagging records with
    /// `provenance`.
    pub fn new(listing_url: impl Into<String>, provenance: impl Into<String>) -> Self {
        Self {
            listing_url: listing_url.into(),
            provenance: provenance.into(),
        }
    }
}

#[async_trait]
impl SiteScraper for JsonListingScraper {
    fn name(&self) -> &str {
        "json-listing"
    }

    fn provenance(&self) -> &str {
        &self.provenance
    }

    fn property_spec(&self) -> Option<PropertySpec> {
        Some(PropertySpec::new().with_required("title").with_required("url"))
    }

    async fn units(&self, client: &FetchClient) -> Result<Vec<WorkUnit>, PipelineError> {
        let body = client.fetch_text(&self.listing_url).await?;
        let listing: Value = serde_json::from_str(&body).map_err(|error| {
            PipelineError::units(format!("listing at {} is not JSON: {error}", self.listing_url))
        })?;

        let Value::Array(entries) = listing else {
            return Err(PipelineError::units(format!(
                "listing at {} is not a JSON array",
                self.listing_url
            )));
        };

        debug!(count = entries.len(), url = %self.listing_url, "derived units from listing");
        Ok(entries.into_iter().map(WorkUnit::new).collect())
    }

    async fn scrape_unit(
        &self,
        client: &FetchClient,
        unit: WorkUnit,
    ) -> Result<Option<ArticleRecord>, PipelineError> {
        match unit.into_payload() {
            // Ready-made entry: fields pass through as a record.
            Value::Object(fields) => Ok(Some(ArticleRecord::from(fields))),

            // Bare URL: fetch the page and build a minimal record.
            Value::String(url) => {
                let document = client.fetch_document(&url).await?;
                let title = page_title(&document);

                let mut record = ArticleRecord::new();
                record.set("url", document.base_url().as_str());
                if let Some(title) = title {
                    record.set("title", title);
                }
                Ok(Some(record))
            }

            other => Err(PipelineError::scrape(format!(
                "listing entry is neither object nor URL string: {other}"
            ))),
        }
    }
}

fn page_title(document: &Document) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document
        .html()
        .select(&selector)
        .next()?
        .text()
        .collect::<String>();
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}
