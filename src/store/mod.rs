//! Persistence boundary for scraped article batches.
//!
//! The pipeline hands a finished batch to an [`ArticleStore`] and inspects
//! the per-record response: each [`StoredArticle`] either carries the
//! backend-assigned identifier or an empty slot marking a per-record
//! failure. A failure of the batch call *itself* (network, HTTP status,
//! undecodable response) is a [`StoreError`] and is handled separately from
//! missing identifiers.
//!
//! [`ApiStore`] is the thin HTTP implementation of this boundary; tests use
//! in-memory doubles.

mod api;

pub use api::ApiStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::record::ArticleRecord;

/// One response record from a batch create call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredArticle {
    /// Backend-assigned identifier; `None` means this record was rejected.
    pub id: Option<u64>,
    /// Remaining response fields, passed through untouched.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Errors from the persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The batch request itself failed at the transport level.
    #[error("store request to {url} failed: {source}")]
    Http {
        /// The endpoint that was called.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("store returned HTTP {status} for {url}")]
    Status {
        /// The endpoint that was called.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded as a list of stored articles.
    #[error("store response could not be decoded: {source}")]
    Decode {
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },
}

/// Batch-accepting storage backend.
///
/// Implementations persist a batch of records against a project/articleset
/// pair and answer with one [`StoredArticle`] per input record, in input
/// order.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Persists the batch, returning per-record outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the batch call itself fails; per-record
    /// rejections are reported through empty `id` slots instead.
    async fn create_articles(
        &self,
        project: u64,
        articleset: u64,
        articles: &[ArticleRecord],
    ) -> Result<Vec<StoredArticle>, StoreError>;
}
