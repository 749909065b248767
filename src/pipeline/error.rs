//! Error types for pipeline stages and the orchestrator.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::fetch::FetchError;
use crate::store::StoreError;

/// Errors raised by pipeline stages and the run orchestrator.
///
/// Severity varies by variant: `Scrape` is isolated at the unit-iteration
/// boundary and never aborts a run, everything else is fatal to the run
/// that raises it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Run configuration is inconsistent or incomplete (startup-time error).
    #[error("configuration error: {message}")]
    Config {
        /// What is wrong with the configuration.
        message: String,
    },

    /// Login failed or reported false; the run aborts before any unit is
    /// processed. Never carries credentials.
    #[error("login failed for scraper {scraper}")]
    Login {
        /// Name of the scraper whose login failed.
        scraper: String,
    },

    /// A single unit failed to scrape. Isolated by unit iteration; the run
    /// continues with the next unit.
    #[error("unit scrape failed: {message}")]
    Scrape {
        /// Description of the per-unit failure.
        message: String,
    },

    /// Deriving the unit sequence from the resource failed. Fatal - with
    /// no units there is nothing to iterate.
    #[error("unit enumeration failed: {message}")]
    Units {
        /// Description of the enumeration failure.
        message: String,
    },

    /// A record reached date-range filtering without a parsable `date`.
    #[error("record from {provenance} has no parsable date field")]
    MissingDate {
        /// Provenance of the offending record.
        provenance: String,
    },

    /// A record's date lies outside the configured window. This is a
    /// programming-contract failure of the concrete scraper, not a
    /// filtering decision.
    #[error("record date {date} outside configured range [{min}, {max}]")]
    DateOutOfRange {
        /// The offending record date.
        date: DateTime<Utc>,
        /// Lower inclusive bound.
        min: DateTime<Utc>,
        /// Upper inclusive bound.
        max: DateTime<Utc>,
    },

    /// A required field is missing from at least one record.
    #[error("required field '{field}' missing in at least one record")]
    MissingRequired {
        /// Name of the missing field.
        field: String,
    },

    /// An expected field is missing from every record of a non-empty batch.
    #[error("expected field '{field}' missing in all records")]
    MissingExpected {
        /// Name of the missing field.
        field: String,
    },

    /// The store accepted the batch call but assigned no identifiers at all.
    #[error("none of the {total} articles were saved")]
    NothingSaved {
        /// Size of the rejected batch.
        total: usize,
    },

    /// Fetch-layer failure surfaced through a pipeline stage.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The batch persistence call itself failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a per-unit scrape error.
    pub fn scrape(message: impl Into<String>) -> Self {
        Self::Scrape {
            message: message.into(),
        }
    }

    /// Creates a unit-enumeration error.
    pub fn units(message: impl Into<String>) -> Self {
        Self::Units {
            message: message.into(),
        }
    }

    /// Creates a login failure for the named scraper.
    pub fn login(scraper: impl Into<String>) -> Self {
        Self::Login {
            scraper: scraper.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_name_the_field() {
        let error = PipelineError::MissingRequired {
            field: "title".to_string(),
        };
        assert!(error.to_string().contains("title"));

        let error = PipelineError::MissingExpected {
            field: "author".to_string(),
        };
        assert!(error.to_string().contains("author"));
    }

    #[test]
    fn test_login_error_carries_no_credentials() {
        let error = PipelineError::login("paywall-daily");
        let message = error.to_string();
        assert!(message.contains("paywall-daily"));
        assert!(!message.to_lowercase().contains("password"));
    }
}
