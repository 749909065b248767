//! Run configuration resolved before the pipeline starts.
//!
//! [`RunOptions`] is built explicitly by the caller (the CLI, a test, an
//! embedding application) and handed to the orchestrator's constructor -
//! there is no implicit global argument parsing. Once a run begins the
//! options are never mutated.
//!
//! Missing or inconsistent options are a startup-time configuration
//! error, not a runtime one: [`RunOptions::validate`] runs in the
//! orchestrator's constructor, before any request is issued.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::pipeline::{DateRange, PipelineError};

/// Immutable configuration for one pipeline run.
#[derive(Clone)]
pub struct RunOptions {
    /// Target project identifier at the store.
    pub project: u64,
    /// Target articleset identifier at the store.
    pub articleset: u64,
    /// Store API host, e.g. `https://amcat.example.org`.
    pub api_host: String,
    /// Store API user.
    pub api_user: String,
    /// Store API password.
    pub api_password: String,
    /// Log per-unit failures with full detail instead of terse markers.
    pub log_errors: bool,
    /// Return the postprocessed batch without persisting.
    pub dry_run: bool,
    /// Lower inclusive date bound; activates date-range filtering
    /// together with `max_datetime`.
    pub min_datetime: Option<DateTime<Utc>>,
    /// Upper inclusive date bound.
    pub max_datetime: Option<DateTime<Utc>>,
    /// Site login username; activates the authentication gate together
    /// with `password`.
    pub username: Option<String>,
    /// Site login password.
    pub password: Option<String>,
}

impl RunOptions {
    /// Checks internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] when only one of the two date
    /// bounds is set, the bounds are reversed, or only one half of the
    /// login credentials is present.
    pub fn validate(&self) -> Result<(), PipelineError> {
        match (self.min_datetime, self.max_datetime) {
            (Some(min), Some(max)) => {
                // Constructing the range performs the min <= max check.
                DateRange::new(min, max)?;
            }
            (None, None) => {}
            _ => {
                return Err(PipelineError::config(
                    "min_datetime and max_datetime must be set together",
                ));
            }
        }

        if self.username.is_some() != self.password.is_some() {
            return Err(PipelineError::config(
                "username and password must be set together",
            ));
        }

        Ok(())
    }

    /// Returns the configured date window, when both bounds are set.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] on reversed bounds.
    pub fn date_range(&self) -> Result<Option<DateRange>, PipelineError> {
        match (self.min_datetime, self.max_datetime) {
            (Some(min), Some(max)) => Ok(Some(DateRange::new(min, max)?)),
            _ => Ok(None),
        }
    }

    /// Returns the login credentials, when both halves are set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) => Some((username, password)),
            _ => None,
        }
    }
}

// Manual Debug: passwords must never reach log output, and options are
// logged at debug level on startup.
impl fmt::Debug for RunOptions {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RunOptions")
            .field("project", &self.project)
            .field("articleset", &self.articleset)
            .field("api_host", &self.api_host)
            .field("api_user", &self.api_user)
            .field("api_password", &"<redacted>")
            .field("log_errors", &self.log_errors)
            .field("dry_run", &self.dry_run)
            .field("min_datetime", &self.min_datetime)
            .field("max_datetime", &self.max_datetime)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_options() -> RunOptions {
        RunOptions {
            project: 1,
            articleset: 2,
            api_host: "https://amcat.example.org".to_string(),
            api_user: "api".to_string(),
            api_password: "api-secret".to_string(),
            log_errors: false,
            dry_run: false,
            min_datetime: None,
            max_datetime: None,
            username: None,
            password: None,
        }
    }

    #[test]
    fn test_validate_accepts_minimal_options() {
        assert!(base_options().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_half_a_date_window() {
        let mut options = base_options();
        options.min_datetime = Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert!(matches!(
            options.validate(),
            Err(PipelineError::Config { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_half_a_credential_pair() {
        let mut options = base_options();
        options.password = Some("site-secret".to_string());
        assert!(matches!(
            options.validate(),
            Err(PipelineError::Config { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_reversed_date_bounds() {
        let mut options = base_options();
        options.min_datetime = Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
        options.max_datetime = Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert!(matches!(
            options.validate(),
            Err(PipelineError::Config { .. })
        ));
    }

    #[test]
    fn test_debug_output_redacts_passwords() {
        let mut options = base_options();
        options.password = Some("site-secret".to_string());
        let debug = format!("{options:?}");
        assert!(!debug.contains("api-secret"));
        assert!(!debug.contains("site-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
