//! Error types for the fetch module.
//!
//! Every failure mode of the fetch client is typed so callers can
//! distinguish transport failures (already retried), protocol expectation
//! failures (never retried) and redirect-resolution failures (status code
//! attached for inspection).

use thiserror::Error;

/// Errors that can occur while fetching a remote resource.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error surfaced after the retry budget is exhausted
    /// (DNS resolution, connection refused, TLS errors, timeouts, body
    /// read failures).
    #[error("network error fetching {url}: {source}")]
    Transport {
        /// The URL that failed to fetch.
        url: String,
        /// The underlying network error from the last attempt.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response (anything outside 2xx) on a content fetch.
    /// Not retried; retry already happened at the transport level.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Redirect resolution observed a status other than 302.
    ///
    /// Carries the observed status so callers can special-case
    /// "no redirect issued" (e.g. a 200 or 404 on a redirect endpoint).
    #[error("expected 302 redirect from {url}, got HTTP {status}")]
    UnexpectedRedirect {
        /// The URL that was expected to redirect.
        url: String,
        /// The status code actually observed.
        status: u16,
    },

    /// A 302 response without a Location header (or one that is not
    /// valid UTF-8).
    #[error("302 response from {url} carried no usable Location header")]
    MissingLocation {
        /// The URL that redirected without a target.
        url: String,
    },

    /// The provided URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl FetchError {
    /// Creates a transport error from the last failed attempt.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an unexpected-redirect error carrying the observed status.
    pub fn unexpected_redirect(url: impl Into<String>, status: u16) -> Self {
        Self::UnexpectedRedirect {
            url: url.into(),
            status,
        }
    }

    /// Creates a missing-Location error.
    pub fn missing_location(url: impl Into<String>) -> Self {
        Self::MissingLocation { url: url.into() }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns the redirect status code when this is an
    /// [`FetchError::UnexpectedRedirect`].
    #[must_use]
    pub fn redirect_status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedRedirect { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_contain_context() {
        let error = FetchError::http_status("https://example.com/a", 503);
        assert!(error.to_string().contains("503"));
        assert!(error.to_string().contains("https://example.com/a"));

        let error = FetchError::unexpected_redirect("https://example.com/r", 404);
        assert!(error.to_string().contains("expected 302"));
        assert!(error.to_string().contains("404"));
    }

    #[test]
    fn test_redirect_status_only_on_unexpected_redirect() {
        assert_eq!(
            FetchError::unexpected_redirect("u", 301).redirect_status(),
            Some(301)
        );
        assert_eq!(FetchError::http_status("u", 301).redirect_status(), None);
        assert_eq!(FetchError::invalid_url("u").redirect_status(), None);
    }
}
