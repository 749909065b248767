//! Resilient HTTP fetch client.
//!
//! This module wraps a [`reqwest::Client`] with the failure handling the
//! pipeline relies on:
//!
//! - a fixed pacing delay before every request (including retries),
//! - bounded retry on *any* transport error with a fixed backoff,
//! - strict redirect resolution that fails loudly on anything but 302,
//! - body decoding with a configured charset and HTML tree parsing.
//!
//! # Retry semantics
//!
//! [`FetchClient::fetch_raw`] retries unconditionally: it does not
//! distinguish retryable from permanent transport failures. That is a
//! deliberate, documented sharp edge kept for behavioral compatibility with
//! the scrapers built on top of it - a DNS typo burns the full retry budget
//! just like a flaky connection does. HTTP error *statuses* are never
//! retried; they surface from [`FetchClient::fetch_text`] as typed errors.
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::fetch::{FetchClient, FetchConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FetchClient::new(FetchConfig::default());
//! let document = client.fetch_document("https://example.com/section/news").await?;
//! let target = client.resolve_redirect("https://example.com/latest").await?;
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::FetchError;

use std::sync::Arc;
use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::cookie::Jar;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use scraper::Html;
use tracing::{debug, instrument, warn};
use url::Url;

/// Default retry budget for a single fetch (attempts, not re-attempts).
pub const DEFAULT_RETRIES: u32 = 3;

/// Fixed backoff slept after a failed attempt.
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Browser User-Agent sent with every request.
///
/// Several target sites serve different (or no) markup to obvious bots, so
/// the client identifies as a desktop browser by default.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; rv:128.0) Gecko/20100101 Firefox/128.0";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User-Agent header for all requests.
    pub user_agent: String,
    /// Fixed delay slept before every request, retries included.
    pub pace_delay: Duration,
    /// Fixed delay slept after a failed attempt before the next one.
    pub retry_backoff: Duration,
    /// Retry budget used by `fetch_text`/`fetch_document`.
    pub retries: u32,
    /// Charset label used to decode response bodies (default `utf-8`).
    pub encoding: String,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Full-request read timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pace_delay: Duration::ZERO,
            retry_backoff: RETRY_BACKOFF,
            retries: DEFAULT_RETRIES,
            encoding: "utf-8".to_string(),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
        }
    }
}

/// A parsed HTML document tagged with the URL it was fetched from.
///
/// The base URL makes relative links resolvable without dragging the fetch
/// client into extraction code.
#[derive(Debug)]
pub struct Document {
    html: Html,
    base_url: Url,
}

impl Document {
    /// Borrows the parsed HTML tree.
    #[must_use]
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Returns the URL this document was fetched from.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a possibly-relative href against the document's own URL.
    #[must_use]
    pub fn resolve_link(&self, href: &str) -> Option<Url> {
        self.base_url.join(href).ok()
    }

    #[cfg(test)]
    pub(crate) fn for_tests(html: Html, base_url: Url) -> Self {
        Self { html, base_url }
    }
}

/// HTTP client with pacing, bounded retry and strict redirect resolution.
///
/// One instance owns the connection pool and cookie jar for a whole run;
/// cookies set during `login` are attached to every later fetch.
#[derive(Debug, Clone)]
pub struct FetchClient {
    /// Client with automatic redirect following (content fetches).
    client: Client,
    /// Client with redirects disabled (`resolve_redirect` only).
    bare_client: Client,
    config: FetchConfig,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl FetchClient {
    /// Creates a fetch client from the given configuration.
    ///
    /// Both internal clients (redirecting and non-redirecting) share one
    /// cookie jar so sessions established by a login survive redirect
    /// probing and content fetches alike.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the supplied
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(config: FetchConfig) -> Self {
        let jar = Arc::new(Jar::default());

        let client = build_client(&config, Arc::clone(&jar), None)
            .expect("failed to build redirecting HTTP client");
        let bare_client = build_client(&config, jar, Some(Policy::none()))
            .expect("failed to build non-redirecting HTTP client");

        Self {
            client,
            bare_client,
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches the raw response body, retrying on any transport error.
    ///
    /// Sleeps the pacing delay before each attempt. On failure the remaining
    /// budget is decremented, the fixed backoff is slept, and the request is
    /// reissued; once the budget is exhausted the last error propagates.
    /// A `retries` of 0 is treated as 1 (at least one attempt is made).
    ///
    /// The response status is *not* inspected here - error pages come back
    /// as bytes, exactly like success pages. Use [`Self::fetch_text`] for a
    /// status-checked fetch.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] once all attempts have failed.
    pub async fn fetch_raw(&self, url: &str, retries: u32) -> Result<Vec<u8>, FetchError> {
        let (_, body) = self.request_with_retry(url, retries).await?;
        Ok(body)
    }

    /// Fetches a URL and decodes the body with the configured charset.
    ///
    /// Retry behavior is inherited from [`Self::fetch_raw`] with the
    /// configured budget; the HTTP status itself is never retried.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] after exhausted retries and
    /// [`FetchError::HttpStatus`] on a non-2xx response.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let (status, body) = self.request_with_retry(url, self.config.retries).await?;
        if !status.is_success() {
            return Err(FetchError::http_status(url.trim(), status.as_u16()));
        }
        Ok(self.decode(&body))
    }

    /// Fetches a URL and parses the body into an HTML tree tagged with its
    /// source URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] when the URL does not parse, plus
    /// everything [`Self::fetch_text`] can return.
    pub async fn fetch_document(&self, url: &str) -> Result<Document, FetchError> {
        let base_url =
            Url::parse(url.trim()).map_err(|_| FetchError::invalid_url(url.trim()))?;
        let text = self.fetch_text(url).await?;
        Ok(Document {
            html: Html::parse_document(&text),
            base_url,
        })
    }

    /// Resolves a URL that is expected to answer with exactly one 302.
    ///
    /// Redirect following is disabled and no retry is attempted. A 302
    /// yields the `Location` header value; any other status is a hard
    /// [`FetchError::UnexpectedRedirect`] carrying the observed code, so
    /// callers can tell "no redirect issued" apart from transport trouble.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] on a network failure,
    /// [`FetchError::UnexpectedRedirect`] for any status other than 302 and
    /// [`FetchError::MissingLocation`] when the 302 carries no target.
    #[instrument(skip(self))]
    pub async fn resolve_redirect(&self, url: &str) -> Result<String, FetchError> {
        let url = url.trim();
        self.pace().await;

        let response = self
            .bare_client
            .get(url)
            .send()
            .await
            .map_err(|error| FetchError::transport(url, error))?;

        let status = response.status();
        if status != StatusCode::FOUND {
            return Err(FetchError::unexpected_redirect(url, status.as_u16()));
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| FetchError::missing_location(url))
    }

    /// Issues a GET with pacing and unconditional bounded retry, returning
    /// status and body. Reading the body counts as part of the attempt.
    async fn request_with_retry(
        &self,
        url: &str,
        retries: u32,
    ) -> Result<(StatusCode, Vec<u8>), FetchError> {
        let url = url.trim();
        let mut remaining = retries.max(1);

        loop {
            self.pace().await;

            match self.attempt(url).await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    remaining -= 1;
                    if remaining == 0 {
                        return Err(FetchError::transport(url, error));
                    }
                    warn!(
                        url,
                        remaining,
                        error = %error,
                        "fetch attempt failed; backing off"
                    );
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<(StatusCode, Vec<u8>), reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(url, status = status.as_u16(), bytes = body.len(), "fetched");
        Ok((status, body.to_vec()))
    }

    async fn pace(&self) {
        if !self.config.pace_delay.is_zero() {
            tokio::time::sleep(self.config.pace_delay).await;
        }
    }

    /// Decodes bytes using the configured charset label, falling back to
    /// UTF-8 when the label is unknown. Undecodable sequences are replaced,
    /// never fatal.
    fn decode(&self, body: &[u8]) -> String {
        let encoding =
            Encoding::for_label(self.config.encoding.as_bytes()).unwrap_or(UTF_8);
        let (text, _, _) = encoding.decode(body);
        text.into_owned()
    }
}

fn build_client(
    config: &FetchConfig,
    jar: Arc<Jar>,
    redirect: Option<Policy>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.read_timeout_secs))
        .cookie_provider(jar)
        .gzip(true);

    if let Some(policy) = redirect {
        builder = builder.redirect(policy);
    }

    builder.build()
}
