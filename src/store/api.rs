//! Thin HTTP client for the remote article store API.
//!
//! Posts article batches as JSON to the store's REST endpoint with basic
//! auth. Deliberately minimal: no retry (the caller decides what a failed
//! batch means) and no response interpretation beyond decoding the
//! per-record identifier list.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::{ArticleStore, StoreError, StoredArticle};
use crate::record::ArticleRecord;

const STORE_TIMEOUT_SECS: u64 = 120;

/// HTTP implementation of [`ArticleStore`].
#[derive(Debug, Clone)]
pub struct ApiStore {
    host: String,
    user: String,
    password: String,
    client: Client,
}

impl ApiStore {
    /// Creates a store client for the given API host and credentials.
    ///
    /// The host is taken with or without a trailing slash.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(STORE_TIMEOUT_SECS))
            .build()
            .expect("failed to build store HTTP client");

        Self {
            host: host.into().trim_end_matches('/').to_string(),
            user: user.into(),
            password: password.into(),
            client,
        }
    }

    fn articles_url(&self, project: u64, articleset: u64) -> String {
        format!(
            "{}/api/v4/projects/{project}/articlesets/{articleset}/articles/",
            self.host
        )
    }
}

#[async_trait]
impl ArticleStore for ApiStore {
    #[instrument(skip(self, articles), fields(batch = articles.len()))]
    async fn create_articles(
        &self,
        project: u64,
        articleset: u64,
        articles: &[ArticleRecord],
    ) -> Result<Vec<StoredArticle>, StoreError> {
        let url = self.articles_url(project, articleset);
        debug!(url = %url, "posting article batch");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.user, Some(&self.password))
            .json(articles)
            .send()
            .await
            .map_err(|source| StoreError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<StoredArticle>>()
            .await
            .map_err(|source| StoreError::Decode { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_articles_url_normalizes_trailing_slash() {
        let with_slash = ApiStore::new("https://amcat.example.org/", "u", "p");
        let without = ApiStore::new("https://amcat.example.org", "u", "p");

        let expected = "https://amcat.example.org/api/v4/projects/7/articlesets/42/articles/";
        assert_eq!(with_slash.articles_url(7, 42), expected);
        assert_eq!(without.articles_url(7, 42), expected);
    }
}
