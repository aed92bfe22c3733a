//! HttpFetcher - reqwest-backed fetcher

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::config::FetchConfig;

use super::{FetchError, Fetcher};

/// Fetches over HTTP(S), resolving relative URLs against an optional base
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl HttpFetcher {
    /// Create a fetcher from the fetch section of the tool configuration
    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        debug!(?config, "HttpFetcher::from_config: called");
        let base_url = match &config.base_url {
            Some(base) => Some(Url::parse(base).map_err(|e| FetchError::InvalidUrl {
                url: base.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, base_url })
    }

    /// Resolve `url` against the base URL (absolute URLs are kept as-is)
    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        debug!(%url, "HttpFetcher::resolve: called");
        let resolved = match &self.base_url {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        resolved.map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        debug!(%url, "HttpFetcher::fetch_text: called");
        let resolved = self.resolve(url)?;

        let response = self
            .client
            .get(resolved.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: resolved.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "HttpFetcher::fetch_text: HTTP error status");
            return Err(FetchError::Status {
                url: resolved.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Request {
            url: resolved.to_string(),
            source,
        })?;
        debug!(body_len = body.len(), "HttpFetcher::fetch_text: response body read");
        Ok(body)
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher").field("base_url", &self.base_url).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(base_url: Option<&str>) -> HttpFetcher {
        let config = FetchConfig {
            base_url: base_url.map(str::to_string),
            ..Default::default()
        };
        HttpFetcher::from_config(&config).unwrap()
    }

    #[test]
    fn test_resolve_relative_against_base() {
        let fetcher = fetcher(Some("https://example.com/site/index.html"));
        let url = fetcher.resolve("widget/conf.json").unwrap();
        assert_eq!(url.as_str(), "https://example.com/site/widget/conf.json");
    }

    #[test]
    fn test_resolve_absolute_ignores_base() {
        let fetcher = fetcher(Some("https://example.com/"));
        let url = fetcher.resolve("https://cdn.example.org/conf.json").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.org/conf.json");
    }

    #[test]
    fn test_resolve_relative_without_base_fails() {
        let fetcher = fetcher(None);
        let err = fetcher.resolve("conf.json").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = FetchConfig {
            base_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(HttpFetcher::from_config(&config).is_err());
    }

    #[test]
    fn test_unusable_user_agent_is_client_error() {
        let config = FetchConfig {
            user_agent: "widgetboot\nbroken".to_string(),
            ..Default::default()
        };
        let err = HttpFetcher::from_config(&config).err().unwrap();
        assert!(matches!(err, FetchError::Client(_)));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_does_not_send() {
        let fetcher = fetcher(None);
        let err = fetcher.fetch_text("relative/only.json").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert_eq!(err.status(), None);
    }
}
