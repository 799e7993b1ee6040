//! The single network boundary used by every adapter.
//!
//! Adapters describe a request as a [`SourceRequest`] and hand it to an
//! [`HttpFetch`] implementation. Parsing never sees the transport, so a
//! deadline or cancellation wrapper can be layered on here alone.

use crate::config::ResearchConfig;
use crate::error::SourceError;
use async_trait::async_trait;
use url::Url;

/// Longest error body kept in [`SourceError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// A GET request against one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
}

impl SourceRequest {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Value of a query parameter after decoding.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

/// Performs one round-trip and returns the response body.
///
/// Implementations must map non-success statuses to [`SourceError::Status`].
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch(&self, request: &SourceRequest) -> Result<String, SourceError>;
}

/// [`HttpFetch`] over a shared `reqwest` client.
///
/// No request timeout is configured: a source that never answers holds up
/// the whole aggregation.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(config: &ResearchConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn fetch(&self, request: &SourceRequest) -> Result<String, SourceError> {
        let mut builder = self.client.get(request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(response.text().await?)
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY {
        trimmed.to_string()
    } else {
        let truncated: String = trimmed.chars().take(MAX_ERROR_BODY).collect();
        format!("{}...", truncated)
    }
}
