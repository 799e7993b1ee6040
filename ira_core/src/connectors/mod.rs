//! One adapter per upstream source.
//!
//! Each adapter owns its raw response types and a pure mapping into
//! [`UnifiedResult`]. The provided [`SourceAdapter::search`] method is where
//! failures are logged and turned into an empty contribution.

use crate::config::ResearchConfig;
use crate::error::SourceError;
use crate::http::{HttpFetch, SourceRequest};
use crate::types::{Source, UnifiedResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

pub mod arxiv;
pub mod crossref;
pub mod open_library;
pub mod semantic_scholar;
pub mod wikipedia;

/// Upper bound requested from every source that takes a limit parameter.
pub const RESULT_LIMIT: u32 = 5;

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;

    /// Build the outbound request for `query`. Pure; no I/O.
    fn build_request(&self, query: &str) -> Result<SourceRequest, SourceError>;

    /// Map a success body into unified results. Pure; no I/O.
    fn parse(&self, body: &str) -> Result<Vec<UnifiedResult>, SourceError>;

    fn fetcher(&self) -> &dyn HttpFetch;

    /// One round-trip with the failure kept, for callers that want to tell
    /// an unreachable source from one that returned garbage.
    async fn try_search(&self, query: &str) -> Result<Vec<UnifiedResult>, SourceError> {
        let request = self.build_request(query)?;
        debug!(source = self.source().slug(), url = %request.url, "dispatching request");
        let body = self.fetcher().fetch(&request).await?;
        self.parse(&body)
    }

    /// Never fails: any error is logged and yields no results.
    async fn search(&self, query: &str) -> Vec<UnifiedResult> {
        let source = self.source();
        match self.try_search(query).await {
            Ok(results) => {
                debug!(source = source.slug(), count = results.len(), "source returned results");
                results
            }
            Err(err) => {
                warn!(
                    source = source.slug(),
                    code = err.code_str(),
                    error = %err,
                    "source query failed"
                );
                Vec::new()
            }
        }
    }
}

/// The five adapters in output order.
pub fn default_adapters(
    config: &ResearchConfig,
    fetcher: Arc<dyn HttpFetch>,
) -> Vec<Arc<dyn SourceAdapter>> {
    vec![
        Arc::new(wikipedia::WikipediaAdapter::new(config, Arc::clone(&fetcher))),
        Arc::new(crossref::CrossrefAdapter::new(config, Arc::clone(&fetcher))),
        Arc::new(arxiv::ArxivAdapter::new(config, Arc::clone(&fetcher))),
        Arc::new(semantic_scholar::SemanticScholarAdapter::new(
            config,
            Arc::clone(&fetcher),
        )),
        Arc::new(open_library::OpenLibraryAdapter::new(config, fetcher)),
    ]
}

/// Collapse runs of whitespace, including the line breaks feeds wrap text with.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Fetcher for pure unit tests; any call is a test bug.
    pub struct NoFetch;

    #[async_trait]
    impl HttpFetch for NoFetch {
        async fn fetch(&self, request: &SourceRequest) -> Result<String, SourceError> {
            Err(SourceError::Transport(format!(
                "unexpected fetch of {}",
                request.url
            )))
        }
    }

    /// Fetcher that always answers with the same outcome.
    pub struct FixedFetch(pub Result<String, u16>);

    #[async_trait]
    impl HttpFetch for FixedFetch {
        async fn fetch(&self, _request: &SourceRequest) -> Result<String, SourceError> {
            match &self.0 {
                Ok(body) => Ok(body.clone()),
                Err(status) => Err(SourceError::Status {
                    status: *status,
                    body: String::new(),
                }),
            }
        }
    }

    pub fn no_fetch() -> Arc<dyn HttpFetch> {
        Arc::new(NoFetch)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::FixedFetch;
    use super::*;

    #[test]
    fn default_adapters_follow_source_order() {
        let adapters = default_adapters(&ResearchConfig::default(), test_support::no_fetch());
        let sources: Vec<Source> = adapters.iter().map(|a| a.source()).collect();
        assert_eq!(sources, Source::ALL.to_vec());
    }

    #[test]
    fn collapses_feed_whitespace() {
        assert_eq!(
            collapse_whitespace("  Deep\n  Residual\tLearning  "),
            "Deep Residual Learning"
        );
    }

    #[tokio::test]
    async fn search_swallows_status_errors() {
        let adapter = crossref::CrossrefAdapter::new(
            &ResearchConfig::default(),
            Arc::new(FixedFetch(Err(500))),
        );
        assert!(adapter.search("graphs").await.is_empty());

        let err = adapter.try_search("graphs").await.unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn search_swallows_malformed_bodies() {
        let adapter = crossref::CrossrefAdapter::new(
            &ResearchConfig::default(),
            Arc::new(FixedFetch(Ok("<html>not json</html>".to_string()))),
        );
        assert!(adapter.search("graphs").await.is_empty());

        let err = adapter.try_search("graphs").await.unwrap_err();
        assert_eq!(err.code_str(), "parse_error");
    }
}
