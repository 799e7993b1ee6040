use crate::config::ResearchConfig;
use crate::connectors::SourceAdapter;
use crate::error::SourceError;
use crate::http::{HttpFetch, SourceRequest};
use crate::types::{Source, UnifiedResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

// Structs for deserializing the MediaWiki `action=query` response.
// The page map is also accepted at the top level.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
    #[serde(default)]
    pages: Option<BTreeMap<i64, Page>>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    // Keyed by numeric page id, so iteration follows id order.
    // Negative ids mark titles that do not exist.
    #[serde(default)]
    pages: BTreeMap<i64, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: Option<String>,
    #[serde(default)]
    invalid: Option<String>,
}

/// Exact-title page lookup returning the intro extract as plain text.
pub struct WikipediaAdapter {
    endpoint: String,
    fetcher: Arc<dyn HttpFetch>,
}

impl WikipediaAdapter {
    pub fn new(config: &ResearchConfig, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            endpoint: config.endpoints.wikipedia.clone(),
            fetcher,
        }
    }

    fn to_result(page: Page) -> UnifiedResult {
        UnifiedResult::new(
            Source::Encyclopedia,
            page.title,
            page.extract.unwrap_or_default(),
        )
    }
}

#[async_trait]
impl SourceAdapter for WikipediaAdapter {
    fn source(&self) -> Source {
        Source::Encyclopedia
    }

    fn build_request(&self, query: &str) -> Result<SourceRequest, SourceError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("action", "query")
            .append_pair("format", "json")
            .append_pair("prop", "extracts")
            .append_pair("exintro", "1")
            .append_pair("explaintext", "1")
            .append_pair("titles", query);
        Ok(SourceRequest::get(url))
    }

    fn parse(&self, body: &str) -> Result<Vec<UnifiedResult>, SourceError> {
        let response: QueryResponse = serde_json::from_str(body)?;
        let pages = match (response.query, response.pages) {
            (Some(query), _) => query.pages,
            (None, Some(pages)) => pages,
            (None, None) => {
                return Err(SourceError::Json(serde::de::Error::missing_field("query")));
            }
        };

        Ok(pages
            .into_values()
            .filter(|page| page.missing.is_none() && page.invalid.is_none())
            .map(Self::to_result)
            .collect())
    }

    fn fetcher(&self) -> &dyn HttpFetch {
        self.fetcher.as_ref()
    }
}
