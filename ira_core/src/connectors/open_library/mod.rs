use crate::config::ResearchConfig;
use crate::connectors::{SourceAdapter, RESULT_LIMIT};
use crate::error::SourceError;
use crate::http::{HttpFetch, SourceRequest};
use crate::types::{Source, UnifiedResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

const SEARCH_PATH: &str = "search.json";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    docs: Vec<Doc>,
}

#[derive(Debug, Deserialize)]
struct Doc {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author_name: Vec<String>,
    #[serde(default)]
    first_publish_year: Option<i32>,
    /// Site-relative path such as `/works/OL45804W`.
    #[serde(default)]
    key: Option<String>,
}

/// Book search on the Open Library catalog.
pub struct OpenLibraryAdapter {
    base: String,
    fetcher: Arc<dyn HttpFetch>,
}

impl OpenLibraryAdapter {
    pub fn new(config: &ResearchConfig, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            base: config.endpoints.open_library.clone(),
            fetcher,
        }
    }

    fn base_url(&self) -> Result<Url, SourceError> {
        // A trailing slash makes `join` append rather than replace the last segment.
        let mut base = Url::parse(&self.base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base)
    }

    fn to_result(base: &Url, doc: Doc) -> UnifiedResult {
        let summary = match doc.first_publish_year {
            Some(year) => format!("Published in {}", year),
            None => "Publication year unknown".to_string(),
        };
        let link = doc
            .key
            .as_deref()
            .map(|key| key.trim().trim_start_matches('/'))
            .filter(|key| !key.is_empty())
            // Keys are site-relative; keep any path prefix on the base.
            .and_then(|key| base.join(key).ok())
            .map(String::from);

        UnifiedResult::new(Source::LibraryCatalog, doc.title, summary)
            .with_authors(doc.author_name)
            .with_year(doc.first_publish_year)
            .with_link(link)
    }
}

#[async_trait]
impl SourceAdapter for OpenLibraryAdapter {
    fn source(&self) -> Source {
        Source::LibraryCatalog
    }

    fn build_request(&self, query: &str) -> Result<SourceRequest, SourceError> {
        let mut url = self.base_url()?.join(SEARCH_PATH)?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &RESULT_LIMIT.to_string());
        Ok(SourceRequest::get(url))
    }

    fn parse(&self, body: &str) -> Result<Vec<UnifiedResult>, SourceError> {
        let response: SearchResponse = serde_json::from_str(body)?;
        let base = self.base_url()?;
        Ok(response
            .docs
            .into_iter()
            .map(|doc| Self::to_result(&base, doc))
            .collect())
    }

    fn fetcher(&self) -> &dyn HttpFetch {
        self.fetcher.as_ref()
    }
}
