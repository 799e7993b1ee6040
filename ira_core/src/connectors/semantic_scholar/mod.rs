use crate::config::ResearchConfig;
use crate::connectors::{SourceAdapter, RESULT_LIMIT};
use crate::error::SourceError;
use crate::http::{HttpFetch, SourceRequest};
use crate::types::{Source, UnifiedResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

/// Header carrying the optional API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Fields requested from the paper search endpoint.
const FIELDS: &str = "title,abstract,authors,year,url";

// `data` is present even when `total` is 0; its absence means an error body.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(alias = "papers")]
    data: Vec<Paper>,
}

#[derive(Debug, Deserialize)]
struct Paper {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    authors: Vec<AuthorRef>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    url: Option<String>,
}

/// The Graph API returns `{authorId, name}` objects; plain names are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthorRef {
    Name(String),
    Record { name: Option<String> },
}

impl AuthorRef {
    fn into_name(self) -> Option<String> {
        let name = match self {
            AuthorRef::Name(name) => name,
            AuthorRef::Record { name } => name?,
        };
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

/// Paper search on the Semantic Scholar academic graph.
pub struct SemanticScholarAdapter {
    endpoint: String,
    api_key: Option<String>,
    fetcher: Arc<dyn HttpFetch>,
}

impl SemanticScholarAdapter {
    pub fn new(config: &ResearchConfig, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            endpoint: config.endpoints.semantic_scholar.clone(),
            api_key: config.semantic_scholar_api_key().map(String::from),
            fetcher,
        }
    }

    fn to_result(paper: Paper) -> UnifiedResult {
        UnifiedResult::new(
            Source::AcademicGraph,
            paper.title.unwrap_or_default(),
            paper.abstract_text.unwrap_or_default(),
        )
        .with_authors(paper.authors.into_iter().filter_map(AuthorRef::into_name))
        .with_year(paper.year)
        .with_link(paper.url.filter(|u| !u.trim().is_empty()))
    }
}

#[async_trait]
impl SourceAdapter for SemanticScholarAdapter {
    fn source(&self) -> Source {
        Source::AcademicGraph
    }

    fn build_request(&self, query: &str) -> Result<SourceRequest, SourceError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("limit", &RESULT_LIMIT.to_string())
            .append_pair("fields", FIELDS);

        let request = SourceRequest::get(url);
        Ok(match &self.api_key {
            Some(key) => request.with_header(API_KEY_HEADER, key.clone()),
            None => request,
        })
    }

    fn parse(&self, body: &str) -> Result<Vec<UnifiedResult>, SourceError> {
        let response: SearchResponse = serde_json::from_str(body)?;
        Ok(response.data.into_iter().map(Self::to_result).collect())
    }

    fn fetcher(&self) -> &dyn HttpFetch {
        self.fetcher.as_ref()
    }
}
