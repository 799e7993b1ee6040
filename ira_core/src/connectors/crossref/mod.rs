use crate::config::ResearchConfig;
use crate::connectors::{SourceAdapter, RESULT_LIMIT};
use crate::error::SourceError;
use crate::http::{HttpFetch, SourceRequest};
use crate::types::{Source, UnifiedResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

/// DOIs are resolved through this prefix to produce a link.
pub const DOI_RESOLVER: &str = "https://doi.org/";

// Structs for deserializing the `/works` response.
// The API wraps items in `message`; a bare `items` list is accepted too.
#[derive(Debug, Deserialize)]
struct WorksResponse {
    #[serde(default)]
    message: Option<WorksMessage>,
    #[serde(default)]
    items: Option<Vec<Work>>,
}

#[derive(Debug, Deserialize)]
struct WorksMessage {
    #[serde(default)]
    items: Vec<Work>,
}

#[derive(Debug, Deserialize)]
struct Work {
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    author: Vec<Contributor>,
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
    #[serde(default)]
    issued: Option<PartialDate>,
}

#[derive(Debug, Deserialize)]
struct Contributor {
    #[serde(default)]
    given: Option<String>,
    #[serde(default)]
    family: Option<String>,
    // Organizational authors carry a single `name`.
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PartialDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl Contributor {
    fn full_name(&self) -> Option<String> {
        let joined = [self.given.as_deref(), self.family.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !joined.is_empty() {
            return Some(joined);
        }
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}

impl PartialDate {
    fn year(&self) -> Option<i32> {
        self.date_parts.first()?.first().copied().flatten()
    }
}

/// Keyword search over the CrossRef works index.
pub struct CrossrefAdapter {
    endpoint: String,
    fetcher: Arc<dyn HttpFetch>,
}

impl CrossrefAdapter {
    pub fn new(config: &ResearchConfig, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            endpoint: config.endpoints.crossref.clone(),
            fetcher,
        }
    }

    fn to_result(work: Work) -> UnifiedResult {
        let authors: Vec<String> = work.author.iter().filter_map(Contributor::full_name).collect();
        let summary = if authors.is_empty() {
            "Published work".to_string()
        } else {
            format!("Published work by {}", authors.join(", "))
        };
        let title = work.title.into_iter().next().unwrap_or_default();
        let link = work
            .doi
            .filter(|doi| !doi.trim().is_empty())
            .map(|doi| format!("{}{}", DOI_RESOLVER, doi.trim()));

        UnifiedResult::new(Source::CitationIndex, title, summary)
            .with_authors(authors)
            .with_year(work.issued.as_ref().and_then(PartialDate::year))
            .with_link(link)
    }
}

#[async_trait]
impl SourceAdapter for CrossrefAdapter {
    fn source(&self) -> Source {
        Source::CitationIndex
    }

    fn build_request(&self, query: &str) -> Result<SourceRequest, SourceError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("rows", &RESULT_LIMIT.to_string());
        Ok(SourceRequest::get(url))
    }

    fn parse(&self, body: &str) -> Result<Vec<UnifiedResult>, SourceError> {
        let response: WorksResponse = serde_json::from_str(body)?;
        let items = match (response.message, response.items) {
            (Some(message), _) => message.items,
            (None, Some(items)) => items,
            (None, None) => {
                return Err(SourceError::Json(serde::de::Error::missing_field(
                    "message",
                )));
            }
        };
        Ok(items.into_iter().map(Self::to_result).collect())
    }

    fn fetcher(&self) -> &dyn HttpFetch {
        self.fetcher.as_ref()
    }
}
