use crate::config::ResearchConfig;
use crate::connectors::{collapse_whitespace, SourceAdapter, RESULT_LIMIT};
use crate::error::SourceError;
use crate::http::{HttpFetch, SourceRequest};
use crate::types::{Source, UnifiedResult};
use async_trait::async_trait;
use chrono::{DateTime, Datelike};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

/// Entries whose id starts with this are API error reports, not papers.
const ERROR_ID_MARKER: &str = "arxiv.org/api/errors";

/// One `<entry>` of the Atom feed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct ArxivEntry {
    id: String,
    title: String,
    summary: String,
    published: String,
    authors: Vec<String>,
    alternate_link: Option<String>,
}

// Flat JSON rendering of the feed, accepted alongside Atom.
#[derive(Debug, Deserialize)]
struct EntriesDocument {
    entries: Vec<JsonEntry>,
}

#[derive(Debug, Deserialize)]
struct JsonEntry {
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    published: Option<String>,
}

impl From<JsonEntry> for ArxivEntry {
    fn from(entry: JsonEntry) -> Self {
        ArxivEntry {
            id: String::new(),
            title: entry.title,
            summary: entry.summary,
            published: entry.published.unwrap_or_default(),
            authors: entry.authors,
            alternate_link: entry.link,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

impl ArxivEntry {
    fn push_text(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Id => &mut self.id,
            Field::Title => &mut self.title,
            Field::Summary => &mut self.summary,
            Field::Published => &mut self.published,
            Field::AuthorName => {
                let name = collapse_whitespace(text);
                if !name.is_empty() {
                    self.authors.push(name);
                }
                return;
            }
        };
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(text);
    }

    fn read_link(&mut self, element: &BytesStart<'_>) -> Result<(), SourceError> {
        let mut href = None;
        let mut rel = None;
        for attr in element.attributes() {
            let attr = attr.map_err(|e| SourceError::Xml(e.to_string()))?;
            let value = attr
                .unescape_value()
                .map_err(|e| SourceError::Xml(e.to_string()))?
                .into_owned();
            match attr.key.as_ref() {
                b"href" => href = Some(value),
                b"rel" => rel = Some(value),
                _ => {}
            }
        }
        // Atom treats a link without `rel` as alternate.
        if self.alternate_link.is_none() && rel.as_deref().unwrap_or("alternate") == "alternate" {
            self.alternate_link = href;
        }
        Ok(())
    }

    fn is_error_report(&self) -> bool {
        self.id.contains(ERROR_ID_MARKER)
    }

    fn year(&self) -> Option<i32> {
        DateTime::parse_from_rfc3339(self.published.trim())
            .ok()
            .map(|published| published.year())
    }
}

fn parse_atom(xml: &str) -> Result<Vec<ArxivEntry>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<ArxivEntry> = None;
    let mut field: Option<Field> = None;
    let mut in_author = false;
    let mut saw_feed = false;
    let mut buffer = Vec::new();

    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"feed" => saw_feed = true,
                b"entry" => current = Some(ArxivEntry::default()),
                b"author" if current.is_some() => in_author = true,
                b"name" if in_author => field = Some(Field::AuthorName),
                b"id" if current.is_some() && !in_author => field = Some(Field::Id),
                b"title" if current.is_some() => field = Some(Field::Title),
                b"summary" if current.is_some() => field = Some(Field::Summary),
                b"published" if current.is_some() => field = Some(Field::Published),
                b"link" => {
                    if let Some(entry) = current.as_mut() {
                        entry.read_link(e)?;
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"link" {
                    if let Some(entry) = current.as_mut() {
                        entry.read_link(e)?;
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(f), Some(entry)) = (field, current.as_mut()) {
                    let text = e.unescape().map_err(|e| SourceError::Xml(e.to_string()))?;
                    entry.push_text(f, &text);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"entry" => {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    field = None;
                }
                b"author" => in_author = false,
                _ => field = None,
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Xml(e.to_string())),
            _ => {}
        }
        buffer.clear();
    }

    if !saw_feed {
        return Err(SourceError::Xml("missing <feed> root element".to_string()));
    }
    Ok(entries)
}

/// Search over arXiv's Atom query API.
pub struct ArxivAdapter {
    endpoint: String,
    fetcher: Arc<dyn HttpFetch>,
}

impl ArxivAdapter {
    pub fn new(config: &ResearchConfig, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self {
            endpoint: config.endpoints.arxiv.clone(),
            fetcher,
        }
    }

    fn to_result(entry: ArxivEntry) -> UnifiedResult {
        let year = entry.year();
        let link = entry
            .alternate_link
            .filter(|l| !l.trim().is_empty())
            .or_else(|| Some(entry.id.trim().to_string()).filter(|id| !id.is_empty()));

        UnifiedResult::new(
            Source::Preprint,
            collapse_whitespace(&entry.title),
            collapse_whitespace(&entry.summary),
        )
        .with_authors(entry.authors)
        .with_year(year)
        .with_link(link)
    }
}

#[async_trait]
impl SourceAdapter for ArxivAdapter {
    fn source(&self) -> Source {
        Source::Preprint
    }

    fn build_request(&self, query: &str) -> Result<SourceRequest, SourceError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("search_query", query)
            .append_pair("max_results", &RESULT_LIMIT.to_string());
        Ok(SourceRequest::get(url))
    }

    fn parse(&self, body: &str) -> Result<Vec<UnifiedResult>, SourceError> {
        let entries = if body.trim_start().starts_with('{') {
            let document: EntriesDocument = serde_json::from_str(body)?;
            document.entries.into_iter().map(ArxivEntry::from).collect()
        } else {
            parse_atom(body)?
        };

        if let Some(report) = entries.iter().find(|e| e.is_error_report()) {
            return Err(SourceError::Xml(format!(
                "arXiv reported an error: {}",
                collapse_whitespace(&report.summary)
            )));
        }

        Ok(entries.into_iter().map(Self::to_result).collect())
    }

    fn fetcher(&self) -> &dyn HttpFetch {
        self.fetcher.as_ref()
    }
}
