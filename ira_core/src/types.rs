//! Core types for aggregated research results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An upstream data provider.
///
/// Declaration order is the order in which results are concatenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    /// Wikipedia page extracts
    #[serde(rename = "Wikipedia")]
    Encyclopedia,
    /// CrossRef works index
    #[serde(rename = "CrossRef")]
    CitationIndex,
    /// arXiv preprints
    #[serde(rename = "arXiv")]
    Preprint,
    /// Semantic Scholar academic graph
    #[serde(rename = "Semantic Scholar")]
    AcademicGraph,
    /// Open Library catalog
    #[serde(rename = "Open Library")]
    LibraryCatalog,
}

impl Source {
    /// Every source, in output order.
    pub const ALL: [Source; 5] = [
        Source::Encyclopedia,
        Source::CitationIndex,
        Source::Preprint,
        Source::AcademicGraph,
        Source::LibraryCatalog,
    ];

    /// Human-facing provider name.
    pub fn display_name(self) -> &'static str {
        match self {
            Source::Encyclopedia => "Wikipedia",
            Source::CitationIndex => "CrossRef",
            Source::Preprint => "arXiv",
            Source::AcademicGraph => "Semantic Scholar",
            Source::LibraryCatalog => "Open Library",
        }
    }

    /// Short identifier used in log fields.
    pub fn slug(self) -> &'static str {
        match self {
            Source::Encyclopedia => "wikipedia",
            Source::CitationIndex => "crossref",
            Source::Preprint => "arxiv",
            Source::AcademicGraph => "semantic_scholar",
            Source::LibraryCatalog => "open_library",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A normalized result from any source.
///
/// Optional fields are `None` when the source did not report them and are
/// left out of the serialized form entirely. Values are built once through
/// the `with_*` builders and are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedResult {
    source: Source,
    title: String,
    summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

impl UnifiedResult {
    /// Create a result with the required fields.
    pub fn new(source: Source, title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            source,
            title: title.into(),
            summary: summary.into(),
            authors: None,
            year: None,
            link: None,
        }
    }

    /// Builder method to add authors. An empty list leaves `authors` unset.
    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let authors: Vec<String> = authors.into_iter().map(Into::into).collect();
        self.authors = if authors.is_empty() {
            None
        } else {
            Some(authors)
        };
        self
    }

    /// Builder method to add a publication year.
    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    /// Builder method to add a link.
    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn authors(&self) -> Option<&[String]> {
        self.authors.as_deref()
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }
}

/// Results from one source, with how long its round-trip took.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceBatch {
    /// Source these results came from
    pub source: Source,

    /// Normalized results, empty if the source failed
    pub results: Vec<UnifiedResult>,

    /// Wall time spent on this source (ms)
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unified_result_builder() {
        let result = UnifiedResult::new(Source::Preprint, "Attention", "We propose...")
            .with_authors(["A. Vaswani", "N. Shazeer"])
            .with_year(Some(2017))
            .with_link(Some("https://arxiv.org/abs/1706.03762".to_string()));

        assert_eq!(result.source(), Source::Preprint);
        assert_eq!(result.title(), "Attention");
        assert_eq!(result.summary(), "We propose...");
        assert_eq!(result.authors().map(|a| a.len()), Some(2));
        assert_eq!(result.year(), Some(2017));
        assert_eq!(result.link(), Some("https://arxiv.org/abs/1706.03762"));
    }

    #[test]
    fn empty_authors_stay_absent() {
        let result =
            UnifiedResult::new(Source::CitationIndex, "T", "").with_authors(Vec::<String>::new());
        assert!(result.authors().is_none());
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let result = UnifiedResult::new(Source::Encyclopedia, "Cats", "Cats are...");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["source"], "Wikipedia");
        assert_eq!(json["title"], "Cats");
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("authors"));
        assert!(!obj.contains_key("year"));
        assert!(!obj.contains_key("link"));
    }

    #[test]
    fn sources_are_listed_in_output_order() {
        let mut sorted = Source::ALL;
        sorted.sort();
        assert_eq!(sorted, Source::ALL);
        assert_eq!(Source::AcademicGraph.to_string(), "Semantic Scholar");
        assert_eq!(Source::LibraryCatalog.slug(), "open_library");
    }
}
