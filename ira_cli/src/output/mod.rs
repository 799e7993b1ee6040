use crate::cli::OutputFormat;
use crate::commands::Result;
use ira_core::UnifiedResult;

mod pretty;
pub use pretty::format_source_summary;

/// Render `results` in the requested format, ready to print.
pub fn render(query: &str, results: &[UnifiedResult], format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(results)?),
        OutputFormat::Yaml => serde_yaml::to_string(results)?,
        OutputFormat::Pretty => pretty::format_results(query, results, pretty::terminal_width()),
        OutputFormat::Table => pretty::format_as_table(results),
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ira_core::Source;

    fn sample() -> Vec<UnifiedResult> {
        vec![
            UnifiedResult::new(Source::Encyclopedia, "Cats", "Cats are..."),
            UnifiedResult::new(Source::CitationIndex, "A Paper", "Published work by A B")
                .with_authors(["A B"])
                .with_link(Some("https://doi.org/10.1/x".to_string())),
        ]
    }

    #[test]
    fn json_is_the_result_list() {
        let rendered = render("cats", &sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["source"], "Wikipedia");
        assert!(items[0].get("link").is_none());
        assert_eq!(items[1]["authors"][0], "A B");
    }

    #[test]
    fn yaml_uses_display_names() {
        let rendered = render("cats", &sample(), OutputFormat::Yaml).unwrap();
        assert!(rendered.contains("source: Wikipedia"));
        assert!(rendered.contains("source: CrossRef"));
    }

    #[test]
    fn empty_json_is_an_empty_array() {
        let rendered = render("nothing", &[], OutputFormat::Json).unwrap();
        assert_eq!(rendered.trim(), "[]");
    }
}
