//! Pretty formatter for terminal output.
//!
//! One card per result: bold numbered title, a source tag, dimmed metadata,
//! a clickable link, then the summary wrapped to the terminal width.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use ira_core::{Source, SourceBatch, UnifiedResult};
use owo_colors::OwoColorize;

/// Terminal width for formatting (default fallback)
const DEFAULT_WIDTH: usize = 80;

/// Indent for card content (after number)
const CARD_INDENT: &str = "      ";

/// Summaries longer than this are cut in card view.
const MAX_SUMMARY_CHARS: usize = 600;

// ============================================================================
// Public API
// ============================================================================

/// Header plus one card per result, or a notice when there are none.
pub fn format_results(query: &str, results: &[UnifiedResult], width: usize) -> String {
    let mut output = String::new();
    output.push_str(&format_section_header(query, results.len(), width));
    output.push_str("\n\n");

    if results.is_empty() {
        output.push_str(&format!("{}No results found\n", CARD_INDENT).dimmed().to_string());
        return output;
    }

    for (i, result) in results.iter().enumerate() {
        output.push_str(&format_card(result, i + 1, width));
        output.push('\n');
    }
    output
}

/// Per-source counts and timings, for `--verbose`.
pub fn format_source_summary(batches: &[SourceBatch]) -> String {
    let mut output = String::new();
    for batch in batches {
        let count = batch.results.len();
        let label = format!("{}:", batch.source.display_name());
        let elapsed = format!("({} ms)", batch.elapsed_ms);
        output.push_str(&format!(
            "  {:<17} {:>2} result{} {}\n",
            label,
            count,
            if count == 1 { "" } else { "s" },
            elapsed.dimmed()
        ));
    }
    output
}

// ============================================================================
// Card Formatting (the main visual pattern)
// ============================================================================

fn format_card(result: &UnifiedResult, index: usize, width: usize) -> String {
    let mut output = String::new();

    // Line 1: Index + Title
    let title = if result.title().trim().is_empty() {
        "(no title)"
    } else {
        result.title()
    };
    output.push_str(&format!(
        " {} {}\n",
        format!("{:>3}.", index).cyan().bold(),
        title.bold()
    ));

    // Line 2: source tag, then whatever metadata the source reported
    let mut meta = vec![source_tag(result.source())];
    if let Some(authors) = result.authors() {
        meta.push(format_authors(authors).dimmed().to_string());
    }
    if let Some(year) = result.year() {
        meta.push(year.to_string().yellow().to_string());
    }
    let separator = " · ".dimmed().to_string();
    output.push_str(&format!("{}{}\n", CARD_INDENT, meta.join(separator.as_str())));

    if let Some(link) = result.link() {
        output.push_str(&format!("{}{}\n", CARD_INDENT, format_hyperlink(link, link).blue()));
    }

    let summary = truncate_str(&clean_snippet(result.summary()), MAX_SUMMARY_CHARS);
    if !summary.is_empty() {
        let options = textwrap::Options::new(width.max(CARD_INDENT.len() + 20))
            .initial_indent(CARD_INDENT)
            .subsequent_indent(CARD_INDENT);
        output.push_str(&textwrap::fill(&summary, options).dimmed().to_string());
        output.push('\n');
    }

    output
}

fn source_tag(source: Source) -> String {
    let label = format!("[{}]", source.display_name());
    match source {
        Source::Encyclopedia => label.white().bold().to_string(),
        Source::CitationIndex => label.magenta().bold().to_string(),
        Source::Preprint => label.red().bold().to_string(),
        Source::AcademicGraph => label.blue().bold().to_string(),
        Source::LibraryCatalog => label.green().bold().to_string(),
    }
}

fn format_authors(authors: &[String]) -> String {
    const SHOWN: usize = 3;
    if authors.len() <= SHOWN {
        authors.join(", ")
    } else {
        format!("{} et al.", authors[..SHOWN].join(", "))
    }
}

// ============================================================================
// Section Headers
// ============================================================================

fn format_section_header(query: &str, count: usize, width: usize) -> String {
    let header_text = format!(
        "Results for \"{}\" ({} result{})",
        query,
        count,
        if count == 1 { "" } else { "s" }
    );
    let line_len = (width.saturating_sub(header_text.chars().count() + 4)).min(60);
    let line = "─".repeat(line_len);

    format!(
        "{} {} {}",
        "──".cyan(),
        header_text.green().bold(),
        line.cyan()
    )
}

// ============================================================================
// Table Formatting
// ============================================================================

/// One row per result.
pub fn format_as_table(results: &[UnifiedResult]) -> String {
    if results.is_empty() {
        return format!("{}\n", "No results found".dimmed());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let headers: Vec<Cell> = ["#", "Source", "Title", "Authors", "Year", "Link"]
        .iter()
        .map(|col| Cell::new(col.cyan().bold().to_string()))
        .collect();
    table.set_header(headers);

    for (i, result) in results.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(result.source().display_name()),
            Cell::new(truncate_str(result.title(), 60)),
            Cell::new(
                result
                    .authors()
                    .map(|a| truncate_str(&format_authors(a), 40))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(
                result
                    .year()
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(result.link().unwrap_or("-")),
        ]);
    }

    let mut output = table.to_string();
    output.push('\n');
    output
}

// ============================================================================
// Utility Functions
// ============================================================================

fn truncate_str(s: &str, max_len: usize) -> String {
    // Take first line only
    let first_line = s.lines().next().unwrap_or(s);

    if first_line.chars().count() <= max_len {
        first_line.to_string()
    } else {
        let truncated: String = first_line.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn clean_snippet(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Format a URL as a clickable hyperlink using OSC 8 escape sequences.
fn format_hyperlink(url: &str, display_text: &str) -> String {
    // Using \x07 (BEL) as terminator for broader compatibility
    format!("\x1b]8;;{}\x07{}\x1b]8;;\x07", url, display_text)
}
