use crate::cli::Cli;
use crate::commands::{CommandError, Result};
use crate::output::{format_source_summary, render};
use indicatif::{ProgressBar, ProgressStyle};
use ira_core::{Aggregator, ResearchConfig};
use tracing::debug;

/// Run one query against every source and print the results.
pub async fn run(cli: &Cli) -> Result<()> {
    let query = cli.query_text().ok_or(CommandError::EmptyQuery)?;

    let config = ResearchConfig::load(cli.config.as_deref())?;
    debug!(?config, "configuration loaded");
    let aggregator = Aggregator::from_config(&config)?;

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Searching across multiple sources...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let outcome = aggregator.aggregate_by_source(&query).await;
    spinner.finish_and_clear();
    let batches = outcome?;

    if cli.verbose > 0 {
        eprint!("{}", format_source_summary(&batches));
    }

    let results: Vec<_> = batches.into_iter().flat_map(|b| b.results).collect();
    print!("{}", render(&query, &results, cli.output)?);

    Ok(())
}
