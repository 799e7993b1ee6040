use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ira")]
#[command(about = "Ira - search five research sources at once")]
#[command(version)]
#[command(after_help = "\x1b[1;36mExamples:\x1b[0m
  ira \"graph neural networks\"             Search every source
  ira quantum error correction            Unquoted words form one query
  ira \"Alan Turing\" --output json         Machine-readable results
  ira crispr --output table               One row per result

\x1b[1;36mSources (in output order):\x1b[0m
  Wikipedia, CrossRef, arXiv, Semantic Scholar, Open Library

\x1b[1;36mConfiguration:\x1b[0m
  ~/.config/ira/config.toml               Optional TOML config
  SEMANTIC_SCHOLAR_API_KEY                Overrides the configured API key")]
pub struct Cli {
    /// Search query; multiple words are joined with spaces
    #[arg(required = true, num_args = 1.., value_name = "QUERY")]
    pub query: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Path to a TOML config file
    #[arg(long, env = "IRA_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The query words joined and trimmed, or `None` if nothing is left.
    pub fn query_text(&self) -> Option<String> {
        let joined = self.query.join(" ");
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Default tracing filter for the chosen verbosity. `RUST_LOG` takes precedence.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "ira_cli=warn,ira_core=warn",
            1 => "ira_cli=info,ira_core=info",
            _ => "ira_cli=debug,ira_core=debug",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable result cards
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// One table row per result
    Table,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ira").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn joins_query_words() {
        let cli = parse(&["quantum", "error", "correction"]);
        assert_eq!(cli.query_text().as_deref(), Some("quantum error correction"));
        assert_eq!(cli.output, OutputFormat::Pretty);
    }

    #[test]
    fn blank_query_is_none() {
        let cli = parse(&["   "]);
        assert!(cli.query_text().is_none());
    }

    #[test]
    fn missing_query_is_a_usage_error() {
        assert!(Cli::try_parse_from(["ira"]).is_err());
    }

    #[test]
    fn parses_output_and_verbosity() {
        let cli = parse(&["-vv", "--output", "yaml", "cats"]);
        assert_eq!(cli.output, OutputFormat::Yaml);
        assert_eq!(cli.log_filter(), "ira_cli=debug,ira_core=debug");

        let quiet = parse(&["cats"]);
        assert_eq!(quiet.log_filter(), "ira_cli=warn,ira_core=warn");
    }
}
