use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::Cli;
use commands::search;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides the -v levels
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = search::run(&cli).await {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}
