pub mod search;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Search query must not be empty")]
    EmptyQuery,

    #[error("Configuration error: {0}")]
    Config(#[from] ira_core::ConfigError),

    #[error("Failed to set up HTTP client: {0}")]
    Client(#[from] ira_core::SourceError),

    // Details are logged by the core; users get one generic message.
    #[error("An error occurred while fetching research data. Please try again.")]
    Aggregation(#[from] ira_core::AggregationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;
