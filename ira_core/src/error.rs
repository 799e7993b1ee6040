// src/error.rs
use crate::types::Source;
use std::path::PathBuf;

/// Failure inside a single source adapter.
///
/// These never reach the caller of [`crate::Aggregator::aggregate`]; the
/// adapter logs them and contributes an empty result list instead.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Serde JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SourceError {
    pub fn code_str(&self) -> &'static str {
        match self {
            SourceError::Http(_) | SourceError::Transport(_) => "upstream_error",
            SourceError::Status { .. } => "bad_status",
            SourceError::Json(_) | SourceError::Xml(_) => "parse_error",
            SourceError::InvalidUrl(_) => "invalid_url",
        }
    }

    /// True when the source could not be reached or refused the request,
    /// as opposed to answering with a body we could not understand.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            SourceError::Http(_) | SourceError::Transport(_) | SourceError::Status { .. }
        )
    }
}

/// Failure of the fan-out/fan-in machinery itself.
#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("search task for {failed} did not complete: {error}")]
    Join {
        failed: Source,
        #[source]
        error: tokio::task::JoinError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_are_unreachable() {
        let err = SourceError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.code_str(), "bad_status");
        assert!(err.is_unreachable());
        assert_eq!(
            err.to_string(),
            "Upstream returned status 503: unavailable"
        );
    }

    #[test]
    fn parse_errors_are_not_unreachable() {
        let err = SourceError::from(serde_json::from_str::<u32>("nope").unwrap_err());
        assert_eq!(err.code_str(), "parse_error");
        assert!(!err.is_unreachable());

        let err = SourceError::Xml("unexpected end".to_string());
        assert_eq!(err.code_str(), "parse_error");
    }
}
