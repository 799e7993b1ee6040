//! Process-wide configuration, built once at startup.
//!
//! [`ResearchConfig::load`] layers defaults, then an optional TOML file, then
//! `SEMANTIC_SCHOLAR_API_KEY`. It is the only place the environment is read;
//! the binary calls it once and hands the result to the adapters by reference.
//! Adapters only see the values stored here.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable holding the Semantic Scholar API key.
pub const SEMANTIC_SCHOLAR_API_KEY_ENV: &str = "SEMANTIC_SCHOLAR_API_KEY";

/// Configuration shared read-only by every adapter.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Sent as `x-api-key` to Semantic Scholar when present.
    pub semantic_scholar_api_key: Option<String>,
    pub user_agent: String,
    pub endpoints: Endpoints,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            semantic_scholar_api_key: None,
            user_agent: format!("ira/{}", env!("CARGO_PKG_VERSION")),
            endpoints: Endpoints::default(),
        }
    }
}

// Keep the key out of logs and panic messages.
impl fmt::Debug for ResearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResearchConfig")
            .field(
                "semantic_scholar_api_key",
                &self.semantic_scholar_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("user_agent", &self.user_agent)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl ResearchConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// `<config dir>/ira/config.toml`, e.g. `~/.config/ira/config.toml` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
            .map(|base| base.join("ira").join("config.toml"))
    }

    /// Load configuration for this process.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present. `SEMANTIC_SCHOLAR_API_KEY` overrides any file value.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "loading config file");
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };

        Ok(config.with_env_api_key(std::env::var(SEMANTIC_SCHOLAR_API_KEY_ENV).ok()))
    }

    /// Apply the environment value of the API key. Blank values are ignored.
    pub fn with_env_api_key(mut self, value: Option<String>) -> Self {
        if let Some(key) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.semantic_scholar_api_key = Some(key);
        }
        self
    }

    pub fn with_semantic_scholar_api_key(mut self, key: impl Into<String>) -> Self {
        self.semantic_scholar_api_key = Some(key.into());
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// The API key, if one is configured and not blank.
    pub fn semantic_scholar_api_key(&self) -> Option<&str> {
        self.semantic_scholar_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Base URLs of the upstream APIs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub wikipedia: String,
    pub crossref: String,
    pub arxiv: String,
    pub semantic_scholar: String,
    /// Site root; the search path is appended and result keys resolve against it.
    pub open_library: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            wikipedia: "https://en.wikipedia.org/w/api.php".to_string(),
            crossref: "https://api.crossref.org/works".to_string(),
            arxiv: "https://export.arxiv.org/api/query".to_string(),
            semantic_scholar: "https://api.semanticscholar.org/graph/v1/paper/search".to_string(),
            open_library: "https://openlibrary.org".to_string(),
        }
    }
}

impl Endpoints {
    /// Every endpoint under one origin, keeping the real API paths.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            wikipedia: format!("{base}/w/api.php"),
            crossref: format!("{base}/works"),
            arxiv: format!("{base}/api/query"),
            semantic_scholar: format!("{base}/graph/v1/paper/search"),
            open_library: base.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_public_apis() {
        let config = ResearchConfig::default();
        assert!(config.semantic_scholar_api_key().is_none());
        assert!(config.user_agent.starts_with("ira/"));
        assert_eq!(config.endpoints.open_library, "https://openlibrary.org");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ResearchConfig::from_toml_str(
            r#"
            semantic_scholar_api_key = "s2-key"

            [endpoints]
            crossref = "http://localhost:9000/works"
            "#,
        )
        .unwrap();

        assert_eq!(config.semantic_scholar_api_key(), Some("s2-key"));
        assert_eq!(config.endpoints.crossref, "http://localhost:9000/works");
        assert_eq!(config.endpoints.arxiv, Endpoints::default().arxiv);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let err = ResearchConfig::from_toml_str("semantic_scholar_api_key = [").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn env_key_overrides_file_unless_blank() {
        let config = ResearchConfig::default().with_semantic_scholar_api_key("from-file");

        let kept = config.clone().with_env_api_key(Some("   ".to_string()));
        assert_eq!(kept.semantic_scholar_api_key(), Some("from-file"));

        let replaced = config.with_env_api_key(Some("from-env".to_string()));
        assert_eq!(replaced.semantic_scholar_api_key(), Some("from-env"));
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = ResearchConfig::default().with_semantic_scholar_api_key("secret-value");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "user_agent = \"ira-test\"").unwrap();

        let config = ResearchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.user_agent, "ira-test");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = ResearchConfig::load(Some(Path::new("/nonexistent/ira/config.toml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn rooted_endpoints_share_origin() {
        let endpoints = Endpoints::rooted_at("http://127.0.0.1:8080/");
        assert_eq!(endpoints.wikipedia, "http://127.0.0.1:8080/w/api.php");
        assert_eq!(endpoints.open_library, "http://127.0.0.1:8080");
    }
}
