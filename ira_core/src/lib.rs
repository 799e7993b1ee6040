// src/lib.rs
//! Concurrent search across public research sources.
//!
//! One query is sent to Wikipedia, CrossRef, arXiv, Semantic Scholar and
//! Open Library at the same time. Each answer is mapped into a
//! [`UnifiedResult`] and the lists are concatenated in that fixed order.
//!
//! ```no_run
//! use ira_core::{Aggregator, ResearchConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ResearchConfig::load(None)?;
//! let aggregator = Aggregator::from_config(&config)?;
//! for result in aggregator.aggregate("graph neural networks").await? {
//!     println!("[{}] {}", result.source(), result.title());
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod connectors;
pub mod error;
pub mod http;
pub mod types;

pub use aggregate::Aggregator;
pub use config::{Endpoints, ResearchConfig, SEMANTIC_SCHOLAR_API_KEY_ENV};
pub use connectors::{default_adapters, SourceAdapter, RESULT_LIMIT};
pub use error::{AggregationError, ConfigError, SourceError};
pub use http::{HttpFetch, ReqwestFetcher, SourceRequest};
pub use types::{Source, SourceBatch, UnifiedResult};
