//! Fan-out/fan-in across every source adapter.
//!
//! Each adapter runs as its own tokio task. The aggregator waits for all of
//! them and concatenates their output in adapter order, whatever order the
//! network answers arrive in.

use crate::config::ResearchConfig;
use crate::connectors::{default_adapters, SourceAdapter};
use crate::error::{AggregationError, SourceError};
use crate::http::{HttpFetch, ReqwestFetcher};
use crate::types::{Source, SourceBatch, UnifiedResult};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Runs one query against a fixed, ordered set of adapters.
///
/// Stateless between calls; a single instance can serve many queries.
#[derive(Clone)]
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl Aggregator {
    /// The five standard sources sharing `fetcher`.
    pub fn new(config: &ResearchConfig, fetcher: Arc<dyn HttpFetch>) -> Self {
        Self::with_adapters(default_adapters(config, fetcher))
    }

    /// The five standard sources over a real HTTP client.
    pub fn from_config(config: &ResearchConfig) -> Result<Self, SourceError> {
        let fetcher = ReqwestFetcher::new(config)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// An arbitrary adapter list; output follows the order given here.
    pub fn with_adapters(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    pub fn sources(&self) -> Vec<Source> {
        self.adapters.iter().map(|a| a.source()).collect()
    }

    /// Query every source concurrently and keep results grouped per source.
    ///
    /// Adapter failures show up as empty batches. The only error is a task
    /// that did not finish, e.g. one that panicked.
    pub async fn aggregate_by_source(
        &self,
        query: &str,
    ) -> Result<Vec<SourceBatch>, AggregationError> {
        let start = Instant::now();

        let (sources, tasks): (Vec<Source>, Vec<_>) = self
            .adapters
            .iter()
            .map(|adapter| {
                let adapter = Arc::clone(adapter);
                let query = query.to_string();
                let source = adapter.source();

                let task = tokio::spawn(async move {
                    let started = Instant::now();
                    let results = adapter.search(&query).await;
                    SourceBatch {
                        source: adapter.source(),
                        results,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    }
                });
                (source, task)
            })
            .unzip();

        let outcomes = join_all(tasks).await;

        let mut batches = Vec::with_capacity(outcomes.len());
        for (source, outcome) in sources.into_iter().zip(outcomes) {
            match outcome {
                Ok(batch) => batches.push(batch),
                Err(join_error) => {
                    error!(
                        source = source.slug(),
                        error = %join_error,
                        "search task did not complete"
                    );
                    return Err(AggregationError::Join {
                        failed: source,
                        error: join_error,
                    });
                }
            }
        }

        info!(
            query,
            sources = batches.len(),
            results = batches.iter().map(|b| b.results.len()).sum::<usize>(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "aggregation complete"
        );
        Ok(batches)
    }

    /// Query every source concurrently and return one flat list in source order.
    pub async fn aggregate(&self, query: &str) -> Result<Vec<UnifiedResult>, AggregationError> {
        let batches = self.aggregate_by_source(query).await?;
        Ok(batches.into_iter().flat_map(|b| b.results).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::SourceRequest;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Adapter with canned output and an optional delay before answering.
    struct Scripted {
        source: Source,
        titles: Vec<&'static str>,
        delay: Duration,
        panics: bool,
    }

    impl Scripted {
        fn new(source: Source, titles: Vec<&'static str>) -> Self {
            Self {
                source,
                titles,
                delay: Duration::ZERO,
                panics: false,
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn panicking(mut self) -> Self {
            self.panics = true;
            self
        }
    }

    #[async_trait]
    impl HttpFetch for Scripted {
        async fn fetch(&self, _request: &SourceRequest) -> Result<String, SourceError> {
            tokio::time::sleep(self.delay).await;
            if self.panics {
                panic!("adapter blew up");
            }
            Ok(self.titles.join("\n"))
        }
    }

    #[async_trait]
    impl SourceAdapter for Scripted {
        fn source(&self) -> Source {
            self.source
        }

        fn build_request(&self, _query: &str) -> Result<SourceRequest, SourceError> {
            Ok(SourceRequest::get(url::Url::parse("http://scripted.invalid/")?))
        }

        fn parse(&self, body: &str) -> Result<Vec<UnifiedResult>, SourceError> {
            Ok(body
                .lines()
                .filter(|l| !l.is_empty())
                .map(|title| UnifiedResult::new(self.source, title, ""))
                .collect())
        }

        fn fetcher(&self) -> &dyn HttpFetch {
            self
        }
    }

    fn titles(results: &[UnifiedResult]) -> Vec<&str> {
        results.iter().map(|r| r.title()).collect()
    }

    #[tokio::test]
    async fn output_follows_adapter_order_not_completion_order() {
        let aggregator = Aggregator::with_adapters(vec![
            Arc::new(Scripted::new(Source::Encyclopedia, vec!["w1"]).slow(Duration::from_millis(80))),
            Arc::new(Scripted::new(Source::CitationIndex, vec!["c1", "c2"])),
            Arc::new(Scripted::new(Source::Preprint, vec!["a1"]).slow(Duration::from_millis(40))),
        ]);

        let results = aggregator.aggregate("anything").await.unwrap();
        assert_eq!(titles(&results), vec!["w1", "c1", "c2", "a1"]);
    }

    #[tokio::test]
    async fn adapters_run_concurrently() {
        let delay = Duration::from_millis(100);
        let aggregator = Aggregator::with_adapters(
            Source::ALL
                .iter()
                .map(|&s| Arc::new(Scripted::new(s, vec!["x"]).slow(delay)) as Arc<dyn SourceAdapter>)
                .collect(),
        );

        let started = Instant::now();
        let results = aggregator.aggregate("q").await.unwrap();
        assert_eq!(results.len(), 5);
        // Sequential execution would take at least 5x the delay.
        assert!(started.elapsed() < delay * 4);
    }

    #[tokio::test]
    async fn all_empty_is_not_an_error() {
        let aggregator = Aggregator::with_adapters(
            Source::ALL
                .iter()
                .map(|&s| Arc::new(Scripted::new(s, vec![])) as Arc<dyn SourceAdapter>)
                .collect(),
        );
        assert!(aggregator.aggregate("q").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batches_keep_source_grouping() {
        let aggregator = Aggregator::with_adapters(vec![
            Arc::new(Scripted::new(Source::AcademicGraph, vec!["s1"])),
            Arc::new(Scripted::new(Source::LibraryCatalog, vec![])),
        ]);

        let batches = aggregator.aggregate_by_source("q").await.unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].source, Source::AcademicGraph);
        assert_eq!(batches[0].results.len(), 1);
        assert_eq!(batches[1].source, Source::LibraryCatalog);
        assert!(batches[1].results.is_empty());
    }

    #[tokio::test]
    async fn panicking_task_fails_the_whole_query() {
        let aggregator = Aggregator::with_adapters(vec![
            Arc::new(Scripted::new(Source::Encyclopedia, vec!["w1"])),
            Arc::new(Scripted::new(Source::Preprint, vec![]).panicking()),
        ]);

        let err = aggregator.aggregate("q").await.unwrap_err();
        let AggregationError::Join { failed, error } = err;
        assert_eq!(failed, Source::Preprint);
        assert!(error.is_panic());
    }

    #[test]
    fn standard_aggregator_lists_all_sources() {
        let aggregator = Aggregator::new(
            &ResearchConfig::default(),
            crate::connectors::test_support::no_fetch(),
        );
        assert_eq!(aggregator.sources(), Source::ALL.to_vec());
    }
}
