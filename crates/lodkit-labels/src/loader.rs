//! Label loader: classify, plan, fetch, merge.

use std::sync::Arc;
use std::time::Instant;

use oxrdf::{Dataset, NamedNode};
use tracing::{debug, info, instrument, trace};

use lodkit_core::{Error, QuadSource, QueryExecutor, QueryOptions, Result};

use crate::classifier::{find_unlabeled_terms, NamespaceFilter, TermSet};
use crate::config::LabelConfig;
use crate::merger::{merge, parse_response, retain_batch_subjects, BatchOutcome, MergedLabels, ParserRegistry};
use crate::planner::{plan, Batch, QueryTemplate};
use crate::queue::BoundedQueue;

/// Everything a spawned batch task needs.
struct BatchFetcher {
    executor: Arc<dyn QueryExecutor>,
    parsers: ParserRegistry,
    template: QueryTemplate,
    options: QueryOptions,
    label: NamedNode,
}

impl BatchFetcher {
    async fn fetch(&self, batch: Batch) -> Result<Dataset> {
        let query = self.template.render(&batch);
        debug!(
            batch_index = batch.index,
            batch_size = batch.len(),
            "Fetching labels for batch"
        );
        trace!(batch_index = batch.index, %query, "Label query");

        let response = self.executor.query(&query, &self.options).await?;
        let fragment = parse_response(response, &self.parsers).await?;
        Ok(retain_batch_subjects(fragment, &batch, self.label.as_ref()))
    }
}

/// Fetches labels for the unlabeled terms of a graph.
///
/// Build one with [`LabelLoader::builder`]. Loading never fails as a whole:
/// each batch that errors, times out or returns something unparseable is
/// logged once and contributes nothing, and the rest are merged.
pub struct LabelLoader {
    config: LabelConfig,
    filter: NamespaceFilter,
    queue: BoundedQueue,
    fetcher: Arc<BatchFetcher>,
}

impl LabelLoader {
    pub fn builder() -> LabelLoaderBuilder {
        LabelLoaderBuilder::default()
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Predicate that carries a label.
    pub fn label_predicate(&self) -> &NamedNode {
        &self.fetcher.label
    }

    /// Terms in `graph` that need a label.
    pub fn find_unlabeled_terms<G>(&self, graph: &G) -> TermSet
    where
        G: QuadSource + ?Sized,
    {
        find_unlabeled_terms(graph, &self.filter, self.fetcher.label.as_ref())
    }

    /// Batches that [`load_labels`](Self::load_labels) would query for `graph`.
    pub fn plan<G>(&self, graph: &G) -> Vec<Batch>
    where
        G: QuadSource + ?Sized,
    {
        plan(self.find_unlabeled_terms(graph), self.config.resolved_chunk_size())
    }

    /// Fetch labels for every unlabeled term of `graph`.
    #[instrument(skip_all, fields(subsystem = "labels", component = "loader", op = "load_labels"))]
    pub async fn load_labels<G>(&self, graph: &G) -> MergedLabels
    where
        G: QuadSource + ?Sized,
    {
        let start = Instant::now();
        let batches = self.plan(graph);
        if batches.is_empty() {
            debug!("No unlabeled terms, skipping label queries");
            return MergedLabels::default();
        }

        let term_count: usize = batches.iter().map(Batch::len).sum();
        debug!(
            term_count,
            batch_count = batches.len(),
            "Planned label batches"
        );

        let fetcher = self.fetcher.clone();
        let settled = self
            .queue
            .run(batches, move |batch| {
                let fetcher = fetcher.clone();
                async move { fetcher.fetch(batch).await }
            })
            .await;

        let merged = merge(settled.into_iter().map(BatchOutcome::from));

        info!(
            term_count,
            quad_count = merged.total_quads,
            succeeded = merged.succeeded,
            failed = merged.failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Loaded labels"
        );
        merged
    }

    /// `graph` plus every label that could be fetched for it.
    pub async fn enrich<G>(&self, graph: &G) -> Dataset
    where
        G: QuadSource + ?Sized,
    {
        let labels = self.load_labels(graph).await;

        let mut enriched = Dataset::new();
        for quad in graph.quads() {
            enriched.insert(quad);
        }
        for quad in labels.dataset.iter() {
            enriched.insert(quad);
        }
        enriched
    }
}

/// Builder for [`LabelLoader`].
#[derive(Default)]
pub struct LabelLoaderBuilder {
    config: LabelConfig,
    executor: Option<Arc<dyn QueryExecutor>>,
    parsers: Option<ParserRegistry>,
}

impl LabelLoaderBuilder {
    pub fn with_config(mut self, config: LabelConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the query executor.
    pub fn with_executor<E>(self, executor: E) -> Self
    where
        E: QueryExecutor + 'static,
    {
        self.with_shared_executor(Arc::new(executor))
    }

    /// Set a query executor that is shared with other owners.
    pub fn with_shared_executor(mut self, executor: Arc<dyn QueryExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Replace the default parser registry.
    pub fn with_parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = Some(parsers);
        self
    }

    /// Build the loader.
    ///
    /// Fails when no executor was supplied, the label predicate is not an
    /// IRI, or the query template lacks the `{{iris}}` placeholder.
    pub fn build(self) -> Result<LabelLoader> {
        let executor = self
            .executor
            .ok_or_else(|| Error::Config("LabelLoader requires a query executor".to_string()))?;

        let label = NamedNode::new(self.config.label_predicate.as_str()).map_err(|e| {
            Error::Config(format!(
                "Invalid label predicate '{}': {}",
                self.config.label_predicate, e
            ))
        })?;

        let template = match &self.config.query_template {
            Some(text) => QueryTemplate::new(text.as_str(), label.clone())?,
            None => QueryTemplate::default_for(label.clone()),
        };

        let queue = BoundedQueue::new(
            self.config.resolved_concurrency(),
            self.config.resolved_timeout(),
        );
        let options = QueryOptions::graph().with_headers(self.config.headers.clone());

        debug!(
            chunk_size = self.config.resolved_chunk_size(),
            concurrency = queue.concurrency(),
            timeout_ms = queue.timeout().as_millis() as u64,
            label_predicate = label.as_str(),
            "Building label loader"
        );

        Ok(LabelLoader {
            filter: self.config.namespace_filter(),
            queue,
            fetcher: Arc::new(BatchFetcher {
                executor,
                parsers: self.parsers.unwrap_or_default(),
                template,
                options,
                label,
            }),
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lodkit_core::QueryResponse;

    struct NoopExecutor;

    #[async_trait]
    impl QueryExecutor for NoopExecutor {
        async fn query(&self, _query: &str, _options: &QueryOptions) -> Result<QueryResponse> {
            Ok(QueryResponse::from_bytes("application/n-triples", ""))
        }
    }

    #[test]
    fn test_build_without_executor_fails() {
        let err = LabelLoader::builder().build().err().unwrap();
        match err {
            Error::Config(msg) => assert!(msg.contains("executor")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_rejects_bad_template() {
        let result = LabelLoader::builder()
            .with_config(LabelConfig::default().with_query_template("DESCRIBE ?x"))
            .with_executor(NoopExecutor)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_build_rejects_bad_label_predicate() {
        let result = LabelLoader::builder()
            .with_config(LabelConfig::default().with_label_predicate("not an iri"))
            .with_executor(NoopExecutor)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_build_with_defaults() {
        let loader = LabelLoader::builder()
            .with_executor(NoopExecutor)
            .build()
            .unwrap();

        assert_eq!(loader.label_predicate().as_str(), "http://schema.org/name");
        assert_eq!(loader.config(), &LabelConfig::default());
    }

    #[tokio::test]
    async fn test_empty_graph_needs_no_queries() {
        let loader = LabelLoader::builder()
            .with_executor(NoopExecutor)
            .build()
            .unwrap();

        let merged = loader.load_labels(&Dataset::new()).await;
        assert!(merged.is_empty());
        assert_eq!(merged.succeeded + merged.failed, 0);
    }
}
