//! Result merging.
//!
//! Turns raw query responses into datasets and folds the per-batch outcomes
//! into one dataset. Merging is a set union, so the result does not depend on
//! the order in which batches completed.

use std::collections::HashMap;
use std::time::Duration;

use oxrdf::{Dataset, NamedNodeRef, SubjectRef};
use oxrdfio::{RdfFormat, RdfParser};
use thiserror::Error;
use tracing::{debug, trace};

use lodkit_core::{Error, QueryResponse, Result};

use crate::planner::Batch;
use crate::queue::{Settled, TaskFailure};

// =============================================================================
// CONTENT TYPES AND PARSERS
// =============================================================================

/// Reduce a `Content-Type` value to its lowercase media type.
///
/// `"text/turtle; charset=utf-8"` becomes `"text/turtle"`.
pub fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Maps media types to RDF syntaxes.
///
/// Keys are stored normalized, so lookups ignore case and parameters.
#[derive(Debug, Clone)]
pub struct ParserRegistry {
    formats: HashMap<String, RdfFormat>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ParserRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    /// A registry with every built-in syntax and its common aliases.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for format in [
            RdfFormat::NTriples,
            RdfFormat::NQuads,
            RdfFormat::Turtle,
            RdfFormat::TriG,
            RdfFormat::N3,
            RdfFormat::RdfXml,
        ] {
            registry.register(format.media_type(), format);
        }

        registry.register("application/x-turtle", RdfFormat::Turtle);
        registry.register("application/x-trig", RdfFormat::TriG);
        registry.register("text/rdf+n3", RdfFormat::N3);
        registry.register("application/xml", RdfFormat::RdfXml);
        registry.register("text/xml", RdfFormat::RdfXml);
        registry
    }

    /// Register (or replace) the syntax for a media type.
    pub fn register(&mut self, media_type: &str, format: RdfFormat) {
        self.formats.insert(normalize_content_type(media_type), format);
    }

    /// Syntax for a content type, if any.
    pub fn lookup(&self, content_type: &str) -> Option<RdfFormat> {
        self.formats.get(&normalize_content_type(content_type)).copied()
    }

    /// Registered media types, sorted.
    pub fn media_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

/// Parse a complete body in the given syntax.
pub fn parse_body(format: RdfFormat, body: &[u8]) -> Result<Dataset> {
    let mut dataset = Dataset::new();
    for quad in RdfParser::from_format(format).for_reader(body) {
        let quad = quad.map_err(|e| Error::Parse(e.to_string()))?;
        dataset.insert(&quad);
    }
    Ok(dataset)
}

/// Parse a query response into a dataset.
///
/// The content type is checked before the body is read, so an unsupported
/// response costs no parsing work.
pub async fn parse_response(response: QueryResponse, registry: &ParserRegistry) -> Result<Dataset> {
    let content_type = normalize_content_type(&response.content_type);
    let format = registry
        .lookup(&content_type)
        .ok_or(Error::UnsupportedContentType(content_type))?;

    let body = response.into_bytes().await?;
    let dataset = parse_body(format, &body)?;

    trace!(
        content_type = format.media_type(),
        quad_count = dataset.len(),
        "Parsed query response"
    );
    Ok(dataset)
}

/// Drop label quads about terms outside `batch`.
///
/// Quads with other predicates are kept.
pub fn retain_batch_subjects(fragment: Dataset, batch: &Batch, label: NamedNodeRef<'_>) -> Dataset {
    let mut kept = Dataset::new();
    let mut dropped = 0usize;

    for quad in fragment.iter() {
        let in_batch = match quad.subject {
            SubjectRef::NamedNode(subject) => batch.contains(subject),
            _ => false,
        };
        if quad.predicate == label && !in_batch {
            dropped += 1;
        } else {
            kept.insert(quad);
        }
    }

    if dropped > 0 {
        debug!(
            batch_index = batch.index,
            dropped, "Dropped label quads for terms outside the batch"
        );
    }
    kept
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Why a batch produced no quads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    /// The executor failed (network or store error).
    #[error("query failed: {0}")]
    Execution(String),

    /// The batch did not settle before the deadline.
    #[error("query exceeded timeout of {}ms", .0.as_millis())]
    TimedOut(Duration),

    /// No parser for the response content type.
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// The response body was not valid in its declared syntax.
    #[error("parse failed: {0}")]
    Parse(String),

    /// The batch task panicked.
    #[error("task panicked: {0}")]
    Panicked(String),
}

impl From<TaskFailure> for FailureReason {
    fn from(failure: TaskFailure) -> Self {
        match failure {
            TaskFailure::Failed(Error::UnsupportedContentType(ct)) => {
                FailureReason::UnsupportedContentType(ct)
            }
            TaskFailure::Failed(Error::Parse(msg)) => FailureReason::Parse(msg),
            TaskFailure::Failed(e) => FailureReason::Execution(e.to_string()),
            TaskFailure::TimedOut(timeout) => FailureReason::TimedOut(timeout),
            TaskFailure::Panicked(msg) => FailureReason::Panicked(msg),
        }
    }
}

/// Settled result of one batch.
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    Success(Dataset),
    Failed(FailureReason),
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::Success(_))
    }

    /// Quads contributed by this batch.
    pub fn quad_count(&self) -> usize {
        match self {
            BatchOutcome::Success(dataset) => dataset.len(),
            BatchOutcome::Failed(_) => 0,
        }
    }
}

impl From<Settled<Dataset>> for BatchOutcome {
    fn from(settled: Settled<Dataset>) -> Self {
        match settled {
            Ok(dataset) => BatchOutcome::Success(dataset),
            Err(failure) => BatchOutcome::Failed(failure.into()),
        }
    }
}

// =============================================================================
// MERGE
// =============================================================================

/// Union of every successful batch.
#[derive(Debug, Clone, Default)]
pub struct MergedLabels {
    /// Merged quads.
    pub dataset: Dataset,
    /// Sum of the quad counts of successful batches, counted before
    /// deduplication.
    pub total_quads: usize,
    /// Number of successful batches.
    pub succeeded: usize,
    /// Number of failed batches.
    pub failed: usize,
    /// Failure reasons, in the order they were merged.
    pub failures: Vec<FailureReason>,
}

impl MergedLabels {
    /// Fold one outcome in.
    pub fn absorb(&mut self, outcome: BatchOutcome) {
        match outcome {
            BatchOutcome::Success(fragment) => {
                self.total_quads += fragment.len();
                self.succeeded += 1;
                for quad in fragment.iter() {
                    self.dataset.insert(quad);
                }
            }
            BatchOutcome::Failed(reason) => {
                self.failed += 1;
                self.failures.push(reason);
            }
        }
    }

    /// Combine two partial merges.
    pub fn combine(mut self, other: MergedLabels) -> Self {
        self.total_quads += other.total_quads;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.failures.extend(other.failures);
        for quad in other.dataset.iter() {
            self.dataset.insert(quad);
        }
        self
    }

    /// Number of distinct quads after merging.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}

/// Merge every outcome into one dataset.
pub fn merge<I>(outcomes: I) -> MergedLabels
where
    I: IntoIterator<Item = BatchOutcome>,
{
    let mut merged = MergedLabels::default();
    for outcome in outcomes {
        merged.absorb(outcome);
    }
    merged
}
