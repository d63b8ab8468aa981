//! # lodkit-labels
//!
//! Fetches human-readable labels for the IRIs of an RDF graph.
//!
//! The pipeline has four stages:
//! - [`classifier`] finds IRIs with no label predicate edge
//! - [`planner`] splits them into fixed-size batches and renders one query each
//! - [`queue`] runs the batch queries with a concurrency cap and per-query timeout
//! - [`merger`] parses each response and unions the results
//!
//! [`LabelLoader`] wires the stages together around any
//! [`QueryExecutor`](lodkit_core::QueryExecutor).
//!
//! # Example
//!
//! ```rust,no_run
//! use lodkit_labels::{LabelConfig, LabelLoader};
//! use lodkit_sparql::SparqlClient;
//! use oxrdf::Dataset;
//!
//! # async fn run(graph: Dataset) -> lodkit_core::Result<()> {
//! let loader = LabelLoader::builder()
//!     .with_config(LabelConfig::default().with_label_namespace("https://ld.admin.ch/"))
//!     .with_executor(SparqlClient::from_env()?)
//!     .build()?;
//!
//! let labels = loader.load_labels(&graph).await;
//! println!("{} label quads", labels.total_quads);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod config;
pub mod loader;
pub mod merger;
pub mod planner;
pub mod queue;

pub use classifier::{find_unlabeled_terms, NamespaceFilter, TermSet};
pub use config::LabelConfig;
pub use loader::{LabelLoader, LabelLoaderBuilder};
pub use merger::{
    merge, normalize_content_type, parse_body, parse_response, BatchOutcome, FailureReason,
    MergedLabels, ParserRegistry,
};
pub use planner::{plan, Batch, QueryTemplate};
pub use queue::{BoundedQueue, Settled, TaskFailure};
