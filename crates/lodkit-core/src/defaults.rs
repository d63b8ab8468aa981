//! Centralized default constants for lodkit.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates should reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// LABEL LOADING
// =============================================================================

/// Number of terms queried together in one label batch.
pub const LABEL_CHUNK_SIZE: usize = 30;

/// Maximum number of label batches in flight at once.
pub const LABEL_CONCURRENCY: usize = 2;

/// Per-batch timeout in milliseconds.
pub const LABEL_TIMEOUT_MS: u64 = 1000;

/// Predicate whose presence marks a term as already labeled.
pub const LABEL_PREDICATE: &str = "http://schema.org/name";

/// Placeholder replaced with the batch's `<iri>` list in a label query template.
pub const TEMPLATE_IRIS_PLACEHOLDER: &str = "{{iris}}";

/// Placeholder replaced with the label predicate IRI in a label query template.
pub const TEMPLATE_LABEL_PLACEHOLDER: &str = "{{label}}";

/// Label query used when no template is configured.
pub const LABEL_QUERY_TEMPLATE: &str = "CONSTRUCT {
  ?uri <{{label}}> ?label .
} WHERE {
  GRAPH ?g {
    ?uri <{{label}}> ?label
    VALUES ?uri { {{iris}} }
  }
}";

// =============================================================================
// SPARQL
// =============================================================================

/// Default SPARQL endpoint.
pub const SPARQL_ENDPOINT: &str = "http://localhost:7200/sparql";

/// Overall HTTP timeout for SPARQL requests (seconds).
pub const SPARQL_TIMEOUT_SECS: u64 = 30;

/// User agent sent with SPARQL requests.
pub const SPARQL_USER_AGENT: &str = concat!("lodkit/", env!("CARGO_PKG_VERSION"));

/// Accept header for graph-producing queries (CONSTRUCT / DESCRIBE).
pub const SPARQL_ACCEPT_GRAPH: &str =
    "application/n-triples, text/turtle;q=0.9, application/n-quads;q=0.8, application/rdf+xml;q=0.5";

/// Accept header for ASK queries.
pub const SPARQL_ACCEPT_ASK: &str = "application/sparql-results+json";

/// Bytes of an error response body kept in the resulting error message.
pub const SPARQL_ERROR_BODY_MAX_BYTES: usize = 512;
