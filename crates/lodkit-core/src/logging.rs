//! Structured logging schema and field name constants for lodkit.
//!
//! All crates use these names for structured `tracing` fields so log
//! aggregation can query every subsystem the same way.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, e.g. a label batch that failed or timed out |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, per-call summaries |
//! | TRACE | Per-item iteration (individual terms, quads) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "labels", "sparql", "plugins", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "classifier", "queue", "merger", "client"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "load_labels", "query", "health_check"
pub const OPERATION: &str = "op";

// ─── Batch fields ──────────────────────────────────────────────────────────

/// Zero-based position of a batch in submission order.
pub const BATCH_INDEX: &str = "batch_index";

/// Number of terms in a batch.
pub const BATCH_SIZE: &str = "batch_size";

/// Number of batches planned for a call.
pub const BATCH_COUNT: &str = "batch_count";

/// Zero-based position of a task in a bounded queue.
pub const TASK_INDEX: &str = "task_index";

/// Number of tasks submitted to a bounded queue.
pub const TASK_COUNT: &str = "task_count";

/// Number of terms found or processed.
pub const TERM_COUNT: &str = "term_count";

/// Number of quads parsed or merged.
pub const QUAD_COUNT: &str = "quad_count";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Configured timeout in milliseconds.
pub const TIMEOUT_MS: &str = "timeout_ms";

/// Configured concurrency limit.
pub const CONCURRENCY: &str = "concurrency";

// ─── Transport fields ──────────────────────────────────────────────────────

/// Endpoint a query was sent to.
pub const ENDPOINT: &str = "endpoint";

/// Normalized response content type.
pub const CONTENT_TYPE: &str = "content_type";

/// HTTP status code.
pub const STATUS: &str = "status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Number of batches that produced labels.
pub const SUCCEEDED: &str = "succeeded";

/// Number of batches that failed, timed out or were unparseable.
pub const FAILED: &str = "failed";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
