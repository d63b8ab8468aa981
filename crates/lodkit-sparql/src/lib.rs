//! # lodkit-sparql
//!
//! SPARQL 1.1 protocol client for lodkit.
//!
//! This crate provides:
//! - [`SparqlClient`], a [`QueryExecutor`](lodkit_core::QueryExecutor) over HTTP
//! - [`SparqlConfig`], loadable from the environment or a TOML file
//! - [`SparqlResponse`], an adapter that keeps response metadata and caches
//!   the body once read
//!
//! # Example
//!
//! ```rust,no_run
//! use lodkit_core::{QueryExecutor, QueryOptions};
//! use lodkit_sparql::{SparqlClient, SparqlConfig};
//!
//! #[tokio::main]
//! async fn main() -> lodkit_core::Result<()> {
//!     let client = SparqlClient::new(SparqlConfig::new("https://example.org/sparql"))?;
//!     let response = client
//!         .query("DESCRIBE <https://example.org/a>", &QueryOptions::graph())
//!         .await?;
//!     println!("{}", response.content_type);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod response;

pub use client::SparqlClient;
pub use config::{ConfigError, ConfigResult, SparqlConfig};
pub use response::SparqlResponse;
