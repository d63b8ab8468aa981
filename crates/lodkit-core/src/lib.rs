//! # lodkit-core
//!
//! Core types, traits, and abstractions for the lodkit Linked-Data toolkit.
//!
//! This crate provides the error type, shared defaults, structured logging
//! field names, the collaborator traits the label engine is written against
//! ([`QueryExecutor`], [`QuadSource`]) and the typed plugin registry.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod plugins;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use plugins::{LoadedPlugin, PluginEntry, PluginFactory, PluginRegistry, PluginsConfig};
pub use traits::*;

// Re-export the RDF model so downstream crates agree on one version
pub use oxrdf;
