//! Label loader configuration.
//!
//! Numeric settings are signed so that configuration written for other
//! runtimes (where `0` or a negative number means "unset") still loads;
//! any non-positive value resolves to the default.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use lodkit_core::{defaults, Error, Result};

use crate::classifier::NamespaceFilter;

/// Configuration for a [`LabelLoader`](crate::LabelLoader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Terms per label query.
    #[serde(alias = "chunkSize")]
    pub chunk_size: i64,
    /// Maximum concurrent label queries.
    pub concurrency: i64,
    /// Per-query timeout in milliseconds.
    #[serde(alias = "timeout", alias = "timeoutMs")]
    pub timeout_ms: i64,
    /// Single namespace prefix; takes precedence over `label_namespaces`.
    #[serde(alias = "labelNamespace")]
    pub label_namespace: Option<String>,
    /// Namespace prefixes eligible for labeling. Empty means all IRIs.
    #[serde(alias = "labelNamespaces")]
    pub label_namespaces: Vec<String>,
    /// Headers sent with every label query.
    pub headers: BTreeMap<String, String>,
    /// Predicate that carries a label.
    #[serde(alias = "labelPredicate")]
    pub label_predicate: String,
    /// Query text with `{{iris}}` (and optionally `{{label}}`) placeholders.
    #[serde(alias = "queryTemplate")]
    pub query_template: Option<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            chunk_size: defaults::LABEL_CHUNK_SIZE as i64,
            concurrency: defaults::LABEL_CONCURRENCY as i64,
            timeout_ms: defaults::LABEL_TIMEOUT_MS as i64,
            label_namespace: None,
            label_namespaces: Vec::new(),
            headers: BTreeMap::new(),
            label_predicate: defaults::LABEL_PREDICATE.to_string(),
            query_template: None,
        }
    }
}

fn positive_or(value: i64, default: u64, name: &str) -> u64 {
    if value > 0 {
        value as u64
    } else {
        debug!(setting = name, value, default, "Non-positive setting, using default");
        default
    }
}

impl LabelConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `LODKIT_LABEL_CHUNK_SIZE` | `30` | Terms per query |
    /// | `LODKIT_LABEL_CONCURRENCY` | `2` | Concurrent queries |
    /// | `LODKIT_LABEL_TIMEOUT_MS` | `1000` | Per-query timeout |
    /// | `LODKIT_LABEL_NAMESPACES` | (all) | Comma-separated prefixes |
    /// | `LODKIT_LABEL_PREDICATE` | `http://schema.org/name` | Label predicate |
    pub fn from_env() -> Self {
        let base = Self::default();
        let int_var = |name: &str, fallback: i64| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(fallback)
        };

        let label_namespaces = std::env::var("LODKIT_LABEL_NAMESPACES")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            chunk_size: int_var("LODKIT_LABEL_CHUNK_SIZE", base.chunk_size),
            concurrency: int_var("LODKIT_LABEL_CONCURRENCY", base.concurrency),
            timeout_ms: int_var("LODKIT_LABEL_TIMEOUT_MS", base.timeout_ms),
            label_namespaces,
            label_predicate: std::env::var("LODKIT_LABEL_PREDICATE")
                .unwrap_or(base.label_predicate),
            ..base
        }
    }

    /// Load the `[labels]` table from a TOML file. A missing table yields defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse the `[labels]` table from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            labels: Option<LabelConfig>,
        }

        let root: TomlRoot = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        Ok(root.labels.unwrap_or_default())
    }

    /// Set terms per query.
    pub fn with_chunk_size(mut self, chunk_size: i64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set maximum concurrent queries.
    pub fn with_concurrency(mut self, concurrency: i64) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-query timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Restrict labeling to a single namespace.
    pub fn with_label_namespace(mut self, prefix: impl Into<String>) -> Self {
        self.label_namespace = Some(prefix.into());
        self
    }

    /// Restrict labeling to several namespaces.
    pub fn with_label_namespaces<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label_namespaces = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Add a header sent with every label query.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the label predicate.
    pub fn with_label_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.label_predicate = predicate.into();
        self
    }

    /// Set the query template.
    pub fn with_query_template(mut self, template: impl Into<String>) -> Self {
        self.query_template = Some(template.into());
        self
    }

    /// Effective terms per query.
    pub fn resolved_chunk_size(&self) -> usize {
        positive_or(
            self.chunk_size,
            defaults::LABEL_CHUNK_SIZE as u64,
            "chunk_size",
        ) as usize
    }

    /// Effective concurrency limit.
    pub fn resolved_concurrency(&self) -> usize {
        positive_or(
            self.concurrency,
            defaults::LABEL_CONCURRENCY as u64,
            "concurrency",
        ) as usize
    }

    /// Effective per-query timeout.
    pub fn resolved_timeout(&self) -> Duration {
        Duration::from_millis(positive_or(
            self.timeout_ms,
            defaults::LABEL_TIMEOUT_MS,
            "timeout_ms",
        ))
    }

    /// Namespace filter described by this config.
    pub fn namespace_filter(&self) -> NamespaceFilter {
        NamespaceFilter::from_config(self.label_namespace.as_deref(), &self.label_namespaces)
    }
}
