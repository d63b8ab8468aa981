//! SPARQL client configuration.
//!
//! Configuration can be loaded from:
//! - TOML files (a `[sparql]` table)
//! - Environment variables (`LODKIT_SPARQL_*` prefixed)

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lodkit_core::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for lodkit_core::Error {
    fn from(e: ConfigError) -> Self {
        lodkit_core::Error::Config(e.to_string())
    }
}

/// SPARQL endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparqlConfig {
    /// Query endpoint URL.
    pub endpoint_url: String,
    /// Overall request timeout in seconds.
    pub timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Headers sent with every request. Per-query headers take precedence.
    pub headers: BTreeMap<String, String>,
}

impl Default for SparqlConfig {
    fn default() -> Self {
        Self {
            endpoint_url: defaults::SPARQL_ENDPOINT.to_string(),
            timeout_secs: defaults::SPARQL_TIMEOUT_SECS,
            user_agent: defaults::SPARQL_USER_AGENT.to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl SparqlConfig {
    /// Config for the given endpoint with defaults elsewhere.
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            ..Default::default()
        }
    }

    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `LODKIT_SPARQL_ENDPOINT` | `http://localhost:7200/sparql` | Query endpoint |
    /// | `LODKIT_SPARQL_TIMEOUT_SECS` | `30` | Request timeout |
    /// | `LODKIT_SPARQL_USER_AGENT` | `lodkit/<version>` | User agent |
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            endpoint_url: std::env::var("LODKIT_SPARQL_ENDPOINT").unwrap_or(base.endpoint_url),
            timeout_secs: std::env::var("LODKIT_SPARQL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(base.timeout_secs),
            user_agent: std::env::var("LODKIT_SPARQL_USER_AGENT").unwrap_or(base.user_agent),
            headers: base.headers,
        }
    }

    /// Load the `[sparql]` table from a TOML file. A missing table yields defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse the `[sparql]` table from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            sparql: Option<SparqlConfig>,
        }

        let root: TomlRoot = toml::from_str(content)?;
        Ok(root.sparql.unwrap_or_default())
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = endpoint_url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.endpoint_url.is_empty() {
            return Err(ConfigError::Validation(
                "SPARQL endpoint_url cannot be empty".to_string(),
            ));
        }

        if !self.endpoint_url.starts_with("http://") && !self.endpoint_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "SPARQL endpoint_url must start with http:// or https://, got: {}",
                self.endpoint_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "SPARQL timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
