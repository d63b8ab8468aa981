//! SPARQL 1.1 protocol client.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use lodkit_core::{defaults, Error, QueryExecutor, QueryOptions, QueryResponse, Result};

use crate::config::SparqlConfig;
use crate::response::SparqlResponse;

/// Client for a single SPARQL query endpoint.
///
/// Queries are sent as `application/x-www-form-urlencoded` POST requests.
/// Compressed responses (gzip, brotli, deflate) are decoded transparently.
#[derive(Debug, Clone)]
pub struct SparqlClient {
    client: Client,
    config: SparqlConfig,
}

impl SparqlClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SparqlConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            endpoint = %config.endpoint_url,
            timeout_secs = config.timeout_secs,
            "Initializing SPARQL client"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(SparqlConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &SparqlConfig {
        &self.config
    }

    /// Configured headers overlaid with per-query headers.
    fn merged_headers(&self, options: &QueryOptions) -> BTreeMap<String, String> {
        let mut headers = self.config.headers.clone();
        headers.extend(options.headers.clone());
        headers
    }

    fn build_request(&self, query: &str, options: &QueryOptions) -> reqwest::RequestBuilder {
        let accept = if options.ask {
            defaults::SPARQL_ACCEPT_ASK
        } else {
            defaults::SPARQL_ACCEPT_GRAPH
        };

        let mut req = self
            .client
            .post(&self.config.endpoint_url)
            .header(ACCEPT, accept)
            .form(&[("query", query)]);

        for (name, value) in self.merged_headers(options) {
            req = req.header(name, value);
        }
        req
    }

    /// Send a query and return the raw response, failing on non-success status.
    #[instrument(skip(self, query, options), fields(subsystem = "sparql", component = "client", op = "query", endpoint = %self.config.endpoint_url, ask = options.ask))]
    pub async fn send(&self, query: &str, options: &QueryOptions) -> Result<SparqlResponse> {
        let start = Instant::now();

        let response = self
            .build_request(query, options)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;

        let mut response = SparqlResponse::new(response);
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let excerpt = truncate_body(&body, defaults::SPARQL_ERROR_BODY_MAX_BYTES);
            let ellipsis = if excerpt.len() < body.len() { "..." } else { "" };
            return Err(Error::Request(format!(
                "SPARQL endpoint returned {}: {}{}",
                status, excerpt, ellipsis
            )));
        }

        debug!(
            status = response.status().as_u16(),
            content_type = response.content_type().unwrap_or_default(),
            duration_ms = start.elapsed().as_millis() as u64,
            "SPARQL response received"
        );
        Ok(response)
    }

    /// Run an ASK query.
    pub async fn ask(&self, query: &str) -> Result<bool> {
        #[derive(Deserialize)]
        struct AskResult {
            boolean: bool,
        }

        let mut response = self.send(query, &QueryOptions::ask()).await?;
        let result: AskResult = serde_json::from_slice(response.body().await?)?;
        Ok(result.boolean)
    }

    /// Check that the endpoint answers a trivial ASK query.
    pub async fn health_check(&self) -> Result<bool> {
        match self.ask("ASK {}").await {
            Ok(_) => {
                info!(endpoint = %self.config.endpoint_url, "SPARQL health check passed");
                Ok(true)
            }
            Err(e) => {
                warn!(endpoint = %self.config.endpoint_url, error = %e, "SPARQL health check failed");
                Ok(false)
            }
        }
    }
}

/// Longest prefix of `body` that fits in `max` bytes without splitting a char.
fn truncate_body(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[async_trait]
impl QueryExecutor for SparqlClient {
    async fn query(&self, query: &str, options: &QueryOptions) -> Result<QueryResponse> {
        Ok(self.send(query, options).await?.into_query_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = SparqlClient::new(SparqlConfig::new("not-a-url"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short", 512), "short");
        assert_eq!(truncate_body("abcdef", 4), "abcd");
        // "é" is two bytes; a cut inside it backs off to the previous boundary.
        assert_eq!(truncate_body("aé", 2), "a");
        assert_eq!(truncate_body(&"x".repeat(2000), 512).len(), 512);
    }

    #[test]
    fn test_merged_headers_prefer_query_headers() {
        let client = SparqlClient::new(
            SparqlConfig::new("http://localhost:3030/ds/query")
                .with_header("X-Source", "config")
                .with_header("X-Keep", "kept"),
        )
        .unwrap();

        let options = QueryOptions::graph().with_header("X-Source", "query");
        let headers = client.merged_headers(&options);

        assert_eq!(headers.get("X-Source").map(String::as_str), Some("query"));
        assert_eq!(headers.get("X-Keep").map(String::as_str), Some("kept"));
    }

    #[test]
    fn test_build_request_sets_accept_and_form_body() {
        let client = SparqlClient::new(SparqlConfig::new("http://localhost:3030/ds/query")).unwrap();
        let request = client
            .build_request("ASK {}", &QueryOptions::ask())
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.headers().get(ACCEPT).unwrap(),
            defaults::SPARQL_ACCEPT_ASK
        );
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, b"query=ASK+%7B%7D");
    }
}
