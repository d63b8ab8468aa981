//! Core traits for lodkit abstractions.
//!
//! These traits define the collaborator contracts the label engine consumes:
//! something that executes queries against a store, and something that holds
//! quads it can scan.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use oxrdf::{Dataset, Graph, GraphNameRef, NamedNodeRef, QuadRef};

use crate::error::Result;

// =============================================================================
// QUERY EXECUTION
// =============================================================================

/// Options passed alongside a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Whether the query is an ASK query (boolean result rather than a graph).
    pub ask: bool,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
}

impl QueryOptions {
    /// Options for a graph-producing (CONSTRUCT / DESCRIBE) query.
    pub fn graph() -> Self {
        Self::default()
    }

    /// Options for an ASK query.
    pub fn ask() -> Self {
        Self {
            ask: true,
            headers: BTreeMap::new(),
        }
    }

    /// Set the request headers.
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Add a single request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Response body as a stream of byte chunks.
pub type ResponseBody = BoxStream<'static, Result<Bytes>>;

/// A raw query response: declared content type plus a body stream.
pub struct QueryResponse {
    /// Content type as declared by the store (may carry parameters).
    pub content_type: String,
    /// Response body.
    pub body: ResponseBody,
}

impl QueryResponse {
    /// Create a response from a body stream.
    pub fn new(content_type: impl Into<String>, body: ResponseBody) -> Self {
        Self {
            content_type: content_type.into(),
            body,
        }
    }

    /// Create a response from an in-memory body.
    pub fn from_bytes(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        Self::new(content_type, stream::once(async move { Ok(body) }).boxed())
    }

    /// Drain the body stream into a single buffer.
    pub async fn into_bytes(self) -> Result<Bytes> {
        let mut body = self.body;
        let mut buf = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl fmt::Debug for QueryResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResponse")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Executes query text against a store.
///
/// Implementations must fail on network or store errors; callers treat any
/// error as a failure of that single query.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute a query and return the raw response.
    async fn query(&self, query: &str, options: &QueryOptions) -> Result<QueryResponse>;
}

// =============================================================================
// GRAPH ACCESS
// =============================================================================

/// Read-only quad container the label engine can scan.
pub trait QuadSource {
    /// Iterate over every quad.
    fn quads(&self) -> Box<dyn Iterator<Item = QuadRef<'_>> + '_>;

    /// Whether `node` has at least one outgoing edge via `predicate`.
    fn has_outgoing(&self, node: NamedNodeRef<'_>, predicate: NamedNodeRef<'_>) -> bool;
}

impl QuadSource for Dataset {
    fn quads(&self) -> Box<dyn Iterator<Item = QuadRef<'_>> + '_> {
        Box::new(self.iter())
    }

    fn has_outgoing(&self, node: NamedNodeRef<'_>, predicate: NamedNodeRef<'_>) -> bool {
        self.quads_for_subject(node)
            .any(|quad| quad.predicate == predicate)
    }
}

impl QuadSource for Graph {
    fn quads(&self) -> Box<dyn Iterator<Item = QuadRef<'_>> + '_> {
        Box::new(
            self.iter()
                .map(|triple| triple.in_graph(GraphNameRef::DefaultGraph)),
        )
    }

    fn has_outgoing(&self, node: NamedNodeRef<'_>, predicate: NamedNodeRef<'_>) -> bool {
        self.object_for_subject_predicate(node, predicate).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{GraphName, Literal, NamedNode, Quad, Triple};

    fn iri(s: &str) -> NamedNode {
        NamedNode::new_unchecked(s)
    }

    #[test]
    fn test_query_options_ask() {
        let opts = QueryOptions::ask().with_header("X-Test", "1");
        assert!(opts.ask);
        assert_eq!(opts.headers.get("X-Test").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_query_options_graph_default() {
        let opts = QueryOptions::graph();
        assert!(!opts.ask);
        assert!(opts.headers.is_empty());
    }

    #[tokio::test]
    async fn test_query_response_from_bytes_round_trip() {
        let response = QueryResponse::from_bytes("text/turtle", "<a> <b> <c> .");
        assert_eq!(response.content_type, "text/turtle");
        let body = response.into_bytes().await.unwrap();
        assert_eq!(&body[..], b"<a> <b> <c> .");
    }

    #[tokio::test]
    async fn test_query_response_concatenates_chunks() {
        let chunks = vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"cd"))];
        let response = QueryResponse::new("text/plain", stream::iter(chunks).boxed());
        let body = response.into_bytes().await.unwrap();
        assert_eq!(&body[..], b"abcd");
    }

    #[tokio::test]
    async fn test_query_response_propagates_stream_error() {
        let chunks = vec![
            Ok(Bytes::from_static(b"ab")),
            Err(crate::Error::Request("connection reset".into())),
        ];
        let response = QueryResponse::new("text/plain", stream::iter(chunks).boxed());
        assert!(response.into_bytes().await.is_err());
    }

    #[test]
    fn test_dataset_has_outgoing() {
        let name = iri("http://schema.org/name");
        let mut dataset = Dataset::new();
        dataset.insert(&Quad::new(
            iri("http://example.com/a"),
            name.clone(),
            Literal::new_simple_literal("A"),
            GraphName::DefaultGraph,
        ));

        assert!(dataset.has_outgoing(iri("http://example.com/a").as_ref(), name.as_ref()));
        assert!(!dataset.has_outgoing(iri("http://example.com/b").as_ref(), name.as_ref()));
        assert_eq!(dataset.quads().count(), 1);
    }

    #[test]
    fn test_graph_quads_are_in_default_graph() {
        let mut graph = Graph::new();
        graph.insert(&Triple::new(
            iri("http://example.com/a"),
            iri("http://example.com/p"),
            iri("http://example.com/b"),
        ));

        let quads: Vec<_> = graph.quads().collect();
        assert_eq!(quads.len(), 1);
        assert!(quads[0].graph_name.is_default_graph());
        assert!(!graph.has_outgoing(
            iri("http://example.com/a").as_ref(),
            iri("http://schema.org/name").as_ref()
        ));
    }
}
