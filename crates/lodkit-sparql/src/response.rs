//! Response adapter over `reqwest::Response`.
//!
//! `SparqlResponse` keeps the status, headers and URL of the HTTP response
//! available after the body has been consumed. The body is read on first
//! access and cached, so callers can inspect it more than once and still hand
//! the response on as a [`QueryResponse`].

use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Response, StatusCode, Url};

use lodkit_core::{Error, QueryResponse, Result};

/// Content type assumed when the store does not declare one.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// An HTTP response from a SPARQL endpoint.
#[derive(Debug)]
pub struct SparqlResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    inner: Option<Response>,
    body: Option<Bytes>,
}

impl SparqlResponse {
    /// Wrap a response without reading its body.
    pub fn new(response: Response) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            url: response.url().clone(),
            inner: Some(response),
            body: None,
        }
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Final URL after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Declared content type, verbatim (parameters included).
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Whether the body has already been read.
    pub fn is_body_cached(&self) -> bool {
        self.body.is_some()
    }

    /// Read the body, caching it for later calls.
    pub async fn body(&mut self) -> Result<&Bytes> {
        if let Some(inner) = self.inner.take() {
            self.body = Some(inner.bytes().await?);
        }
        self.body
            .as_ref()
            .ok_or_else(|| Error::Internal("response body is no longer available".to_string()))
    }

    /// Read the body as UTF-8 text.
    pub async fn text(&mut self) -> Result<String> {
        let body = self.body().await?;
        Ok(String::from_utf8_lossy(body).into_owned())
    }

    /// Convert into a core [`QueryResponse`].
    ///
    /// A cached body is reused; otherwise the body is streamed.
    pub fn into_query_response(self) -> QueryResponse {
        let content_type = self
            .content_type()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();

        match (self.body, self.inner) {
            (Some(body), _) => QueryResponse::from_bytes(content_type, body),
            (None, Some(inner)) => QueryResponse::new(
                content_type,
                inner
                    .bytes_stream()
                    .map(|chunk| chunk.map_err(Error::from))
                    .boxed(),
            ),
            (None, None) => QueryResponse::from_bytes(content_type, Bytes::new()),
        }
    }
}
