//! HTTP transport types and the transport trait.
//!
//! # Design
//! Requests and responses are plain data. `CartClient` builds an
//! `HttpRequest` whose `path` is relative to the API root; the transport owns
//! the base URL and the actual network I/O. This keeps the client core
//! deterministic and lets tests swap in a scripted transport.
//!
//! A transport may hand back non-2xx responses as data, or reject them with
//! `TransportError::Response`. The client normalizes both the same way.

use std::future::Future;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Path relative to the API root, e.g. `checkout/42/items`.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Join `path` onto `base_url` with exactly one `/` between them.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure reported by an `HttpTransport`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server answered, but the transport treats the status as a failure.
    #[error("request rejected with HTTP {}", .0.status)]
    Response(HttpResponse),

    /// No response was received (DNS, refused connection, TLS, ...).
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Executes `HttpRequest`s against a concrete backend.
///
/// Implementations resolve `HttpRequest::path` against their own base URL.
pub trait HttpTransport: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}
