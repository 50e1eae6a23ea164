//! `HttpTransport` backed by `reqwest`.
//!
//! Non-2xx responses are returned as data; only failures without a response
//! become `TransportError::Connection`.

use std::fmt::Display;

use reqwest::Client;
use tracing::warn;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Cloneable transport bound to an API root such as `https://shop.example.com/api`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Replace the default `reqwest::Client` (timeouts, proxies, auth headers).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
        };
        let mut builder = self.http.request(method, request.url(&self.base_url));
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(key, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (key.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await;

        Ok(assemble_response(status, headers, body))
    }
}

/// Once the status line is in, the response is kept even if the body
/// cannot be read; the body is then empty.
fn assemble_response<E: Display>(
    status: u16,
    headers: Vec<(String, String)>,
    body: Result<String, E>,
) -> HttpResponse {
    let body = body.unwrap_or_else(|err| {
        warn!(status, error = %err, "failed to read response body");
        String::new()
    });
    HttpResponse {
        status,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_body_keeps_status_and_headers() {
        let headers = vec![("content-type".to_string(), "application/json".to_string())];
        let response = assemble_response(402, headers.clone(), Err("connection reset"));
        assert_eq!(response.status, 402);
        assert_eq!(response.headers, headers);
        assert!(response.body.is_empty());
    }

    #[test]
    fn readable_body_is_kept() {
        let response = assemble_response::<&str>(200, Vec::new(), Ok("{}".to_string()));
        assert_eq!(response.body, "{}");
    }

    #[test]
    fn base_url_is_kept_verbatim() {
        let transport = ReqwestTransport::new("http://localhost:3000/api/");
        assert_eq!(transport.base_url(), "http://localhost:3000/api/");
    }
}
