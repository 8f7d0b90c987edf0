//! HTTP Transport
//!
//! The one seam between the exchange client and the network. Production code
//! uses [`ReqwestTransport`]; tests script responses.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};

use dca_core::error::{DcaError, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Outgoing request
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body; the client does its own parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one round trip. Only network failures are errors; any HTTP
    /// status comes back as a response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// `reqwest`-backed transport with a bounded timeout.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DcaError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> DcaError {
    if err.is_timeout() {
        DcaError::timeout(err.to_string())
    } else {
        DcaError::transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let req = HttpRequest::post("https://example.test/v1/order", "{}")
            .header("API-KEY", "k")
            .header("Content-Type", "application/json");
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.body.as_deref(), Some("{}"));
        assert_eq!(req.header_value("api-key"), Some("k"));
        assert_eq!(req.header_value("API-SIGN"), None);

        let req = HttpRequest::get("https://example.test/v1/ticker");
        assert_eq!(req.method, Method::GET);
        assert!(req.body.is_none());
    }

    #[test]
    fn test_success_range() {
        assert!(HttpResponse { status: 200, body: String::new() }.is_success());
        assert!(!HttpResponse { status: 401, body: String::new() }.is_success());
        assert!(!HttpResponse { status: 503, body: String::new() }.is_success());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = ReqwestTransport::new(Duration::from_millis(500)).unwrap();
        // port 9 (discard) on loopback is closed on CI machines
        let err = transport
            .send(HttpRequest::get("http://127.0.0.1:9/v1/ticker"))
            .await
            .unwrap_err();
        assert!(err.is_transient(), "{err}");
    }
}
