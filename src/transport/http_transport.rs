//! HTTP transport implementation using reqwest.

use async_trait::async_trait;
use std::time::Duration;

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::errors::{InfoSightError, InfoSightResult};

/// Reqwest-based HTTP transport implementation.
///
/// Status codes are returned as-is; mapping them to errors is left to the
/// caller.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a new reqwest transport without a request timeout.
    pub fn new() -> InfoSightResult<Self> {
        Self::with_timeout(None)
    }

    /// Creates a new reqwest transport with an optional request timeout.
    pub fn with_timeout(timeout: Option<Duration>) -> InfoSightResult<Self> {
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(10);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| InfoSightError::Configuration {
            message: format!("Failed to create HTTP client: {}", e),
        })?;

        Ok(Self { client })
    }

    /// Creates a new transport with a custom client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> InfoSightResult<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new().is_ok());
        assert!(ReqwestTransport::with_timeout(Some(Duration::from_secs(30))).is_ok());
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let transport = ReqwestTransport::new().unwrap();
        let result = transport
            .send(&HttpRequest::get("http://127.0.0.1:1/unreachable"))
            .await;

        assert!(matches!(result, Err(InfoSightError::Transport { .. })));
    }
}
