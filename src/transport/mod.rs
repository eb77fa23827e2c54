//! HTTP transport module for the InfoSight client.
//!
//! A transport performs one buffered HTTP exchange. Transports compose by
//! wrapping: the client sends through an authenticating transport, which
//! sends through the bearer-scheme shim, which sends through reqwest.

mod bearer;
mod http_transport;

pub use bearer::BearerSchemeTransport;
pub use http_transport::ReqwestTransport;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use std::sync::Arc;

use crate::errors::InfoSightResult;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET request.
    Get,
    /// POST request.
    Post,
}

impl Method {
    /// Returns the method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Creates a GET request without headers.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Creates a POST request with the given body.
    pub fn post(url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Some(body.into()),
        }
    }
}

/// Fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Returns the status line, e.g. `403 Forbidden`.
    pub fn status_line(&self) -> String {
        match StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
        {
            Some(reason) => format!("{} {}", self.status, reason),
            None => self.status.to_string(),
        }
    }

    /// Returns true for status codes above 399.
    pub fn is_error(&self) -> bool {
        self.status > 399
    }
}

/// Trait for HTTP transport implementations.
///
/// Implementations must not modify the caller's request; wrappers that need
/// to change it work on a copy.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends an HTTP request and returns the buffered response.
    async fn send(&self, request: &HttpRequest) -> InfoSightResult<HttpResponse>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: &HttpRequest) -> InfoSightResult<HttpResponse> {
        (**self).send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(Method::Get), reqwest::Method::GET);
        assert_eq!(reqwest::Method::from(Method::Post), reqwest::Method::POST);
        assert_eq!(Method::Get.as_str(), "GET");
    }

    #[test]
    fn test_status_line() {
        let response = HttpResponse {
            status: 403,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        assert_eq!(response.status_line(), "403 Forbidden");
        assert!(response.is_error());

        let response = HttpResponse {
            status: 399,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        assert!(!response.is_error());

        let response = HttpResponse {
            status: 599,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        assert_eq!(response.status_line(), "599");
    }
}
