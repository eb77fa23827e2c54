//! Authorization scheme rewrite for the InfoSight token server.
//!
//! InfoSight issues tokens of type `BearerToken` but only accepts the
//! standard `Bearer` scheme on API calls.

use async_trait::async_trait;
use http::header::{HeaderValue, AUTHORIZATION};

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::errors::InfoSightResult;

const NON_STANDARD_PREFIX: &str = "BearerToken ";
const STANDARD_PREFIX: &str = "Bearer ";

/// Transport wrapper that rewrites `Authorization: BearerToken <v>` into
/// `Authorization: Bearer <v>`.
///
/// The wrapped transport always receives a copy of the request. Every other
/// header and field is forwarded unchanged, as are errors.
#[derive(Debug, Clone)]
pub struct BearerSchemeTransport<T> {
    inner: T,
}

impl<T> BearerSchemeTransport<T> {
    /// Wraps a transport.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Returns the wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

/// Returns the standard form of a `BearerToken` authorization value, or
/// `None` if no rewrite applies.
fn rewrite_scheme(value: &HeaderValue) -> Option<HeaderValue> {
    let credential = value.as_bytes().strip_prefix(NON_STANDARD_PREFIX.as_bytes())?;

    let mut rewritten = Vec::with_capacity(STANDARD_PREFIX.len() + credential.len());
    rewritten.extend_from_slice(STANDARD_PREFIX.as_bytes());
    rewritten.extend_from_slice(credential);

    let mut header = HeaderValue::from_bytes(&rewritten).ok()?;
    header.set_sensitive(value.is_sensitive());
    Some(header)
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for BearerSchemeTransport<T> {
    async fn send(&self, request: &HttpRequest) -> InfoSightResult<HttpResponse> {
        let mut forwarded = request.clone();

        if let Some(rewritten) = request.headers.get(AUTHORIZATION).and_then(rewrite_scheme) {
            forwarded.headers.insert(AUTHORIZATION, rewritten);
        }

        self.inner.send(&forwarded).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InfoSightError;
    use crate::mocks::{MockResponse, MockTransport};
    use http::header::{ACCEPT, USER_AGENT};
    use std::sync::Arc;

    fn request_with_auth(auth: &'static str) -> HttpRequest {
        let mut request = HttpRequest::get("https://example.com/api/wellness/v1/issues");
        request
            .headers
            .insert(AUTHORIZATION, HeaderValue::from_static(auth));
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        request
            .headers
            .insert(USER_AGENT, HeaderValue::from_static("test-agent"));
        request
    }

    #[tokio::test]
    async fn test_rewrites_bearer_token_scheme() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue_response(MockResponse::json(200, serde_json::json!({})));
        let transport = BearerSchemeTransport::new(mock.clone());

        let request = request_with_auth("BearerToken abc123");
        transport.send(&request).await.unwrap();

        let forwarded = mock.last_request().unwrap();
        assert_eq!(forwarded.headers.get(AUTHORIZATION).unwrap(), "Bearer abc123");
        assert_eq!(forwarded.headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(forwarded.headers.get(USER_AGENT).unwrap(), "test-agent");
        assert_eq!(forwarded.headers.len(), request.headers.len());
        assert_eq!(forwarded.url, request.url);
        assert_eq!(forwarded.method, request.method);

        // The caller's request is untouched.
        assert_eq!(
            request.headers.get(AUTHORIZATION).unwrap(),
            "BearerToken abc123"
        );
    }

    #[tokio::test]
    async fn test_other_schemes_pass_through() {
        let mock = Arc::new(MockTransport::new());
        let transport = BearerSchemeTransport::new(mock.clone());

        for auth in ["Bearer abc", "Basic dXNlcjpwYXNz", "BearerTokenabc", "bearertoken abc"] {
            mock.enqueue_response(MockResponse::json(200, serde_json::json!({})));
            transport.send(&request_with_auth(auth)).await.unwrap();

            let forwarded = mock.last_request().unwrap();
            assert_eq!(forwarded.headers.get(AUTHORIZATION).unwrap(), auth);
        }
    }

    #[tokio::test]
    async fn test_request_without_authorization() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue_response(MockResponse::json(200, serde_json::json!({})));
        let transport = BearerSchemeTransport::new(mock.clone());

        transport
            .send(&HttpRequest::get("https://example.com/"))
            .await
            .unwrap();

        assert!(mock.last_request().unwrap().headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue_transport_error("connection reset");
        let transport = BearerSchemeTransport::new(mock.clone());

        let result = transport.send(&request_with_auth("BearerToken abc")).await;

        match result {
            Err(InfoSightError::Transport { message }) => assert_eq!(message, "connection reset"),
            other => panic!("Expected Transport error, got {:?}", other),
        }
        assert_eq!(mock.request_count(), 1);
    }

    #[test]
    fn test_rewrite_keeps_credential_bytes() {
        let value = HeaderValue::from_static("BearerToken a.b-c_d==");
        assert_eq!(rewrite_scheme(&value).unwrap(), "Bearer a.b-c_d==");
        assert!(rewrite_scheme(&HeaderValue::from_static("Bearer x")).is_none());
    }
}
