//! Authentication module for the InfoSight client.
//!
//! InfoSight uses the OAuth2 client credentials grant. A [`TokenSource`]
//! hands out valid access tokens and an [`AuthenticatedTransport`] attaches
//! them to outgoing requests.

mod client_credentials;
mod token;

pub use client_credentials::{ClientCredentialsConfig, ClientCredentialsTokenSource};
pub use token::{Token, EXPIRY_DELTA_SECS};

use async_trait::async_trait;
use http::header::{HeaderValue, AUTHORIZATION};
use std::sync::Arc;

use crate::errors::{InfoSightError, InfoSightResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// How the client authenticates itself to the token endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthStyle {
    /// Try `InHeader` first and fall back to `InParams`; the style that
    /// works is remembered.
    #[default]
    AutoDetect,
    /// HTTP Basic authentication header.
    InHeader,
    /// `client_id` and `client_secret` in the form body.
    InParams,
}

/// Trait for access token providers.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns a valid token, fetching or refreshing it if necessary.
    async fn token(&self) -> InfoSightResult<Token>;
}

/// Transport that attaches `Authorization: <type> <token>` to each request.
pub struct AuthenticatedTransport {
    source: Arc<dyn TokenSource>,
    inner: Arc<dyn HttpTransport>,
}

impl AuthenticatedTransport {
    /// Creates a transport sending through `inner` with tokens from `source`.
    pub fn new(source: Arc<dyn TokenSource>, inner: Arc<dyn HttpTransport>) -> Self {
        Self { source, inner }
    }
}

#[async_trait]
impl HttpTransport for AuthenticatedTransport {
    async fn send(&self, request: &HttpRequest) -> InfoSightResult<HttpResponse> {
        let token = self.source.token().await?;

        let mut value = HeaderValue::from_str(&token.authorization_value()).map_err(|e| {
            InfoSightError::Token {
                message: format!("token is not a valid header value: {}", e),
                status: None,
            }
        })?;
        value.set_sensitive(true);

        let mut authorized = request.clone();
        authorized.headers.insert(AUTHORIZATION, value);

        self.inner.send(&authorized).await
    }
}
