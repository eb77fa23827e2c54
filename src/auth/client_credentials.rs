//! Client Credentials Flow
//!
//! RFC 6749 Section 4.4 - Client Credentials Grant, with token caching.

use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use http::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use super::token::{Token, TokenResponse};
use super::{AuthStyle, TokenSource};
use crate::errors::{InfoSightError, InfoSightResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Client credentials grant parameters.
#[derive(Clone)]
pub struct ClientCredentialsConfig {
    /// OAuth2 client ID.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: SecretString,
    /// Token endpoint URL.
    pub token_url: String,
    /// Requested scopes, space-joined into the `scope` parameter.
    pub scopes: Vec<String>,
    /// How the client authenticates to the token endpoint.
    pub auth_style: AuthStyle,
}

impl std::fmt::Debug for ClientCredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_url", &self.token_url)
            .field("scopes", &self.scopes)
            .field("auth_style", &self.auth_style)
            .finish()
    }
}

struct TokenState {
    token: Option<Token>,
    auth_style: AuthStyle,
}

/// Token source performing the client credentials exchange.
///
/// The token is fetched on first use and reused until it expires. Concurrent
/// callers wait on a single exchange.
pub struct ClientCredentialsTokenSource {
    config: ClientCredentialsConfig,
    transport: Arc<dyn HttpTransport>,
    state: Mutex<TokenState>,
}

impl ClientCredentialsTokenSource {
    /// Creates a new token source sending token requests through `transport`.
    pub fn new(config: ClientCredentialsConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let auth_style = config.auth_style;
        Self {
            config,
            transport,
            state: Mutex::new(TokenState {
                token: None,
                auth_style,
            }),
        }
    }

    /// Returns the token endpoint URL.
    pub fn token_url(&self) -> &str {
        &self.config.token_url
    }

    /// Returns the authentication style in use; `AutoDetect` until probed.
    pub async fn auth_style(&self) -> AuthStyle {
        self.state.lock().await.auth_style
    }

    fn build_request(&self, style: AuthStyle) -> InfoSightResult<HttpRequest> {
        let mut form = url::form_urlencoded::Serializer::new(String::new());
        form.append_pair("grant_type", "client_credentials");
        form.append_pair("scope", &self.config.scopes.join(" "));

        if style == AuthStyle::InParams {
            form.append_pair("client_id", &self.config.client_id);
            form.append_pair("client_secret", self.config.client_secret.expose_secret());
        }

        let mut request = HttpRequest::post(self.config.token_url.clone(), form.finish());
        request.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        if style == AuthStyle::InHeader {
            let credentials = format!(
                "{}:{}",
                query_escape(&self.config.client_id),
                query_escape(self.config.client_secret.expose_secret())
            );
            let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
            let mut value = HeaderValue::from_str(&format!("Basic {}", encoded)).map_err(|e| {
                InfoSightError::Configuration {
                    message: format!("Invalid client credentials header: {}", e),
                }
            })?;
            value.set_sensitive(true);
            request.headers.insert(AUTHORIZATION, value);
        }

        Ok(request)
    }

    async fn request_token(&self, style: AuthStyle) -> InfoSightResult<Token> {
        let request = self.build_request(style)?;
        let response = self.transport.send(&request).await?;

        if !(200..300).contains(&response.status) {
            return Err(token_error_from_response(&response));
        }

        let token_response = if is_form_encoded(&response) {
            TokenResponse::from_form(&response.body)
        } else {
            serde_json::from_slice::<TokenResponse>(&response.body).map_err(|e| {
                InfoSightError::Token {
                    message: format!("cannot parse token response: {}", e),
                    status: Some(response.status),
                }
            })?
        };

        if token_response.access_token.is_empty() {
            return Err(InfoSightError::Token {
                message: "server response missing access_token".to_string(),
                status: Some(response.status),
            });
        }

        Ok(token_response.into_token(Utc::now()))
    }

    async fn retrieve(&self, style: &mut AuthStyle) -> InfoSightResult<Token> {
        if *style != AuthStyle::AutoDetect {
            return self.request_token(*style).await;
        }

        match self.request_token(AuthStyle::InHeader).await {
            Ok(token) => {
                *style = AuthStyle::InHeader;
                Ok(token)
            }
            Err(header_error) => {
                warn!(
                    error = %header_error,
                    "Token request with basic auth failed, retrying with credentials in body"
                );
                let token = self.request_token(AuthStyle::InParams).await?;
                *style = AuthStyle::InParams;
                Ok(token)
            }
        }
    }
}

#[async_trait]
impl TokenSource for ClientCredentialsTokenSource {
    async fn token(&self) -> InfoSightResult<Token> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.token.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.clone());
        }

        debug!(token_url = %self.config.token_url, "Requesting access token");

        let mut style = state.auth_style;
        let result = self.retrieve(&mut style).await;
        state.auth_style = style;

        match result {
            Ok(token) => {
                state.token = Some(token.clone());
                Ok(token)
            }
            Err(e) => {
                error!(
                    error = %e,
                    token_url = %self.config.token_url,
                    "Failed to obtain access token"
                );
                Err(e)
            }
        }
    }
}

/// Escapes a credential the way `application/x-www-form-urlencoded` does.
fn query_escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn is_form_encoded(response: &HttpResponse) -> bool {
    response
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| {
            ct.starts_with("application/x-www-form-urlencoded") || ct.starts_with("text/plain")
        })
}

/// RFC 6749 Section 5.2 error response.
#[derive(serde::Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

fn token_error_from_response(response: &HttpResponse) -> InfoSightError {
    let message = match serde_json::from_slice::<OAuthErrorBody>(&response.body) {
        Ok(OAuthErrorBody {
            error,
            error_description: Some(description),
        }) => format!("{}: {}", error, description),
        Ok(OAuthErrorBody { error, .. }) => error,
        Err(_) => format!(
            "{}: {}",
            response.status_line(),
            String::from_utf8_lossy(&response.body)
        ),
    };

    InfoSightError::Token {
        message,
        status: Some(response.status),
    }
}
