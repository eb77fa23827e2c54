//! Configuration module for the InfoSight client.
//!
//! Provides the server URL, OAuth2 credentials, user agent and per-client
//! request settings.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::auth::{AuthStyle, ClientCredentialsConfig};
use crate::client::RequestContext;
use crate::errors::{InfoSightError, InfoSightResult};

/// Default InfoSight API server.
pub const DEFAULT_SERVER: &str = "https://infosight.hpe.com/apis/";

/// Default wellness API version.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Default user agent.
pub const DEFAULT_USER_AGENT: &str = concat!("infosight-client/", env!("CARGO_PKG_VERSION"));

/// Path of the token endpoint, relative to the server URL.
pub const TOKEN_PATH: &str = "oauth/token";

/// Environment variable holding the server URL.
pub const ENV_URL: &str = "INFOSIGHT_URL";
/// Environment variable holding the OAuth2 client key.
pub const ENV_CLIENT_KEY: &str = "INFOSIGHT_CLIENT_KEY";
/// Environment variable holding the OAuth2 client secret.
pub const ENV_CLIENT_SECRET: &str = "INFOSIGHT_CLIENT_SECRET";

/// Configuration for the InfoSight client.
#[derive(Clone)]
pub struct InfoSightConfig {
    /// Server URL, always ending with exactly one `/`.
    pub server: String,
    /// OAuth2 client key.
    pub client_key: String,
    /// OAuth2 client secret (stored securely).
    pub(crate) client_secret: SecretString,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Whether to dump every request and response to the trace log.
    pub trace: bool,
    /// Wellness API version.
    pub api_version: String,
    /// Deadline and cancellation applied to every request.
    pub context: RequestContext,
    /// OAuth2 scopes.
    pub scopes: Vec<String>,
    /// Token endpoint authentication style.
    pub auth_style: AuthStyle,
    /// Timeout of the underlying HTTP client; none by default.
    pub timeout: Option<Duration>,
}

impl InfoSightConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> InfoSightConfigBuilder {
        InfoSightConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `INFOSIGHT_URL`: server URL, the default server when unset or empty
    /// - `INFOSIGHT_CLIENT_KEY`: OAuth2 client key
    /// - `INFOSIGHT_CLIENT_SECRET`: OAuth2 client secret
    pub fn from_env() -> InfoSightResult<Self> {
        Self::builder().from_env().build()
    }

    /// Returns the client secret (exposing the secret).
    pub(crate) fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }

    /// Returns the token endpoint URL.
    pub fn token_url(&self) -> String {
        format!("{}{}", self.server, TOKEN_PATH)
    }

    /// Returns the client credentials grant parameters.
    pub fn client_credentials(&self) -> ClientCredentialsConfig {
        ClientCredentialsConfig {
            client_id: self.client_key.clone(),
            client_secret: SecretString::new(self.client_secret().to_string()),
            token_url: self.token_url(),
            scopes: self.scopes.clone(),
            auth_style: self.auth_style,
        }
    }
}

impl std::fmt::Debug for InfoSightConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfoSightConfig")
            .field("server", &self.server)
            .field("client_key", &self.client_key)
            .field("client_secret", &"[REDACTED]")
            .field("user_agent", &self.user_agent)
            .field("trace", &self.trace)
            .field("api_version", &self.api_version)
            .field("context", &self.context)
            .field("scopes", &self.scopes)
            .field("auth_style", &self.auth_style)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Normalizes a server URL to end with exactly one `/`.
///
/// An empty URL selects [`DEFAULT_SERVER`]. Anything else must parse as an
/// absolute URL.
pub fn normalize_server(base_url: &str) -> InfoSightResult<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(DEFAULT_SERVER.to_string());
    }

    let parsed = url::Url::parse(trimmed)?;
    if parsed.cannot_be_a_base() {
        return Err(InfoSightError::Configuration {
            message: format!("Base URL cannot be used as a base: {}", base_url),
        });
    }

    Ok(format!("{}/", parsed.as_str().trim_end_matches('/')))
}

/// Builder for `InfoSightConfig`.
#[derive(Default)]
pub struct InfoSightConfigBuilder {
    base_url: Option<String>,
    client_key: Option<String>,
    client_secret: Option<String>,
    user_agent: Option<String>,
    trace: bool,
    api_version: Option<String>,
    context: Option<RequestContext>,
    scopes: Vec<String>,
    auth_style: AuthStyle,
    timeout: Option<Duration>,
}

impl InfoSightConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the server URL. An empty string selects the default server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the OAuth2 client key and secret.
    pub fn login(
        mut self,
        client_key: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_key = Some(client_key.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Enables dumping every request and response to the trace log.
    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Sets the wellness API version.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Sets the request context.
    pub fn context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Sets the OAuth2 scopes.
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the token endpoint authentication style.
    pub fn auth_style(mut self, auth_style: AuthStyle) -> Self {
        self.auth_style = auth_style;
        self
    }

    /// Sets a timeout on the underlying HTTP client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Loads the server URL and credentials from the environment.
    ///
    /// Unset variables are read as empty strings.
    pub fn from_env(self) -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        self.base_url(var(ENV_URL))
            .login(var(ENV_CLIENT_KEY), var(ENV_CLIENT_SECRET))
    }

    /// Builds the configuration.
    pub fn build(self) -> InfoSightResult<InfoSightConfig> {
        let server = normalize_server(self.base_url.as_deref().unwrap_or_default())?;

        Ok(InfoSightConfig {
            server,
            client_key: self.client_key.unwrap_or_default(),
            client_secret: SecretString::new(self.client_secret.unwrap_or_default()),
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            trace: self.trace,
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            context: self.context.unwrap_or_default(),
            scopes: self.scopes,
            auth_style: self.auth_style,
            timeout: self.timeout,
        })
    }
}
