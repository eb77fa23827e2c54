//! InfoSight API client.

mod context;

pub use context::RequestContext;

use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::{AuthStyle, AuthenticatedTransport, ClientCredentialsTokenSource};
use crate::config::{InfoSightConfig, InfoSightConfigBuilder};
use crate::errors::{InfoSightError, InfoSightResult};
use crate::observability::dump::trace_exchange;
use crate::services::Wellness;
use crate::transport::{
    BearerSchemeTransport, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
};

const APPLICATION_JSON: &str = "application/json";

/// The main InfoSight client.
///
/// Owns its configuration and the authenticated transport. Resource
/// accessors such as [`Wellness`] borrow it.
pub struct InfoSightClient {
    config: InfoSightConfig,
    transport: Arc<dyn HttpTransport>,
}

impl InfoSightClient {
    /// Creates a client with the default transport stack: OAuth2 client
    /// credentials over the bearer-scheme shim over reqwest.
    pub fn new(config: InfoSightConfig) -> InfoSightResult<Self> {
        let base: Arc<dyn HttpTransport> = Arc::new(BearerSchemeTransport::new(
            ReqwestTransport::with_timeout(config.timeout)?,
        ));
        let source = Arc::new(ClientCredentialsTokenSource::new(
            config.client_credentials(),
            base.clone(),
        ));
        let transport = Arc::new(AuthenticatedTransport::new(source, base));

        Ok(Self::with_transport(config, transport))
    }

    /// Creates a client sending through the given transport.
    ///
    /// The transport is expected to take care of authentication.
    pub fn with_transport(config: InfoSightConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// Creates a new client builder.
    pub fn builder() -> InfoSightClientBuilder {
        InfoSightClientBuilder::new()
    }

    /// Creates a client from `INFOSIGHT_URL`, `INFOSIGHT_CLIENT_KEY` and
    /// `INFOSIGHT_CLIENT_SECRET`.
    pub fn from_env() -> InfoSightResult<Self> {
        Self::builder().from_env().build()
    }

    /// Returns the server URL, ending with `/`.
    pub fn server(&self) -> &str {
        &self.config.server
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &InfoSightConfig {
        &self.config
    }

    /// Returns the request context.
    pub fn context(&self) -> &RequestContext {
        &self.config.context
    }

    /// Returns the wellness accessor.
    pub fn wellness(&self) -> Wellness<'_> {
        Wellness::new(self)
    }

    fn apply_headers(&self, request: &mut HttpRequest) -> InfoSightResult<()> {
        let user_agent = HeaderValue::from_str(&self.config.user_agent).map_err(|e| {
            InfoSightError::Configuration {
                message: format!("Invalid user agent: {}", e),
            }
        })?;

        request.headers.insert(USER_AGENT, user_agent);
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        Ok(())
    }

    /// Executes a request.
    ///
    /// Sets the standard headers and runs the exchange under the client's
    /// request context. Any HTTP status is returned as a response; only
    /// failures to complete the exchange are errors.
    pub async fn execute(&self, mut request: HttpRequest) -> InfoSightResult<HttpResponse> {
        self.apply_headers(&mut request)?;

        debug!(method = request.method.as_str(), url = %request.url, "Sending request");

        let result = self.config.context.run(self.transport.send(&request)).await;

        if self.config.trace {
            trace_exchange(&request, result.as_ref().ok());
        }

        match &result {
            Ok(response) => {
                debug!(status = response.status, url = %request.url, "Received response")
            }
            Err(e) => warn!(error = %e, url = %request.url, "Request failed"),
        }

        result
    }
}

impl std::fmt::Debug for InfoSightClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfoSightClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for the InfoSight client.
#[derive(Default)]
pub struct InfoSightClientBuilder {
    config: InfoSightConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl InfoSightClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the server URL. An empty string selects the default server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = self.config.base_url(base_url);
        self
    }

    /// Sets the OAuth2 client key and secret.
    pub fn login(
        mut self,
        client_key: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.config = self.config.login(client_key, client_secret);
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Enables request and response dumps on the trace log.
    pub fn trace(mut self, trace: bool) -> Self {
        self.config = self.config.trace(trace);
        self
    }

    /// Sets the request context.
    pub fn context(mut self, context: RequestContext) -> Self {
        self.config = self.config.context(context);
        self
    }

    /// Sets the wellness API version.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config = self.config.api_version(api_version);
        self
    }

    /// Sets the OAuth2 scopes.
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config = self.config.scopes(scopes);
        self
    }

    /// Sets the token endpoint authentication style.
    pub fn auth_style(mut self, auth_style: AuthStyle) -> Self {
        self.config = self.config.auth_style(auth_style);
        self
    }

    /// Sets a timeout on the underlying HTTP client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Loads the server URL and credentials from the environment.
    pub fn from_env(mut self) -> Self {
        self.config = self.config.from_env();
        self
    }

    /// Replaces the default authenticated transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> InfoSightResult<InfoSightClient> {
        let config = self.config.build()?;
        match self.transport {
            Some(transport) => Ok(InfoSightClient::with_transport(config, transport)),
            None => InfoSightClient::new(config),
        }
    }
}
