//! Wellness service.

use async_trait::async_trait;
use tracing::debug;

use crate::client::InfoSightClient;
use crate::errors::{InfoSightError, InfoSightResult};
use crate::transport::HttpRequest;
use crate::types::{ApiResponse, FaultResponse};

/// Object set holding the wellness issues.
pub const ISSUES: &str = "issues";

/// Wellness service trait.
#[async_trait]
pub trait WellnessService: Send + Sync {
    /// Fetches the named object set.
    ///
    /// An error status from the server is returned as
    /// [`InfoSightError::Fault`].
    async fn fetch_object_set(&self, object_set: &str) -> InfoSightResult<ApiResponse>;

    /// Fetches the wellness issues.
    async fn fetch_issues(&self) -> InfoSightResult<ApiResponse> {
        self.fetch_object_set(ISSUES).await
    }
}

/// Accessor for the wellness API of a client.
#[derive(Debug, Clone)]
pub struct Wellness<'a> {
    client: &'a InfoSightClient,
    version: String,
}

impl<'a> Wellness<'a> {
    /// Creates an accessor using the client's configured API version.
    pub fn new(client: &'a InfoSightClient) -> Self {
        Self {
            client,
            version: client.config().api_version.clone(),
        }
    }

    /// Overrides the API version for this accessor.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Returns the API version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the URL of the named object set.
    pub fn object_set_url(&self, object_set: &str) -> String {
        format!(
            "{}wellness/{}/{}?domain=urn:nimble",
            self.client.server(),
            self.version,
            object_set
        )
    }
}

#[async_trait]
impl WellnessService for Wellness<'_> {
    async fn fetch_object_set(&self, object_set: &str) -> InfoSightResult<ApiResponse> {
        let request = HttpRequest::get(self.object_set_url(object_set));
        let response = self.client.execute(request).await?;

        if response.is_error() {
            let fault = FaultResponse::from_response(&response)?;
            debug!(status = response.status, object_set, fault = %fault, "Wellness fault");
            return Err(InfoSightError::Fault(fault));
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| InfoSightError::decode(&e, &response.body))
    }
}
