//! Fault envelope returned when a request fails.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{InfoSightError, InfoSightResult};
use crate::transport::HttpResponse;

/// Detailed fault information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultDetail {
    /// Vendor error code.
    #[serde(
        rename = "errorcode",
        alias = "errorCode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_code: Option<String>,
}

/// Fault body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    /// Human readable fault description.
    #[serde(
        rename = "faultstring",
        alias = "faultString",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fault_string: Option<String>,
    /// Fault detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<FaultDetail>,
}

/// Fault envelope returned for HTTP status codes above 399.
///
/// `status` and `status_code` are taken from the HTTP response, not the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultResponse {
    /// HTTP status line, e.g. `403 Forbidden`.
    #[serde(skip)]
    pub status: String,
    /// HTTP status code.
    #[serde(skip)]
    pub status_code: u16,
    /// Fault body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
}

impl FaultResponse {
    /// Decodes a fault envelope from an HTTP response.
    pub fn from_response(response: &HttpResponse) -> InfoSightResult<Self> {
        let mut fault: FaultResponse = serde_json::from_slice(&response.body)
            .map_err(|e| InfoSightError::decode(&e, &response.body))?;
        fault.status = response.status_line();
        fault.status_code = response.status;
        Ok(fault)
    }

    /// Returns the fault string, if the server sent a non-empty one.
    pub fn fault_string(&self) -> Option<&str> {
        self.fault
            .as_ref()
            .and_then(|f| f.fault_string.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Returns the vendor error code, if present.
    pub fn error_code(&self) -> Option<&str> {
        self.fault
            .as_ref()
            .and_then(|f| f.detail.as_ref())
            .and_then(|d| d.error_code.as_deref())
    }
}

impl fmt::Display for FaultResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fault_string() {
            Some(message) => f.write_str(message),
            None => f.write_str(&self.status),
        }
    }
}

impl std::error::Error for FaultResponse {}
