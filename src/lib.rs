//! HPE InfoSight Client Library
//!
//! An async Rust client for the HPE InfoSight REST API. It authenticates
//! with OAuth2 client credentials and reads wellness object sets such as
//! issues.
//!
//! # Features
//!
//! - **OAuth2**: Client credentials grant with token caching and refresh
//! - **Wellness**: Object sets returned as a generic envelope, API faults as typed errors
//! - **Request Context**: Per-request deadlines and cancellation
//! - **Observability**: `tracing` events and optional wire dumps of every exchange
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use infosight_client::{InfoSightClient, WellnessService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = InfoSightClient::builder()
//!         .login("client-key", "client-secret")
//!         .build()?;
//!
//!     let issues = client.wellness().fetch_issues().await?;
//!     for issue in issues.data() {
//!         println!("{}", issue);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod services;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use auth::AuthStyle;
pub use client::{InfoSightClient, InfoSightClientBuilder, RequestContext};
pub use config::{InfoSightConfig, InfoSightConfigBuilder};
pub use errors::{InfoSightError, InfoSightResult};
pub use services::{Wellness, WellnessService};
pub use types::{ApiResponse, FaultResponse};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
