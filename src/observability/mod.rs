//! Observability module: logging setup and wire dumps.

pub mod dump;
pub mod logging;

pub use dump::TRACE_TARGET;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
