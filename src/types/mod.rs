//! Wire types for the InfoSight API.

pub mod envelope;
pub mod fault;

pub use envelope::{ApiResponse, FilterInfo, Order, PagingInfo, RequestInfo, Sorting, Status};
pub use fault::{Fault, FaultDetail, FaultResponse};
