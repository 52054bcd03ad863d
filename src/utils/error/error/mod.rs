//! Gateway error kinds and their HTTP rendering
//!
//! Every failure a caller can observe is one `GatewayError` variant with a
//! stable code and status.

#![allow(missing_docs)]

mod conversions;
mod helpers;
mod response;
mod types;

pub use response::{ErrorDetail, ErrorResponse};
pub use types::{GatewayError, Result};
