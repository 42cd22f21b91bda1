//! `forgekit-core` — shared contract primitives.
//!
//! This crate contains the pieces every other crate agrees on (error codes,
//! response envelope bodies, id generation) and **no infrastructure concerns**.

pub mod envelope;
pub mod error;
pub mod id;

pub use envelope::{ErrorBody, ErrorDetail, SuccessBody};
pub use error::ErrorCode;
pub use id::new_id;
