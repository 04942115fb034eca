//! jlog-core - Core types for the jlog journal gateway
//!
//! This crate provides the data model shared by the journal backend and the
//! RPC layer: log entries, boot session records, query filters, the error
//! taxonomy and the cooperative cancellation token.

pub mod cancel;
pub mod error;
pub mod models;

pub use cancel::{CancelSlot, CancelToken};
pub use error::{GatewayError, GatewayResult};
pub use models::*;
