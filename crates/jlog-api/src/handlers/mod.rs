//! Request handlers for the RPC surface

pub mod logs;
