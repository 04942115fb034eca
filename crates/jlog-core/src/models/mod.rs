//! Shared data models for the journal gateway

mod boot;
mod entry;
mod filter;

pub use boot::*;
pub use entry::*;
pub use filter::*;
