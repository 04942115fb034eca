//! Narrow iteration interface over the journal store
//!
//! The gateway never touches the storage engine directly: it opens a scan
//! through [`JournalStore`] and drives the returned [`JournalCursor`] one
//! record at a time. The production adapter streams `journalctl -o export`
//! output; tests use the in-memory [`MockJournalStore`].
//!
//! Resource release is tied to cursor drop, so every exit path of a scan -
//! exhaustion, limit, cancellation, error - closes the underlying handle.

mod journalctl;
mod mock;

pub use journalctl::JournalctlStore;
pub use mock::MockJournalStore;

use jlog_core::GatewayResult;

use crate::planner::ScanPlan;

/// Journal field holding the message text
pub const FIELD_MESSAGE: &str = "MESSAGE";
/// Journal field holding the syslog priority
pub const FIELD_PRIORITY: &str = "PRIORITY";
/// Journal field holding the wall-clock timestamp in microseconds
pub const FIELD_REALTIME: &str = "__REALTIME_TIMESTAMP";
/// Journal field holding the opaque position token
pub const FIELD_CURSOR: &str = "__CURSOR";
/// Journal field holding the originating systemd unit
pub const FIELD_UNIT: &str = "_SYSTEMD_UNIT";
/// Journal field holding the boot session id
pub const FIELD_BOOT_ID: &str = "_BOOT_ID";

/// Factory opening one positioned scan over the journal
pub trait JournalStore: Send + Sync {
    /// Apply the plan's match clauses and seek, returning a cursor ready to
    /// step. Open and seek failures are [`jlog_core::GatewayError::ScanSetup`].
    fn open(&self, plan: &ScanPlan) -> GatewayResult<Box<dyn JournalCursor>>;
}

/// One in-flight scan position.
///
/// After a successful step the cursor points at a concrete record whose
/// fields can be read until the next step. Step failures are
/// [`jlog_core::GatewayError::Step`].
pub trait JournalCursor: Send {
    /// Advance towards newer records; `false` means no more records
    fn step_next(&mut self) -> GatewayResult<bool>;

    /// Advance towards older records; `false` means no more records
    fn step_previous(&mut self) -> GatewayResult<bool>;

    /// Read a named field of the current record
    fn field(&self, name: &str) -> Option<String>;

    /// Opaque position token of the current record
    fn cursor_token(&self) -> Option<String>;

    /// Wall-clock timestamp of the current record, microseconds since epoch
    fn realtime_usec(&self) -> Option<u64>;
}
