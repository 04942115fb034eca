//! Cooperative cancellation for in-flight scans
//!
//! A [`CancelToken`] is a one-directional signal: once cancelled it stays
//! cancelled. The gateway facade owns a [`CancelSlot`] and issues a fresh
//! token at the start of every `Load` call; `CancelLoad` signals whatever
//! token is currently in the slot. Concurrent `Load` calls therefore race
//! for the slot and only the most recent one is cancellable - a documented
//! limitation of the RPC surface, which carries no request id.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared cancellation flag observed by a running scan
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation; idempotent
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Holder of the most recently issued cancellation token
#[derive(Debug, Default)]
pub struct CancelSlot {
    current: Mutex<CancelToken>,
}

impl CancelSlot {
    /// Create an empty slot holding an (unobserved) default token
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token and make it the cancellation target.
    ///
    /// Any previously issued token is left behind uncancelled; a stale scan
    /// still polling it simply runs to completion unless it was signalled
    /// before the new call started.
    pub fn issue(&self) -> CancelToken {
        let token = CancelToken::new();
        *self.current.lock() = token.clone();
        token
    }

    /// Cancel the most recently issued token; no effect on finished scans
    pub fn cancel_current(&self) {
        self.current.lock().cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_uncancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_sticky_and_idempotent() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let token = CancelToken::new();
        let observer = token.clone();
        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn test_slot_targets_latest_token() {
        let slot = CancelSlot::new();
        let stale = slot.issue();
        let fresh = slot.issue();
        slot.cancel_current();
        assert!(!stale.is_cancelled());
        assert!(fresh.is_cancelled());
    }

    #[test]
    fn test_cancel_before_any_issue_is_harmless() {
        let slot = CancelSlot::new();
        slot.cancel_current();
        let token = slot.issue();
        assert!(!token.is_cancelled());
    }
}
