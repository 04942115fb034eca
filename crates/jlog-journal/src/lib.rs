//! jlog-journal - Journal query backend for the jlog gateway
//!
//! This crate turns a [`jlog_core::QueryFilter`] into a bounded, ordered,
//! cursor-paginated page of log entries. The journal itself is reached
//! through the narrow [`store::JournalStore`] iteration interface, with a
//! `journalctl`-backed production adapter and an in-memory mock for tests.
//! The kernel ring buffer is served by a separate line-oriented reader.
//!
//! Flow: request → [`gateway::LogGateway`] → (ring-buffer path | journal
//! path: [`planner`] → [`scanner`]) → ordered entry list → cursor trimming.

pub mod command;
pub mod config;
pub mod dmesg;
pub mod gateway;
pub mod listing;
pub mod pattern;
pub mod planner;
pub mod scanner;
pub mod store;

pub use command::{CommandRunner, MockCommandRunner, SystemCommandRunner};
pub use config::CommandConfig;
pub use gateway::{LogGateway, DMESG_SERVICE};
pub use pattern::PatternMatcher;
pub use planner::{plan, FieldMatch, ScanDirection, ScanPlan, SeekTo};
pub use store::{JournalCursor, JournalStore, JournalctlStore, MockJournalStore};
