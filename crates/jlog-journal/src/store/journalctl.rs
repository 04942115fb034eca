//! `journalctl`-backed journal store
//!
//! Opens one child process per scan with the plan translated to command-line
//! arguments (`FIELD=value` match args, `--cursor`/`--after-cursor`/`--until`
//! seeks, `-r` for reversed iteration) and streams export-format records off
//! its stdout. The export grammar - `KEY=value` lines, blank line between
//! records - is the contract with the collaborator; the child is killed when
//! the cursor is dropped, however the scan ended.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};

use jlog_core::{GatewayError, GatewayResult};

use super::{JournalCursor, JournalStore, FIELD_CURSOR, FIELD_REALTIME};
use crate::planner::{ScanDirection, ScanPlan, SeekTo};

/// Store adapter spawning `journalctl` for each scan
#[derive(Debug, Clone)]
pub struct JournalctlStore {
    program: String,
}

impl JournalctlStore {
    /// Create a store invoking the given `journalctl` binary
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl JournalStore for JournalctlStore {
    fn open(&self, plan: &ScanPlan) -> GatewayResult<Box<dyn JournalCursor>> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--no-pager", "-q", "-o", "export"]);
        for clause in &plan.matches {
            cmd.arg(format!("{}={}", clause.field, clause.value));
        }
        match &plan.seek {
            SeekTo::Cursor { id, skip_pointed } => {
                let flag = if *skip_pointed { "--after-cursor" } else { "--cursor" };
                cmd.arg(format!("{flag}={id}"));
            }
            SeekTo::Time { usec } => {
                cmd.arg(format!("--until=@{}", usec / 1_000_000));
            }
            SeekTo::Tail => {}
        }
        let reversed = !matches!(plan.direction, ScanDirection::Forward);
        if reversed {
            cmd.arg("-r");
        }
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::null());

        tracing::debug!(?cmd, "opening journal scan");
        let mut child = cmd.spawn().map_err(|e| {
            GatewayError::ScanSetup(format!("cannot spawn {}: {e}", self.program))
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GatewayError::ScanSetup("child stdout unavailable".into()))?;

        Ok(Box::new(JournalctlCursor {
            child,
            reader: BufReader::new(stdout),
            reversed,
            current: HashMap::new(),
        }))
    }
}

/// Cursor streaming export records from a `journalctl` child
struct JournalctlCursor {
    child: Child,
    reader: BufReader<ChildStdout>,
    reversed: bool,
    current: HashMap<String, String>,
}

impl JournalctlCursor {
    /// Pull the next export record off the stream.
    ///
    /// Binary-valued fields (a name line without `=`, followed by a
    /// length-prefixed payload) are not representable in the entry model
    /// and are dropped from the record.
    fn advance(&mut self) -> GatewayResult<bool> {
        let mut record = HashMap::new();
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| GatewayError::Step(e.to_string()))?;
            if read == 0 {
                // EOF; a record without trailing separator still counts
                if record.is_empty() {
                    return Ok(false);
                }
                break;
            }
            let trimmed = line.trim_end_matches('\n');
            if trimmed.is_empty() {
                if record.is_empty() {
                    continue;
                }
                break;
            }
            if let Some((key, value)) = trimmed.split_once('=') {
                record.insert(key.to_string(), value.to_string());
            }
        }
        self.current = record;
        Ok(true)
    }
}

impl JournalCursor for JournalctlCursor {
    fn step_next(&mut self) -> GatewayResult<bool> {
        if self.reversed {
            return Err(GatewayError::Step(
                "scan was opened for backward iteration".into(),
            ));
        }
        self.advance()
    }

    fn step_previous(&mut self) -> GatewayResult<bool> {
        if !self.reversed {
            return Err(GatewayError::Step(
                "scan was opened for forward iteration".into(),
            ));
        }
        self.advance()
    }

    fn field(&self, name: &str) -> Option<String> {
        self.current.get(name).cloned()
    }

    fn cursor_token(&self) -> Option<String> {
        self.field(FIELD_CURSOR)
    }

    fn realtime_usec(&self) -> Option<u64> {
        self.field(FIELD_REALTIME).and_then(|v| v.parse().ok())
    }
}

impl Drop for JournalctlCursor {
    fn drop(&mut self) {
        // The scan may stop long before the child drains; reap it either way
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
