//! External command collaborator
//!
//! Boot/unit listings and the kernel ring buffer come from line-oriented
//! command output. The invocation lives behind [`CommandRunner`] so parsers
//! only ever see structured rows; tests script a [`MockCommandRunner`].

use std::collections::HashMap;
use std::io;
use std::process::Command;

use parking_lot::RwLock;

/// Runs a program and yields its stdout as lines
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`; non-zero exit is an error
    fn run(&self, program: &str, args: &[&str]) -> io::Result<Vec<String>>;
}

/// Production runner using `std::process::Command`
#[derive(Debug, Default, Clone)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<Vec<String>> {
        let output = Command::new(program).args(args).output()?;
        if !output.status.success() {
            return Err(io::Error::other(format!(
                "{program} exited with {}",
                output.status
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().map(str::to_string).collect())
    }
}

/// Scripted runner for tests, keyed by the full command line
#[derive(Debug, Default)]
pub struct MockCommandRunner {
    /// command line -> lines or failure message
    scripts: RwLock<HashMap<String, Result<Vec<String>, String>>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script successful output for a command line like `"journalctl --list-boots"`
    pub fn expect(&self, command_line: &str, lines: &[&str]) {
        self.scripts.write().insert(
            command_line.to_string(),
            Ok(lines.iter().map(|&l| l.to_string()).collect()),
        );
    }

    /// Script a failure for a command line
    pub fn fail(&self, command_line: &str, reason: &str) {
        self.scripts
            .write()
            .insert(command_line.to_string(), Err(reason.to_string()));
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<Vec<String>> {
        let mut command_line = program.to_string();
        for arg in args {
            command_line.push(' ');
            command_line.push_str(arg);
        }
        match self.scripts.read().get(&command_line) {
            Some(Ok(lines)) => Ok(lines.clone()),
            Some(Err(reason)) => Err(io::Error::other(reason.clone())),
            None => Err(io::Error::other(format!("unscripted command: {command_line}"))),
        }
    }
}
