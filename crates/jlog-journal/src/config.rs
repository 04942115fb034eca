//! Backend configuration

use serde::{Deserialize, Serialize};

/// Programs the gateway shells out to.
///
/// Overridable for containerized or test deployments; the defaults resolve
/// through `PATH`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Journal query and boot listing program
    pub journalctl: String,
    /// Kernel ring buffer dump program
    pub dmesg: String,
    /// Unit listing program
    pub systemctl: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            journalctl: "journalctl".to_string(),
            dmesg: "dmesg".to_string(),
            systemctl: "systemctl".to_string(),
        }
    }
}
