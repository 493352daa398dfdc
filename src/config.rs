//! Configuration loading and management

use std::time::Duration;

use anyhow::Result;

use crate::events::DEFAULT_THROTTLE;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Suppression window for repeated violation notifications
    pub violation_throttle: Duration,

    /// Register the keyboard hook immediately at startup. When disabled
    /// the host drives installation over IPC.
    pub auto_install: bool,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let violation_throttle = std::env::var("KEYLOCK_THROTTLE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_THROTTLE);

        let auto_install = std::env::var("KEYLOCK_AUTO_INSTALL")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Ok(Self {
            violation_throttle,
            auto_install,
        })
    }
}
