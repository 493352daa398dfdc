//! IPC message protocol definitions
//!
//! JSON lines over stdio: one `Command` per stdin line from the host,
//! one `Event` per stdout line from the daemon.

use serde::{Deserialize, Serialize};

use crate::events::Violation;

/// Commands from the host application to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Connectivity check
    Ping,

    /// Request a status snapshot
    GetStatus,

    /// Register the keyboard hook
    Install,

    /// Deregister the keyboard hook
    Uninstall,

    /// Stop the daemon
    Shutdown,
}

/// Events from the daemon to the host application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Daemon is up and reading commands
    Ready { version: String },

    /// Response to ping
    Pong,

    /// Current daemon status
    Status(DaemonStatus),

    /// Result of an install or uninstall command. `changed` is false when
    /// the command was a no-op (already in the requested state or the OS
    /// refused registration).
    HookChanged { installed: bool, changed: bool },

    /// A key combination was suppressed
    Violation(Violation),

    /// Error response
    Error { message: String },
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Whether the keyboard hook is currently registered
    pub hook_installed: bool,

    /// Key events suppressed since startup
    pub blocked_total: u64,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl Default for DaemonStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            hook_installed: false,
            blocked_total: 0,
            uptime_secs: 0,
        }
    }
}
