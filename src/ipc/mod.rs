//! IPC module for daemon-host communication

mod bridge;
mod protocol;

pub use bridge::{emit_event, spawn_stdin_reader};
pub use protocol::{Command, DaemonStatus, Event};
