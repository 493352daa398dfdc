//! IPC bridge: stdin command reader and stdout event emitter.
//!
//! The daemon runs as a sidecar of the kiosk application; stdout carries
//! the event stream (logs go to stderr), stdin carries commands. A
//! blocking reader thread forwards deserialized commands through an mpsc
//! channel into the async command loop.

use std::io::{self, BufRead, Write};

use tokio::sync::mpsc;
use tracing::{debug, error};

use super::protocol::{Command, Event};

/// Emit an `Event` as a JSON line on stdout and flush.
pub fn emit_event(event: &Event) {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            error!(%e, "failed to serialize event");
            return;
        }
    };
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    // Write errors mean the host side of the pipe is gone; the stdin
    // reader notices EOF and shuts the daemon down.
    let _ = writeln!(handle, "{}", json);
    let _ = handle.flush();
}

/// Spawn a blocking thread that reads JSON lines from stdin and forwards
/// parsed commands through the returned channel.
///
/// The channel closes when stdin reaches EOF (host application exited)
/// or on an unrecoverable read error.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<Command> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Command>(trimmed) {
                        Ok(cmd) => {
                            debug!(?cmd, "received command");
                            if tx.send(cmd).is_err() {
                                break; // Receiver dropped, main loop is gone
                            }
                        }
                        Err(e) => {
                            error!(%e, input = trimmed, "invalid command");
                            emit_event(&Event::Error {
                                message: format!("invalid command: {}", e),
                            });
                        }
                    }
                }
                Err(e) => {
                    error!(%e, "stdin read error");
                    break;
                }
            }
        }
        debug!("stdin reader thread exiting");
    });

    rx
}
