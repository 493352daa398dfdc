//! keylock-daemon: OS-level keyboard lockdown for kiosk applications
//!
//! Runs as a sidecar of the kiosk/exam application and provides:
//! - A system-wide low-level keyboard hook that suppresses OS shortcuts
//!   (task switching, run dialog, function keys, ...) before normal input
//!   routing sees them
//! - A fixed, ordered policy deciding allow/block per key event, with an
//!   administrative escape hatch (Ctrl+Alt+Shift+A / Ctrl+Alt+Shift+S)
//! - A stdio IPC surface: commands in on stdin, status and violation
//!   events out on stdout (logs go to stderr)

mod config;
mod events;
mod hook;
mod ipc;
mod lifecycle;
mod policy;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::events::{combo_label, Violation, ViolationThrottle};
use crate::hook::{BlockedKey, KeyboardHook};
use crate::ipc::{Command, DaemonStatus, Event};
use crate::lifecycle::ShutdownSignal;
use crate::policy::{vk, ModifierSnapshot, PolicyEngine, Verdict};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the IPC event stream; all logging goes to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "keylock-daemon starting"
    );

    let config = Config::load()?;
    info!(?config.violation_throttle, config.auto_install, "configuration loaded");

    let engine = PolicyEngine::new();
    info!(rules = engine.rule_count(), "lockdown policy initialized");

    // Boot-time sanity check on the rule table order
    let admin_chord = ModifierSnapshot {
        ctrl: true,
        alt: true,
        shift: true,
        ..Default::default()
    };
    if engine.evaluate(vk::A, admin_chord) != Verdict::Allow
        || engine.evaluate(vk::LEFT_META, ModifierSnapshot::default()) != Verdict::Block
    {
        warn!("policy self-check failed, administrative escape hatch may be unreachable");
    }

    let started_at = Instant::now();
    let blocked_total = Arc::new(AtomicU64::new(0));

    // Hook thread -> violation reporter
    let (violation_tx, violation_rx) = mpsc::channel::<BlockedKey>(64);
    let hook = KeyboardHook::new(violation_tx);

    let reporter = tokio::spawn(run_reporter(
        engine,
        violation_rx,
        Arc::clone(&blocked_total),
        config.violation_throttle,
    ));

    if config.auto_install && !hook.install() {
        warn!("running without keyboard lockdown, host may retry over IPC");
    }

    ipc::emit_event(&Event::Ready {
        version: env!("CARGO_PKG_VERSION").to_string(),
    });

    let mut commands = ipc::spawn_stdin_reader();
    let shutdown = ShutdownSignal::new();

    info!("daemon initialized, entering command loop");

    tokio::select! {
        // Drive host commands until shutdown is requested or stdin closes
        _ = async {
            while let Some(cmd) = commands.recv().await {
                if handle_command(cmd, &hook, &blocked_total, started_at) {
                    info!("shutdown command received");
                    return;
                }
            }
            info!("stdin closed, host application is gone");
        } => {}

        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    info!("shutting down...");

    hook.uninstall();
    reporter.abort();

    info!("keylock-daemon stopped");

    Ok(())
}

/// Process one host command. Returns true when the daemon should exit.
fn handle_command(
    cmd: Command,
    hook: &KeyboardHook,
    blocked_total: &AtomicU64,
    started_at: Instant,
) -> bool {
    match cmd {
        Command::Ping => ipc::emit_event(&Event::Pong),

        Command::GetStatus => {
            ipc::emit_event(&Event::Status(DaemonStatus {
                version: env!("CARGO_PKG_VERSION").to_string(),
                hook_installed: hook.is_installed(),
                blocked_total: blocked_total.load(Ordering::Relaxed),
                uptime_secs: started_at.elapsed().as_secs(),
            }));
        }

        Command::Install => {
            let changed = hook.install();
            ipc::emit_event(&Event::HookChanged {
                installed: hook.is_installed(),
                changed,
            });
        }

        Command::Uninstall => {
            let changed = hook.uninstall();
            ipc::emit_event(&Event::HookChanged {
                installed: hook.is_installed(),
                changed,
            });
        }

        Command::Shutdown => return true,
    }

    false
}

/// Drain blocked-key reports from the hook thread, throttle repeats of
/// the same combination, and push violation events to the host.
async fn run_reporter(
    engine: PolicyEngine,
    mut violation_rx: mpsc::Receiver<BlockedKey>,
    blocked_total: Arc<AtomicU64>,
    throttle_window: Duration,
) {
    let mut throttle = ViolationThrottle::new(throttle_window);

    while let Some(report) = violation_rx.recv().await {
        blocked_total.fetch_add(1, Ordering::Relaxed);

        let combo = combo_label(report.key, report.modifiers);
        // Re-derive the decision to name the matched rule; evaluation is
        // pure, so this reproduces the verdict the hook callback saw.
        let decision = engine.decide(report.key, report.modifiers);
        let rule = decision.rule.unwrap_or("unmatched");

        debug!(combo = %combo, rule, "blocked key combination");

        if !throttle.admit(&combo, Instant::now()) {
            continue;
        }

        ipc::emit_event(&Event::Violation(Violation {
            combo,
            rule: rule.to_string(),
            timestamp: chrono::Utc::now(),
        }));
    }

    debug!("violation reporter stopped");
}
