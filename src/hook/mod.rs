//! Keyboard hook module
//!
//! Owns the system-wide low-level keyboard hook as a single resource with
//! explicit install/uninstall. The per-event callback lives in the
//! platform backend and consults the policy engine synchronously.

#[cfg(windows)]
mod windows;

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::policy::{ModifierSnapshot, VirtualKey};

/// A key event the policy suppressed, reported off the hook thread
#[derive(Debug, Clone, Copy)]
pub struct BlockedKey {
    pub key: VirtualKey,
    pub modifiers: ModifierSnapshot,
}

/// Errors from the platform hook backend
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[cfg(windows)]
    #[error("failed to register low-level keyboard hook: {0}")]
    Registration(String),

    #[cfg(windows)]
    #[error("failed to spawn hook thread: {0}")]
    ThreadSpawn(String),

    #[cfg(not(windows))]
    #[error("low-level keyboard hook is not supported on this platform")]
    Unsupported,
}

/// The system-wide keyboard hook handle.
///
/// Install and uninstall are expected to be serialized by the embedding
/// application; both are benign no-ops (returning `false`) when called in
/// the wrong state.
pub struct KeyboardHook {
    #[cfg_attr(not(windows), allow(dead_code))]
    violation_tx: mpsc::Sender<BlockedKey>,
    installed: AtomicBool,
}

impl KeyboardHook {
    /// Create the hook resource. Nothing is registered until `install`.
    pub fn new(violation_tx: mpsc::Sender<BlockedKey>) -> Self {
        Self {
            violation_tx,
            installed: AtomicBool::new(false),
        }
    }

    /// Register as the system-wide low-level keyboard observer.
    ///
    /// Returns `false` without effect when already installed or when OS
    /// registration fails; the caller decides whether to retry or run in
    /// degraded, unprotected mode.
    pub fn install(&self) -> bool {
        if self.installed.load(Ordering::SeqCst) {
            warn!("keyboard hook already installed");
            return false;
        }

        match self.platform_install() {
            Ok(()) => {
                self.installed.store(true, Ordering::SeqCst);
                info!("keyboard hook installed, input lockdown active");
                true
            }
            Err(e) => {
                warn!(%e, "keyboard hook installation failed, input lockdown inactive");
                false
            }
        }
    }

    /// Deregister the hook. Returns `false` when not currently installed.
    pub fn uninstall(&self) -> bool {
        if !self.installed.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.platform_uninstall();
        info!("keyboard hook removed");
        true
    }

    /// Pure status query
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    #[cfg(windows)]
    fn platform_install(&self) -> Result<(), HookError> {
        windows::install(self.violation_tx.clone())
    }

    #[cfg(windows)]
    fn platform_uninstall(&self) {
        windows::uninstall();
    }

    #[cfg(not(windows))]
    fn platform_install(&self) -> Result<(), HookError> {
        Err(HookError::Unsupported)
    }

    #[cfg(not(windows))]
    fn platform_uninstall(&self) {}
}
