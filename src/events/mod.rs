//! Violation event definitions
//!
//! A violation is one suppressed key combination. Events are serialized
//! onto the IPC stream for the host application; repeats of the same
//! combination are throttled so a held key does not flood the stream.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::{ModifierSnapshot, VirtualKey};

/// Default suppression window for repeated notifications of one combo
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(1500);

/// A blocked key combination, as reported to the host application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Human-readable combination, e.g. "Ctrl+Shift+Escape"
    pub combo: String,
    /// Name of the policy rule that suppressed the event
    pub rule: String,
    /// When the event was suppressed
    pub timestamp: DateTime<Utc>,
}

/// Render a key plus its modifier snapshot as a combination label.
///
/// Modifier order is Windows, Ctrl, Alt, Shift. A modifier key pressed on
/// its own is not repeated ("Windows", not "Windows+Windows").
pub fn combo_label(key: VirtualKey, modifiers: ModifierSnapshot) -> String {
    let mut parts: Vec<String> = Vec::new();
    if modifiers.any_meta() {
        parts.push("Windows".to_string());
    }
    if modifiers.ctrl {
        parts.push("Ctrl".to_string());
    }
    if modifiers.alt {
        parts.push("Alt".to_string());
    }
    if modifiers.shift {
        parts.push("Shift".to_string());
    }
    let label = key.label();
    if !parts.contains(&label) {
        parts.push(label);
    }
    parts.join("+")
}

/// Suppresses repeat notifications for the same combination inside a
/// fixed window. A different combination always passes immediately.
pub struct ViolationThrottle {
    window: Duration,
    last_combo: Option<String>,
    last_emitted: Option<Instant>,
}

impl ViolationThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_combo: None,
            last_emitted: None,
        }
    }

    /// Whether a notification for `combo` should be emitted at `now`.
    /// Admitting records the combo and resets the window.
    pub fn admit(&mut self, combo: &str, now: Instant) -> bool {
        if let (Some(last), Some(at)) = (&self.last_combo, self.last_emitted) {
            if last == combo && now.duration_since(at) < self.window {
                return false;
            }
        }
        self.last_combo = Some(combo.to_string());
        self.last_emitted = Some(now);
        true
    }
}
