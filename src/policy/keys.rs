//! Virtual-key definitions and modifier state snapshots
//!
//! Provides constants for the Windows virtual-key space and a struct
//! capturing which modifier keys are held at the instant a key event
//! arrives.

/// A key in the platform's virtual-key space.
///
/// Carried by value; never mutated. The numeric codes are the Win32
/// `VK_*` constants, which the low-level hook delivers directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualKey(pub u16);

/// Virtual-key code constants used by the lockdown policy
pub mod vk {
    use super::VirtualKey;

    pub const BACKSPACE: VirtualKey = VirtualKey(0x08);
    pub const TAB: VirtualKey = VirtualKey(0x09);
    pub const ENTER: VirtualKey = VirtualKey(0x0D);
    pub const SHIFT: VirtualKey = VirtualKey(0x10);
    pub const CONTROL: VirtualKey = VirtualKey(0x11);
    /// The Alt key (VK_MENU)
    pub const ALT: VirtualKey = VirtualKey(0x12);
    pub const ESCAPE: VirtualKey = VirtualKey(0x1B);
    pub const SPACE: VirtualKey = VirtualKey(0x20);
    pub const PAGE_UP: VirtualKey = VirtualKey(0x21);
    pub const PAGE_DOWN: VirtualKey = VirtualKey(0x22);
    pub const END: VirtualKey = VirtualKey(0x23);
    pub const HOME: VirtualKey = VirtualKey(0x24);
    pub const LEFT: VirtualKey = VirtualKey(0x25);
    pub const UP: VirtualKey = VirtualKey(0x26);
    pub const RIGHT: VirtualKey = VirtualKey(0x27);
    pub const DOWN: VirtualKey = VirtualKey(0x28);
    pub const INSERT: VirtualKey = VirtualKey(0x2D);
    pub const DELETE: VirtualKey = VirtualKey(0x2E);

    pub const KEY_1: VirtualKey = VirtualKey(0x31);
    pub const KEY_2: VirtualKey = VirtualKey(0x32);
    pub const KEY_5: VirtualKey = VirtualKey(0x35);

    pub const A: VirtualKey = VirtualKey(0x41);
    pub const D: VirtualKey = VirtualKey(0x44);
    pub const L: VirtualKey = VirtualKey(0x4C);
    pub const R: VirtualKey = VirtualKey(0x52);
    pub const S: VirtualKey = VirtualKey(0x53);
    pub const X: VirtualKey = VirtualKey(0x58);
    pub const Z: VirtualKey = VirtualKey(0x5A);

    /// Left OS-meta (Windows) key
    pub const LEFT_META: VirtualKey = VirtualKey(0x5B);
    /// Right OS-meta (Windows) key
    pub const RIGHT_META: VirtualKey = VirtualKey(0x5C);

    pub const F1: VirtualKey = VirtualKey(0x70);
    pub const F4: VirtualKey = VirtualKey(0x73);
    pub const F10: VirtualKey = VirtualKey(0x79);
    pub const F12: VirtualKey = VirtualKey(0x7B);

    pub const NUM_LOCK: VirtualKey = VirtualKey(0x90);
}

impl VirtualKey {
    /// A..Z
    pub fn is_letter(self) -> bool {
        self.0 >= vk::A.0 && self.0 <= vk::Z.0
    }

    /// F1..F12, the contiguous function-key range
    pub fn is_function_key(self) -> bool {
        self.0 >= vk::F1.0 && self.0 <= vk::F12.0
    }

    /// The four arrow keys
    pub fn is_arrow(self) -> bool {
        self.0 >= vk::LEFT.0 && self.0 <= vk::DOWN.0
    }

    /// Left or right OS-meta key
    pub fn is_meta(self) -> bool {
        self == vk::LEFT_META || self == vk::RIGHT_META
    }

    /// Navigation/editing keys blocked when no modifier is held.
    /// Backspace is deliberately absent: it stays usable in text fields.
    pub fn is_navigation(self) -> bool {
        matches!(
            self,
            vk::ENTER
                | vk::TAB
                | vk::DELETE
                | vk::INSERT
                | vk::HOME
                | vk::END
                | vk::PAGE_UP
                | vk::PAGE_DOWN
        ) || self.is_arrow()
    }

    /// Stable human-readable name for logs and violation events
    pub fn label(self) -> String {
        match self {
            vk::BACKSPACE => "Backspace".into(),
            vk::TAB => "Tab".into(),
            vk::ENTER => "Enter".into(),
            vk::SHIFT => "Shift".into(),
            vk::CONTROL => "Ctrl".into(),
            vk::ALT => "Alt".into(),
            vk::ESCAPE => "Escape".into(),
            vk::SPACE => "Space".into(),
            vk::PAGE_UP => "PageUp".into(),
            vk::PAGE_DOWN => "PageDown".into(),
            vk::END => "End".into(),
            vk::HOME => "Home".into(),
            vk::LEFT => "Left".into(),
            vk::UP => "Up".into(),
            vk::RIGHT => "Right".into(),
            vk::DOWN => "Down".into(),
            vk::INSERT => "Insert".into(),
            vk::DELETE => "Delete".into(),
            vk::LEFT_META | vk::RIGHT_META => "Windows".into(),
            vk::NUM_LOCK => "NumLock".into(),
            _ if self.is_letter() || (self.0 >= 0x30 && self.0 <= 0x39) => {
                char::from(self.0 as u8).to_string()
            }
            _ if self.is_function_key() => format!("F{}", self.0 - vk::F1.0 + 1),
            other => format!("VK({:#04x})", other.0),
        }
    }
}

/// The live pressed/released state of the modifier keys, sampled at the
/// instant a key event arrives.
///
/// Valid only for that instant; recreated per event, never cached across
/// events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierSnapshot {
    /// Ctrl is held
    pub ctrl: bool,
    /// Alt is held
    pub alt: bool,
    /// Shift is held
    pub shift: bool,
    /// Left OS-meta (Windows) key is held
    pub left_meta: bool,
    /// Right OS-meta (Windows) key is held
    pub right_meta: bool,
}

impl ModifierSnapshot {
    /// Either OS-meta key is held
    pub fn any_meta(&self) -> bool {
        self.left_meta || self.right_meta
    }

    /// No modifier of any kind is held
    pub fn none_held(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.any_meta()
    }

    /// Ctrl, Alt and Shift are all held together (the escape-hatch chord
    /// modifiers)
    pub fn ctrl_alt_shift(&self) -> bool {
        self.ctrl && self.alt && self.shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let snap = ModifierSnapshot::default();
        assert!(snap.none_held());
        assert!(!snap.any_meta());
        assert!(!snap.ctrl_alt_shift());
    }

    #[test]
    fn test_any_meta() {
        let left = ModifierSnapshot {
            left_meta: true,
            ..Default::default()
        };
        let right = ModifierSnapshot {
            right_meta: true,
            ..Default::default()
        };
        assert!(left.any_meta());
        assert!(right.any_meta());
        assert!(!left.none_held());
    }

    #[test]
    fn test_ctrl_alt_shift() {
        let chord = ModifierSnapshot {
            ctrl: true,
            alt: true,
            shift: true,
            ..Default::default()
        };
        assert!(chord.ctrl_alt_shift());
        assert!(!chord.none_held());

        let partial = ModifierSnapshot {
            ctrl: true,
            alt: true,
            ..Default::default()
        };
        assert!(!partial.ctrl_alt_shift());
    }

    #[test]
    fn test_key_classification() {
        assert!(vk::A.is_letter());
        assert!(vk::Z.is_letter());
        assert!(!vk::KEY_1.is_letter());
        assert!(vk::F1.is_function_key());
        assert!(vk::F12.is_function_key());
        assert!(!vk::TAB.is_function_key());
        assert!(vk::LEFT.is_arrow());
        assert!(vk::DOWN.is_arrow());
        assert!(vk::LEFT_META.is_meta());
        assert!(vk::RIGHT_META.is_meta());
        assert!(vk::TAB.is_navigation());
        assert!(vk::PAGE_DOWN.is_navigation());
        assert!(!vk::BACKSPACE.is_navigation());
    }

    #[test]
    fn test_labels() {
        assert_eq!(vk::A.label(), "A");
        assert_eq!(vk::KEY_5.label(), "5");
        assert_eq!(vk::F10.label(), "F10");
        assert_eq!(vk::LEFT_META.label(), "Windows");
        assert_eq!(VirtualKey(0xFF).label(), "VK(0xff)");
    }
}
