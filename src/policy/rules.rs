//! Lockdown rule table and evaluator
//!
//! The policy is an ordered list of (predicate, verdict) pairs walked
//! first-match-wins. Order is significant: later entries are written as
//! unreachable overrides for cases earlier entries already catch, and the
//! administrative allow entries must precede the broad Ctrl+letter block.

use super::keys::{vk, ModifierSnapshot, VirtualKey};

/// Outcome of evaluating one key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Forward the event to the next consumer in the chain
    Allow,
    /// Suppress the event system-wide
    Block,
}

/// One entry in the policy table: a pure predicate over the incoming key
/// and the modifier snapshot, paired with the verdict returned on match.
pub struct Rule {
    /// Stable identifier used in logs and violation events
    pub name: &'static str,
    matches: fn(VirtualKey, ModifierSnapshot) -> bool,
    verdict: Verdict,
}

impl Rule {
    fn block(name: &'static str, matches: fn(VirtualKey, ModifierSnapshot) -> bool) -> Self {
        Self {
            name,
            matches,
            verdict: Verdict::Block,
        }
    }

    fn allow(name: &'static str, matches: fn(VirtualKey, ModifierSnapshot) -> bool) -> Self {
        Self {
            name,
            matches,
            verdict: Verdict::Allow,
        }
    }
}

/// The verdict together with the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    /// Name of the matched rule; `None` for the implicit default allow
    pub rule: Option<&'static str>,
}

/// Evaluates key events against the fixed lockdown policy.
///
/// Built once at startup and never mutated. Evaluation is a pure function
/// of the (key, snapshot) pair: no locks, no allocation, no I/O, bounded
/// by the table length.
pub struct PolicyEngine {
    rules: Vec<Rule>,
}

impl PolicyEngine {
    /// Create an engine with the standard kiosk lockdown table
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Create an engine from an explicit table. Order is the contract;
    /// callers own getting it right.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Walk the table and return the first matching rule's verdict along
    /// with its name. No match means the implicit default: allow.
    pub fn decide(&self, key: VirtualKey, modifiers: ModifierSnapshot) -> Decision {
        for rule in &self.rules {
            if (rule.matches)(key, modifiers) {
                return Decision {
                    verdict: rule.verdict,
                    rule: Some(rule.name),
                };
            }
        }
        Decision {
            verdict: Verdict::Allow,
            rule: None,
        }
    }

    /// First-match verdict for the (key, snapshot) pair
    pub fn evaluate(&self, key: VirtualKey, modifiers: ModifierSnapshot) -> Verdict {
        self.decide(key, modifiers).verdict
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The standard lockdown table, highest precedence first.
pub fn default_rules() -> Vec<Rule> {
    vec![
        // A bare press of either OS-meta key is suppressed before anything
        // else gets a say.
        Rule::block("bare-meta", |key, _| key.is_meta()),
        // Task switcher
        Rule::block("alt-tab", |key, mods| key == vk::TAB && mods.alt),
        // Security/task-manager dialog
        Rule::block("ctrl-shift-esc", |key, mods| {
            key == vk::ESCAPE && mods.ctrl && mods.shift
        }),
        // Window close
        Rule::block("alt-f4", |key, mods| key == vk::F4 && mods.alt),
        // Named meta shortcuts: quick-link menu, lock screen, show
        // desktop, run dialog. The meta catch-all below would cover these
        // too; they are kept as explicit entries.
        Rule::block("meta-shortcut", |key, mods| {
            mods.any_meta() && matches!(key, vk::X | vk::L | vk::D | vk::R)
        }),
        // Function keys are out entirely, with or without modifiers.
        Rule::block("function-key", |key, _| key.is_function_key()),
        // Administrative escape hatch: the two sanctioned four-key chords
        // terminate evaluation here, ahead of the Ctrl+letter block.
        Rule::allow("escape-hatch", |key, mods| {
            mods.ctrl_alt_shift() && matches!(key, vk::A | vk::S)
        }),
        // Any other Ctrl+Alt+Shift+letter chord is forwarded as well, so
        // the aggressive Ctrl+letter block below cannot swallow future
        // administrative chords.
        Rule::allow("ctrl-alt-shift-letter", |key, mods| {
            mods.ctrl_alt_shift() && key.is_letter()
        }),
        Rule::block("ctrl-letter", |key, mods| mods.ctrl && key.is_letter()),
        Rule::block("ctrl-digit", |key, mods| {
            mods.ctrl && matches!(key, vk::KEY_1 | vk::KEY_2 | vk::KEY_5)
        }),
        // Ctrl+Esc, Ctrl+F4, Ctrl+Tab (Ctrl+Shift+Tab included)
        Rule::block("ctrl-special", |key, mods| {
            mods.ctrl && matches!(key, vk::ESCAPE | vk::F4 | vk::TAB)
        }),
        Rule::block("alt-special", |key, mods| {
            mods.alt && matches!(key, vk::ENTER | vk::SPACE | vk::ESCAPE)
        }),
        Rule::block("shift-special", |key, mods| {
            mods.shift && matches!(key, vk::F10 | vk::TAB | vk::DELETE)
        }),
        Rule::block("ctrl-arrow", |key, mods| mods.ctrl && key.is_arrow()),
        // Navigation and editing keys are suppressed only when pressed
        // bare; with a modifier held they fall through to the entries
        // above or to the default allow. Backspace is not in this set.
        Rule::block("bare-navigation", |key, mods| {
            key.is_navigation() && mods.none_held()
        }),
        Rule::block("bare-alt", |key, mods| {
            key == vk::ALT && !mods.ctrl && !mods.shift && !mods.any_meta()
        }),
        Rule::block("num-lock", |key, _| key == vk::NUM_LOCK),
        // Backspace passes whatever is held: text fields must stay
        // editable, and the meta catch-all below must not swallow it.
        Rule::allow("backspace", |key, _| key == vk::BACKSPACE),
        // Catch-all: every meta combination not named above
        Rule::block("meta-catch-all", |_, mods| mods.any_meta()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PolicyEngine {
        PolicyEngine::new()
    }

    fn no_mods() -> ModifierSnapshot {
        ModifierSnapshot::default()
    }

    fn ctrl() -> ModifierSnapshot {
        ModifierSnapshot {
            ctrl: true,
            ..Default::default()
        }
    }

    fn alt() -> ModifierSnapshot {
        ModifierSnapshot {
            alt: true,
            ..Default::default()
        }
    }

    fn shift() -> ModifierSnapshot {
        ModifierSnapshot {
            shift: true,
            ..Default::default()
        }
    }

    fn admin_chord() -> ModifierSnapshot {
        ModifierSnapshot {
            ctrl: true,
            alt: true,
            shift: true,
            ..Default::default()
        }
    }

    /// All 32 combinations of the five modifier booleans
    fn all_snapshots() -> Vec<ModifierSnapshot> {
        (0u8..32)
            .map(|bits| ModifierSnapshot {
                ctrl: bits & 1 != 0,
                alt: bits & 2 != 0,
                shift: bits & 4 != 0,
                left_meta: bits & 8 != 0,
                right_meta: bits & 16 != 0,
            })
            .collect()
    }

    #[test]
    fn test_plain_typing_allowed() {
        let engine = engine();
        for code in vk::A.0..=vk::Z.0 {
            assert_eq!(engine.evaluate(VirtualKey(code), no_mods()), Verdict::Allow);
        }
        for code in 0x30..=0x39 {
            assert_eq!(engine.evaluate(VirtualKey(code), no_mods()), Verdict::Allow);
        }
        assert_eq!(engine.evaluate(vk::SPACE, no_mods()), Verdict::Allow);
        assert_eq!(engine.evaluate(vk::ESCAPE, no_mods()), Verdict::Allow);
    }

    #[test]
    fn test_backspace_always_allowed() {
        let engine = engine();
        for snap in all_snapshots() {
            assert_eq!(
                engine.evaluate(vk::BACKSPACE, snap),
                Verdict::Allow,
                "Backspace must pass under {:?}",
                snap
            );
        }
        // Even against the meta catch-all
        let meta = ModifierSnapshot {
            left_meta: true,
            ..Default::default()
        };
        assert_eq!(engine.decide(vk::BACKSPACE, meta).rule, Some("backspace"));
    }

    #[test]
    fn test_escape_hatch_chords() {
        let engine = engine();
        assert_eq!(engine.evaluate(vk::A, admin_chord()), Verdict::Allow);
        assert_eq!(engine.evaluate(vk::S, admin_chord()), Verdict::Allow);
        // Plain Ctrl+A stays blocked
        assert_eq!(engine.evaluate(vk::A, ctrl()), Verdict::Block);
        assert_eq!(
            engine.decide(vk::A, ctrl()).rule,
            Some("ctrl-letter")
        );
    }

    #[test]
    fn test_ctrl_alt_shift_letter_forwarded() {
        // The carve-out is not limited to the two named chords
        let engine = engine();
        assert_eq!(engine.evaluate(vk::Z, admin_chord()), Verdict::Allow);
        assert_eq!(
            engine.decide(vk::Z, admin_chord()).rule,
            Some("ctrl-alt-shift-letter")
        );
    }

    #[test]
    fn test_function_keys_blocked_under_any_snapshot() {
        let engine = engine();
        for code in vk::F1.0..=vk::F12.0 {
            for snap in all_snapshots() {
                assert_eq!(
                    engine.evaluate(VirtualKey(code), snap),
                    Verdict::Block,
                    "F{} must be blocked under {:?}",
                    code - vk::F1.0 + 1,
                    snap
                );
            }
        }
    }

    #[test]
    fn test_bare_meta_blocked_first() {
        let engine = engine();
        let left = engine.decide(vk::LEFT_META, no_mods());
        assert_eq!(left.verdict, Verdict::Block);
        assert_eq!(left.rule, Some("bare-meta"));
        assert_eq!(engine.evaluate(vk::RIGHT_META, no_mods()), Verdict::Block);
    }

    #[test]
    fn test_meta_catch_all_fires_for_every_letter() {
        let engine = engine();
        let meta = ModifierSnapshot {
            left_meta: true,
            ..Default::default()
        };
        for code in vk::A.0..=vk::Z.0 {
            let decision = engine.decide(VirtualKey(code), meta);
            assert_eq!(decision.verdict, Verdict::Block);
            // X, L, D and R hit the named entry; the rest fall to the
            // catch-all.
            let key = VirtualKey(code);
            if matches!(key, vk::X | vk::L | vk::D | vk::R) {
                assert_eq!(decision.rule, Some("meta-shortcut"));
            } else {
                assert_eq!(decision.rule, Some("meta-catch-all"));
            }
        }
    }

    #[test]
    fn test_tab_resolves_under_every_snapshot() {
        let engine = engine();
        assert_eq!(engine.evaluate(vk::TAB, alt()), Verdict::Block);
        assert_eq!(
            engine.evaluate(
                vk::TAB,
                ModifierSnapshot {
                    ctrl: true,
                    shift: true,
                    ..Default::default()
                }
            ),
            Verdict::Block
        );
        assert_eq!(engine.evaluate(vk::TAB, no_mods()), Verdict::Block);
        // Totality: every snapshot yields exactly one verdict
        for snap in all_snapshots() {
            let v = engine.evaluate(vk::TAB, snap);
            assert!(v == Verdict::Allow || v == Verdict::Block);
        }
    }

    #[test]
    fn test_ctrl_digits() {
        let engine = engine();
        assert_eq!(engine.evaluate(vk::KEY_1, ctrl()), Verdict::Block);
        assert_eq!(engine.evaluate(vk::KEY_2, ctrl()), Verdict::Block);
        assert_eq!(engine.evaluate(vk::KEY_5, ctrl()), Verdict::Block);
        // Digits outside the named set fall through to the default allow
        assert_eq!(engine.evaluate(VirtualKey(0x33), ctrl()), Verdict::Allow);
        assert_eq!(engine.evaluate(vk::KEY_1, no_mods()), Verdict::Allow);
    }

    #[test]
    fn test_ctrl_specials() {
        let engine = engine();
        assert_eq!(engine.evaluate(vk::ESCAPE, ctrl()), Verdict::Block);
        assert_eq!(engine.evaluate(vk::TAB, ctrl()), Verdict::Block);
        // Ctrl+F4 is caught by the function-key entry before ctrl-special
        let f4 = engine.decide(vk::F4, ctrl());
        assert_eq!(f4.verdict, Verdict::Block);
        assert_eq!(f4.rule, Some("function-key"));
    }

    #[test]
    fn test_security_dialog_and_window_close() {
        let engine = engine();
        assert_eq!(
            engine.evaluate(
                vk::ESCAPE,
                ModifierSnapshot {
                    ctrl: true,
                    shift: true,
                    ..Default::default()
                }
            ),
            Verdict::Block
        );
        assert_eq!(engine.evaluate(vk::F4, alt()), Verdict::Block);
    }

    #[test]
    fn test_alt_specials() {
        let engine = engine();
        assert_eq!(engine.evaluate(vk::ENTER, alt()), Verdict::Block);
        assert_eq!(engine.evaluate(vk::SPACE, alt()), Verdict::Block);
        assert_eq!(engine.evaluate(vk::ESCAPE, alt()), Verdict::Block);
        // Alt+letter is not in the table and falls through to allow
        assert_eq!(engine.evaluate(vk::A, alt()), Verdict::Allow);
    }

    #[test]
    fn test_shift_specials() {
        let engine = engine();
        assert_eq!(engine.evaluate(vk::TAB, shift()), Verdict::Block);
        assert_eq!(engine.evaluate(vk::DELETE, shift()), Verdict::Block);
        assert_eq!(engine.evaluate(vk::F10, shift()), Verdict::Block);
        // Shift+letter is ordinary typing
        assert_eq!(engine.evaluate(vk::A, shift()), Verdict::Allow);
    }

    #[test]
    fn test_ctrl_arrows() {
        let engine = engine();
        for key in [vk::LEFT, vk::UP, vk::RIGHT, vk::DOWN] {
            assert_eq!(engine.evaluate(key, ctrl()), Verdict::Block);
        }
    }

    #[test]
    fn test_bare_navigation_blocked_only_without_modifiers() {
        let engine = engine();
        for key in [
            vk::ENTER,
            vk::TAB,
            vk::DELETE,
            vk::INSERT,
            vk::HOME,
            vk::END,
            vk::PAGE_UP,
            vk::PAGE_DOWN,
            vk::UP,
            vk::DOWN,
            vk::LEFT,
            vk::RIGHT,
        ] {
            assert_eq!(engine.evaluate(key, no_mods()), Verdict::Block);
        }
        // With Shift held the bare-navigation entry does not fire; Home
        // falls through to the default allow (text selection).
        assert_eq!(engine.evaluate(vk::HOME, shift()), Verdict::Allow);
        assert_eq!(engine.evaluate(vk::UP, shift()), Verdict::Allow);
    }

    #[test]
    fn test_bare_alt() {
        let engine = engine();
        let decision = engine.decide(vk::ALT, no_mods());
        assert_eq!(decision.verdict, Verdict::Block);
        assert_eq!(decision.rule, Some("bare-alt"));
        // Alt with Ctrl held falls through (the combination itself is
        // handled per-key by the entries above)
        assert_eq!(engine.evaluate(vk::ALT, ctrl()), Verdict::Allow);
    }

    #[test]
    fn test_num_lock() {
        let engine = engine();
        for snap in all_snapshots() {
            assert_eq!(engine.evaluate(vk::NUM_LOCK, snap), Verdict::Block);
        }
    }

    #[test]
    fn test_idempotent_evaluation() {
        let engine = engine();
        for _ in 0..3 {
            assert_eq!(engine.evaluate(vk::A, admin_chord()), Verdict::Allow);
            assert_eq!(engine.evaluate(vk::A, ctrl()), Verdict::Block);
            assert_eq!(engine.evaluate(vk::BACKSPACE, no_mods()), Verdict::Allow);
        }
    }

    #[test]
    fn test_rule_order_protects_escape_hatch() {
        // Moving the Ctrl+letter block ahead of the escape hatch must flip
        // the admin chord from Allow to Block; the table order is the
        // contract, not an implementation detail.
        let mut rules = default_rules();
        let hatch = rules
            .iter()
            .position(|r| r.name == "escape-hatch")
            .expect("escape-hatch entry present");
        let block = rules
            .iter()
            .position(|r| r.name == "ctrl-letter")
            .expect("ctrl-letter entry present");
        rules.swap(hatch, block);

        let reordered = PolicyEngine::with_rules(rules);
        assert_eq!(reordered.evaluate(vk::A, admin_chord()), Verdict::Block);
        assert_eq!(engine().evaluate(vk::A, admin_chord()), Verdict::Allow);
    }
}
