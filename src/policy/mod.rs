//! Lockdown policy module
//!
//! Classifies every incoming (key, modifier-snapshot) pair into an allow
//! or block verdict via a fixed, ordered rule table.

mod keys;
mod rules;

pub use keys::{vk, ModifierSnapshot, VirtualKey};
pub use rules::{default_rules, Decision, PolicyEngine, Rule, Verdict};
