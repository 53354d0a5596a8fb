//! Per-instance hover effects keyed by a stable identifier.
//!
//! A grid of cards registers one entry per card. Pointer events from the host
//! are routed by key, so there is no list of element references captured by
//! listener closures.

use std::collections::HashMap;

use crate::animation::{Transition, VisualState};
use crate::element::ElementId;
use crate::scope::ScopeId;

/// Stable identifier of a hoverable instance, e.g. `tech/React`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HoverKey(String);

impl HoverKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HoverKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for HoverKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// One element's reaction to pointer enter and leave.
#[derive(Clone, Debug)]
pub struct HoverEffect {
    pub target: ElementId,
    pub enter: VisualState,
    pub enter_transition: Transition,
    pub leave: VisualState,
    pub leave_transition: Transition,
}

impl HoverEffect {
    /// An effect that animates to `enter` and back to `leave` with the same
    /// transition both ways.
    pub fn new(
        target: ElementId,
        enter: VisualState,
        leave: VisualState,
        transition: Transition,
    ) -> Self {
        Self {
            target,
            enter,
            enter_transition: transition.clone(),
            leave,
            leave_transition: transition,
        }
    }

    pub fn leave_transition(mut self, transition: Transition) -> Self {
        self.leave_transition = transition;
        self
    }
}

pub(crate) struct HoverEntry {
    pub effects: Vec<HoverEffect>,
    pub hovered: bool,
    pub scope: Option<ScopeId>,
}

#[derive(Default)]
pub(crate) struct HoverRegistry {
    entries: HashMap<HoverKey, HoverEntry>,
}

impl HoverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `key`.
    pub fn insert(&mut self, key: HoverKey, effects: Vec<HoverEffect>, scope: Option<ScopeId>) {
        self.entries.insert(
            key,
            HoverEntry {
                effects,
                hovered: false,
                scope,
            },
        );
    }

    /// Remove the entry for `key` only if `scope` registered it. A key that
    /// was re-registered by another scope since is left alone.
    pub fn remove_owned(&mut self, key: &HoverKey, scope: ScopeId) -> bool {
        if self.entries.get(key).is_some_and(|e| e.scope == Some(scope)) {
            self.entries.remove(key);
            true
        } else {
            false
        }
    }

    /// Flip the hovered flag. Returns the entry when the flag changed.
    pub fn set_hovered(&mut self, key: &HoverKey, hovered: bool) -> Option<&HoverEntry> {
        let entry = self.entries.get_mut(key)?;
        if entry.hovered == hovered {
            return None;
        }
        entry.hovered = hovered;
        Some(entry)
    }

    pub fn is_hovered(&self, key: &HoverKey) -> bool {
        self.entries.get(key).is_some_and(|e| e.hovered)
    }

    pub fn contains(&self, key: &HoverKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::TimingFunction;
    use crate::element::{ElementTree, Rect};
    use crate::scope::ScopeArena;

    fn lift(target: ElementId) -> Vec<HoverEffect> {
        vec![HoverEffect::new(
            target,
            VisualState::new().y(-10.0),
            VisualState::new().y(0.0),
            Transition::new(300.0, TimingFunction::Linear),
        )]
    }

    #[test]
    fn test_hovered_flag_flips_once() {
        let target = ElementTree::new().insert(Rect::default());
        let mut registry = HoverRegistry::new();
        let key = HoverKey::from("tech/React");
        registry.insert(key.clone(), lift(target), None);

        assert!(registry.set_hovered(&key, true).is_some());
        assert!(registry.set_hovered(&key, true).is_none());
        assert!(registry.is_hovered(&key));
        assert!(registry.set_hovered(&key, false).is_some());
        assert!(registry.set_hovered(&HoverKey::from("tech/Go"), true).is_none());
    }

    #[test]
    fn test_remove_owned_spares_newer_registration() {
        let target = ElementTree::new().insert(Rect::default());
        let mut scopes = ScopeArena::new();
        let first = scopes.open(target);
        let second = scopes.open(target);

        let mut registry = HoverRegistry::new();
        let key = HoverKey::from(String::from("tech/Git"));
        registry.insert(key.clone(), lift(target), Some(first));
        registry.insert(key.clone(), lift(target), Some(second));

        assert!(!registry.remove_owned(&key, first));
        assert!(registry.contains(&key));
        assert!(registry.remove_owned(&key, second));
        assert_eq!(registry.len(), 0);
    }
}
