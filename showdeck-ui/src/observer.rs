//! Viewport observer registry
//!
//! Intersection is delivered to the engine as explicit `ViewportSignal`
//! events naming a target element; the registry records which lifecycle
//! reactions are armed for that element. Two independent observer kinds
//! watch year groups (pre-load on approach, free when far away) and a third
//! watches individual items (mount the embed near the viewport, one-shot).

use std::collections::HashMap;

/// What a registered observer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObserverKind {
    /// Year group entered the extended (pre-load margin) viewport
    YearLoad,
    /// Year group left the viewport by the configured distance
    YearUnload,
    /// Individual item placeholder came within the item margin
    ItemLoad,
}

/// Viewport intersection event, as reported by the host
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportSignal {
    /// Target crossed into the (margin-extended) viewport
    Entered { target: String },
    /// Target left the viewport; distance is measured in viewport heights
    Exited { target: String, distance_viewports: f32 },
}

impl ViewportSignal {
    pub fn target(&self) -> &str {
        match self {
            ViewportSignal::Entered { target } => target,
            ViewportSignal::Exited { target, .. } => target,
        }
    }
}

/// Registered observers keyed by target element id
#[derive(Debug, Default)]
pub struct ObserverRegistry {
    by_target: HashMap<String, Vec<ObserverKind>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, target: &str, kind: ObserverKind) {
        let kinds = self.by_target.entry(target.to_string()).or_default();
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    /// Drop one observer kind from a target (one-shot item observers)
    pub fn unregister(&mut self, target: &str, kind: ObserverKind) {
        if let Some(kinds) = self.by_target.get_mut(target) {
            kinds.retain(|k| *k != kind);
            if kinds.is_empty() {
                self.by_target.remove(target);
            }
        }
    }

    /// Drop every observer on a target (element removed from the tree)
    pub fn unregister_target(&mut self, target: &str) {
        self.by_target.remove(target);
    }

    pub fn is_registered(&self, target: &str, kind: ObserverKind) -> bool {
        self.by_target
            .get(target)
            .map(|kinds| kinds.contains(&kind))
            .unwrap_or(false)
    }

    /// Armed observer kinds for a target, in registration order
    pub fn kinds_for(&self, target: &str) -> Vec<ObserverKind> {
        self.by_target.get(target).cloned().unwrap_or_default()
    }

    /// Total registrations, across all targets
    pub fn len(&self) -> usize {
        self.by_target.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent_per_kind() {
        let mut reg = ObserverRegistry::new();
        reg.register("year-2024", ObserverKind::YearLoad);
        reg.register("year-2024", ObserverKind::YearLoad);
        reg.register("year-2024", ObserverKind::YearUnload);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_unregister_single_kind() {
        let mut reg = ObserverRegistry::new();
        reg.register("item-1", ObserverKind::ItemLoad);
        reg.register("item-1", ObserverKind::YearUnload);
        reg.unregister("item-1", ObserverKind::ItemLoad);
        assert!(!reg.is_registered("item-1", ObserverKind::ItemLoad));
        assert!(reg.is_registered("item-1", ObserverKind::YearUnload));
    }

    #[test]
    fn test_unregister_target_clears_everything() {
        let mut reg = ObserverRegistry::new();
        reg.register("year-2023", ObserverKind::YearLoad);
        reg.register("year-2023", ObserverKind::YearUnload);
        reg.unregister_target("year-2023");
        assert!(reg.is_empty());
    }

    #[test]
    fn test_signal_target_accessor() {
        let enter = ViewportSignal::Entered {
            target: "a".to_string(),
        };
        let exit = ViewportSignal::Exited {
            target: "b".to_string(),
            distance_viewports: 2.5,
        };
        assert_eq!(enter.target(), "a");
        assert_eq!(exit.target(), "b");
    }
}
