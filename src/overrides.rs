//! The global-override registry: single-slot-per-event-kind capture.
//!
//! Holding a slot is the closest thing this single-threaded system has to a
//! lock. A gesture registers its behavior for the kinds it needs at gesture
//! start, receives those events before any node-local behavior (and even
//! when the pointer leaves every recognized node), and must release the
//! slots on every exit path. Slots are held by id, never by reference, so a
//! removed behavior or node reads as an empty slot.

use strum::EnumCount;

use crate::behavior::{BehaviorArena, BehaviorId};
use crate::event::EventKind;
use crate::node::{NodeId, NodeTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideSlot {
    pub behavior: BehaviorId,
    /// The node the gesture started on. Dispatch hands the override this
    /// node, not the hit-tested one.
    pub node: NodeId,
}

#[derive(Debug)]
pub struct OverrideRegistry {
    slots: [Option<OverrideSlot>; EventKind::COUNT],
}

impl Default for OverrideRegistry {
    fn default() -> Self {
        OverrideRegistry {
            slots: [None; EventKind::COUNT],
        }
    }
}

impl OverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `behavior` (with its active node) for each kind whose slot
    /// is empty. First registrant wins; occupied slots are left untouched —
    /// no preemption, no queueing.
    pub fn set(&mut self, behavior: BehaviorId, node: NodeId, kinds: &[EventKind]) {
        for kind in kinds {
            let slot = &mut self.slots[kind.index()];
            if slot.is_none() {
                *slot = Some(OverrideSlot { behavior, node });
            }
        }
    }

    /// Release the slot for `kind` if `behavior` owns it. A non-owner
    /// attempt is refused: one gesture must not be able to tear down
    /// another's capture.
    pub fn unset(&mut self, behavior: BehaviorId, kind: EventKind) {
        match self.slots[kind.index()] {
            Some(slot) if slot.behavior == behavior => self.slots[kind.index()] = None,
            Some(slot) => log::warn!(
                "override unset for {kind} refused: slot is owned by another behavior ({:?})",
                slot.behavior
            ),
            None => {}
        }
    }

    /// Release every slot owned by `behavior`.
    pub fn unset_all(&mut self, behavior: BehaviorId) {
        for slot in &mut self.slots {
            if slot.map(|s| s.behavior) == Some(behavior) {
                *slot = None;
            }
        }
    }

    /// The live override for `kind`, if any. A slot whose behavior or node
    /// no longer exists is hygiene debt — some exit path forgot to
    /// unregister — and is cleared here with a warning.
    pub fn resolve(
        &mut self,
        kind: EventKind,
        arena: &BehaviorArena,
        tree: &NodeTree,
    ) -> Option<OverrideSlot> {
        let slot = self.slots[kind.index()]?;
        if arena.contains(slot.behavior) && tree.contains(slot.node) {
            return Some(slot);
        }
        log::warn!("override slot for {kind} outlived its owner; clearing");
        self.slots[kind.index()] = None;
        None
    }

    /// Non-clearing view of a slot, dead or alive. Diagnostics only.
    pub fn peek(&self, kind: EventKind) -> Option<OverrideSlot> {
        self.slots[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::tests_support::Inert;

    fn fixture() -> (BehaviorArena, NodeTree, BehaviorId, BehaviorId, NodeId) {
        let mut arena = BehaviorArena::new();
        let a = arena.insert(Box::new(Inert));
        let b = arena.insert(Box::new(Inert));
        let mut tree = NodeTree::new();
        let node = tree.add_child(tree.root());
        (arena, tree, a, b, node)
    }

    #[test]
    fn first_registrant_wins() {
        let (arena, tree, a, b, node) = fixture();
        let mut registry = OverrideRegistry::new();
        registry.set(a, node, &[EventKind::MouseUp]);
        registry.set(b, node, &[EventKind::MouseUp]);

        let slot = registry.resolve(EventKind::MouseUp, &arena, &tree).unwrap();
        assert_eq!(slot.behavior, a);
    }

    #[test]
    fn unset_is_owner_checked() {
        let (arena, tree, a, b, node) = fixture();
        let mut registry = OverrideRegistry::new();
        registry.set(a, node, &[EventKind::MouseMove]);

        registry.unset(b, EventKind::MouseMove);
        assert!(
            registry
                .resolve(EventKind::MouseMove, &arena, &tree)
                .is_some(),
            "non-owner must not clear the slot"
        );

        registry.unset(a, EventKind::MouseMove);
        assert!(
            registry
                .resolve(EventKind::MouseMove, &arena, &tree)
                .is_none()
        );
    }

    #[test]
    fn unset_all_releases_every_owned_slot() {
        let (arena, tree, a, b, node) = fixture();
        let mut registry = OverrideRegistry::new();
        registry.set(a, node, &[EventKind::MouseMove, EventKind::MouseUp]);
        registry.set(b, node, &[EventKind::KeyDown]);

        registry.unset_all(a);
        assert!(
            registry
                .resolve(EventKind::MouseMove, &arena, &tree)
                .is_none()
        );
        assert!(registry.resolve(EventKind::MouseUp, &arena, &tree).is_none());
        assert!(registry.resolve(EventKind::KeyDown, &arena, &tree).is_some());
    }

    #[test]
    fn stale_owner_reads_as_empty() {
        let (mut arena, tree, a, _b, node) = fixture();
        let mut registry = OverrideRegistry::new();
        registry.set(a, node, &[EventKind::Drop]);

        arena.remove(a);
        assert!(registry.resolve(EventKind::Drop, &arena, &tree).is_none());
        // and the slot was lazily cleared, so a new gesture can claim it
        assert!(registry.peek(EventKind::Drop).is_none());
    }

    #[test]
    fn stale_node_reads_as_empty() {
        let (arena, mut tree, a, _b, node) = fixture();
        let mut registry = OverrideRegistry::new();
        registry.set(a, node, &[EventKind::Drop]);

        tree.remove(node);
        assert!(registry.resolve(EventKind::Drop, &arena, &tree).is_none());
    }
}
