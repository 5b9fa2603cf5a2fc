//! Focus bookkeeping for keyboard and clipboard routing.

use crate::node::{NodeId, NodeTree};

/// Which node keyboard and clipboard events target. Falls back to the tree
/// root when nothing is focused or the focused node has been removed.
#[derive(Debug, Default)]
pub struct FocusState {
    focused: Option<NodeId>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_focus(&mut self, node: NodeId) {
        self.focused = Some(node);
    }

    pub fn clear(&mut self) {
        self.focused = None;
    }

    /// The focused node if it is still alive.
    pub fn current(&self, tree: &NodeTree) -> Option<NodeId> {
        self.focused.filter(|id| tree.contains(*id))
    }

    /// The keyboard/clipboard target: the live focused node, else the root.
    pub fn resolve(&self, tree: &NodeTree) -> NodeId {
        self.current(tree).unwrap_or(tree.root())
    }
}
