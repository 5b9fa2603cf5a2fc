//! The UI node tree: hit testing, parent links, and behavior attachment.
//!
//! Nodes are slotmap keys, so holding a [`NodeId`] never keeps a node alive
//! and a stale id is detectably dead (`contains` returns false). That is the
//! explicit liveness mechanism everything else in the crate leans on; there
//! are no weak references here.

use peniko::kurbo::{Point, Rect};
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::behavior::BehaviorId;

new_key_type! {
    /// A generational identifier for a node in the tree.
    pub struct NodeId;
}

#[derive(Debug, Default)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Screen-space bounds for hit testing. `None` makes the node
    /// transparent to hit testing; its children are still tested.
    rect: Option<Rect>,
    local: SmallVec<[BehaviorId; 2]>,
    heritable: SmallVec<[BehaviorId; 2]>,
}

/// The tree of event-target nodes. Layout is owned by the host; it pushes
/// screen rects in via [`NodeTree::set_rect`].
#[derive(Debug)]
pub struct NodeTree {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
}

impl NodeTree {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::default());
        NodeTree { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|data| data.children.as_slice())
            .unwrap_or(&[])
    }

    /// Append a child under `parent`. Panics if `parent` is stale; creating
    /// a node under a removed parent is a programmer error.
    pub fn add_child(&mut self, parent: NodeId) -> NodeId {
        assert!(self.nodes.contains_key(parent), "parent node is gone");
        let child = self.nodes.insert(NodeData {
            parent: Some(parent),
            ..NodeData::default()
        });
        self.nodes[parent].children.push(child);
        child
    }

    pub fn set_rect(&mut self, node: NodeId, rect: impl Into<Option<Rect>>) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.rect = rect.into();
        }
    }

    pub fn rect(&self, node: NodeId) -> Option<Rect> {
        self.nodes.get(node)?.rect
    }

    /// Remove `node` and its whole subtree. The root cannot be removed.
    /// After removal the id resolves nowhere: focus falls back to root,
    /// override slots holding it read as empty, hit tests skip it.
    pub fn remove(&mut self, node: NodeId) {
        if node == self.root || !self.nodes.contains_key(node) {
            return;
        }
        if let Some(parent) = self.nodes[node].parent
            && let Some(parent_data) = self.nodes.get_mut(parent)
        {
            parent_data.children.retain(|c| *c != node);
        }
        let mut queue = vec![node];
        while let Some(id) = queue.pop() {
            if let Some(data) = self.nodes.remove(id) {
                queue.extend(data.children);
            }
        }
    }

    pub fn add_local_behavior(&mut self, node: NodeId, behavior: BehaviorId) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.local.push(behavior);
        }
    }

    /// Attach a behavior that also applies to every descendant of `node`.
    pub fn add_heritable_behavior(&mut self, node: NodeId, behavior: BehaviorId) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.heritable.push(behavior);
        }
    }

    /// Drop every attachment of `behavior` across the tree. Part of behavior
    /// teardown; see [`Dispatcher::remove_behavior`](crate::Dispatcher::remove_behavior).
    pub fn detach_behavior(&mut self, behavior: BehaviorId) {
        for (_, data) in self.nodes.iter_mut() {
            data.local.retain(|b| *b != behavior);
            data.heritable.retain(|b| *b != behavior);
        }
    }

    /// Deepest node whose rect contains `point`. Later siblings are in
    /// front. A rect-less node never matches itself but its children can.
    pub fn node_at_point(&self, point: Point) -> Option<NodeId> {
        self.hit(self.root, point)
    }

    fn hit(&self, node: NodeId, point: Point) -> Option<NodeId> {
        let data = self.nodes.get(node)?;
        for child in data.children.iter().rev() {
            if let Some(found) = self.hit(*child, point) {
                return Some(found);
            }
        }
        match data.rect {
            Some(rect) if rect.contains(point) => Some(node),
            _ => None,
        }
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

/// The behaviors owned by `node` itself. Highest-precedence tier.
pub fn local_behaviors(tree: &NodeTree, node: NodeId) -> SmallVec<[BehaviorId; 4]> {
    tree.nodes
        .get(node)
        .map(|data| data.local.iter().copied().collect())
        .unwrap_or_default()
}

/// Heritable behaviors visible at `node`: its own heritable contributions
/// first, then each ancestor's, nearer ancestors before farther ones.
pub fn inherited_behaviors(tree: &NodeTree, node: NodeId) -> SmallVec<[BehaviorId; 8]> {
    let mut behaviors = SmallVec::new();
    let mut current = Some(node);
    while let Some(id) = current {
        let Some(data) = tree.nodes.get(id) else { break };
        behaviors.extend(data.heritable.iter().copied());
        current = data.parent;
    }
    behaviors
}
