//! The behavior contract: pluggable, stateful event handlers.
//!
//! A behavior receives every event dispatched to a node it is attached to
//! (directly, by inheritance, or through the fallback tier) and answers with
//! a [`DispatchStatus`]. Behaviors live in a [`BehaviorArena`] and are
//! addressed by generational [`BehaviorId`]s, so a stale id is detectably
//! dead — the registry side of the crate never holds a behavior alive.

use std::any::Any;
use std::cell::RefCell;

use slotmap::{SlotMap, new_key_type};

use crate::chord::Shortcut;
use crate::dispatch::EventCx;
use crate::event::{EventKind, InputEvent};
use crate::node::{NodeId, NodeTree};

/// The five-way outcome of one behavior's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DispatchStatus {
    /// Handled something, walk continues.
    Continue,
    /// Looked at the event and passed. Currently routed identically to
    /// `Continue`; kept distinct so a future dispatcher can tell a pass
    /// from a partial handle.
    Decline,
    /// Terminate the walk and suppress the platform default action.
    Stop,
    /// Silently not handled. The default answer; not traced.
    Ignore,
    /// Terminate the walk but leave the platform default action alone.
    Native,
}

impl DispatchStatus {
    /// Whether this status ends the walk.
    pub fn terminates(self) -> bool {
        matches!(self, DispatchStatus::Stop | DispatchStatus::Native)
    }

    /// Whether this status leaves the platform default action unsuppressed.
    pub fn allows_default(self) -> bool {
        matches!(self, DispatchStatus::Native)
    }
}

/// A named action a behavior contributes to context menus or the command
/// palette. Independent of dispatch.
#[derive(Debug, Clone, Default)]
pub struct Action {
    pub label: String,
    pub hotkey: Option<Shortcut>,
    pub sub_actions: Vec<Action>,
}

impl Action {
    pub fn new(label: impl Into<String>) -> Self {
        Action {
            label: label.into(),
            ..Action::default()
        }
    }

    pub fn with_hotkey(mut self, hotkey: Shortcut) -> Self {
        self.hotkey = Some(hotkey);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ActionGroup {
    pub label: String,
    pub actions: Vec<Action>,
}

/// A pluggable event handler.
///
/// All methods have defaults; a minimal behavior implements nothing and
/// ignores everything. Handlers run synchronously to completion, one at a
/// time; anything asynchronous they kick off happens after dispatch returns
/// and outside its guarantees.
///
/// Multi-step gestures (drag, resize, marquee) register a global override at
/// gesture start via [`EventCx::capture`] and must release it on *every*
/// exit path — completion, cancel, and abnormal termination alike. A leaked
/// slot misroutes that event kind until the owner is removed.
pub trait Behavior: Any {
    /// Name used in trace records.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Handle one event dispatched as `kind` to `node`.
    fn event(
        &mut self,
        cx: &mut EventCx<'_>,
        kind: EventKind,
        node: NodeId,
        event: &InputEvent,
    ) -> DispatchStatus {
        let _ = (cx, kind, node, event);
        DispatchStatus::Ignore
    }

    /// Named action groups this behavior offers for `node`.
    fn actions(&self, tree: &NodeTree, node: NodeId) -> Vec<ActionGroup> {
        let _ = (tree, node);
        Vec::new()
    }

    /// The node an action on `node` should logically apply to. Defaults to
    /// `node` itself; a behavior on a handle or lozenge redirects to the
    /// thing it represents.
    fn delegate(&self, tree: &NodeTree, node: NodeId) -> NodeId {
        let _ = tree;
        node
    }
}

new_key_type! {
    /// A generational identifier for a behavior in the arena.
    pub struct BehaviorId;
}

/// Owns every behavior. Each slot is individually `RefCell`ed so one
/// behavior can run while the rest of the arena stays borrowable.
#[derive(Default)]
pub struct BehaviorArena {
    slots: SlotMap<BehaviorId, RefCell<Box<dyn Behavior>>>,
}

impl BehaviorArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, behavior: Box<dyn Behavior>) -> BehaviorId {
        self.slots.insert(RefCell::new(behavior))
    }

    pub fn remove(&mut self, id: BehaviorId) -> Option<Box<dyn Behavior>> {
        self.slots.remove(id).map(RefCell::into_inner)
    }

    pub fn contains(&self, id: BehaviorId) -> bool {
        self.slots.contains_key(id)
    }

    pub(crate) fn get(&self, id: BehaviorId) -> Option<&RefCell<Box<dyn Behavior>>> {
        self.slots.get(id)
    }

    /// Trace name for a behavior, tolerating stale ids and re-entrancy.
    pub fn name(&self, id: BehaviorId) -> &'static str {
        self.slots
            .get(id)
            .and_then(|cell| cell.try_borrow().ok().map(|b| b.name()))
            .unwrap_or("<gone>")
    }

    /// Whether the behavior behind `id` is a `T`. Mirrors looking a node's
    /// behavior list up by concrete type.
    pub fn is<T: Behavior>(&self, id: BehaviorId) -> bool {
        self.slots
            .get(id)
            .and_then(|cell| cell.try_borrow().ok().map(|b| (&**b as &dyn Any).is::<T>()))
            .unwrap_or(false)
    }

    /// Run `f` against the concrete `T` behind `id`, if it is one.
    pub fn with_downcast<T: Behavior, R>(
        &self,
        id: BehaviorId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let cell = self.slots.get(id)?;
        let mut behavior = cell.try_borrow_mut().ok()?;
        let any = &mut **behavior as &mut dyn Any;
        any.downcast_mut::<T>().map(f)
    }
}
