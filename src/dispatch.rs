//! The dispatcher: one entry point per raw event, one ordered and
//! cancellable behavior walk per dispatch.
//!
//! Exactly one dispatch is ever active; behaviors run synchronously to
//! completion in precedence order. Any behavior can say stop — no later
//! entry runs afterward — and as a rule no behavior should yield in
//! anticipation of another running later; the whole point of owning
//! dispatch (rather than using host event bubbling) is that precedence can
//! be reordered in one place as conditions change.

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use crate::behavior::{ActionGroup, Behavior, BehaviorArena, BehaviorId, DispatchStatus};
use crate::chord::{ChordTable, Platform, Shortcut};
use crate::event::{EventKind, InputEvent, KeyInput, MouseButton, MouseInput};
use crate::focus::FocusState;
use crate::keyboard::{KeyTracker, Modifiers};
use crate::node::{NodeId, NodeTree, inherited_behaviors, local_behaviors};
use crate::overrides::OverrideRegistry;
use crate::trace::{NullTrace, TraceRecord, TraceSink, TraceStatus};

/// What the host should do with the raw platform event after dispatch.
/// Stands in for `preventDefault`/`stopPropagation`, which only the host
/// can actually call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventResponse {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventResponse {
    /// Leave the event entirely to the host: routing miss or deliberate
    /// native escape hatch.
    pub fn passthrough() -> Self {
        EventResponse {
            prevent_default: false,
            stop_propagation: false,
        }
    }
}

/// Per-invocation view of the dispatcher handed to behaviors. Carries the
/// invoked behavior's own id so gesture capture needs no global lookup.
pub struct EventCx<'a> {
    pub tree: &'a mut NodeTree,
    pub focus: &'a mut FocusState,
    pub keys: &'a KeyTracker,
    pub chords: &'a ChordTable,
    pub overrides: &'a mut OverrideRegistry,
    pub platform: Platform,
    /// The behavior currently being invoked.
    pub behavior: BehaviorId,
}

impl EventCx<'_> {
    /// Whether the live key set matches `shortcut` on this platform.
    pub fn chord(&self, shortcut: Shortcut) -> bool {
        self.chords.matches(shortcut, self.keys)
    }

    /// True iff exactly `key` is held.
    pub fn only_key(&self, key: &str) -> bool {
        self.keys.only(key)
    }

    /// Begin a gesture: claim the override slots for `kinds`, with `node`
    /// as the node later override dispatches are delivered to. First
    /// registrant wins.
    pub fn capture(&mut self, node: NodeId, kinds: &[EventKind]) {
        self.overrides.set(self.behavior, node, kinds);
    }

    /// Release one captured kind. Owner-checked.
    pub fn release(&mut self, kind: EventKind) {
        self.overrides.unset(self.behavior, kind);
    }

    /// Release every kind this behavior holds. Call on *every* gesture exit
    /// path.
    pub fn release_all(&mut self) {
        self.overrides.unset_all(self.behavior);
    }
}

/// The process-wide input router. Owns the node tree, focus state, key
/// tracker, chord table, behavior arena and override registry; the host
/// feeds raw events into the `key_down`/`mouse_down`/... entry points.
pub struct Dispatcher {
    platform: Platform,
    tree: NodeTree,
    focus: FocusState,
    keys: KeyTracker,
    chords: ChordTable,
    arena: BehaviorArena,
    overrides: OverrideRegistry,
    defaults: Vec<BehaviorId>,
    trace: Rc<RefCell<dyn TraceSink>>,
}

impl Dispatcher {
    pub fn new(platform: Platform) -> Self {
        Dispatcher {
            platform,
            tree: NodeTree::new(),
            focus: FocusState::new(),
            keys: KeyTracker::new(),
            chords: ChordTable::for_platform(platform),
            arena: BehaviorArena::new(),
            overrides: OverrideRegistry::new(),
            defaults: Vec::new(),
            trace: Rc::new(RefCell::new(NullTrace)),
        }
    }

    pub fn set_trace(&mut self, trace: Rc<RefCell<dyn TraceSink>>) {
        self.trace = trace;
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    pub fn focus(&self) -> &FocusState {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut FocusState {
        &mut self.focus
    }

    pub fn keys(&self) -> &KeyTracker {
        &self.keys
    }

    pub fn chords(&self) -> &ChordTable {
        &self.chords
    }

    pub fn overrides(&self) -> &OverrideRegistry {
        &self.overrides
    }

    pub fn overrides_mut(&mut self) -> &mut OverrideRegistry {
        &mut self.overrides
    }

    pub fn behaviors(&self) -> &BehaviorArena {
        &self.arena
    }

    pub fn add_behavior(&mut self, behavior: Box<dyn Behavior>) -> BehaviorId {
        self.arena.insert(behavior)
    }

    /// Put `behavior` in the fallback tier: walked after node-local and
    /// inherited behaviors on every dispatch.
    pub fn add_default_behavior(&mut self, behavior: BehaviorId) {
        if !self.defaults.contains(&behavior) {
            self.defaults.push(behavior);
        }
    }

    /// Tear a behavior down: releases its override slots, detaches it from
    /// every node and the fallback tier, then drops it. This is the
    /// explicit dispose hook that keeps override slots from outliving their
    /// owners.
    pub fn remove_behavior(&mut self, behavior: BehaviorId) -> Option<Box<dyn Behavior>> {
        self.overrides.unset_all(behavior);
        self.tree.detach_behavior(behavior);
        self.defaults.retain(|b| *b != behavior);
        self.arena.remove(behavior)
    }

    /// First behavior of concrete type `T` in `node`'s walk order, if any.
    pub fn find_behavior<T: Behavior>(&self, node: NodeId) -> Option<BehaviorId> {
        self.behavior_stack(node)
            .into_iter()
            .find(|id| self.arena.is::<T>(*id))
    }

    /// Aggregate the action groups every behavior in `node`'s walk order
    /// offers, each asked about its own delegate for `node`.
    pub fn actions_for(&self, node: NodeId) -> Vec<ActionGroup> {
        let mut groups = Vec::new();
        for id in self.behavior_stack(node) {
            if let Some(cell) = self.arena.get(id)
                && let Ok(behavior) = cell.try_borrow()
            {
                let subject = behavior.delegate(&self.tree, node);
                groups.extend(behavior.actions(&self.tree, subject));
            }
        }
        groups
    }

    // ---- raw event entry points -------------------------------------------

    pub fn key_down(&mut self, event: KeyInput) -> EventResponse {
        // press() filters out modifiers, "dead" and empty names itself
        self.keys.press(&event.key);
        self.keys
            .sync_keyboard(event.modifiers, event.is_space_code());
        let node = self.focus.resolve(&self.tree);
        self.dispatch(EventKind::KeyDown, node, &InputEvent::Key(event))
    }

    pub fn key_up(&mut self, event: KeyInput) -> EventResponse {
        self.keys.release(&event.key);
        self.keys.sync_keyboard(event.modifiers, false);
        let node = self.focus.resolve(&self.tree);
        self.dispatch(EventKind::KeyUp, node, &InputEvent::Key(event))
    }

    pub fn mouse_down(&mut self, event: MouseInput) -> EventResponse {
        self.keys.sync_pointer(event.modifiers);
        let right = self.is_right_click(&event);

        // Double/triple click come from the click count on the down event,
        // not from a separate native event, so an intercepting behavior can
        // pre-empt the single-click action. Only primary clicks expand this
        // way; a right-button multi-click is still a right-click.
        if !right && event.click_count == 2 {
            return self.hit_dispatch(EventKind::DoubleClick, event);
        }
        if !right && event.click_count == 3 {
            return self.hit_dispatch(EventKind::TripleClick, event);
        }

        if right && event.modifiers.contains(Modifiers::SHIFT) {
            // shift-rightclick is the escape hatch to the native context menu
            return EventResponse::passthrough();
        }

        let kind = if right {
            EventKind::RightMouseDown
        } else {
            EventKind::MouseDown
        };
        self.hit_dispatch(kind, event)
    }

    pub fn mouse_up(&mut self, event: MouseInput) -> EventResponse {
        self.keys.sync_pointer(event.modifiers);
        let right = self.is_right_click(&event);

        // multi-click ups already dispatched on the down side
        if event.click_count != 1 {
            return EventResponse::passthrough();
        }

        let kind = if right {
            EventKind::RightMouseUp
        } else {
            EventKind::MouseUp
        };
        if let Some(node) = self.tree.node_at_point(event.pos) {
            return self.dispatch(kind, node, &InputEvent::Mouse(event));
        }
        // A captured drag can end outside every recognized node; the owner
        // still needs the up to terminate its gesture.
        self.dispatch_override_only(kind, &InputEvent::Mouse(event))
    }

    pub fn mouse_move(&mut self, event: MouseInput) -> EventResponse {
        let right = self.is_right_click(&event);
        let kind = if right {
            EventKind::RightMouseMove
        } else {
            EventKind::MouseMove
        };
        if let Some(node) = self.tree.node_at_point(event.pos) {
            return self.dispatch(kind, node, &InputEvent::Mouse(event));
        }
        self.dispatch_override_only(kind, &InputEvent::Mouse(event))
    }

    pub fn mouse_over(&mut self, event: MouseInput) -> EventResponse {
        self.hit_dispatch(EventKind::MouseOver, event)
    }

    /// Enter/leave pairs are tracked by the host's hover bookkeeping, which
    /// already knows the node; no hit test here.
    pub fn mouse_enter(&mut self, node: NodeId, event: MouseInput) -> EventResponse {
        if !self.tree.contains(node) {
            return EventResponse::passthrough();
        }
        self.dispatch(EventKind::MouseEnter, node, &InputEvent::Mouse(event))
    }

    pub fn mouse_leave(&mut self, node: NodeId, event: MouseInput) -> EventResponse {
        if !self.tree.contains(node) {
            return EventResponse::passthrough();
        }
        self.dispatch(EventKind::MouseLeave, node, &InputEvent::Mouse(event))
    }

    pub fn context_menu(&mut self, event: MouseInput) -> EventResponse {
        self.hit_dispatch(EventKind::ContextMenu, event)
    }

    pub fn wheel(&mut self, event: crate::event::WheelInput) -> EventResponse {
        let Some(node) = self.tree.node_at_point(event.pos) else {
            return EventResponse::passthrough();
        };
        self.dispatch(EventKind::Wheel, node, &InputEvent::Wheel(event))
    }

    pub fn cut(&mut self, event: crate::event::ClipboardInput) -> EventResponse {
        let node = self.focus.resolve(&self.tree);
        self.dispatch(EventKind::Cut, node, &InputEvent::Clipboard(event))
    }

    pub fn copy(&mut self, event: crate::event::ClipboardInput) -> EventResponse {
        let node = self.focus.resolve(&self.tree);
        self.dispatch(EventKind::Copy, node, &InputEvent::Clipboard(event))
    }

    pub fn paste(&mut self, event: crate::event::ClipboardInput) -> EventResponse {
        let node = self.focus.resolve(&self.tree);
        self.dispatch(EventKind::Paste, node, &InputEvent::Clipboard(event))
    }

    pub fn drag_enter(&mut self, event: crate::event::DragInput) -> EventResponse {
        self.drag_dispatch(EventKind::DragEnter, event)
    }

    pub fn drag_leave(&mut self, event: crate::event::DragInput) -> EventResponse {
        self.drag_dispatch(EventKind::DragLeave, event)
    }

    pub fn drag_over(&mut self, event: crate::event::DragInput) -> EventResponse {
        self.drag_dispatch(EventKind::DragOver, event)
    }

    pub fn drop(&mut self, event: crate::event::DragInput) -> EventResponse {
        self.drag_dispatch(EventKind::Drop, event)
    }

    // ---- the walk ---------------------------------------------------------

    /// Route one event, already resolved to a kind and target node, through
    /// the ordered behavior list. Public so hosts (and tests) can inject
    /// synthetic dispatches without a raw event.
    pub fn dispatch(&mut self, kind: EventKind, node: NodeId, event: &InputEvent) -> EventResponse {
        let stack = self.behavior_stack(node);
        let level = kind.trace_level();

        {
            let names: Vec<&'static str> = stack.iter().map(|id| self.arena.name(*id)).collect();
            self.trace.clone().borrow_mut().begin(kind, node, &names);
        }

        let mut done = false;
        let mut allow_default = false;

        // The override holder goes first, with the node it registered —
        // not the hit-tested one.
        let override_slot = self.overrides.resolve(kind, &self.arena, &self.tree);
        if let Some(slot) = override_slot {
            let status = self.invoke(slot.behavior, kind, slot.node, event);
            self.emit(TraceRecord {
                kind,
                node: slot.node,
                behavior: self.arena.name(slot.behavior),
                priority: true,
                status,
                level: level + 1,
            });
            self.absorb(status, &mut done, &mut allow_default);
        }

        for id in stack {
            // already ran above
            if override_slot.map(|slot| slot.behavior) == Some(id) {
                continue;
            }

            let status = if done {
                // Not invoked; traced anyway so the log shows what *would*
                // have run next.
                TraceStatus::Skipped
            } else {
                self.invoke(id, kind, node, event)
            };

            if status == TraceStatus::Status(DispatchStatus::Ignore) {
                continue;
            }

            self.emit(TraceRecord {
                kind,
                node,
                behavior: self.arena.name(id),
                priority: false,
                status,
                level: level + 1,
            });
            self.absorb(status, &mut done, &mut allow_default);
        }

        // Mandatory key-state cleanup; runs no matter how the walk ended.
        self.keys
            .finish_dispatch(done, kind == EventKind::KeyDown);

        let mut prevent_default = !allow_default;
        if kind == EventKind::Wheel
            && let InputEvent::Wheel(wheel) = event
            && wheel.is_pinch()
        {
            // a pinch must never fall through to the host's own zoom
            prevent_default = true;
        }

        EventResponse {
            prevent_default,
            stop_propagation: true,
        }
    }

    fn absorb(&self, status: TraceStatus, done: &mut bool, allow_default: &mut bool) {
        if let TraceStatus::Status(status) = status {
            if status.terminates() {
                *done = true;
            }
            if status.allows_default() {
                *allow_default = true;
            }
        }
    }

    /// Run one behavior's turn. A panicking handler is contained here: it
    /// costs that handler its turn and nothing else.
    fn invoke(
        &mut self,
        id: BehaviorId,
        kind: EventKind,
        node: NodeId,
        event: &InputEvent,
    ) -> TraceStatus {
        let Some(cell) = self.arena.get(id) else {
            return TraceStatus::Status(DispatchStatus::Ignore);
        };
        // A behavior re-entering dispatch could find itself already
        // borrowed; its turn is simply skipped.
        let Ok(mut behavior) = cell.try_borrow_mut() else {
            return TraceStatus::Status(DispatchStatus::Ignore);
        };
        let mut cx = EventCx {
            tree: &mut self.tree,
            focus: &mut self.focus,
            keys: &self.keys,
            chords: &self.chords,
            overrides: &mut self.overrides,
            platform: self.platform,
            behavior: id,
        };
        match catch_unwind(AssertUnwindSafe(|| behavior.event(&mut cx, kind, node, event))) {
            Ok(status) => TraceStatus::Status(status),
            Err(_) => {
                log::error!(
                    "behavior {} panicked handling {kind}; treating as ignore",
                    behavior.name()
                );
                TraceStatus::Panicked
            }
        }
    }

    /// The ordered walk list for `node`: local behaviors, then inherited
    /// ones (nearer ancestors first), then the fallback tier — registered
    /// defaults plus the focused node's own list, so globally relevant
    /// shortcuts fire even when the pointer target is unrelated.
    pub fn behavior_stack(&self, node: NodeId) -> Vec<BehaviorId> {
        fn push_unique(stack: &mut Vec<BehaviorId>, id: BehaviorId) {
            if !stack.contains(&id) {
                stack.push(id);
            }
        }

        let mut stack = Vec::new();
        for id in local_behaviors(&self.tree, node) {
            push_unique(&mut stack, id);
        }
        for id in inherited_behaviors(&self.tree, node) {
            push_unique(&mut stack, id);
        }
        for id in &self.defaults {
            push_unique(&mut stack, *id);
        }
        if let Some(focused) = self.focus.current(&self.tree)
            && focused != node
        {
            for id in local_behaviors(&self.tree, focused) {
                push_unique(&mut stack, id);
            }
            for id in inherited_behaviors(&self.tree, focused) {
                push_unique(&mut stack, id);
            }
        }
        stack
    }

    fn emit(&self, record: TraceRecord) {
        self.trace.borrow_mut().record(&record);
    }

    fn hit_dispatch(&mut self, kind: EventKind, event: MouseInput) -> EventResponse {
        let Some(node) = self.tree.node_at_point(event.pos) else {
            return EventResponse::passthrough();
        };
        self.dispatch(kind, node, &InputEvent::Mouse(event))
    }

    fn drag_dispatch(&mut self, kind: EventKind, event: crate::event::DragInput) -> EventResponse {
        let Some(node) = self.tree.node_at_point(event.pos) else {
            return EventResponse::passthrough();
        };
        self.dispatch(kind, node, &InputEvent::Drag(event))
    }

    /// Routing-miss path for mouse-up/move: if a gesture holds the slot for
    /// `kind`, deliver to its registered node even though nothing was hit.
    /// The raw event itself stays with the host.
    fn dispatch_override_only(&mut self, kind: EventKind, event: &InputEvent) -> EventResponse {
        if let Some(slot) = self.overrides.resolve(kind, &self.arena, &self.tree) {
            let name = self.arena.name(slot.behavior);
            self.trace.clone().borrow_mut().begin(kind, slot.node, &[name]);
            let status = self.invoke(slot.behavior, kind, slot.node, event);
            self.emit(TraceRecord {
                kind,
                node: slot.node,
                behavior: name,
                priority: true,
                status,
                level: kind.trace_level() + 1,
            });
        }
        EventResponse::passthrough()
    }

    fn is_right_click(&self, event: &MouseInput) -> bool {
        event.button == MouseButton::Secondary
            || (self.platform.is_mac() && event.modifiers.contains(Modifiers::CONTROL))
    }
}
