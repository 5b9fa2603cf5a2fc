//! # eventnav
//!
//! The input dispatch and behavior-precedence engine of a collaborative
//! spatial-canvas application. The host windowing layer feeds raw keyboard,
//! mouse, clipboard, drag and wheel events into a [`Dispatcher`]; the
//! dispatcher resolves a target [node](node::NodeTree), computes the ordered
//! list of [`Behavior`]s that get a say, walks it under strict precedence
//! and termination rules, and answers with an [`EventResponse`] telling the
//! host whether to suppress the platform default action.
//!
//! ## Precedence
//!
//! A dispatch walks, in order: the [global override](overrides) holder for
//! that event kind (gesture capture — drags, resizes, marquee selection),
//! the target node's own behaviors, behaviors inherited from ancestors
//! (nearer first), and finally a fallback tier of registered defaults plus
//! the focused node's behaviors. Any entry returning
//! [`DispatchStatus::Stop`] or [`DispatchStatus::Native`] ends the walk;
//! `Native` additionally leaves the platform default action alone.
//!
//! ## Example
//!
//! ```
//! use eventnav::{
//!     Behavior, DispatchStatus, Dispatcher, EventCx, EventKind, InputEvent, KeyInput,
//!     NodeId, Platform, Shortcut,
//! };
//! use eventnav::keyboard::Modifiers;
//!
//! struct QuickSearch;
//!
//! impl Behavior for QuickSearch {
//!     fn event(
//!         &mut self,
//!         cx: &mut EventCx<'_>,
//!         kind: EventKind,
//!         _node: NodeId,
//!         _event: &InputEvent,
//!     ) -> DispatchStatus {
//!         if kind == EventKind::KeyDown && cx.chord(Shortcut::MetaK) {
//!             // open the search palette...
//!             DispatchStatus::Stop
//!         } else {
//!             DispatchStatus::Ignore
//!         }
//!     }
//! }
//!
//! let mut nav = Dispatcher::new(Platform::Mac);
//! let search = nav.add_behavior(Box::new(QuickSearch));
//! nav.add_default_behavior(search);
//!
//! let response = nav.key_down(KeyInput::new("k", Modifiers::META));
//! assert!(response.prevent_default);
//! ```
//!
//! Everything here is single-threaded and synchronous: one dispatch at a
//! time, no suspension points, no locks. The only "lock" in the system is
//! an override slot, and the correctness burden is releasing it on every
//! gesture exit path.

pub use peniko::kurbo;

pub mod behavior;
pub mod chord;
pub mod dispatch;
pub mod event;
pub mod focus;
pub mod keyboard;
pub mod node;
pub mod overrides;
pub mod seq;
pub mod trace;

pub use behavior::{Action, ActionGroup, Behavior, BehaviorId, DispatchStatus};
pub use chord::{ChordTable, Platform, Shortcut};
pub use dispatch::{Dispatcher, EventCx, EventResponse};
pub use event::{
    ClipboardInput, DragInput, EventKind, InputEvent, KeyInput, MouseButton, MouseInput,
    WheelInput,
};
pub use focus::FocusState;
pub use keyboard::KeyTracker;
pub use node::{NodeId, NodeTree};
pub use seq::insert_seq;
