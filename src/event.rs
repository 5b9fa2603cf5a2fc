//! Raw input events and the dispatchable event kinds derived from them.
//!
//! The host windowing layer owns the real platform event objects; it hands us
//! small owned payloads instead. One raw payload can dispatch as several
//! kinds (a primary mouse-down with click count 2 dispatches as
//! [`EventKind::DoubleClick`], a ctrl-primary-click on mac dispatches as
//! [`EventKind::RightMouseDown`]), so the raw payload and the kind are kept
//! separate.

use peniko::kurbo::{Point, Vec2};

use crate::keyboard::Modifiers;

/// Every kind a dispatch can be routed as.
///
/// The discriminant indexes the global-override slot table, so this enum is
/// deliberately unit-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumCount)]
pub enum EventKind {
    KeyDown,
    KeyUp,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseOver,
    MouseEnter,
    MouseLeave,
    DoubleClick,
    TripleClick,
    RightMouseDown,
    RightMouseUp,
    RightMouseMove,
    ContextMenu,
    Cut,
    Copy,
    Paste,
    DragEnter,
    DragLeave,
    DragOver,
    Drop,
    Wheel,
}

impl EventKind {
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Mouse-move kinds fire continuously; they need a much higher trace
    /// verbosity before they show up.
    pub(crate) fn trace_level(self) -> u8 {
        match self {
            EventKind::MouseMove | EventKind::RightMouseMove => 10,
            _ => 1,
        }
    }
}

/// A keyboard event as reported by the host: the logical key name plus the
/// raw modifier flags. `code` is the physical key code name (`"Space"` is
/// the only one the tracker cares about).
#[derive(Debug, Clone)]
pub struct KeyInput {
    pub key: String,
    pub code: Option<String>,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        KeyInput {
            key: key.into(),
            code: None,
            modifiers,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub(crate) fn is_space_code(&self) -> bool {
        self.code.as_deref() == Some("Space")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Auxiliary,
    Secondary,
}

/// A mouse event in logical window coordinates. `click_count` is the
/// platform click detail on down/up events and 0 for moves.
#[derive(Debug, Clone)]
pub struct MouseInput {
    pub button: MouseButton,
    pub pos: Point,
    pub click_count: u8,
    pub modifiers: Modifiers,
}

impl MouseInput {
    pub fn new(button: MouseButton, pos: Point) -> Self {
        MouseInput {
            button,
            pos,
            click_count: 1,
            modifiers: Modifiers::empty(),
        }
    }

    pub fn with_click_count(mut self, count: u8) -> Self {
        self.click_count = count;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Clipboard payload accessor. The host resolves the platform clipboard
/// before dispatch; behaviors only ever see this snapshot.
#[derive(Debug, Clone, Default)]
pub struct ClipboardInput {
    pub text: Option<String>,
}

impl ClipboardInput {
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Drag-and-drop payload, positioned like a pointer event.
#[derive(Debug, Clone)]
pub struct DragInput {
    pub pos: Point,
    pub payload: Option<String>,
}

impl DragInput {
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

/// Wheel event. A ctrl-flagged wheel is a pinch-zoom on most platforms and
/// is distinguished through [`WheelInput::is_pinch`].
#[derive(Debug, Clone)]
pub struct WheelInput {
    pub pos: Point,
    pub delta: Vec2,
    pub modifiers: Modifiers,
}

impl WheelInput {
    pub fn is_pinch(&self) -> bool {
        self.modifiers.contains(Modifiers::CONTROL)
    }
}

/// The tagged union handed to every behavior. Behaviors match on the
/// variants (and the [`EventKind`] they were dispatched as) rather than
/// implementing one method per kind.
#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(KeyInput),
    Mouse(MouseInput),
    Clipboard(ClipboardInput),
    Drag(DragInput),
    Wheel(WheelInput),
}

impl InputEvent {
    /// Screen position for pointer-like events, `None` for keyboard and
    /// clipboard events.
    pub fn point(&self) -> Option<Point> {
        match self {
            InputEvent::Mouse(m) => Some(m.pos),
            InputEvent::Drag(d) => Some(d.pos),
            InputEvent::Wheel(w) => Some(w.pos),
            InputEvent::Key(_) | InputEvent::Clipboard(_) => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            InputEvent::Key(k) => k.modifiers,
            InputEvent::Mouse(m) => m.modifiers,
            InputEvent::Wheel(w) => w.modifiers,
            InputEvent::Clipboard(_) | InputEvent::Drag(_) => Modifiers::empty(),
        }
    }
}
