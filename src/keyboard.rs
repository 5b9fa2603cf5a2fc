//! Live modifier and key-set bookkeeping.
//!
//! The tracker mirrors what the user is physically holding so that chord
//! matching can compare against a plain sorted set. Modifier entries are
//! derived from the raw event's boolean flags on every keyboard *and* mouse
//! event, never from key-down/up of the modifier keys themselves; that is
//! what makes ctrl-click style chords work.

use rustc_hash::FxHashSet;

bitflags::bitflags! {
    /// Raw modifier flags as reported by the host on each event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const META = 1;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const SHIFT = 1 << 3;
    }
}

const MODIFIER_NAMES: [&str; 4] = ["control", "alt", "shift", "meta"];

/// Keys that survive the post-dispatch sweep. Holding cmd and pressing `c`
/// then `v` must leave cmd in the set between the two dispatches. `space` is
/// kept because space-drag gestures span many dispatches.
const STICKY_KEYS: [&str; 4] = ["meta", "shift", "control", "space"];

pub(crate) fn is_modifier_name(key: &str) -> bool {
    MODIFIER_NAMES.contains(&key)
}

/// The set of semantic keys currently held, lower-cased.
#[derive(Debug, Default)]
pub struct KeyTracker {
    keys: FxHashSet<String>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a non-modifier keydown. IME artifacts (`"dead"`) and empty
    /// key names are excluded; modifier names are handled by the flag sync
    /// instead.
    pub fn press(&mut self, key: &str) {
        let key = key.to_lowercase();
        if key.is_empty() || key == "dead" || is_modifier_name(&key) {
            return;
        }
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: &str) {
        let key = key.to_lowercase();
        self.keys.remove(&key);
    }

    /// Sync the synthetic modifier entries from a keyboard event.
    /// `space_keydown` is true only while a keydown with physical code Space
    /// is being processed; the `space` entry is not sticky across other
    /// keyboard events.
    pub fn sync_keyboard(&mut self, modifiers: Modifiers, space_keydown: bool) {
        self.sync_flags(modifiers);
        if space_keydown {
            self.keys.insert("space".to_string());
        } else {
            self.keys.remove("space");
        }
    }

    /// Sync the synthetic modifier entries from a mouse event. Mouse events
    /// carry no physical key code, so the `space` entry is left alone.
    pub fn sync_pointer(&mut self, modifiers: Modifiers) {
        self.sync_flags(modifiers);
    }

    fn sync_flags(&mut self, modifiers: Modifiers) {
        for (flag, name) in [
            (Modifiers::META, "meta"),
            (Modifiers::CONTROL, "control"),
            (Modifiers::ALT, "alt"),
            (Modifiers::SHIFT, "shift"),
        ] {
            if modifiers.contains(flag) {
                self.keys.insert(name.to_string());
            } else {
                self.keys.remove(name);
            }
        }
    }

    pub fn is_down(&self, key: &str) -> bool {
        self.keys.contains(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The live set, sorted, for order-independent chord comparison.
    pub fn sorted(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys.iter().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// True iff exactly `key` is held, nothing else.
    pub fn only(&self, key: &str) -> bool {
        self.keys.len() == 1 && self.is_down(key)
    }

    /// Mandatory post-dispatch cleanup. Non-sticky keys are dropped so that
    /// cmd-c followed by cmd-v works without releasing cmd. If a keydown
    /// dispatch terminated and no manipulator modifier is held, the whole
    /// set is cleared: when a handler moves focus (e.g. into an iframe), the
    /// matching keyup is never delivered and the key would stay stuck.
    pub(crate) fn finish_dispatch(&mut self, done: bool, was_keydown: bool) {
        self.keys.retain(|key| STICKY_KEYS.contains(&key.as_str()));

        if done
            && was_keydown
            && !self.is_down("shift")
            && !self.is_down("control")
            && !self.is_down("meta")
        {
            self.keys.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_follow_flags_not_key_events() {
        let mut tracker = KeyTracker::new();
        tracker.press("meta");
        assert!(tracker.is_empty(), "modifier names are not tracked as keys");

        tracker.sync_pointer(Modifiers::META | Modifiers::SHIFT);
        assert!(tracker.is_down("meta"));
        assert!(tracker.is_down("shift"));

        tracker.sync_pointer(Modifiers::SHIFT);
        assert!(!tracker.is_down("meta"));
        assert!(tracker.is_down("shift"));
    }

    #[test]
    fn dead_and_empty_keys_are_excluded() {
        let mut tracker = KeyTracker::new();
        tracker.press("dead");
        tracker.press("");
        assert!(tracker.is_empty());
    }

    #[test]
    fn keys_are_lower_cased() {
        let mut tracker = KeyTracker::new();
        tracker.press("ArrowLeft");
        assert!(tracker.is_down("arrowleft"));
        tracker.release("ARROWLEFT");
        assert!(tracker.is_empty());
    }

    #[test]
    fn space_is_not_sticky() {
        let mut tracker = KeyTracker::new();
        tracker.sync_keyboard(Modifiers::empty(), true);
        assert!(tracker.is_down("space"));

        // any later keyboard event without the space code clears it
        tracker.sync_keyboard(Modifiers::empty(), false);
        assert!(!tracker.is_down("space"));
    }

    #[test]
    fn pointer_sync_leaves_space_alone() {
        let mut tracker = KeyTracker::new();
        tracker.sync_keyboard(Modifiers::empty(), true);
        tracker.sync_pointer(Modifiers::empty());
        assert!(tracker.is_down("space"));
    }

    #[test]
    fn cleanup_keeps_manipulators_only() {
        let mut tracker = KeyTracker::new();
        tracker.sync_keyboard(Modifiers::META, false);
        tracker.press("c");
        tracker.finish_dispatch(true, true);
        assert!(tracker.is_down("meta"));
        assert!(!tracker.is_down("c"));
    }

    #[test]
    fn terminated_keydown_without_modifiers_clears_everything() {
        let mut tracker = KeyTracker::new();
        tracker.press("u");
        tracker.finish_dispatch(true, true);
        assert!(tracker.is_empty());
    }

    #[test]
    fn unterminated_keydown_keeps_sticky_keys() {
        let mut tracker = KeyTracker::new();
        tracker.sync_keyboard(Modifiers::SHIFT, false);
        tracker.press("x");
        tracker.finish_dispatch(false, true);
        assert!(tracker.is_down("shift"));
        assert!(!tracker.is_down("x"));
    }
}
