//! Logical shortcut names and their platform key-combination tables.
//!
//! A [`Shortcut`] is a closed set of logical names; the physical chords they
//! resolve to are swapped wholesale per platform at startup. A shortcut may
//! carry several alternative chords (a legacy spelling next to the idiomatic
//! one), and matching any alternative counts as a match.

use indexmap::IndexMap;
use smallvec::SmallVec;
use strum::IntoEnumIterator;

use crate::keyboard::{KeyTracker, Modifiers};

/// Host platform, injected at startup. Selects the chord table and the
/// meta-vs-control convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mac,
    Other,
}

impl Platform {
    pub fn is_mac(self) -> bool {
        matches!(self, Platform::Mac)
    }

    /// The key name that plays the "command" role on this platform.
    pub fn meta_key(self) -> &'static str {
        match self {
            Platform::Mac => "meta",
            Platform::Other => "control",
        }
    }

    /// Whether a click with these modifier flags counts as a meta-click
    /// (cmd-click on mac, ctrl-click elsewhere).
    pub fn is_meta_click(self, modifiers: Modifiers) -> bool {
        match self {
            Platform::Mac => modifiers.contains(Modifiers::META),
            Platform::Other => modifiers.contains(Modifiers::CONTROL),
        }
    }
}

/// Logical shortcut names. Closed enum: an unknown chord name is a compile
/// error rather than a runtime lookup failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum Shortcut {
    #[strum(serialize = "control-meta-shift-p")]
    ControlMetaShiftP,
    #[strum(serialize = "meta-shift-i")]
    MetaShiftI,
    #[strum(serialize = "meta-shift-alt-u")]
    MetaShiftAltU,
    #[strum(serialize = "alt-meta")]
    AltMeta,
    #[strum(serialize = "meta-/")]
    MetaSlash,
    #[strum(serialize = "meta-u")]
    MetaU,
    #[strum(serialize = "meta-a")]
    MetaA,
    #[strum(serialize = "meta-b")]
    MetaB,
    #[strum(serialize = "meta-e")]
    MetaE,
    #[strum(serialize = "meta-k")]
    MetaK,
    #[strum(serialize = "meta-l")]
    MetaL,
    #[strum(serialize = "meta-o")]
    MetaO,
    #[strum(serialize = "meta-j")]
    MetaJ,
    #[strum(serialize = "meta-v")]
    MetaV,
    #[strum(serialize = "meta-x")]
    MetaX,
    #[strum(serialize = "meta-c")]
    MetaC,
    #[strum(serialize = "meta-g")]
    MetaG,
    #[strum(serialize = "meta-t")]
    MetaT,
    #[strum(serialize = "meta-enter")]
    MetaEnter,
    #[strum(serialize = "meta-minus")]
    MetaMinus,
    #[strum(serialize = "meta-plus")]
    MetaPlus,
    #[strum(serialize = "meta-0")]
    Meta0,
    #[strum(serialize = "shift-home")]
    ShiftHome,
    #[strum(serialize = "shift-end")]
    ShiftEnd,
    #[strum(serialize = "home")]
    Home,
    #[strum(serialize = "end")]
    End,
    #[strum(serialize = "undo")]
    Undo,
    #[strum(serialize = "redo")]
    Redo,
}

impl Shortcut {
    /// The physical chords for this shortcut on `platform`. Alternatives are
    /// tried in order by [`ChordTable::matches`].
    fn bindings(self, platform: Platform) -> &'static [&'static [&'static str]] {
        use Shortcut::*;
        match platform {
            Platform::Mac => match self {
                ControlMetaShiftP => &[&["control", "meta", "p", "shift"]],
                MetaShiftI => &[&["i", "meta", "shift"]],
                // alt turns u into a diaeresis on mac keyboards
                MetaShiftAltU => &[&["alt", "meta", "shift", "\u{a8}"]],
                AltMeta => &[&["alt", "meta"]],
                MetaSlash => &[&["/", "meta"]],
                MetaU => &[&["meta", "u"]],
                MetaA => &[&["a", "meta"]],
                MetaB => &[&["b", "meta"]],
                MetaE => &[&["e", "meta"]],
                MetaK => &[&["k", "meta"]],
                MetaL => &[&["l", "meta"]],
                MetaO => &[&["meta", "o"]],
                MetaJ => &[&["j", "meta"]],
                MetaV => &[&["meta", "v"]],
                MetaX => &[&["meta", "x"]],
                MetaC => &[&["c", "meta"]],
                MetaG => &[&["g", "meta"]],
                MetaT => &[&["meta", "t"]],
                MetaEnter => &[&["enter", "meta"]],
                MetaMinus => &[&["meta", "-"]],
                MetaPlus => &[&["meta", "="]],
                Meta0 => &[&["meta", "0"]],
                ShiftHome => &[
                    &["a", "control", "shift"],
                    &["arrowleft", "meta", "shift"],
                ],
                ShiftEnd => &[
                    &["control", "e", "shift"],
                    &["arrowright", "meta", "shift"],
                ],
                Home => &[&["a", "control"], &["arrowleft", "meta"]],
                End => &[&["control", "e"], &["arrowright", "meta"]],
                Undo => &[&["meta", "z"]],
                Redo => &[&["meta", "shift", "z"]],
            },
            // On non-mac hosts the "meta" role is played by control.
            Platform::Other => match self {
                ControlMetaShiftP => &[&["control", "p", "shift"]],
                MetaShiftI => &[&["control", "i", "shift"]],
                MetaShiftAltU => &[&["alt", "control", "shift", "u"]],
                AltMeta => &[&["alt", "control"]],
                MetaSlash => &[&["/", "control"]],
                MetaU => &[&["control", "u"]],
                MetaA => &[&["a", "control"]],
                MetaB => &[&["b", "control"]],
                MetaE => &[&["control", "e"]],
                MetaK => &[&["control", "k"]],
                MetaL => &[&["control", "l"]],
                MetaO => &[&["control", "o"]],
                MetaJ => &[&["control", "j"]],
                MetaV => &[&["control", "v"]],
                MetaX => &[&["control", "x"]],
                MetaC => &[&["c", "control"]],
                MetaG => &[&["control", "g"]],
                MetaT => &[&["control", "t"]],
                MetaEnter => &[&["control", "enter"]],
                MetaMinus => &[&["control", "-"]],
                MetaPlus => &[&["control", "="]],
                Meta0 => &[&["control", "0"]],
                ShiftHome => &[&["home", "shift"]],
                ShiftEnd => &[&["end", "shift"]],
                Home => &[&["home"]],
                End => &[&["end"]],
                Undo => &[&["control", "z"]],
                Redo => &[&["control", "shift", "z"]],
            },
        }
    }
}

type Chord = SmallVec<[&'static str; 4]>;

/// The platform-selected table mapping every [`Shortcut`] to its sorted
/// physical chords.
#[derive(Debug)]
pub struct ChordTable {
    platform: Platform,
    table: IndexMap<Shortcut, SmallVec<[Chord; 2]>>,
}

impl ChordTable {
    /// Build the full table for a platform. Panics if a shortcut has no
    /// binding or a binding is empty; both are programmer errors in the
    /// static tables above and must fail at load, not at match time.
    pub fn for_platform(platform: Platform) -> Self {
        let mut table = IndexMap::new();
        for shortcut in Shortcut::iter() {
            let alternatives = shortcut.bindings(platform);
            assert!(
                !alternatives.is_empty(),
                "shortcut {shortcut} has no binding on {platform:?}"
            );
            let mut chords: SmallVec<[Chord; 2]> = SmallVec::new();
            for alt in alternatives {
                assert!(!alt.is_empty(), "shortcut {shortcut} has an empty chord");
                let mut chord: Chord = alt.iter().copied().collect();
                chord.sort_unstable();
                chords.push(chord);
            }
            table.insert(shortcut, chords);
        }
        ChordTable { platform, table }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Whether the live key set matches any alternative chord of `shortcut`.
    /// Element-for-element equality of the sorted sets; order-independent
    /// and exact, so a held extra key defeats the match.
    pub fn matches(&self, shortcut: Shortcut, keys: &KeyTracker) -> bool {
        let live = keys.sorted();
        self.table[&shortcut]
            .iter()
            .any(|chord| chord.len() == live.len() && chord.iter().zip(&live).all(|(a, b)| a == b))
    }
}
