#![forbid(unsafe_code)]

//! Keyboard input: physical key codes to navigator actions.
//!
//! Bindings use the DOM `KeyboardEvent.code` (physical key) rather than
//! `key`, so they work on any layout: `KeyW` is the same key on QWERTY and
//! on a Cyrillic layout.
//!
//! Chords with Ctrl, Alt or Meta are never handled, so browser shortcuts
//! (`Ctrl+F`, `Cmd+W`, ...) keep working. Shift is ignored for matching.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

impl Modifiers {
    /// Modifiers that turn a key press into a browser shortcut.
    pub const SHORTCUT: Self = Self::ALT.union(Self::CTRL).union(Self::META);
}

/// A `keydown` reduced to what the dispatcher looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// DOM `KeyboardEvent.code`, e.g. `"KeyS"`.
    pub code: String,
    pub modifiers: Modifiers,
}

impl KeyInput {
    /// A key press with no modifiers.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            modifiers: Modifiers::empty(),
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Navigator operation a key is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    PrevPost,
    NextPost,
    PrevPhoto,
    NextPhoto,
    Like,
    HideOrRestore,
}

impl Action {
    /// Stable label for structured logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrevPost => "prev_post",
            Self::NextPost => "next_post",
            Self::PrevPhoto => "prev_photo",
            Self::NextPhoto => "next_photo",
            Self::Like => "like",
            Self::HideOrRestore => "hide_or_restore",
        }
    }
}

/// Why a key press was not turned into an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    /// The key has no binding.
    Unbound,
    /// Ctrl, Alt or Meta was held.
    Shortcut,
    /// A text field has focus.
    TextEntryFocused,
    /// A modal layer covers the feed.
    LayerShown,
}

impl IgnoredReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unbound => "unbound",
            Self::Shortcut => "shortcut",
            Self::TextEntryFocused => "text_entry_focused",
            Self::LayerShown => "layer_shown",
        }
    }
}

/// Result of dispatching one key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Performed(Action),
    Ignored(IgnoredReason),
}

/// Default physical-key bindings.
pub const DEFAULT_BINDINGS: &[(&str, Action)] = &[
    ("KeyW", Action::PrevPost),
    ("KeyS", Action::NextPost),
    ("KeyA", Action::PrevPhoto),
    ("KeyD", Action::NextPhoto),
    ("KeyF", Action::Like),
    ("KeyQ", Action::HideOrRestore),
];

/// Fixed table from physical key code to [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keymap {
    bindings: &'static [(&'static str, Action)],
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new(DEFAULT_BINDINGS)
    }
}

impl Keymap {
    #[must_use]
    pub const fn new(bindings: &'static [(&'static str, Action)]) -> Self {
        Self { bindings }
    }

    /// Action bound to `code`; the first binding wins on duplicates.
    #[must_use]
    pub fn resolve(&self, code: &str) -> Option<Action> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|&(_, action)| action)
    }

    /// Map a key press, ignoring shortcut chords.
    pub fn map(&self, key: &KeyInput) -> Result<Action, IgnoredReason> {
        if key.modifiers.intersects(Modifiers::SHORTCUT) {
            return Err(IgnoredReason::Shortcut);
        }
        self.resolve(&key.code).ok_or(IgnoredReason::Unbound)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&'static str, Action)> + '_ {
        self.bindings.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_cover_every_action() {
        let keymap = Keymap::default();
        for action in [
            Action::PrevPost,
            Action::NextPost,
            Action::PrevPhoto,
            Action::NextPhoto,
            Action::Like,
            Action::HideOrRestore,
        ] {
            assert!(
                keymap.bindings().any(|(_, bound)| bound == action),
                "no key for {}",
                action.as_str()
            );
        }
    }

    #[test]
    fn resolves_physical_codes() {
        let keymap = Keymap::default();
        assert_eq!(keymap.resolve("KeyS"), Some(Action::NextPost));
        assert_eq!(keymap.resolve("KeyW"), Some(Action::PrevPost));
        assert_eq!(keymap.resolve("KeyQ"), Some(Action::HideOrRestore));
        assert_eq!(keymap.resolve("s"), None);
        assert_eq!(keymap.resolve("KeyZ"), None);
    }

    #[test]
    fn shift_is_ignored_for_matching() {
        let keymap = Keymap::default();
        let key = KeyInput::new("KeyF").with_modifiers(Modifiers::SHIFT);
        assert_eq!(keymap.map(&key), Ok(Action::Like));
    }

    #[test]
    fn shortcut_chords_pass_through() {
        let keymap = Keymap::default();
        for mods in [Modifiers::CTRL, Modifiers::ALT, Modifiers::META, Modifiers::CTRL | Modifiers::SHIFT] {
            let key = KeyInput::new("KeyS").with_modifiers(mods);
            assert_eq!(keymap.map(&key), Err(IgnoredReason::Shortcut));
        }
    }

    #[test]
    fn unbound_key_is_reported() {
        let keymap = Keymap::default();
        assert_eq!(keymap.map(&KeyInput::new("Enter")), Err(IgnoredReason::Unbound));
    }

    #[test]
    fn custom_table_first_binding_wins() {
        static TABLE: &[(&str, Action)] = &[("KeyJ", Action::NextPost), ("KeyJ", Action::Like)];
        let keymap = Keymap::new(TABLE);
        assert_eq!(keymap.resolve("KeyJ"), Some(Action::NextPost));
    }
}
