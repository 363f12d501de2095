#![forbid(unsafe_code)]

//! Canonical input event types.
//!
//! This module defines the events produced by the decoder. All events derive
//! `Clone`, `PartialEq`, and `Eq` for use in tests and pattern matching.
//!
//! # Design Notes
//!
//! - Mouse coordinates are 0-indexed (the wire protocols are 1-indexed)
//! - `KeyAction` defaults to `Press` when the terminal cannot report more
//! - `Modifiers` use bitflags for easy combination
//! - A key carries either a named symbol or a rune cluster; table entries
//!   for literal bytes may carry both (symbol plus fallback rune)

use bitflags::bitflags;

use crate::color::Rgb;

/// A decoded terminal input event.
///
/// Exactly one variant is produced per decoded unit; a single driver call
/// may return several events (a completed paste yields at least two).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A mouse event.
    Mouse(MouseEvent),

    /// Bracketed paste started; raw bytes are accumulated until the end
    /// marker arrives.
    PasteStart,

    /// Bracketed paste ended. Followed by a single [`Event::Paste`]
    /// carrying the accumulated text.
    PasteEnd,

    /// The full text of a bracketed paste, in order, with invalid UTF-8
    /// byte runs dropped.
    Paste(String),

    /// Foreground color reply (OSC 10).
    ForegroundColor(Rgb),

    /// Background color reply (OSC 11).
    BackgroundColor(Rgb),

    /// Cursor color reply (OSC 12).
    CursorColor(Rgb),

    /// A structurally valid but unrecognized sequence, carrying the raw
    /// bytes consumed so far. Callers can layer custom protocols (DCS,
    /// APC, unknown OSC identifiers) on top of these.
    Unknown(Vec<u8>),
}

/// A keyboard event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// Named key, if any (arrows, function keys, editing keys).
    pub sym: Option<KeySym>,

    /// Code points for printable keys. Multi-rune clusters (combining
    /// emoji, flags) arrive as a single event.
    pub runes: Vec<char>,

    /// Alternate code points reported by advanced protocols (shifted key
    /// or base-layout key from the Kitty keyboard protocol).
    pub alt_runes: Vec<char>,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// Press, repeat, or release.
    pub action: KeyAction,
}

impl KeyEvent {
    /// Create a key event for a named key.
    #[must_use]
    pub fn sym(sym: KeySym) -> Self {
        Self {
            sym: Some(sym),
            ..Self::default()
        }
    }

    /// Create a key event for a single rune.
    #[must_use]
    pub fn rune(c: char) -> Self {
        Self {
            runes: vec![c],
            ..Self::default()
        }
    }

    /// Create a key event from a rune cluster.
    #[must_use]
    pub fn runes(runes: Vec<char>) -> Self {
        Self {
            runes,
            ..Self::default()
        }
    }

    /// Add modifiers to this event.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    /// Set the action of this event.
    #[must_use]
    pub fn with_action(mut self, action: KeyAction) -> Self {
        self.action = action;
        self
    }

    /// Check if Ctrl is held.
    #[must_use]
    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt is held.
    #[must_use]
    pub fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift is held.
    #[must_use]
    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Named (non-rune) keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySym {
    /// Enter/Return key.
    Enter,
    /// Tab key.
    Tab,
    /// Backspace key.
    Backspace,
    /// Escape key.
    Escape,
    /// Space bar (unless the table maps it to the rune ' ').
    Space,
    /// Insert key.
    Insert,
    /// Delete key.
    Delete,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up key.
    PageUp,
    /// Page Down key.
    PageDown,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Begin key (keypad 5).
    Begin,
    /// Find key (VT220; usually decoded as Home).
    Find,
    /// Select key (VT220; usually decoded as End).
    Select,
    /// Function key (F1-F63).
    Function(u8),

    /// Caps Lock key.
    CapsLock,
    /// Scroll Lock key.
    ScrollLock,
    /// Num Lock key.
    NumLock,
    /// Print Screen key.
    PrintScreen,
    /// Pause key.
    Pause,
    /// Menu key.
    Menu,

    /// Keypad Enter.
    KpEnter,
    /// Keypad equals.
    KpEqual,
    /// Keypad Begin (keypad 5 without Num Lock).
    KpBegin,

    /// Media key: Play.
    MediaPlay,
    /// Media key: Pause.
    MediaPause,
    /// Media key: Play/Pause toggle.
    MediaPlayPause,
    /// Media key: Reverse.
    MediaReverse,
    /// Media key: Stop.
    MediaStop,
    /// Media key: Fast Forward.
    MediaFastForward,
    /// Media key: Rewind.
    MediaRewind,
    /// Media key: Next track.
    MediaNext,
    /// Media key: Previous track.
    MediaPrev,
    /// Media key: Record.
    MediaRecord,
    /// Volume down key.
    LowerVolume,
    /// Volume up key.
    RaiseVolume,
    /// Mute key.
    MuteVolume,

    /// Left Shift (reported by the Kitty keyboard protocol).
    LeftShift,
    /// Left Control.
    LeftCtrl,
    /// Left Alt.
    LeftAlt,
    /// Left Super.
    LeftSuper,
    /// Left Hyper.
    LeftHyper,
    /// Left Meta.
    LeftMeta,
    /// Right Shift.
    RightShift,
    /// Right Control.
    RightCtrl,
    /// Right Alt.
    RightAlt,
    /// Right Super.
    RightSuper,
    /// Right Hyper.
    RightHyper,
    /// Right Meta.
    RightMeta,
    /// ISO Level 3 Shift (AltGr).
    IsoLevel3Shift,
    /// ISO Level 5 Shift.
    IsoLevel5Shift,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyAction {
    /// Key was pressed (default when the terminal cannot report more).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key or mouse event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT = 0b00_0001;
        /// Alt/Option key.
        const ALT   = 0b00_0010;
        /// Control key.
        const CTRL  = 0b00_0100;
        /// Super/Command key.
        const SUPER = 0b00_1000;
        /// Hyper key.
        const HYPER = 0b01_0000;
        /// Meta key.
        const META  = 0b10_0000;
    }
}

/// A mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Column (0-indexed, leftmost is 0).
    pub column: u16,

    /// Row (0-indexed, topmost is 0).
    pub row: u16,

    /// Which button, if any.
    pub button: MouseButton,

    /// Press, release, or motion.
    pub action: MouseAction,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// Create a mouse event at the given 0-based position.
    #[must_use]
    pub const fn new(button: MouseButton, action: MouseAction, column: u16, row: u16) -> Self {
        Self {
            column,
            row,
            button,
            action,
            modifiers: Modifiers::empty(),
        }
    }

    /// Add modifiers to this event.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// No button (motion reports).
    #[default]
    None,
    /// Left mouse button.
    Left,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Right,
    /// Wheel scrolled up.
    WheelUp,
    /// Wheel scrolled down.
    WheelDown,
    /// Wheel tilted left.
    WheelLeft,
    /// Wheel tilted right.
    WheelRight,
    /// Backward button (XButton1).
    Backward,
    /// Forward button (XButton2).
    Forward,
}

/// The type of mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseAction {
    /// Button pressed down (also wheel ticks).
    #[default]
    Press,
    /// Button released.
    Release,
    /// Pointer moved, with or without a held button.
    Motion,
}
