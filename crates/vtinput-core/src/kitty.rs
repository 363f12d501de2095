#![forbid(unsafe_code)]

//! Kitty keyboard protocol decoding (`CSI code;mods;text u`).
//!
//! The protocol packs everything into one CSI sequence with colon-separated
//! sub-parameters:
//!
//! ```text
//! CSI code[:shifted[:base]] ; [mods[:action]] ; [codepoints] u
//! ```
//!
//! Functional keys live in a Unicode private use block starting at 57344;
//! everything else is a literal code point. The modifier parameter is the
//! held bitmask plus one, so an absent parameter means "no modifiers".

use crate::event::{KeyAction, KeyEvent, KeySym};
use crate::table::xterm_modifiers;

/// Decode a Kitty keyboard report from its parsed CSI parameters.
///
/// Each outer slice element is one semicolon-separated parameter; inner
/// values are its colon-separated sub-parameters. Empty sub-parameters
/// are zero.
#[must_use]
pub fn decode(params: &[Vec<u32>]) -> KeyEvent {
    let first = params.first().map(Vec::as_slice).unwrap_or(&[]);
    let second = params.get(1).map(Vec::as_slice).unwrap_or(&[]);
    let third = params.get(2).map(Vec::as_slice).unwrap_or(&[]);

    let code = first.first().copied().unwrap_or(0);
    let mut key = key_for_code(code);

    // Shifted code point from the alternate-keys extension. Alternates
    // only make sense for rune keys; functional keys have no shifted
    // spelling.
    if key.sym.is_none()
        && let Some(&shifted) = first.get(1)
        && shifted != 0
        && let Some(c) = char::from_u32(shifted)
    {
        key.alt_runes = vec![c];
    }

    // Modifier parameter defaults to 1 (no modifiers). Bits above the
    // Meta bit report lock state, which we do not surface.
    let mods = second.first().copied().unwrap_or(1).max(1);
    key.modifiers = xterm_modifiers(((mods - 1) & 0x3f) as u8);

    key.action = match second.get(1).copied() {
        Some(2) => KeyAction::Repeat,
        Some(3) => KeyAction::Release,
        _ => KeyAction::Press,
    };

    // Base layout key, when present, wins over the shifted code point.
    if key.sym.is_none()
        && let Some(&base) = third.first()
        && base != 0
        && let Some(c) = char::from_u32(base)
    {
        key.alt_runes = vec![c];
    }

    key
}

/// Map a Kitty key code to an event: either a functional key from the
/// private use block, a legacy C0 alias, or a literal rune.
fn key_for_code(code: u32) -> KeyEvent {
    // Legacy aliases the protocol keeps for keys that already have C0
    // encodings.
    match code {
        9 => return KeyEvent::sym(KeySym::Tab),
        13 => return KeyEvent::sym(KeySym::Enter),
        27 => return KeyEvent::sym(KeySym::Escape),
        127 => return KeyEvent::sym(KeySym::Backspace),
        _ => {}
    }

    let sym = match code {
        57344 => KeySym::Escape,
        57345 => KeySym::Enter,
        57346 => KeySym::Tab,
        57347 => KeySym::Backspace,
        57348 => KeySym::Insert,
        57349 => KeySym::Delete,
        57350 => KeySym::Left,
        57351 => KeySym::Right,
        57352 => KeySym::Up,
        57353 => KeySym::Down,
        57354 => KeySym::PageUp,
        57355 => KeySym::PageDown,
        57356 => KeySym::Home,
        57357 => KeySym::End,
        57358 => KeySym::CapsLock,
        57359 => KeySym::ScrollLock,
        57360 => KeySym::NumLock,
        57361 => KeySym::PrintScreen,
        57362 => KeySym::Pause,
        57363 => KeySym::Menu,

        // F13..F35.
        57376..=57398 => KeySym::Function((code - 57376 + 13) as u8),

        // Keypad digits and operators report as runes so text entry
        // works regardless of Num Lock reporting.
        57399..=57408 => {
            let digit = (b'0' + (code - 57399) as u8) as char;
            return KeyEvent::rune(digit);
        }
        57409 => return KeyEvent::rune('.'),
        57410 => return KeyEvent::rune('/'),
        57411 => return KeyEvent::rune('*'),
        57412 => return KeyEvent::rune('-'),
        57413 => return KeyEvent::rune('+'),
        57414 => KeySym::KpEnter,
        57415 => KeySym::KpEqual,
        57416 => return KeyEvent::rune(','),
        57417 => KeySym::Left,
        57418 => KeySym::Right,
        57419 => KeySym::Up,
        57420 => KeySym::Down,
        57421 => KeySym::PageUp,
        57422 => KeySym::PageDown,
        57423 => KeySym::Home,
        57424 => KeySym::End,
        57425 => KeySym::Insert,
        57426 => KeySym::Delete,
        57427 => KeySym::KpBegin,

        57428 => KeySym::MediaPlay,
        57429 => KeySym::MediaPause,
        57430 => KeySym::MediaPlayPause,
        57431 => KeySym::MediaReverse,
        57432 => KeySym::MediaStop,
        57433 => KeySym::MediaFastForward,
        57434 => KeySym::MediaRewind,
        57435 => KeySym::MediaNext,
        57436 => KeySym::MediaPrev,
        57437 => KeySym::MediaRecord,
        57438 => KeySym::LowerVolume,
        57439 => KeySym::RaiseVolume,
        57440 => KeySym::MuteVolume,

        57441 => KeySym::LeftShift,
        57442 => KeySym::LeftCtrl,
        57443 => KeySym::LeftAlt,
        57444 => KeySym::LeftSuper,
        57445 => KeySym::LeftHyper,
        57446 => KeySym::LeftMeta,
        57447 => KeySym::RightShift,
        57448 => KeySym::RightCtrl,
        57449 => KeySym::RightAlt,
        57450 => KeySym::RightSuper,
        57451 => KeySym::RightHyper,
        57452 => KeySym::RightMeta,
        57453 => KeySym::IsoLevel3Shift,
        57454 => KeySym::IsoLevel5Shift,

        _ => {
            let c = char::from_u32(code).unwrap_or('\u{FFFD}');
            return KeyEvent::rune(c);
        }
    };
    KeyEvent::sym(sym)
}
