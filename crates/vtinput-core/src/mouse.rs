#![forbid(unsafe_code)]

//! Mouse report decoding for the X10 and SGR protocols.
//!
//! Both protocols share one button encoding: the low two bits select the
//! button, bit 5 (32) marks motion, bit 6 (64) selects the wheel pairs,
//! and bit 7 (128) selects the backward/forward buttons. Bits 2..4
//! (4/8/16) carry Shift/Alt/Ctrl.
//!
//! They differ in framing. X10 (`CSI M` plus three raw bytes) offsets the
//! button byte by 32 and cannot report release buttons or coordinates
//! past 223. SGR (`CSI < p;x;y M|m`) sends decimal parameters and
//! distinguishes press from release with the final byte.

use crate::event::{Modifiers, MouseAction, MouseButton, MouseEvent};

/// Decode an X10 mouse report from the three bytes following `CSI M`.
///
/// The button byte carries the protocol's +32 offset; the coordinate
/// bytes are taken as 1-based positions.
#[must_use]
pub fn decode_x10(btn: u8, col: u8, row: u8) -> MouseEvent {
    let bits = u16::from(btn.wrapping_sub(32));
    let (button, action, modifiers) = decode_button(bits, ButtonFinal::X10);
    MouseEvent {
        column: u16::from(col).saturating_sub(1),
        row: u16::from(row).saturating_sub(1),
        button,
        action,
        modifiers,
    }
}

/// Decode an SGR mouse report from its three parameters and final byte.
///
/// `release` is true when the sequence ended in `m` rather than `M`.
#[must_use]
pub fn decode_sgr(btn: u16, col: u16, row: u16, release: bool) -> MouseEvent {
    let fin = if release {
        ButtonFinal::SgrRelease
    } else {
        ButtonFinal::SgrPress
    };
    let (button, action, modifiers) = decode_button(btn, fin);
    MouseEvent {
        column: col.saturating_sub(1),
        row: row.saturating_sub(1),
        button,
        action,
        modifiers,
    }
}

enum ButtonFinal {
    X10,
    SgrPress,
    SgrRelease,
}

fn decode_button(bits: u16, fin: ButtonFinal) -> (MouseButton, MouseAction, Modifiers) {
    let mut modifiers = Modifiers::empty();
    if bits & 4 != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if bits & 8 != 0 {
        modifiers |= Modifiers::ALT;
    }
    if bits & 16 != 0 {
        modifiers |= Modifiers::CTRL;
    }

    let motion = bits & 32 != 0;
    let low = bits & 3;

    let button = if bits & 64 != 0 {
        match low {
            0 => MouseButton::WheelUp,
            1 => MouseButton::WheelDown,
            2 => MouseButton::WheelLeft,
            _ => MouseButton::WheelRight,
        }
    } else if bits & 128 != 0 {
        match low {
            0 => MouseButton::Backward,
            _ => MouseButton::Forward,
        }
    } else {
        match low {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            // X10 uses 3 for release (of an unknown button); SGR uses it
            // for motion with no button held.
            _ => MouseButton::None,
        }
    };

    let action = if motion {
        MouseAction::Motion
    } else {
        match fin {
            ButtonFinal::X10 => {
                if button == MouseButton::None {
                    MouseAction::Release
                } else {
                    MouseAction::Press
                }
            }
            ButtonFinal::SgrPress => MouseAction::Press,
            ButtonFinal::SgrRelease => MouseAction::Release,
        }
    };

    (button, action, modifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x10_left_press() {
        let ev = decode_x10(0x20, 0x0a, 0x14);
        assert_eq!(
            ev,
            MouseEvent::new(MouseButton::Left, MouseAction::Press, 9, 19)
        );
    }

    #[test]
    fn x10_release_and_motion() {
        let ev = decode_x10(0x20 + 3, 1, 1);
        assert_eq!(ev.button, MouseButton::None);
        assert_eq!(ev.action, MouseAction::Release);

        let ev = decode_x10(0x20 + 32, 5, 6);
        assert_eq!(ev.button, MouseButton::Left);
        assert_eq!(ev.action, MouseAction::Motion);
        assert_eq!((ev.column, ev.row), (4, 5));
    }

    #[test]
    fn x10_wheel_and_modifiers() {
        let ev = decode_x10(0x20 + 64, 1, 1);
        assert_eq!(ev.button, MouseButton::WheelUp);
        assert_eq!(ev.action, MouseAction::Press);

        let ev = decode_x10(0x20 + 65 + 16, 1, 1);
        assert_eq!(ev.button, MouseButton::WheelDown);
        assert_eq!(ev.modifiers, Modifiers::CTRL);
    }

    #[test]
    fn sgr_left_press() {
        let ev = decode_sgr(0, 10, 20, false);
        assert_eq!(
            ev,
            MouseEvent::new(MouseButton::Left, MouseAction::Press, 9, 19)
        );
    }

    #[test]
    fn sgr_release_keeps_button() {
        let ev = decode_sgr(2, 3, 4, true);
        assert_eq!(ev.button, MouseButton::Right);
        assert_eq!(ev.action, MouseAction::Release);
    }

    #[test]
    fn sgr_motion_without_button() {
        let ev = decode_sgr(35, 8, 8, false);
        assert_eq!(ev.button, MouseButton::None);
        assert_eq!(ev.action, MouseAction::Motion);
    }

    #[test]
    fn sgr_extra_buttons() {
        let ev = decode_sgr(128, 1, 1, false);
        assert_eq!(ev.button, MouseButton::Backward);
        let ev = decode_sgr(129, 1, 1, false);
        assert_eq!(ev.button, MouseButton::Forward);
    }

    #[test]
    fn sgr_shift_alt_wheel() {
        let ev = decode_sgr(64 + 1 + 4 + 8, 2, 2, false);
        assert_eq!(ev.button, MouseButton::WheelDown);
        assert_eq!(ev.modifiers, Modifiers::SHIFT | Modifiers::ALT);
    }

    #[test]
    fn coordinates_saturate_at_zero() {
        // A zero coordinate never underflows.
        let ev = decode_sgr(0, 0, 0, false);
        assert_eq!((ev.column, ev.row), (0, 0));
    }
}
