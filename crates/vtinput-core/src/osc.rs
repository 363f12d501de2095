#![forbid(unsafe_code)]

//! String sequences: OSC, DCS, and APC.
//!
//! These share one framing rule: an introducer, an arbitrary byte body,
//! and a terminator. The terminator is BEL (0x07), the 8-bit ST (0x9C),
//! or the 7-bit ST (`ESC \`). A bare ESC that is not part of ST aborts
//! the sequence and is left in the buffer to start the next one.
//!
//! Only OSC 10/11/12 color replies decode to structured events; other
//! string sequences surface as [`Event::Unknown`] so callers can layer
//! their own protocols on top.

use crate::color::parse_x11_color;
use crate::event::Event;

/// Where a string sequence's body ends and how many bytes the whole
/// sequence consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StringSpan {
    /// Index one past the last body byte.
    pub body_end: usize,
    /// Total bytes consumed including introducer and terminator.
    pub consumed: usize,
}

/// Scan for the terminator of a string sequence whose body starts at
/// `body_start`. Returns `None` when the window ends before a
/// terminator is seen (incomplete).
pub(crate) fn scan_string(buf: &[u8], body_start: usize) -> Option<StringSpan> {
    let mut i = body_start;
    while i < buf.len() {
        match buf[i] {
            0x07 | 0x9c => {
                return Some(StringSpan {
                    body_end: i,
                    consumed: i + 1,
                });
            }
            0x1b => {
                if i + 1 >= buf.len() {
                    // Cannot tell yet whether this is ST.
                    return None;
                }
                let consumed = if buf[i + 1] == b'\\' { i + 2 } else { i };
                return Some(StringSpan {
                    body_end: i,
                    consumed,
                });
            }
            _ => i += 1,
        }
    }
    None
}

/// Decode an OSC body of the form `Ps;Pt`. Color replies (OSC 10/11/12)
/// produce structured events; everything else is surfaced raw.
pub(crate) fn osc_event(body: &[u8], raw: &[u8]) -> Event {
    let unknown = || Event::Unknown(raw.to_vec());

    let Ok(text) = std::str::from_utf8(body) else {
        return unknown();
    };
    let Some((id, rest)) = text.split_once(';') else {
        return unknown();
    };
    let Ok(id) = id.parse::<u16>() else {
        return unknown();
    };

    match id {
        10 | 11 | 12 => match parse_x11_color(rest) {
            Some(color) => match id {
                10 => Event::ForegroundColor(color),
                11 => Event::BackgroundColor(color),
                _ => Event::CursorColor(color),
            },
            None => unknown(),
        },
        _ => unknown(),
    }
}
