#![forbid(unsafe_code)]

//! CSI and SS3 escape sequence decoding.
//!
//! A CSI sequence is `ESC [` (or the 8-bit 0x9B), optional private marker
//! bytes, parameter bytes (digits, `;`, `:`), intermediate bytes, and a
//! final byte in 0x40..=0x7E. Decoding first tries an exact lookup of the
//! raw sequence in the table, then falls back to structural parsing for
//! mouse reports and the Kitty keyboard protocol.
//!
//! # Design
//!
//! - A sequence cut off by the end of the window consumes nothing; the
//!   caller refills and retries.
//! - A byte outside the final range terminates the sequence without being
//!   consumed: the bytes up to it go through the table verbatim (terminfo
//!   overrides can map nonstandard sequences like URxvt's `CSI n $`) and
//!   miss as [`Event::Unknown`], while the offending byte stays in the
//!   window for the next dispatch.

use crate::event::Event;
use crate::kitty;
use crate::mouse;
use crate::table::{SequenceTable, xterm_modifiers};

/// Decode a CSI sequence. `intro_len` is the introducer length: 2 for
/// `ESC [`, 1 for the 8-bit 0x9B. Returns `(0, None)` when the window
/// ends before the sequence does.
pub(crate) fn decode_csi(
    buf: &[u8],
    intro_len: usize,
    table: &SequenceTable,
) -> (usize, Option<Event>) {
    let mut i = intro_len;

    // Private marker bytes.
    let marker_start = i;
    while i < buf.len() && (0x3c..=0x3f).contains(&buf[i]) {
        i += 1;
    }
    let marker = buf.get(marker_start..i).unwrap_or(&[]);

    // Parameter bytes.
    let params_start = i;
    while i < buf.len() && (0x30..=0x3b).contains(&buf[i]) {
        i += 1;
    }
    let params_raw = &buf[params_start..i];

    // Intermediate bytes.
    while i < buf.len() && (0x20..=0x2f).contains(&buf[i]) {
        i += 1;
    }

    let Some(&fin) = buf.get(i) else {
        return (0, None);
    };

    if !(0x40..=0x7e).contains(&fin) {
        // The sequence ends here but the byte belongs to whatever comes
        // next (often the ESC of the following sequence). Terminfo
        // overrides get a chance at the bytes scanned so far.
        let raw = &buf[..i];
        if let Some(key) = lookup(table, raw, intro_len) {
            return (i, Some(Event::Key(key)));
        }
        return (i, Some(Event::Unknown(raw.to_vec())));
    }
    let consumed = i + 1;
    let raw = &buf[..consumed];

    // Exact table match wins (cursor keys, function keys, XTerm
    // modified variants).
    if let Some(key) = lookup(table, raw, intro_len) {
        return (consumed, Some(Event::Key(key)));
    }

    let params = parse_params(params_raw);

    match (marker, fin) {
        // SGR mouse: CSI < btn;x;y M|m
        (b"<", b'M' | b'm') => {
            let btn = narrow(scalar(&params, 0));
            let col = narrow(scalar(&params, 1));
            let row = narrow(scalar(&params, 2));
            let ev = mouse::decode_sgr(btn, col, row, fin == b'm');
            (consumed, Some(Event::Mouse(ev)))
        }

        // X10 mouse: CSI M followed by three raw bytes.
        (b"", b'M') if params_raw.is_empty() => {
            let Some(bytes) = buf.get(consumed..consumed + 3) else {
                return (0, None);
            };
            let ev = mouse::decode_x10(bytes[0], bytes[1], bytes[2]);
            (consumed + 3, Some(Event::Mouse(ev)))
        }

        // Kitty keyboard protocol.
        (b"", b'u') => (consumed, Some(Event::Key(kitty::decode(&params)))),

        _ => (consumed, Some(Event::Unknown(raw.to_vec()))),
    }
}

/// Decode an SS3 sequence (`ESC O` or the 8-bit 0x8F). An optional
/// digit parameter carries XTerm modifiers.
pub(crate) fn decode_ss3(
    buf: &[u8],
    intro_len: usize,
    table: &SequenceTable,
) -> (usize, Option<Event>) {
    let mut i = intro_len;
    let mut modifier: u32 = 0;
    while i < buf.len() && buf[i].is_ascii_digit() {
        modifier = modifier
            .saturating_mul(10)
            .saturating_add(u32::from(buf[i] - b'0'));
        i += 1;
    }

    let Some(&fin) = buf.get(i) else {
        return (0, None);
    };
    let consumed = i + 1;
    let raw = &buf[..consumed];

    let key = [0x1b, b'O', fin];
    match table.lookup(&key) {
        Some(base) => {
            let mut key = base.clone();
            if modifier > 1 {
                key.modifiers |= xterm_modifiers(((modifier - 1) & 0x3f) as u8);
            }
            (consumed, Some(Event::Key(key)))
        }
        None => (consumed, Some(Event::Unknown(raw.to_vec()))),
    }
}

/// Table lookup of a raw sequence, normalizing the 8-bit introducer to
/// its 7-bit spelling.
fn lookup(table: &SequenceTable, raw: &[u8], intro_len: usize) -> Option<crate::event::KeyEvent> {
    if intro_len == 2 {
        return table.lookup(raw).cloned();
    }
    let mut key = Vec::with_capacity(raw.len() + 1);
    key.extend_from_slice(b"\x1b[");
    key.extend_from_slice(&raw[1..]);
    table.lookup(&key).cloned()
}

/// Parse CSI parameter bytes into semicolon-separated groups of
/// colon-separated sub-parameters. Empty positions parse as zero.
pub(crate) fn parse_params(raw: &[u8]) -> Vec<Vec<u32>> {
    let mut groups = Vec::new();
    let mut group = Vec::new();
    let mut value: u32 = 0;

    for &b in raw {
        match b {
            b'0'..=b'9' => {
                value = value.saturating_mul(10).saturating_add(u32::from(b - b'0'));
            }
            b':' => {
                group.push(value);
                value = 0;
            }
            b';' => {
                group.push(value);
                groups.push(std::mem::take(&mut group));
                value = 0;
            }
            _ => {}
        }
    }
    if !raw.is_empty() {
        group.push(value);
        groups.push(group);
    }
    groups
}

/// Clamp an oversized parameter instead of wrapping it.
fn narrow(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn scalar(params: &[Vec<u32>], index: usize) -> u32 {
    params
        .get(index)
        .and_then(|group| group.first())
        .copied()
        .unwrap_or(0)
}
