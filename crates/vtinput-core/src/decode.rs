#![forbid(unsafe_code)]

//! The incremental decoder: byte classification and grammar dispatch.
//!
//! [`Decoder::decode_next`] takes the current buffer window and returns
//! how many bytes form the next recognized unit plus the events that
//! unit represents. Zero consumed bytes means the window ends inside a
//! sequence; the caller must read more bytes and retry. The only state
//! carried across calls is the bracketed paste accumulator.
//!
//! # Design
//!
//! - A whole-window exact table match is taken before any grammar
//!   parsing. This keeps `Alt+[` from being misread as a CSI introducer
//!   when a terminfo override claims the two-byte sequence.
//! - `ESC` followed by a non-introducer byte means Alt plus that byte,
//!   reprocessed standalone. An alt-pending flag drives one more trip
//!   through the dispatch loop rather than a recursive call.
//! - A lone `ESC` at the end of the window decodes as the Escape key
//!   immediately. Waiting for a possible continuation would need a
//!   timeout, and this decoder is deliberately time-free.

use crate::csi;
use crate::event::{Event, KeyEvent, Modifiers};
use crate::osc;
use crate::paste;
use crate::table::SequenceTable;

/// Incremental decoder over a byte window.
///
/// Holds the sequence table and the bracketed paste accumulator. Cloning
/// is cheap enough for peek paths that must not disturb paste state.
#[derive(Debug, Clone)]
pub struct Decoder {
    table: SequenceTable,
    pasting: Option<Vec<u8>>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(SequenceTable::default())
    }
}

impl Decoder {
    /// Create a decoder over the given sequence table.
    #[must_use]
    pub fn new(table: SequenceTable) -> Self {
        Self {
            table,
            pasting: None,
        }
    }

    /// The table this decoder resolves fixed sequences against.
    #[must_use]
    pub fn table(&self) -> &SequenceTable {
        &self.table
    }

    /// True while inside a bracketed paste.
    #[must_use]
    pub fn is_pasting(&self) -> bool {
        self.pasting.is_some()
    }

    /// Decode the next unit from the window.
    ///
    /// Returns the number of bytes consumed and the events they decode
    /// to. `(0, [])` signals an incomplete sequence: refill the window
    /// and call again. A positive count with no events is valid (bytes
    /// were absorbed, e.g. paste content or an invalid lead byte).
    pub fn decode_next(&mut self, buf: &[u8]) -> (usize, Vec<Event>) {
        if buf.is_empty() {
            return (0, Vec::new());
        }

        if let Some(acc) = &mut self.pasting {
            let (n, events) = paste::decode_pasting(buf, acc);
            if !events.is_empty() {
                self.pasting = None;
            }
            return (n, events);
        }

        if buf.starts_with(paste::START_MARKER) {
            #[cfg(feature = "tracing")]
            tracing::trace!("paste start");
            self.pasting = Some(Vec::new());
            return (paste::START_MARKER.len(), vec![Event::PasteStart]);
        }

        // Whole-window fast path.
        if let Some(key) = self.table.lookup(buf) {
            return (buf.len(), vec![Event::Key(key.clone())]);
        }

        let mut alt = false;
        let mut offset = 0;
        loop {
            let rest = &buf[offset..];
            let Some(&b) = rest.first() else {
                // Trailing ESC with nothing after it; wait for more.
                return (0, Vec::new());
            };

            let (n, events) = match b {
                0x1b => {
                    match rest.get(1) {
                        None => {
                            // Lone Escape at the end of the window.
                            let key = self
                                .table
                                .lookup(&[0x1b])
                                .cloned()
                                .unwrap_or_else(|| KeyEvent::rune('\u{1b}'));
                            (1, vec![Event::Key(key)])
                        }
                        Some(b'[') => csi_outcome(csi::decode_csi(rest, 2, &self.table)),
                        Some(b'O') => csi_outcome(csi::decode_ss3(rest, 2, &self.table)),
                        Some(b']') => string_sequence(rest, 2, StringKind::Osc),
                        Some(b'P') => string_sequence(rest, 2, StringKind::Dcs),
                        Some(b'_') => string_sequence(rest, 2, StringKind::Apc),
                        Some(_) => {
                            // Alt plus whatever the next byte decodes to.
                            alt = true;
                            offset += 1;
                            continue;
                        }
                    }
                }

                0x9b => csi_outcome(csi::decode_csi(rest, 1, &self.table)),
                0x8f => csi_outcome(csi::decode_ss3(rest, 1, &self.table)),
                0x9d => string_sequence(rest, 1, StringKind::Osc),
                0x90 => string_sequence(rest, 1, StringKind::Dcs),
                0x9f => string_sequence(rest, 1, StringKind::Apc),

                // Control bytes, DEL, and space resolve by table.
                _ if b <= 0x20 || b == 0x7f => match self.table.lookup(&[b]) {
                    Some(key) => (1, vec![Event::Key(key.clone())]),
                    None => (1, vec![Event::Unknown(vec![b])]),
                },

                _ => match collect_runes(rest, alt) {
                    RuneScan::Incomplete => return (0, Vec::new()),
                    RuneScan::Skip => (1, Vec::new()),
                    RuneScan::Cluster(len, runes) => {
                        (len, vec![Event::Key(KeyEvent::runes(runes))])
                    }
                },
            };

            if n == 0 {
                // Incomplete inner sequence; the pending ESC stays too.
                return (0, Vec::new());
            }

            return finish(offset + n, events, alt);
        }
    }
}

fn csi_outcome((n, event): (usize, Option<Event>)) -> (usize, Vec<Event>) {
    match event {
        Some(ev) => (n, vec![ev]),
        None => (0, Vec::new()),
    }
}

enum StringKind {
    Osc,
    Dcs,
    Apc,
}

fn string_sequence(rest: &[u8], intro_len: usize, kind: StringKind) -> (usize, Vec<Event>) {
    let Some(span) = osc::scan_string(rest, intro_len) else {
        return (0, Vec::new());
    };
    let raw = &rest[..span.consumed];
    let event = match kind {
        StringKind::Osc => osc::osc_event(&rest[intro_len..span.body_end], raw),
        StringKind::Dcs | StringKind::Apc => Event::Unknown(raw.to_vec()),
    };
    #[cfg(feature = "tracing")]
    if matches!(event, Event::Unknown(_)) {
        tracing::trace!(len = span.consumed, "unrecognized string sequence");
    }
    (span.consumed, vec![event])
}

/// Apply a pending Alt modifier to the decoded events.
fn finish(consumed: usize, events: Vec<Event>, alt: bool) -> (usize, Vec<Event>) {
    if !alt {
        return (consumed, events);
    }
    let events = events
        .into_iter()
        .map(|ev| match ev {
            Event::Key(mut key) => {
                key.modifiers |= Modifiers::ALT;
                Event::Key(key)
            }
            Event::Mouse(mut mouse) => {
                mouse.modifiers |= Modifiers::ALT;
                Event::Mouse(mouse)
            }
            other => other,
        })
        .collect();
    (consumed, events)
}

enum RuneScan {
    /// The window ends inside a rune.
    Incomplete,
    /// Impossible lead byte; drop it.
    Skip,
    /// A cluster of decoded code points and its byte length.
    Cluster(usize, Vec<char>),
}

enum RuneStep {
    Incomplete,
    Invalid,
    Rune(char, usize),
}

/// Greedily collect contiguous printable code points into one cluster,
/// stopping at the first control, space, or invalid byte. With `single`
/// set (Alt handling) exactly one code point is taken.
fn collect_runes(rest: &[u8], single: bool) -> RuneScan {
    let mut runes = Vec::new();
    let mut i = 0;

    while i < rest.len() {
        let b = rest[i];
        if b <= 0x20 || b == 0x7f {
            break;
        }
        match next_rune(&rest[i..]) {
            RuneStep::Rune(c, n) => {
                runes.push(c);
                i += n;
                if single {
                    break;
                }
            }
            RuneStep::Incomplete => {
                if runes.is_empty() {
                    return RuneScan::Incomplete;
                }
                break;
            }
            RuneStep::Invalid => {
                if runes.is_empty() {
                    return RuneScan::Skip;
                }
                break;
            }
        }
    }

    if runes.is_empty() {
        // Reachable only when the first byte was a boundary byte, which
        // the dispatcher never sends here; treat it as a skip.
        return RuneScan::Skip;
    }
    RuneScan::Cluster(i, runes)
}

/// Decode one UTF-8 code point from the front of the slice.
fn next_rune(bytes: &[u8]) -> RuneStep {
    let Some(&lead) = bytes.first() else {
        return RuneStep::Incomplete;
    };
    let len = match lead {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return RuneStep::Invalid,
    };
    if bytes.len() < len {
        return RuneStep::Incomplete;
    }
    match std::str::from_utf8(&bytes[..len]) {
        Ok(s) => match s.chars().next() {
            Some(c) => RuneStep::Rune(c, len),
            None => RuneStep::Invalid,
        },
        Err(_) => RuneStep::Invalid,
    }
}
