//! Property-based invariant tests for the input decoder.
//!
//! These verify the incremental-parsing contract over arbitrary inputs:
//!
//! 1. Every table sequence decodes to exactly its mapped key, consuming
//!    exactly its own length.
//! 2. No byte is dropped or double-consumed: consumed counts over a
//!    buffer sum to its length.
//! 3. Decoding is chunking-invariant for escape-free input up to rune
//!    grouping: feeding the stream in arbitrary window sizes yields the
//!    same rune-level events as one large window. Cluster boundaries may
//!    differ because collection is greedy within the available window.
//!    (A lone trailing ESC decodes eagerly as the Escape key, so streams
//!    containing ESC are exempt by design.)
//! 4. `ESC` plus a printable byte is that byte's event with Alt set,
//!    consuming exactly two bytes.
//! 5. SGR mouse coordinates shift from 1-based wire form to 0-based
//!    events.
//! 6. Bracketed paste is verbatim for any escape-free UTF-8 content.
//! 7. Tables built with arbitrary flag combinations honor the remappings
//!    those flags declare.
//! 8. The decoder never panics on arbitrary byte soup and always makes
//!    progress once the window holds a complete unit or is degraded.

use proptest::prelude::*;
use vtinput_core::{
    Decoder, Event, Flags, KeyEvent, KeySym, Modifiers, MouseEvent, SequenceTable,
};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Decode a whole buffer with a fresh decoder, panicking on a stall.
fn decode_all(decoder: &mut Decoder, buf: &[u8]) -> Vec<Event> {
    let mut events = Vec::new();
    let mut offset = 0;
    while offset < buf.len() {
        let (n, mut evs) = decoder.decode_next(&buf[offset..]);
        assert!(n > 0, "stalled at offset {offset} of {:?}", buf);
        offset += n;
        events.append(&mut evs);
    }
    events
}

/// Simulate the driver window: feed chunks, carry an undecoded tail.
fn decode_chunked(buf: &[u8], chunk: usize) -> Vec<Event> {
    let mut decoder = Decoder::default();
    let mut events = Vec::new();
    let mut window: Vec<u8> = Vec::new();
    for piece in buf.chunks(chunk.max(1)) {
        window.extend_from_slice(piece);
        loop {
            let (n, mut evs) = decoder.decode_next(&window);
            if n == 0 {
                break;
            }
            window.drain(..n);
            events.append(&mut evs);
        }
    }
    assert!(window.is_empty(), "undecoded tail {window:?}");
    events
}

/// Split multi-rune key events into one event per rune, so event streams
/// can be compared independently of how clusters happened to be grouped.
fn normalize(events: Vec<Event>) -> Vec<Event> {
    events
        .into_iter()
        .flat_map(|ev| match ev {
            Event::Key(key) if key.runes.len() > 1 && key.sym.is_none() => key
                .runes
                .iter()
                .map(|&c| {
                    Event::Key(KeyEvent::rune(c).with_modifiers(key.modifiers))
                })
                .collect(),
            other => vec![other],
        })
        .collect()
}

/// Escape-free printable text plus common control bytes.
fn escape_free_stream() -> impl Strategy<Value = Vec<u8>> {
    let piece = prop_oneof![
        "[a-zA-Z0-9 ]{1,8}".prop_map(|s| s.into_bytes()),
        "[\\u{a1}-\\u{ff}\\u{400}-\\u{4ff}\\u{1f600}-\\u{1f640}]{1,4}"
            .prop_map(|s| s.into_bytes()),
        prop_oneof![Just(0x09u8), Just(0x0du8), Just(0x7fu8), Just(0x01u8)]
            .prop_map(|b| vec![b]),
    ];
    prop::collection::vec(piece, 0..8).prop_map(|pieces| pieces.concat())
}

/// Paste payloads: printable text with no ESC, so the end marker cannot
/// be forged by the content.
fn paste_content() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 \\u{a1}-\\u{ff}]{0,40}"
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Table sequences decode to themselves
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn every_table_sequence_decodes_exactly() {
    let table = SequenceTable::default();
    for (seq, key) in table.entries() {
        let mut decoder = Decoder::new(table.clone());
        let (n, events) = decoder.decode_next(seq);
        assert_eq!(n, seq.len(), "consumed length mismatch for {seq:?}");
        assert_eq!(
            events,
            vec![Event::Key(key.clone())],
            "event mismatch for {seq:?}"
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Consumed counts account for every byte
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn consumed_bytes_sum_to_length(stream in escape_free_stream()) {
        let mut decoder = Decoder::default();
        let mut offset = 0;
        while offset < stream.len() {
            let (n, _) = decoder.decode_next(&stream[offset..]);
            prop_assert!(n > 0, "stall at {offset}");
            offset += n;
        }
        prop_assert_eq!(offset, stream.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Chunking invariance for escape-free streams
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn chunking_is_invariant(stream in escape_free_stream(), chunk in 1usize..16) {
        let mut decoder = Decoder::default();
        let whole = decode_all(&mut decoder, &stream);
        let chunked = decode_chunked(&stream, chunk);
        prop_assert_eq!(normalize(whole), normalize(chunked));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Alt prefix
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn esc_prefix_means_alt(b in 0x21u8..0x7f) {
        // Introducer lookahead bytes start real sequences instead.
        prop_assume!(!matches!(b, b'O' | b'P' | b'[' | b']' | b'_'));

        let mut decoder = Decoder::default();
        let (plain_n, plain) = decoder.decode_next(&[b]);
        prop_assert_eq!(plain_n, 1);

        let mut decoder = Decoder::default();
        let (n, events) = decoder.decode_next(&[0x1b, b]);
        prop_assert_eq!(n, 2);

        let expected: Vec<Event> = plain
            .into_iter()
            .map(|ev| match ev {
                Event::Key(mut k) => {
                    k.modifiers |= Modifiers::ALT;
                    Event::Key(k)
                }
                other => other,
            })
            .collect();
        prop_assert_eq!(events, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. SGR mouse coordinates are 0-based
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sgr_mouse_coordinates_shift(btn in 0u16..4, col in 1u16..1000, row in 1u16..1000) {
        let seq = format!("\x1b[<{btn};{col};{row}M");
        let mut decoder = Decoder::default();
        let (n, events) = decoder.decode_next(seq.as_bytes());
        prop_assert_eq!(n, seq.len());
        prop_assert_eq!(events.len(), 1);
        let Event::Mouse(MouseEvent { column, row: r, .. }) = events[0].clone() else {
            return Err(TestCaseError::fail("expected mouse event"));
        };
        prop_assert_eq!(column, col - 1);
        prop_assert_eq!(r, row - 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Paste is verbatim
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn paste_roundtrip(content in paste_content(), chunk in 1usize..16) {
        let mut buf = b"\x1b[200~".to_vec();
        buf.extend_from_slice(content.as_bytes());
        buf.extend_from_slice(b"\x1b[201~");

        let events = decode_chunked(&buf, chunk);
        prop_assert_eq!(
            events,
            vec![
                Event::PasteStart,
                Event::PasteEnd,
                Event::Paste(content),
            ]
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Flag-built tables honor their remappings
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn flags_resolve_ambiguous_bytes(bits in any::<u16>()) {
        let flags = Flags::from_bits_truncate(bits);
        let table = SequenceTable::with_flags(flags);

        let tab = table.lookup(&[0x09]).cloned();
        if flags.contains(Flags::CTRL_I) {
            prop_assert_eq!(tab, Some(KeyEvent::rune('i').with_modifiers(Modifiers::CTRL)));
        } else {
            prop_assert_eq!(tab, Some(KeyEvent::sym(KeySym::Tab)));
        }

        let cr = table.lookup(&[0x0d]).cloned();
        if flags.contains(Flags::CTRL_M) {
            prop_assert_eq!(cr, Some(KeyEvent::rune('m').with_modifiers(Modifiers::CTRL)));
        } else {
            prop_assert_eq!(cr, Some(KeyEvent::sym(KeySym::Enter)));
        }

        let del = table.lookup(&[0x7f]).cloned();
        if flags.contains(Flags::BACKSPACE) {
            prop_assert_eq!(del, Some(KeyEvent::sym(KeySym::Delete)));
        } else {
            prop_assert_eq!(del, Some(KeyEvent::sym(KeySym::Backspace)));
        }

        let modified = table.lookup(b"\x1b[1;5A").cloned();
        if flags.contains(Flags::NO_XTERM) {
            prop_assert_eq!(modified, None);
        } else {
            prop_assert_eq!(
                modified,
                Some(KeyEvent::sym(KeySym::Up).with_modifiers(Modifiers::CTRL))
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. No panics, eventual progress on byte soup
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn no_panic_on_arbitrary_bytes(stream in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut decoder = Decoder::default();
        let mut offset = 0;
        let mut stalled = false;
        while offset < stream.len() {
            let (n, events) = decoder.decode_next(&stream[offset..]);
            if n == 0 {
                // Incomplete tail: a real driver would refill or degrade.
                stalled = true;
                break;
            }
            offset += n;
            drop(events);
        }
        prop_assert!(offset == stream.len() || stalled);
    }

    #[test]
    fn key_events_from_text_are_rune_clusters(text in "[a-z]{1,12}") {
        let mut decoder = Decoder::default();
        let (n, events) = decoder.decode_next(text.as_bytes());
        prop_assert_eq!(n, text.len());
        prop_assert_eq!(
            events,
            vec![Event::Key(KeyEvent::runes(text.chars().collect()))]
        );
    }
}
