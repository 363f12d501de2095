#![forbid(unsafe_code)]

//! Bracketed paste accumulation.
//!
//! Between the start marker (`CSI 200 ~`) and end marker (`CSI 201 ~`)
//! every byte is paste content, even bytes that would otherwise parse as
//! escape sequences. The accumulator grows until the end marker arrives,
//! then flushes as one [`Event::Paste`] with invalid UTF-8 runs dropped.
//!
//! A window tail that is a proper prefix of the end marker stays
//! unconsumed: it may complete into the marker on the next fill.

use crate::event::Event;

/// The paste start marker, recognized by the dispatch loop.
pub(crate) const START_MARKER: &[u8] = b"\x1b[200~";

/// The paste end marker, recognized here.
pub(crate) const END_MARKER: &[u8] = b"\x1b[201~";

/// Consume paste content from `buf` into `acc`. Emits `[PasteEnd,
/// Paste(text)]` and drains the accumulator when the end marker is
/// found. Returns zero consumed when the whole window could still be
/// part of the end marker.
pub(crate) fn decode_pasting(buf: &[u8], acc: &mut Vec<u8>) -> (usize, Vec<Event>) {
    if let Some(pos) = find_marker(buf) {
        acc.extend_from_slice(&buf[..pos]);
        let text = decode_text(acc);
        acc.clear();
        return (pos + END_MARKER.len(), vec![Event::PasteEnd, Event::Paste(text)]);
    }

    // Keep any tail that could grow into the end marker.
    let tail = marker_prefix_overlap(buf);
    let consumed = buf.len() - tail;
    acc.extend_from_slice(&buf[..consumed]);
    (consumed, Vec::new())
}

fn find_marker(buf: &[u8]) -> Option<usize> {
    buf.windows(END_MARKER.len())
        .position(|w| w == END_MARKER)
}

/// Longest k such that the buffer ends with the first k marker bytes.
fn marker_prefix_overlap(buf: &[u8]) -> usize {
    let max = END_MARKER.len().min(buf.len());
    (1..=max)
        .rev()
        .find(|&k| buf[buf.len() - k..] == END_MARKER[..k])
        .unwrap_or(0)
}

/// Decode paste bytes as UTF-8, dropping invalid runs rather than
/// substituting replacement characters.
fn decode_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(s) => {
                out.push_str(s);
                break;
            }
            Err(err) => {
                let valid = err.valid_up_to();
                if let Ok(s) = std::str::from_utf8(&rest[..valid]) {
                    out.push_str(s);
                }
                let skip = err.error_len().unwrap_or(rest.len() - valid);
                rest = &rest[valid + skip..];
            }
        }
    }
    out
}
