#![forbid(unsafe_code)]

//! Blocking driver: reads a byte source into a bounded window and
//! decodes events from it.
//!
//! The window is a fixed 256-byte buffer. Consumed bytes are compacted
//! away; an incomplete sequence stays at the front until another read
//! completes it. Two failure valves keep the driver live:
//!
//! - A full window with zero decode progress degrades to one
//!   [`Event::Unknown`] carrying the whole window.
//! - End of input drains any undecodable tail as [`Event::Unknown`],
//!   after which the next call reports `UnexpectedEof`.

use std::io;

use crate::decode::Decoder;
use crate::event::Event;
use crate::table::SequenceTable;

/// Capacity of the read window. No real terminal sequence comes close
/// to this length.
pub const WINDOW_SIZE: usize = 256;

/// A blocking byte source. Blanket-implemented for all [`io::Read`]
/// types, so files, pipes, sockets, and in-memory cursors all work.
pub trait ByteSource {
    /// Read some bytes, blocking until at least one is available.
    /// Returning zero means the source is exhausted.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<R: io::Read> ByteSource for R {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self, buf)
    }
}

/// Event driver over a blocking byte source.
#[derive(Debug)]
pub struct Driver<S> {
    source: S,
    decoder: Decoder,
    buf: [u8; WINDOW_SIZE],
    len: usize,
}

impl<S: ByteSource> Driver<S> {
    /// Create a driver decoding against the given table.
    pub fn new(source: S, table: SequenceTable) -> Self {
        Self {
            source,
            decoder: Decoder::new(table),
            buf: [0; WINDOW_SIZE],
            len: 0,
        }
    }

    /// The decoder, for inspecting paste state or the table.
    #[must_use]
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Read and consume the next batch of events. Blocks until at least
    /// one event is available or the source fails.
    ///
    /// # Errors
    ///
    /// Propagates source errors, including cancellation, unchanged.
    /// Returns `UnexpectedEof` once the source is exhausted and the
    /// window is empty.
    pub fn read_events(&mut self) -> io::Result<Vec<Event>> {
        loop {
            let events = self.drain_window();
            if !events.is_empty() {
                return Ok(events);
            }

            if self.len == WINDOW_SIZE {
                // No progress possible and no room to grow.
                #[cfg(feature = "tracing")]
                tracing::warn!(len = self.len, "window full without progress, degrading");
                let raw = self.buf[..self.len].to_vec();
                self.len = 0;
                return Ok(vec![Event::Unknown(raw)]);
            }

            if self.fill()? == 0 {
                if self.len > 0 {
                    // The tail can never complete now.
                    let raw = self.buf[..self.len].to_vec();
                    self.len = 0;
                    return Ok(vec![Event::Unknown(raw)]);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "byte source closed",
                ));
            }
        }
    }

    /// Decode events from the current window without consuming it or
    /// mutating paste state. Blocks to fill the window when it holds no
    /// complete unit yet.
    ///
    /// # Errors
    ///
    /// Same error contract as [`Driver::read_events`].
    pub fn peek_events(&mut self) -> io::Result<Vec<Event>> {
        loop {
            let mut decoder = self.decoder.clone();
            let mut events = Vec::new();
            let mut offset = 0;
            while offset < self.len {
                let (n, mut evs) = decoder.decode_next(&self.buf[offset..self.len]);
                if n == 0 {
                    break;
                }
                offset += n;
                events.append(&mut evs);
            }
            if !events.is_empty() {
                return Ok(events);
            }

            if self.len == WINDOW_SIZE {
                return Ok(vec![Event::Unknown(self.buf[..self.len].to_vec())]);
            }

            if self.fill()? == 0 {
                if self.len > 0 {
                    return Ok(vec![Event::Unknown(self.buf[..self.len].to_vec())]);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "byte source closed",
                ));
            }
        }
    }

    /// Decode as much of the window as possible, compacting consumed
    /// bytes away.
    fn drain_window(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while self.len > 0 {
            let (n, mut evs) = self.decoder.decode_next(&self.buf[..self.len]);
            if n == 0 {
                break;
            }
            self.buf.copy_within(n..self.len, 0);
            self.len -= n;
            events.append(&mut evs);
        }
        events
    }

    fn fill(&mut self) -> io::Result<usize> {
        let n = self.source.read(&mut self.buf[self.len..])?;
        self.len += n;
        Ok(n)
    }
}
