#![forbid(unsafe_code)]

//! Core: incremental terminal input decoding into structured events.
//!
//! Terminals multiplex keys, mouse reports, paste blocks, and query
//! replies over one byte stream using overlapping escape-sequence
//! grammars. [`decode::Decoder`] disambiguates them incrementally from a
//! partial buffer; [`driver::Driver`] wraps a blocking byte source and
//! the bounded window the decoder runs over.

pub mod color;
pub mod decode;
pub mod driver;
pub mod event;
pub mod kitty;
pub mod logging;
pub mod mouse;
pub mod table;

mod csi;
mod osc;
mod paste;

pub use color::Rgb;
pub use decode::Decoder;
pub use driver::{ByteSource, Driver, WINDOW_SIZE};
pub use event::{
    Event, KeyAction, KeyEvent, KeySym, Modifiers, MouseAction, MouseButton, MouseEvent,
};
pub use table::{Flags, SequenceTable, SequenceTableBuilder};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};
