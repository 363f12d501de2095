#![forbid(unsafe_code)]

//! Flag-driven lookup table for fixed key sequences.
//!
//! The decoder resolves control bytes, CSI/SS3 function keys, and their
//! XTerm-modified variants through a [`SequenceTable`] built once up front.
//! Behavior flags resolve the classic terminal ambiguities (is 0x09 Tab or
//! Ctrl+I?) at build time, so decoding stays a plain map lookup.
//!
//! # Design
//!
//! - Entries are keyed by the full raw byte sequence, including the 0x1B
//!   introducer for escape sequences and single bytes for control keys.
//! - XTerm modifier expansion (`CSI 1;m X`, `CSI n;m ~` for m in 2..=8)
//!   is generated into the table rather than parsed structurally.
//! - Caller-supplied entries (typically from terminfo) override defaults
//!   unless [`Flags::NO_TERMINFO`] is set.

use std::collections::HashMap;

use bitflags::bitflags;

use crate::event::{KeyEvent, KeySym, Modifiers};

bitflags! {
    /// Behavior flags that resolve ambiguous byte mappings at table build
    /// time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flags: u16 {
        /// Report 0x00 as Ctrl+@ instead of Ctrl+Space.
        const CTRL_AT           = 1 << 0;
        /// Report 0x09 as Ctrl+I instead of Tab.
        const CTRL_I            = 1 << 1;
        /// Report 0x0D as Ctrl+M instead of Enter.
        const CTRL_M            = 1 << 2;
        /// Report 0x1B as Ctrl+[ instead of Escape.
        const CTRL_OPEN_BRACKET = 1 << 3;
        /// Report 0x20 as the rune ' ' instead of the Space symbol.
        const SPACE             = 1 << 4;
        /// Report 0x08 as Backspace and 0x7F as Delete (swapped from the
        /// default of 0x7F=Backspace, 0x08=Ctrl+H).
        const BACKSPACE         = 1 << 5;
        /// Report `CSI 1 ~` as the VT220 Find key instead of Home.
        const FIND              = 1 << 6;
        /// Report `CSI 4 ~` as the VT220 Select key instead of End.
        const SELECT            = 1 << 7;
        /// Skip generating XTerm modifier variants of known sequences.
        const NO_XTERM          = 1 << 8;
        /// Ignore caller-supplied (terminfo) override entries.
        const NO_TERMINFO       = 1 << 9;
        /// Report the extended function-key range (`CSI 25 ~` and up) as
        /// F13..F20 instead of Shift+F1..F8.
        const FKEYS             = 1 << 10;
    }
}

/// Lookup table from raw byte sequences to key events.
#[derive(Debug, Clone)]
pub struct SequenceTable {
    map: HashMap<Vec<u8>, KeyEvent>,
    flags: Flags,
    term: String,
}

impl Default for SequenceTable {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SequenceTable {
    /// Start building a table.
    #[must_use]
    pub fn builder() -> SequenceTableBuilder {
        SequenceTableBuilder {
            flags: Flags::empty(),
            term: String::new(),
            overrides: Vec::new(),
        }
    }

    /// Build a table with the given flags and no overrides.
    #[must_use]
    pub fn with_flags(flags: Flags) -> Self {
        Self::builder().flags(flags).build()
    }

    /// Look up an exact byte sequence.
    #[must_use]
    pub fn lookup(&self, seq: &[u8]) -> Option<&KeyEvent> {
        self.map.get(seq)
    }

    /// The flags this table was built with.
    #[must_use]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// The terminal type this table was built for. Empty when none was
    /// declared; informational only — override entries are what actually
    /// carry terminal-specific sequences.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Iterate over all entries.
    pub fn entries(&self) -> impl Iterator<Item = (&[u8], &KeyEvent)> {
        self.map.iter().map(|(seq, key)| (seq.as_slice(), key))
    }

    /// Number of entries, mostly useful for diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Builder for [`SequenceTable`].
#[derive(Debug, Clone)]
pub struct SequenceTableBuilder {
    flags: Flags,
    term: String,
    overrides: Vec<(Vec<u8>, KeyEvent)>,
}

impl SequenceTableBuilder {
    /// Set behavior flags.
    #[must_use]
    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Declare the terminal type (the `TERM` value) this table targets.
    #[must_use]
    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    /// Add an override entry (e.g. from a terminfo database). Overrides
    /// win over built-in defaults but are dropped entirely under
    /// [`Flags::NO_TERMINFO`].
    #[must_use]
    pub fn entry(mut self, seq: impl Into<Vec<u8>>, key: KeyEvent) -> Self {
        self.overrides.push((seq.into(), key));
        self
    }

    /// Build the table.
    #[must_use]
    pub fn build(self) -> SequenceTable {
        let flags = self.flags;
        let mut map = HashMap::new();

        insert_control_bytes(&mut map, flags);
        insert_escape_sequences(&mut map, flags);

        if !flags.contains(Flags::NO_XTERM) {
            insert_xterm_modified(&mut map);
        }

        if !flags.contains(Flags::NO_TERMINFO) {
            for (seq, key) in self.overrides {
                map.insert(seq, key);
            }
        }

        SequenceTable {
            map,
            flags,
            term: self.term,
        }
    }
}

fn insert_control_bytes(map: &mut HashMap<Vec<u8>, KeyEvent>, flags: Flags) {
    let ctrl = Modifiers::CTRL;

    let nul = if flags.contains(Flags::CTRL_AT) {
        KeyEvent::rune('@').with_modifiers(ctrl)
    } else {
        KeyEvent::sym(KeySym::Space).with_modifiers(ctrl)
    };
    map.insert(vec![0x00], nul);

    // Ctrl+letter for the remaining C0 range; a few bytes double as
    // dedicated keys depending on flags.
    for b in 0x01..=0x1au8 {
        let key = match b {
            0x08 => {
                if flags.contains(Flags::BACKSPACE) {
                    KeyEvent::sym(KeySym::Backspace)
                } else {
                    KeyEvent::rune('h').with_modifiers(ctrl)
                }
            }
            0x09 => {
                if flags.contains(Flags::CTRL_I) {
                    KeyEvent::rune('i').with_modifiers(ctrl)
                } else {
                    KeyEvent::sym(KeySym::Tab)
                }
            }
            0x0d => {
                if flags.contains(Flags::CTRL_M) {
                    KeyEvent::rune('m').with_modifiers(ctrl)
                } else {
                    KeyEvent::sym(KeySym::Enter)
                }
            }
            _ => KeyEvent::rune((b + 0x60) as char).with_modifiers(ctrl),
        };
        map.insert(vec![b], key);
    }

    let esc = if flags.contains(Flags::CTRL_OPEN_BRACKET) {
        KeyEvent::rune('[').with_modifiers(ctrl)
    } else {
        KeyEvent::sym(KeySym::Escape)
    };
    map.insert(vec![0x1b], esc);

    for b in 0x1c..=0x1fu8 {
        map.insert(
            vec![b],
            KeyEvent::rune((b + 0x40) as char).with_modifiers(ctrl),
        );
    }

    let space = if flags.contains(Flags::SPACE) {
        KeyEvent::rune(' ')
    } else {
        KeyEvent::sym(KeySym::Space)
    };
    map.insert(vec![0x20], space);

    let del = if flags.contains(Flags::BACKSPACE) {
        KeyEvent::sym(KeySym::Delete)
    } else {
        KeyEvent::sym(KeySym::Backspace)
    };
    map.insert(vec![0x7f], del);
}

fn insert_escape_sequences(map: &mut HashMap<Vec<u8>, KeyEvent>, flags: Flags) {
    // CSI cursor and editing keys.
    let csi_finals: &[(u8, KeyEvent)] = &[
        (b'A', KeyEvent::sym(KeySym::Up)),
        (b'B', KeyEvent::sym(KeySym::Down)),
        (b'C', KeyEvent::sym(KeySym::Right)),
        (b'D', KeyEvent::sym(KeySym::Left)),
        (b'E', KeyEvent::sym(KeySym::Begin)),
        (b'F', KeyEvent::sym(KeySym::End)),
        (b'H', KeyEvent::sym(KeySym::Home)),
        (b'P', KeyEvent::sym(KeySym::Function(1))),
        (b'Q', KeyEvent::sym(KeySym::Function(2))),
        (b'R', KeyEvent::sym(KeySym::Function(3))),
        (b'S', KeyEvent::sym(KeySym::Function(4))),
    ];
    for (fin, key) in csi_finals {
        map.insert(format!("\x1b[{}", *fin as char).into_bytes(), key.clone());
    }
    map.insert(
        b"\x1b[Z".to_vec(),
        KeyEvent::sym(KeySym::Tab).with_modifiers(Modifiers::SHIFT),
    );

    // SS3 variants sent in application cursor/keypad mode.
    let ss3_finals: &[(u8, KeyEvent)] = &[
        (b'A', KeyEvent::sym(KeySym::Up)),
        (b'B', KeyEvent::sym(KeySym::Down)),
        (b'C', KeyEvent::sym(KeySym::Right)),
        (b'D', KeyEvent::sym(KeySym::Left)),
        (b'E', KeyEvent::sym(KeySym::Begin)),
        (b'F', KeyEvent::sym(KeySym::End)),
        (b'H', KeyEvent::sym(KeySym::Home)),
        (b'P', KeyEvent::sym(KeySym::Function(1))),
        (b'Q', KeyEvent::sym(KeySym::Function(2))),
        (b'R', KeyEvent::sym(KeySym::Function(3))),
        (b'S', KeyEvent::sym(KeySym::Function(4))),
        (b'M', KeyEvent::sym(KeySym::KpEnter)),
        (b'X', KeyEvent::sym(KeySym::KpEqual)),
    ];
    for (fin, key) in ss3_finals {
        map.insert(format!("\x1bO{}", *fin as char).into_bytes(), key.clone());
    }

    // VT220-style tilde keys.
    let first = if flags.contains(Flags::FIND) {
        KeySym::Find
    } else {
        KeySym::Home
    };
    let fourth = if flags.contains(Flags::SELECT) {
        KeySym::Select
    } else {
        KeySym::End
    };
    let tilde: &[(u8, KeyEvent)] = &[
        (1, KeyEvent::sym(first)),
        (2, KeyEvent::sym(KeySym::Insert)),
        (3, KeyEvent::sym(KeySym::Delete)),
        (4, KeyEvent::sym(fourth)),
        (5, KeyEvent::sym(KeySym::PageUp)),
        (6, KeyEvent::sym(KeySym::PageDown)),
        (7, KeyEvent::sym(KeySym::Home)),
        (8, KeyEvent::sym(KeySym::End)),
        (11, KeyEvent::sym(KeySym::Function(1))),
        (12, KeyEvent::sym(KeySym::Function(2))),
        (13, KeyEvent::sym(KeySym::Function(3))),
        (14, KeyEvent::sym(KeySym::Function(4))),
        (15, KeyEvent::sym(KeySym::Function(5))),
        (17, KeyEvent::sym(KeySym::Function(6))),
        (18, KeyEvent::sym(KeySym::Function(7))),
        (19, KeyEvent::sym(KeySym::Function(8))),
        (20, KeyEvent::sym(KeySym::Function(9))),
        (21, KeyEvent::sym(KeySym::Function(10))),
        (23, KeyEvent::sym(KeySym::Function(11))),
        (24, KeyEvent::sym(KeySym::Function(12))),
    ];
    for (num, key) in tilde {
        map.insert(format!("\x1b[{num}~").into_bytes(), key.clone());
    }

    // The extended range above F12. Most terminals emit these for
    // Shift+F1..F8; some keyboards actually have the keys.
    let extended: &[(u8, u8)] = &[
        (25, 13),
        (26, 14),
        (28, 15),
        (29, 16),
        (31, 17),
        (32, 18),
        (33, 19),
        (34, 20),
    ];
    for (num, fkey) in extended {
        let key = if flags.contains(Flags::FKEYS) {
            KeyEvent::sym(KeySym::Function(*fkey))
        } else {
            KeyEvent::sym(KeySym::Function(fkey - 12)).with_modifiers(Modifiers::SHIFT)
        };
        map.insert(format!("\x1b[{num}~").into_bytes(), key);
    }
}

/// Generate `CSI 1;m X` and `CSI n;m ~` variants for every base entry.
/// The modifier parameter is the XTerm encoding: bitmask of held
/// modifiers plus one.
fn insert_xterm_modified(map: &mut HashMap<Vec<u8>, KeyEvent>) {
    let base: Vec<(Vec<u8>, KeyEvent)> = map
        .iter()
        .filter(|(seq, _)| seq.starts_with(b"\x1b[") || seq.starts_with(b"\x1bO"))
        .map(|(seq, key)| (seq.clone(), key.clone()))
        .collect();

    for (seq, key) in base {
        let Some((&fin, body)) = seq.split_last() else {
            continue;
        };
        for m in 2..=8u8 {
            let mods = xterm_modifiers(m - 1);
            let modified = key.clone().with_modifiers(mods);
            let variant = if fin == b'~' {
                // "\x1b[5~" becomes "\x1b[5;m~"
                format!(
                    "{};{m}~",
                    String::from_utf8_lossy(&body[..])
                )
                .into_bytes()
            } else {
                // Both "\x1b[A" and "\x1bOA" become "\x1b[1;mA".
                format!("\x1b[1;{m}{}", fin as char).into_bytes()
            };
            map.entry(variant).or_insert(modified);
        }
    }
}

/// Decode an XTerm modifier bitmask (the `;m` parameter minus one).
#[must_use]
pub fn xterm_modifiers(bits: u8) -> Modifiers {
    let mut mods = Modifiers::empty();
    if bits & 1 != 0 {
        mods |= Modifiers::SHIFT;
    }
    if bits & 2 != 0 {
        mods |= Modifiers::ALT;
    }
    if bits & 4 != 0 {
        mods |= Modifiers::CTRL;
    }
    if bits & 8 != 0 {
        mods |= Modifiers::SUPER;
    }
    if bits & 16 != 0 {
        mods |= Modifiers::HYPER;
    }
    if bits & 32 != 0 {
        mods |= Modifiers::META;
    }
    mods
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_control_bytes() {
        let t = SequenceTable::default();
        assert_eq!(t.lookup(&[0x09]), Some(&KeyEvent::sym(KeySym::Tab)));
        assert_eq!(t.lookup(&[0x0d]), Some(&KeyEvent::sym(KeySym::Enter)));
        assert_eq!(t.lookup(&[0x1b]), Some(&KeyEvent::sym(KeySym::Escape)));
        assert_eq!(t.lookup(&[0x7f]), Some(&KeyEvent::sym(KeySym::Backspace)));
        assert_eq!(
            t.lookup(&[0x01]),
            Some(&KeyEvent::rune('a').with_modifiers(Modifiers::CTRL))
        );
        assert_eq!(
            t.lookup(&[0x1c]),
            Some(&KeyEvent::rune('\\').with_modifiers(Modifiers::CTRL))
        );
    }

    #[test]
    fn flags_resolve_ambiguous_bytes() {
        let t = SequenceTable::with_flags(
            Flags::CTRL_I | Flags::CTRL_M | Flags::CTRL_AT | Flags::SPACE | Flags::BACKSPACE,
        );
        assert_eq!(
            t.lookup(&[0x09]),
            Some(&KeyEvent::rune('i').with_modifiers(Modifiers::CTRL))
        );
        assert_eq!(
            t.lookup(&[0x0d]),
            Some(&KeyEvent::rune('m').with_modifiers(Modifiers::CTRL))
        );
        assert_eq!(
            t.lookup(&[0x00]),
            Some(&KeyEvent::rune('@').with_modifiers(Modifiers::CTRL))
        );
        assert_eq!(t.lookup(&[0x20]), Some(&KeyEvent::rune(' ')));
        assert_eq!(t.lookup(&[0x08]), Some(&KeyEvent::sym(KeySym::Backspace)));
        assert_eq!(t.lookup(&[0x7f]), Some(&KeyEvent::sym(KeySym::Delete)));
    }

    #[test]
    fn cursor_and_function_keys() {
        let t = SequenceTable::default();
        assert_eq!(t.lookup(b"\x1b[A"), Some(&KeyEvent::sym(KeySym::Up)));
        assert_eq!(t.lookup(b"\x1bOD"), Some(&KeyEvent::sym(KeySym::Left)));
        assert_eq!(t.lookup(b"\x1bOP"), Some(&KeyEvent::sym(KeySym::Function(1))));
        assert_eq!(t.lookup(b"\x1b[15~"), Some(&KeyEvent::sym(KeySym::Function(5))));
        assert_eq!(t.lookup(b"\x1b[24~"), Some(&KeyEvent::sym(KeySym::Function(12))));
        assert_eq!(
            t.lookup(b"\x1b[Z"),
            Some(&KeyEvent::sym(KeySym::Tab).with_modifiers(Modifiers::SHIFT))
        );
    }

    #[test]
    fn find_and_select_flags() {
        let t = SequenceTable::default();
        assert_eq!(t.lookup(b"\x1b[1~"), Some(&KeyEvent::sym(KeySym::Home)));
        assert_eq!(t.lookup(b"\x1b[4~"), Some(&KeyEvent::sym(KeySym::End)));

        let t = SequenceTable::with_flags(Flags::FIND | Flags::SELECT);
        assert_eq!(t.lookup(b"\x1b[1~"), Some(&KeyEvent::sym(KeySym::Find)));
        assert_eq!(t.lookup(b"\x1b[4~"), Some(&KeyEvent::sym(KeySym::Select)));
    }

    #[test]
    fn extended_function_keys_fold_to_shift() {
        let t = SequenceTable::default();
        assert_eq!(
            t.lookup(b"\x1b[25~"),
            Some(&KeyEvent::sym(KeySym::Function(1)).with_modifiers(Modifiers::SHIFT))
        );
        assert_eq!(
            t.lookup(b"\x1b[34~"),
            Some(&KeyEvent::sym(KeySym::Function(8)).with_modifiers(Modifiers::SHIFT))
        );

        let t = SequenceTable::with_flags(Flags::FKEYS);
        assert_eq!(t.lookup(b"\x1b[25~"), Some(&KeyEvent::sym(KeySym::Function(13))));
        assert_eq!(t.lookup(b"\x1b[34~"), Some(&KeyEvent::sym(KeySym::Function(20))));
    }

    #[test]
    fn xterm_modified_variants() {
        let t = SequenceTable::default();
        assert_eq!(
            t.lookup(b"\x1b[1;5A"),
            Some(&KeyEvent::sym(KeySym::Up).with_modifiers(Modifiers::CTRL))
        );
        assert_eq!(
            t.lookup(b"\x1b[1;2H"),
            Some(&KeyEvent::sym(KeySym::Home).with_modifiers(Modifiers::SHIFT))
        );
        assert_eq!(
            t.lookup(b"\x1b[3;3~"),
            Some(&KeyEvent::sym(KeySym::Delete).with_modifiers(Modifiers::ALT))
        );
        assert_eq!(
            t.lookup(b"\x1b[5;8~"),
            Some(
                &KeyEvent::sym(KeySym::PageUp)
                    .with_modifiers(Modifiers::SHIFT | Modifiers::ALT | Modifiers::CTRL)
            )
        );

        let bare = SequenceTable::with_flags(Flags::NO_XTERM);
        assert_eq!(bare.lookup(b"\x1b[1;5A"), None);
    }

    #[test]
    fn overrides_win_unless_disabled() {
        let custom = KeyEvent::sym(KeySym::Function(42));
        let t = SequenceTable::builder()
            .entry(b"\x1b[XX".to_vec(), custom.clone())
            .entry(b"\x1b[A".to_vec(), custom.clone())
            .build();
        assert_eq!(t.lookup(b"\x1b[XX"), Some(&custom));
        assert_eq!(t.lookup(b"\x1b[A"), Some(&custom));

        let t = SequenceTable::builder()
            .flags(Flags::NO_TERMINFO)
            .entry(b"\x1b[XX".to_vec(), custom)
            .build();
        assert_eq!(t.lookup(b"\x1b[XX"), None);
        assert_eq!(t.lookup(b"\x1b[A"), Some(&KeyEvent::sym(KeySym::Up)));
    }

    #[test]
    fn records_terminal_type() {
        let t = SequenceTable::builder().term("xterm-256color").build();
        assert_eq!(t.term(), "xterm-256color");
        assert_eq!(SequenceTable::default().term(), "");
    }

    #[test]
    fn xterm_modifier_bits() {
        assert_eq!(xterm_modifiers(0), Modifiers::empty());
        assert_eq!(xterm_modifiers(1), Modifiers::SHIFT);
        assert_eq!(xterm_modifiers(5), Modifiers::SHIFT | Modifiers::CTRL);
        assert_eq!(xterm_modifiers(63), Modifiers::all());
    }
}
