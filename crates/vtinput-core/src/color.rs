#![forbid(unsafe_code)]

//! Color parsing for terminal color replies.
//!
//! Terminals answer OSC 10/11/12 queries with an X11 color specification,
//! most commonly `rgb:RRRR/GGGG/BBBB` with 1-4 hex digits per component,
//! or the `#RRGGBB` shorthand. Components are scaled to full 16-bit range
//! so `rgb:8/8/8` and `rgb:8000/8000/8000` mean the same color.

/// A 16-bit-per-channel RGB color, as reported by terminal color queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red channel (0..=65535).
    pub r: u16,
    /// Green channel (0..=65535).
    pub g: u16,
    /// Blue channel (0..=65535).
    pub b: u16,
}

impl Rgb {
    /// Construct from 16-bit channels.
    #[must_use]
    pub const fn new(r: u16, g: u16, b: u16) -> Self {
        Self { r, g, b }
    }

    /// Truncate to 8 bits per channel.
    #[must_use]
    pub const fn to_rgb8(self) -> (u8, u8, u8) {
        ((self.r >> 8) as u8, (self.g >> 8) as u8, (self.b >> 8) as u8)
    }
}

/// Parse an X11 color specification as found in OSC color replies.
///
/// Accepts `rgb:R/G/B` with 1-4 hex digits per component and `#RRGGBB`.
/// Returns `None` for anything else.
#[must_use]
pub fn parse_x11_color(spec: &str) -> Option<Rgb> {
    if let Some(body) = spec.strip_prefix("rgb:") {
        let mut parts = body.split('/');
        let r = scale_component(parts.next()?)?;
        let g = scale_component(parts.next()?)?;
        let b = scale_component(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        return Some(Rgb::new(r, g, b));
    }

    if let Some(hex) = spec.strip_prefix('#') {
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let r = u16::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u16::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u16::from_str_radix(&hex[4..6], 16).ok()?;
        // Widen 8-bit channels so 0xFF maps to 0xFFFF.
        return Some(Rgb::new(r * 0x101, g * 0x101, b * 0x101));
    }

    None
}

/// Scale a 1-4 hex digit component to the full 16-bit range.
fn scale_component(digits: &str) -> Option<u16> {
    let n = digits.len();
    if n == 0 || n > 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u16::from_str_radix(digits, 16).ok()?;
    // Left-justify short components: "8" means 0x8000, "80" means 0x8000.
    Some(value << (4 * (4 - n)))
}
