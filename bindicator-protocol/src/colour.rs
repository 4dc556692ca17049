//! Pixel colours
//!
//! Colours are literal RGB triples; no colour-space conversion is applied.

use smart_leds::RGB8;

use crate::hex;

/// RGB colour of a single pixel
pub type Colour = RGB8;

/// Colour used when a request carries no usable colour
pub const DEFAULT_COLOUR: Colour = Colour {
    r: 0xFF,
    g: 0xFF,
    b: 0xFF,
};

/// Length of a colour hex string ("rrggbb")
pub const HEX_COLOUR_LEN: usize = 6;

/// Parse a six-digit hex colour such as `"ff8000"`
///
/// Returns `None` for any other length or for non-hex characters.
pub fn from_hex(text: &str) -> Option<Colour> {
    let bytes = text.as_bytes();
    if bytes.len() != HEX_COLOUR_LEN {
        return None;
    }
    Some(Colour {
        r: hex::decode_pair(bytes[0], bytes[1])?,
        g: hex::decode_pair(bytes[2], bytes[3])?,
        b: hex::decode_pair(bytes[4], bytes[5])?,
    })
}

/// Build a colour from three channel values, each of which must fit in 0-255
pub fn from_channels(r: u64, g: u64, b: u64) -> Option<Colour> {
    Some(Colour {
        r: u8::try_from(r).ok()?,
        g: u8::try_from(g).ok()?,
        b: u8::try_from(b).ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(from_hex("ff8000"), Some(Colour::new(0xFF, 0x80, 0x00)));
        assert_eq!(from_hex("00FFaa"), Some(Colour::new(0x00, 0xFF, 0xAA)));
    }

    #[test]
    fn test_from_hex_wrong_length() {
        assert_eq!(from_hex("ff"), None);
        assert_eq!(from_hex("#ff8000"), None);
        assert_eq!(from_hex(""), None);
    }

    #[test]
    fn test_from_hex_non_hex() {
        assert_eq!(from_hex("zz0000"), None);
    }

    #[test]
    fn test_from_hex_multibyte_chars() {
        // Six bytes, but not six hex digits
        assert_eq!(from_hex("ff\u{e9}00"), None);
    }

    #[test]
    fn test_from_channels_range() {
        assert_eq!(from_channels(0, 128, 255), Some(Colour::new(0, 128, 255)));
        assert_eq!(from_channels(256, 0, 0), None);
    }
}
