//! Hexadecimal helpers
//!
//! Used for colour strings and for the ASCII-hex form of a command stream.

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Encode a byte as two lowercase ASCII hex digits
pub fn encode_byte(byte: u8) -> [u8; 2] {
    [
        DIGITS[usize::from(byte >> 4)],
        DIGITS[usize::from(byte & 0x0F)],
    ]
}

/// Decode a single ASCII hex digit (either case)
pub fn decode_digit(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// Decode two ASCII hex digits into a byte
pub fn decode_pair(high: u8, low: u8) -> Option<u8> {
    Some((decode_digit(high)? << 4) | decode_digit(low)?)
}
