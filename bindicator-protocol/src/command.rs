//! Command encoding for the strip controller protocol.
//!
//! Command format:
//! - PAYLOAD (6 bytes): opcode-led for Clear/Show, strip-led for SetPixel
//! - TERMINATOR (1 byte): 0x0A
//!
//! Multi-byte integers are big-endian. Encoding is a pure function of the
//! command, so identical commands always produce identical bytes.

use crate::colour::Colour;

/// Opcode that clears every pixel of a strip
pub const OPCODE_CLEAR: u8 = 0xFF;

/// Opcode that latches a strip's pending pixel writes onto the LEDs
pub const OPCODE_SHOW: u8 = 0xAA;

/// Byte closing every command
pub const TERMINATOR: u8 = 0x0A;

/// Payload bytes per command
pub const PAYLOAD_SIZE: usize = 6;

/// Complete command size (PAYLOAD + TERMINATOR)
pub const COMMAND_SIZE: usize = PAYLOAD_SIZE + 1;

/// Strip identifier as carried on the wire
pub type StripId = u8;

/// Zero-based LED index within a strip
pub type PixelOffset = u16;

/// Errors that can occur during command encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Seventh byte of a command was not the terminator
    MissingTerminator,
    /// Command not valid at this position in the stream
    UnexpectedCommand,
}

/// A single strip controller command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripCommand {
    /// Turn off every pixel of the strip
    Clear { strip: StripId },
    /// Push the strip's pixel state to the LEDs
    Show { strip: StripId },
    /// Set one pixel to a colour
    SetPixel {
        strip: StripId,
        offset: PixelOffset,
        colour: Colour,
    },
}

impl StripCommand {
    /// Strip this command addresses
    pub fn strip(&self) -> StripId {
        match self {
            StripCommand::Clear { strip }
            | StripCommand::Show { strip }
            | StripCommand::SetPixel { strip, .. } => *strip,
        }
    }

    /// Encode this command into its fixed-width wire form
    pub fn encode(&self) -> [u8; COMMAND_SIZE] {
        match *self {
            StripCommand::Clear { strip } => [OPCODE_CLEAR, strip, 0, 0, 0, 0, TERMINATOR],
            StripCommand::Show { strip } => [OPCODE_SHOW, strip, 0, 0, 0, 0, TERMINATOR],
            StripCommand::SetPixel {
                strip,
                offset,
                colour,
            } => {
                let [hi, lo] = offset.to_be_bytes();
                [strip, hi, lo, colour.r, colour.g, colour.b, TERMINATOR]
            }
        }
    }

    /// Encode this command into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode_into(&self, buffer: &mut [u8]) -> Result<usize, CommandError> {
        let target = buffer
            .get_mut(..COMMAND_SIZE)
            .ok_or(CommandError::BufferTooSmall)?;
        target.copy_from_slice(&self.encode());
        Ok(COMMAND_SIZE)
    }

    /// Decode a Clear or Show record, ignoring stream position
    ///
    /// Returns `None` when the record is not opcode-led with zero padding.
    pub(crate) fn decode_control(record: &[u8; COMMAND_SIZE]) -> Option<Self> {
        let padded = record[2..PAYLOAD_SIZE].iter().all(|&b| b == 0);
        if !padded {
            return None;
        }
        match record[0] {
            OPCODE_CLEAR => Some(StripCommand::Clear { strip: record[1] }),
            OPCODE_SHOW => Some(StripCommand::Show { strip: record[1] }),
            _ => None,
        }
    }

    /// Decode a record as SetPixel
    pub(crate) fn decode_set_pixel(record: &[u8; COMMAND_SIZE]) -> Self {
        StripCommand::SetPixel {
            strip: record[0],
            offset: u16::from_be_bytes([record[1], record[2]]),
            colour: Colour {
                r: record[3],
                g: record[4],
                b: record[5],
            },
        }
    }
}

// RGB8 has no defmt support of its own
#[cfg(feature = "defmt")]
impl defmt::Format for StripCommand {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            StripCommand::Clear { strip } => defmt::write!(f, "Clear({})", strip),
            StripCommand::Show { strip } => defmt::write!(f, "Show({})", strip),
            StripCommand::SetPixel {
                strip,
                offset,
                colour,
            } => defmt::write!(
                f,
                "SetPixel({}, {}, ({}, {}, {}))",
                strip,
                offset,
                colour.r,
                colour.g,
                colour.b
            ),
        }
    }
}
