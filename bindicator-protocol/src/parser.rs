//! Stream decoding for the strip controller protocol
//!
//! SetPixel has no opcode, so a record can only be classified by where it
//! sits in the stream: after a strip's Clear and before its Show, any record
//! led by that strip's id is a pixel write.

use heapless::Vec;

use crate::command::{CommandError, StripCommand, StripId, COMMAND_SIZE, TERMINATOR};

/// State machine for decoding a command stream
#[derive(Debug, Clone)]
pub struct CommandParser {
    buffer: Vec<u8, COMMAND_SIZE>,
    open_strip: Option<StripId>,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandParser {
    /// Create a new command parser
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            open_strip: None,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.open_strip = None;
    }

    /// Strip whose Clear has been seen but whose Show has not
    pub fn open_strip(&self) -> Option<StripId> {
        self.open_strip
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(command))` when a complete record is decoded,
    /// `Ok(None)` when more bytes are needed, or `Err` on a protocol error.
    /// The parser resets itself after an error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<StripCommand>, CommandError> {
        // Cannot fail: the buffer is drained every COMMAND_SIZE bytes
        let _ = self.buffer.push(byte);
        if self.buffer.len() < COMMAND_SIZE {
            return Ok(None);
        }

        let mut record = [0u8; COMMAND_SIZE];
        record.copy_from_slice(&self.buffer);
        self.buffer.clear();

        match self.classify(&record) {
            Ok(command) => Ok(Some(command)),
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete command found, if any, together with the
    /// number of bytes consumed.
    pub fn feed_bytes(
        &mut self,
        bytes: &[u8],
    ) -> Result<(Option<StripCommand>, usize), CommandError> {
        for (index, &byte) in bytes.iter().enumerate() {
            if let Some(command) = self.feed(byte)? {
                return Ok((Some(command), index + 1));
            }
        }
        Ok((None, bytes.len()))
    }

    fn classify(&mut self, record: &[u8; COMMAND_SIZE]) -> Result<StripCommand, CommandError> {
        if record[COMMAND_SIZE - 1] != TERMINATOR {
            return Err(CommandError::MissingTerminator);
        }

        let control = StripCommand::decode_control(record);
        match (self.open_strip, control) {
            (None, Some(StripCommand::Clear { strip })) => {
                self.open_strip = Some(strip);
                Ok(StripCommand::Clear { strip })
            }
            (Some(open), Some(StripCommand::Show { strip })) if strip == open => {
                self.open_strip = None;
                Ok(StripCommand::Show { strip })
            }
            (Some(open), _) if record[0] == open => Ok(StripCommand::decode_set_pixel(record)),
            _ => Err(CommandError::UnexpectedCommand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::Colour;

    fn feed_all(parser: &mut CommandParser, bytes: &[u8]) -> Result<usize, CommandError> {
        let mut decoded = 0;
        for &byte in bytes {
            if parser.feed(byte)?.is_some() {
                decoded += 1;
            }
        }
        Ok(decoded)
    }

    #[test]
    fn test_decode_strip_sequence() {
        let pixel = StripCommand::SetPixel {
            strip: 2,
            offset: 17,
            colour: Colour::new(1, 2, 3),
        };

        let mut parser = CommandParser::new();
        let (clear, used) = parser.feed_bytes(&StripCommand::Clear { strip: 2 }.encode()).unwrap();
        assert_eq!(clear, Some(StripCommand::Clear { strip: 2 }));
        assert_eq!(used, COMMAND_SIZE);
        assert_eq!(parser.open_strip(), Some(2));

        let (set, _) = parser.feed_bytes(&pixel.encode()).unwrap();
        assert_eq!(set, Some(pixel));

        let (show, _) = parser.feed_bytes(&StripCommand::Show { strip: 2 }.encode()).unwrap();
        assert_eq!(show, Some(StripCommand::Show { strip: 2 }));
        assert_eq!(parser.open_strip(), None);
    }

    #[test]
    fn test_partial_record_needs_more_bytes() {
        let encoded = StripCommand::Clear { strip: 1 }.encode();
        let mut parser = CommandParser::new();

        let (command, used) = parser.feed_bytes(&encoded[..4]).unwrap();
        assert_eq!(command, None);
        assert_eq!(used, 4);

        let (command, _) = parser.feed_bytes(&encoded[4..]).unwrap();
        assert_eq!(command, Some(StripCommand::Clear { strip: 1 }));
    }

    #[test]
    fn test_pixel_lookalike_of_opcode_strip() {
        // Strip 0xFF: a pixel write starts with the Clear opcode byte
        let pixel = StripCommand::SetPixel {
            strip: 0xFF,
            offset: 0x0102,
            colour: Colour::new(9, 9, 9),
        };
        let mut parser = CommandParser::new();
        parser.feed_bytes(&StripCommand::Clear { strip: 0xFF }.encode()).unwrap();

        let (command, _) = parser.feed_bytes(&pixel.encode()).unwrap();
        assert_eq!(command, Some(pixel));
    }

    #[test]
    fn test_set_pixel_without_clear() {
        let pixel = StripCommand::SetPixel {
            strip: 4,
            offset: 0,
            colour: Colour::new(0, 0, 0),
        };
        let mut parser = CommandParser::new();
        let result = parser.feed_bytes(&pixel.encode());
        assert_eq!(result, Err(CommandError::UnexpectedCommand));
    }

    #[test]
    fn test_set_pixel_for_other_strip() {
        let pixel = StripCommand::SetPixel {
            strip: 4,
            offset: 0,
            colour: Colour::new(0, 0, 0),
        };
        let mut parser = CommandParser::new();
        parser.feed_bytes(&StripCommand::Clear { strip: 3 }.encode()).unwrap();
        let result = parser.feed_bytes(&pixel.encode());
        assert_eq!(result, Err(CommandError::UnexpectedCommand));
        assert_eq!(parser.open_strip(), None);
    }

    #[test]
    fn test_missing_terminator() {
        let mut encoded = StripCommand::Clear { strip: 1 }.encode();
        encoded[COMMAND_SIZE - 1] = 0x00;

        let mut parser = CommandParser::new();
        let result = parser.feed_bytes(&encoded);
        assert_eq!(result, Err(CommandError::MissingTerminator));
    }

    #[test]
    fn test_recovers_after_error() {
        let mut parser = CommandParser::new();
        assert!(parser.feed_bytes(&StripCommand::Show { strip: 1 }.encode()).is_err());

        let mut stream = [0u8; COMMAND_SIZE * 2];
        stream[..COMMAND_SIZE].copy_from_slice(&StripCommand::Clear { strip: 1 }.encode());
        stream[COMMAND_SIZE..].copy_from_slice(&StripCommand::Show { strip: 1 }.encode());
        assert_eq!(feed_all(&mut parser, &stream), Ok(2));
    }
}
