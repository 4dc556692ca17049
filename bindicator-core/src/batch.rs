//! Per-strip command batching
//!
//! Each strip touched by a batch gets its own buffer, opened with a Clear
//! the first time one of its pixels is set. Finishing the batch closes every
//! buffer with a Show and concatenates them in first-touch order:
//!
//! ```text
//! Clear(a) Set(a,..)... Show(a) Clear(b) Set(b,..)... Show(b)
//! ```
//!
//! Strips no entry resolves onto are never mentioned in the stream.

use alloc::vec::Vec;

use bindicator_protocol::{Colour, PixelOffset, StripCommand, StripId, COMMAND_SIZE};

use crate::geometry;
use crate::layout::LayoutTable;
use crate::request::BindicatorRequest;

/// One pixel to light
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedAssignment {
    /// Strip the pixel is on
    pub strip_id: StripId,
    /// Pixel offset on the strip
    pub offset: PixelOffset,
    /// Colour to set
    pub colour: Colour,
}

impl LedAssignment {
    fn command(&self) -> StripCommand {
        StripCommand::SetPixel {
            strip: self.strip_id,
            offset: self.offset,
            colour: self.colour,
        }
    }
}

/// Encoded commands for one strip
#[derive(Debug, Clone)]
struct StripBuffer {
    strip_id: StripId,
    bytes: Vec<u8>,
}

impl StripBuffer {
    fn open(strip_id: StripId) -> Self {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&StripCommand::Clear { strip: strip_id }.encode());
        Self { strip_id, bytes }
    }

    fn push(&mut self, command: StripCommand) {
        self.bytes.extend_from_slice(&command.encode());
    }
}

/// Command buffers for one batch, kept in first-touch order
#[derive(Debug, Clone, Default)]
pub struct CommandBatch {
    strips: Vec<StripBuffer>,
    pixels: usize,
}

impl CommandBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a batch from validated requests
    ///
    /// Requests that miss the layout contribute nothing.
    pub fn from_requests(table: &LayoutTable, requests: &[BindicatorRequest]) -> Self {
        let mut batch = Self::new();
        for request in requests {
            let Some(span) = geometry::resolve(table, &request.address) else {
                continue;
            };
            for (strip_id, offset) in span.pixels() {
                batch.set_pixel(LedAssignment {
                    strip_id,
                    offset,
                    colour: request.colour,
                });
            }
        }
        batch
    }

    /// Append a pixel write to its strip's buffer
    ///
    /// The buffer is created, starting with a Clear, on first use.
    pub fn set_pixel(&mut self, assignment: LedAssignment) {
        let command = assignment.command();
        match self
            .strips
            .iter_mut()
            .find(|strip| strip.strip_id == assignment.strip_id)
        {
            Some(strip) => strip.push(command),
            None => {
                let mut strip = StripBuffer::open(assignment.strip_id);
                strip.push(command);
                self.strips.push(strip);
            }
        }
        self.pixels += 1;
    }

    /// Strips touched so far, in first-touch order
    pub fn touched_strips(&self) -> impl Iterator<Item = StripId> + '_ {
        self.strips.iter().map(|strip| strip.strip_id)
    }

    /// Number of pixel writes
    pub fn pixel_count(&self) -> usize {
        self.pixels
    }

    /// Check if no strip has been touched
    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    /// Close every strip with a Show and concatenate into one stream
    pub fn finish(self) -> Vec<u8> {
        let commands = self.pixels + 2 * self.strips.len();
        let mut stream = Vec::with_capacity(commands * COMMAND_SIZE);
        for mut strip in self.strips {
            strip.push(StripCommand::Show {
                strip: strip.strip_id,
            });
            stream.extend_from_slice(&strip.bytes);
        }
        stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use bindicator_protocol::CommandParser;

    use crate::layout::Shelf;
    use crate::request::BinAddress;

    fn decode(stream: &[u8]) -> Vec<StripCommand> {
        let mut parser = CommandParser::new();
        stream
            .iter()
            .filter_map(|&byte| parser.feed(byte).unwrap())
            .collect()
    }

    fn assignment(strip_id: StripId, offset: PixelOffset) -> LedAssignment {
        LedAssignment {
            strip_id,
            offset,
            colour: Colour::new(1, 2, 3),
        }
    }

    #[test]
    fn test_empty_batch() {
        let batch = CommandBatch::new();
        assert!(batch.is_empty());
        assert!(batch.finish().is_empty());
    }

    #[test]
    fn test_strip_bracketed_by_clear_and_show() {
        let mut batch = CommandBatch::new();
        batch.set_pixel(assignment(3, 10));
        batch.set_pixel(assignment(3, 11));

        let commands = decode(&batch.finish());
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0], StripCommand::Clear { strip: 3 });
        assert_eq!(commands[1], assignment(3, 10).command());
        assert_eq!(commands[2], assignment(3, 11).command());
        assert_eq!(commands[3], StripCommand::Show { strip: 3 });
    }

    #[test]
    fn test_strips_in_first_touch_order() {
        let mut batch = CommandBatch::new();
        batch.set_pixel(assignment(5, 0));
        batch.set_pixel(assignment(3, 0));
        batch.set_pixel(assignment(5, 1));

        assert_eq!(batch.touched_strips().collect::<Vec<_>>(), vec![5, 3]);
        assert_eq!(batch.pixel_count(), 3);

        let commands = decode(&batch.finish());
        let strips: Vec<StripId> = commands.iter().map(StripCommand::strip).collect();
        assert_eq!(strips, vec![5, 5, 5, 5, 3, 3, 3]);
        assert_eq!(commands[3], StripCommand::Show { strip: 5 });
        assert_eq!(commands[6], StripCommand::Show { strip: 3 });
    }

    #[test]
    fn test_from_requests_skips_misses() {
        let mut table = LayoutTable::new();
        let shelf = Shelf::new(100.0, 2, 0, 10, false, vec![0.0, 50.0]).unwrap();
        table.insert_shelf("A", 1, shelf).unwrap();

        let requests = [
            BindicatorRequest {
                address: BinAddress::new("A", 1, 3),
                colour: Colour::new(9, 9, 9),
            },
            BindicatorRequest {
                address: BinAddress::new("A", 1, 2),
                colour: Colour::new(0, 0, 255),
            },
        ];
        let batch = CommandBatch::from_requests(&table, &requests);

        assert_eq!(batch.touched_strips().collect::<Vec<_>>(), vec![2]);
        assert_eq!(batch.pixel_count(), 5);
        assert_eq!(batch.finish().len(), 7 * COMMAND_SIZE);
    }
}
