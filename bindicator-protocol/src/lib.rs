//! Strip controller serial protocol
//!
//! This crate defines the command stream sent from the bindicator host to the
//! microcontroller that drives the daisy-chained NeoPixel strips. Every
//! command is a fixed-width record:
//!
//! ```text
//! ┌──────────────────────────────────────┬────────────┐
//! │ PAYLOAD                              │ TERMINATOR │
//! │ 6B                                   │ 1B (0x0A)  │
//! └──────────────────────────────────────┴────────────┘
//!
//! Clear     FF  strip  00 00 00 00
//! Show      AA  strip  00 00 00 00
//! SetPixel  strip  offset(BE16)  R  G  B
//! ```
//!
//! SetPixel carries no opcode: within a transmission unit each strip's pixel
//! writes are bracketed by that strip's Clear and Show.

#![no_std]
#![deny(unsafe_code)]

pub mod colour;
pub mod command;
pub mod hex;
pub mod parser;

pub use colour::{Colour, DEFAULT_COLOUR};
pub use command::{
    CommandError, PixelOffset, StripCommand, StripId, COMMAND_SIZE, OPCODE_CLEAR, OPCODE_SHOW,
    PAYLOAD_SIZE, TERMINATOR,
};
pub use parser::CommandParser;
