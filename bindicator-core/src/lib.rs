//! Board-agnostic core logic for bindicator LED strips
//!
//! This crate turns pick requests into strip commands:
//!
//! - Layout snapshot (cart → shelf → strip geometry) with atomic reload
//! - Geometry resolution from a 1-based bin to a pixel range
//! - Request validation for untyped batch payloads
//! - Per-strip command batching and serialized transmission
//! - Configuration parsing (strips tables, host settings)

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod batch;
pub mod config;
pub mod geometry;
pub mod layout;
pub mod request;
pub mod updater;

pub use batch::{CommandBatch, LedAssignment};
pub use geometry::{resolve, PixelSpan};
pub use layout::{LayoutStore, LayoutTable, Shelf};
pub use request::{BinAddress, BindicatorRequest};
pub use updater::{BindicatorUpdater, TransportError, UpdateError, UpdaterConfig, WireEncoding};
