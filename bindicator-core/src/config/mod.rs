//! Configuration
//!
//! Strip tables are plain CSV, one file per strip. Host settings are TOML.

pub mod strips;

#[cfg(feature = "std")]
pub mod loader;
#[cfg(feature = "std")]
pub mod settings;

pub use strips::{parse_strips, strip_id_from_file_name, ParseError, ParseErrorKind};
