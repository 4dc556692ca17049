//! Bindicator requests
//!
//! Batches arrive as untyped JSON. The payload itself must be an array;
//! individual entries that fail validation are dropped without failing the
//! batch.

use alloc::string::String;
use alloc::vec::Vec;

use bindicator_protocol::{colour, Colour, DEFAULT_COLOUR};
use serde_json::Value;

use crate::layout::ShelfId;

/// Batch payload was not an array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputShapeError;

/// Location of a bin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinAddress {
    /// Cart name
    pub cart: String,
    /// Shelf id within the cart
    pub shelf: ShelfId,
    /// 1-based bin index along the shelf
    pub bin: u32,
}

impl BinAddress {
    /// Create a bin address
    pub fn new(cart: &str, shelf: ShelfId, bin: u32) -> Self {
        Self {
            cart: String::from(cart),
            shelf,
            bin,
        }
    }
}

/// A validated request to light one bin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindicatorRequest {
    /// Bin to light
    pub address: BinAddress,
    /// Colour to light it with
    pub colour: Colour,
}

impl BindicatorRequest {
    /// Validate one batch entry
    ///
    /// An entry needs a text `cart` plus positive integer `shelf` and `bin`.
    /// `colour` may have any shape; unusable colours fall back to the default.
    pub fn from_value(entry: &Value) -> Option<Self> {
        let cart = entry.get("cart")?.as_str()?;
        let shelf = positive_integer(entry.get("shelf")?)?;
        let bin = positive_integer(entry.get("bin")?)?;

        Some(Self {
            address: BinAddress::new(cart, shelf, bin),
            colour: resolve_colour(entry.get("colour")),
        })
    }
}

/// Validate a batch payload
///
/// Fails only when the payload is not an array. Invalid entries are skipped.
pub fn parse_batch(payload: &Value) -> Result<Vec<BindicatorRequest>, InputShapeError> {
    let entries = payload.as_array().ok_or(InputShapeError)?;
    Ok(entries
        .iter()
        .filter_map(BindicatorRequest::from_value)
        .collect())
}

/// Resolve a colour field of any shape
///
/// Accepts `[r, g, b]` with each channel in 0-255, or a six-digit hex
/// string. Anything else, including a missing field, gives the default.
pub fn resolve_colour(value: Option<&Value>) -> Colour {
    value.and_then(parse_colour).unwrap_or(DEFAULT_COLOUR)
}

fn parse_colour(value: &Value) -> Option<Colour> {
    match value {
        Value::String(text) => colour::from_hex(text),
        Value::Array(channels) => match channels.as_slice() {
            [r, g, b] => colour::from_channels(
                whole_number(r)?,
                whole_number(g)?,
                whole_number(b)?,
            ),
            _ => None,
        },
        _ => None,
    }
}

/// Positive integer, accepting integral floats such as `2.0`
fn positive_integer(value: &Value) -> Option<u32> {
    let n = whole_number(value)?;
    u32::try_from(n).ok().filter(|&n| n > 0)
}

/// Non-negative integer, accepting integral floats such as `255.0`
fn whole_number(value: &Value) -> Option<u64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(n) = number.as_u64() {
        return Some(n);
    }
    let n = number.as_f64()?;
    let integral = libm::trunc(n) == n;
    (integral && n >= 0.0 && n <= f64::from(u32::MAX)).then(|| n as u64)
}
