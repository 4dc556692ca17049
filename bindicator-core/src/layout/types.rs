//! Layout type definitions
//!
//! A cart holds shelves; each shelf owns a contiguous run of pixels on one
//! strip and a set of bin boundaries measured along its width.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use bindicator_protocol::{PixelOffset, StripId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shelf identifier within a cart
pub type ShelfId = u32;

/// Reasons a shelf record is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// Width is zero, negative or not finite
    InvalidWidth,
    /// Strip length is zero
    EmptyStrip,
    /// Pixel run extends past the last addressable offset
    StripOverflow,
    /// No bin boundaries given
    NoBins,
    /// Bin boundaries are not in ascending order
    BinsNotAscending,
    /// Bin boundary lies outside `[0, width)`
    BinOutOfRange,
}

/// Shelf geometry and its mapping onto a strip
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shelf {
    /// Physical width of the shelf (distance units)
    pub width: f64,
    /// Strip the shelf's pixels live on
    pub strip_id: StripId,
    /// First pixel belonging to this shelf
    pub strip_offset: PixelOffset,
    /// Number of pixels allotted to this shelf
    pub strip_length: u16,
    /// Strip runs from the far end of the shelf back to the near end
    pub is_reverse: bool,
    /// Start distance of each bin, ascending
    pub bin_offsets: Vec<f64>,
}

impl Shelf {
    /// Create a validated shelf
    pub fn new(
        width: f64,
        strip_id: StripId,
        strip_offset: PixelOffset,
        strip_length: u16,
        is_reverse: bool,
        bin_offsets: Vec<f64>,
    ) -> Result<Self, LayoutError> {
        let shelf = Self {
            width,
            strip_id,
            strip_offset,
            strip_length,
            is_reverse,
            bin_offsets,
        };
        shelf.validate()?;
        Ok(shelf)
    }

    /// Check the geometry invariants
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(LayoutError::InvalidWidth);
        }
        if self.strip_length == 0 {
            return Err(LayoutError::EmptyStrip);
        }
        // The last bin of a reversed shelf can reach offset + length
        if self.strip_offset.checked_add(self.strip_length).is_none() {
            return Err(LayoutError::StripOverflow);
        }
        if self.bin_offsets.is_empty() {
            return Err(LayoutError::NoBins);
        }
        if self
            .bin_offsets
            .iter()
            .any(|&d| !(0.0..self.width).contains(&d))
        {
            return Err(LayoutError::BinOutOfRange);
        }
        if self.bin_offsets.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(LayoutError::BinsNotAscending);
        }
        Ok(())
    }

    /// Number of bins on this shelf
    pub fn bin_count(&self) -> usize {
        self.bin_offsets.len()
    }
}

/// A cart and its shelves
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Cart {
    shelves: BTreeMap<ShelfId, Shelf>,
}

impl Cart {
    /// Look up a shelf by id
    pub fn shelf(&self, shelf_id: ShelfId) -> Option<&Shelf> {
        self.shelves.get(&shelf_id)
    }

    /// Iterate shelves in ascending id order
    pub fn shelves(&self) -> impl Iterator<Item = (ShelfId, &Shelf)> {
        self.shelves.iter().map(|(&id, shelf)| (id, shelf))
    }
}

/// Complete layout snapshot
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LayoutTable {
    carts: BTreeMap<String, Cart>,
    /// Strip ids in the order they were first registered
    strip_ids: Vec<StripId>,
}

impl LayoutTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a shelf
    ///
    /// The shelf's strip is registered on first sight, so `strip_ids` keeps
    /// discovery order. Re-inserting an existing (cart, shelf) pair replaces it.
    pub fn insert_shelf(
        &mut self,
        cart: &str,
        shelf_id: ShelfId,
        shelf: Shelf,
    ) -> Result<(), LayoutError> {
        shelf.validate()?;

        if !self.strip_ids.contains(&shelf.strip_id) {
            self.strip_ids.push(shelf.strip_id);
        }
        self.carts
            .entry(String::from(cart))
            .or_default()
            .shelves
            .insert(shelf_id, shelf);
        Ok(())
    }

    /// Look up a shelf by cart name and shelf id
    pub fn shelf(&self, cart: &str, shelf_id: ShelfId) -> Option<&Shelf> {
        self.carts.get(cart)?.shelf(shelf_id)
    }

    /// Look up a cart by name
    pub fn cart(&self, cart: &str) -> Option<&Cart> {
        self.carts.get(cart)
    }

    /// Strip ids in discovery order
    pub fn strip_ids(&self) -> &[StripId] {
        &self.strip_ids
    }

    /// Number of carts
    pub fn cart_count(&self) -> usize {
        self.carts.len()
    }

    /// Total number of shelves across all carts
    pub fn shelf_count(&self) -> usize {
        self.carts.values().map(|cart| cart.shelves.len()).sum()
    }

    /// Check if the table has no shelves
    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }
}
