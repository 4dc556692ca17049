//! Bin to pixel geometry
//!
//! A bin spans from its own boundary to the next one (or to the shelf edge
//! for the last bin). Both ends are mapped proportionally onto the shelf's
//! pixel run:
//!
//! ```text
//! ratio = distance / width          (1 - ratio when reversed)
//! pixel = round(ratio * length) + offset
//! ```
//!
//! Rounding is to the nearest integer with ties away from zero, so 2.5 maps
//! to 3. The pixel on a shared boundary belongs to the next bin when the
//! strip runs forward, and to the previous bin when it runs in reverse.

use core::ops::RangeInclusive;

use bindicator_protocol::{PixelOffset, StripId};

use crate::layout::{LayoutTable, Shelf};
use crate::request::BinAddress;

/// Contiguous run of pixels on one strip, in ascending offset order
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelSpan {
    strip_id: StripId,
    first: PixelOffset,
    /// One past the last offset, kept in u32 so offset 65535 is reachable
    end: u32,
}

impl PixelSpan {
    fn new(strip_id: StripId, first: i64, last: i64) -> Self {
        // Shelf validation keeps both ends within 0..=u16::MAX
        let first = PixelOffset::try_from(first.max(0)).unwrap_or(PixelOffset::MAX);
        let end = u32::try_from(last.saturating_add(1).max(0))
            .unwrap_or(u32::MAX)
            .max(u32::from(first));
        Self {
            strip_id,
            first,
            end,
        }
    }

    /// Strip the span lies on
    pub fn strip_id(&self) -> StripId {
        self.strip_id
    }

    /// Number of pixels covered
    pub fn len(&self) -> usize {
        (self.end - u32::from(self.first)) as usize
    }

    /// Check if the span covers no pixels
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Covered offsets as an inclusive range, or `None` when empty
    pub fn offsets(&self) -> Option<RangeInclusive<PixelOffset>> {
        let last = PixelOffset::try_from(self.end.checked_sub(1)?).ok()?;
        (last >= self.first).then_some(self.first..=last)
    }

    /// `(strip, offset)` pairs in ascending offset order
    pub fn pixels(&self) -> impl Iterator<Item = (StripId, PixelOffset)> + '_ {
        self.offsets()
            .into_iter()
            .flatten()
            .map(move |offset| (self.strip_id, offset))
    }
}

/// Map a distance along the shelf to a pixel offset on its strip
pub fn map_distance_to_pixel(shelf: &Shelf, distance: f64) -> i64 {
    let mut ratio = distance / shelf.width;
    if shelf.is_reverse {
        ratio = 1.0 - ratio;
    }
    libm::round(ratio * f64::from(shelf.strip_length)) as i64 + i64::from(shelf.strip_offset)
}

/// Resolve a 1-based bin on a shelf to its pixel span
///
/// Returns `None` when the bin index is 0 or past the last bin.
pub fn resolve_bin(shelf: &Shelf, bin: u32) -> Option<PixelSpan> {
    let index = usize::try_from(bin.checked_sub(1)?).ok()?;
    let dist_start = *shelf.bin_offsets.get(index)?;
    let dist_end = shelf
        .bin_offsets
        .get(index + 1)
        .copied()
        .unwrap_or(shelf.width);

    let p_start = map_distance_to_pixel(shelf, dist_start);
    let p_end = map_distance_to_pixel(shelf, dist_end);

    let span = if shelf.is_reverse {
        PixelSpan::new(shelf.strip_id, p_end + 1, p_start)
    } else {
        PixelSpan::new(shelf.strip_id, p_start, p_end - 1)
    };
    Some(span)
}

/// Resolve a bin address against a layout table
///
/// Returns `None` for an unknown cart or shelf, or a bin out of range. A
/// found bin may still resolve to an empty span when two boundaries coincide.
pub fn resolve(table: &LayoutTable, address: &BinAddress) -> Option<PixelSpan> {
    let shelf = table.shelf(&address.cart, address.shelf)?;
    resolve_bin(shelf, address.bin)
}
