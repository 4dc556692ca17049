//! Active layout snapshot
//!
//! Readers clone an `Arc` of the current table inside a short critical
//! section; `load` swaps in a complete new table, so no reader ever sees a
//! half-built one.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::RefCell;

use bindicator_protocol::StripId;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::types::{LayoutTable, Shelf, ShelfId};

/// Shared holder of the active layout table
pub struct LayoutStore {
    active: Mutex<CriticalSectionRawMutex, RefCell<Option<Arc<LayoutTable>>>>,
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutStore {
    /// Create a store with no table loaded
    pub const fn new() -> Self {
        Self {
            active: Mutex::new(RefCell::new(None)),
        }
    }

    /// Create a store that is ready immediately
    pub fn with_table(table: LayoutTable) -> Self {
        let store = Self::new();
        store.load(table);
        store
    }

    /// Replace the active table
    pub fn load(&self, table: LayoutTable) {
        let next = Arc::new(table);
        let previous = self.active.lock(|active| active.replace(Some(next)));
        // Release the old table outside the critical section
        drop(previous);
    }

    /// Check if a table has been loaded
    pub fn is_ready(&self) -> bool {
        self.active.lock(|active| active.borrow().is_some())
    }

    /// Current table, if one has been loaded
    pub fn snapshot(&self) -> Option<Arc<LayoutTable>> {
        self.active.lock(|active| active.borrow().clone())
    }

    /// Look up a shelf in the current table
    pub fn lookup_shelf(&self, cart: &str, shelf_id: ShelfId) -> Option<Shelf> {
        self.snapshot()?.shelf(cart, shelf_id).cloned()
    }

    /// Known strip ids in discovery order
    pub fn strip_ids(&self) -> Vec<StripId> {
        self.snapshot()
            .map(|table| table.strip_ids().to_vec())
            .unwrap_or_default()
    }
}
