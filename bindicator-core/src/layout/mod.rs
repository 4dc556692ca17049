//! Physical layout of carts, shelves and strips
//!
//! The table is built once and then shared read-only; a reload builds a new
//! table and swaps it into the store.

pub mod store;
pub mod types;

pub use store::LayoutStore;
pub use types::*;
