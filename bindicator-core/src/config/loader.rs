//! Layout loading from disk
//!
//! Reads every `strips-<id>.csv` in a directory into one table. The store is
//! only updated once the whole directory has parsed, so a bad file leaves the
//! previous layout in service.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::vec::Vec;

use bindicator_protocol::StripId;

use super::strips::{parse_strips, strip_id_from_file_name, ParseError};
use crate::layout::{LayoutStore, LayoutTable};

/// Layout loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    /// Directory or file could not be read
    Io(io::ErrorKind),
    /// A strips table is malformed
    Parse {
        /// Strip whose table failed
        strip_id: StripId,
        /// Row error
        error: ParseError,
    },
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e.kind())
    }
}

/// Find strips tables in a directory, in ascending strip id order
pub fn strips_files(dir: &Path) -> Result<Vec<(StripId, PathBuf)>, LoadError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(strip_id) = name.to_str().and_then(strip_id_from_file_name) else {
            continue;
        };
        files.push((strip_id, entry.path()));
    }
    files.sort();
    Ok(files)
}

/// Build a layout table from a directory of strips tables
pub fn load_layout_dir(dir: &Path) -> Result<LayoutTable, LoadError> {
    let mut table = LayoutTable::new();
    for (strip_id, path) in strips_files(dir)? {
        let input = fs::read_to_string(&path)?;
        let _added = parse_strips(strip_id, &input, &mut table)
            .map_err(|error| LoadError::Parse { strip_id, error })?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Strip {}: {} shelves", strip_id, _added);
    }
    Ok(table)
}

/// Load a directory and swap it into the store
///
/// On error the store keeps serving its current table.
pub fn reload_layout(store: &LayoutStore, dir: &Path) -> Result<(), LoadError> {
    let table = match load_layout_dir(dir) {
        Ok(table) => table,
        Err(e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Layout reload failed: {}", defmt::Debug2Format(&e));
            return Err(e);
        }
    };

    #[cfg(feature = "defmt")]
    defmt::info!(
        "Layout loaded: {} carts, {} shelves, {} strips",
        table.cart_count(),
        table.shelf_count(),
        table.strip_ids().len()
    );

    store.load(table);
    Ok(())
}
