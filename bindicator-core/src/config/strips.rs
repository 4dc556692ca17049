//! Strips table parser
//!
//! Each strip is described by a file named `strips-<id>.csv`:
//!
//! ```text
//! cart,shelf,width,offset,length,reverse,bin1,bin2,...
//! "A",1,120,0,60,false,0,40,80
//! "A",2,120,60,60,true,0,60
//! ```
//!
//! The first line is a header and is ignored. Entries are `"quoted"` text,
//! `true`/`false`, or numbers; anything else unquoted is read as text.
//!
//! NOT supported:
//! - Commas or escaped quotes inside quoted text
//! - Multi-line entries

use alloc::vec::Vec;

use bindicator_protocol::StripId;

use crate::layout::{LayoutError, LayoutTable, Shelf};

/// File name prefix of a strips table
pub const STRIPS_FILE_PREFIX: &str = "strips-";

/// File name suffix of a strips table
pub const STRIPS_FILE_SUFFIX: &str = ".csv";

/// Columns before the first bin offset
const FIXED_COLUMNS: usize = 6;

/// What went wrong on a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Row has no bin offsets or is missing fixed columns
    MissingColumn,
    /// Entry has the wrong type or is out of range
    InvalidValue,
    /// Row parsed but describes impossible geometry
    Layout(LayoutError),
}

/// Parse error with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    /// Line the error was found on
    pub line: usize,
    /// Error kind
    pub kind: ParseErrorKind,
}

/// A single CSV entry
#[derive(Debug, Clone, Copy, PartialEq)]
enum Entry<'a> {
    Text(&'a str),
    Flag(bool),
    Number(f64),
}

impl<'a> Entry<'a> {
    fn parse(raw: &'a str) -> Self {
        let raw = raw.trim();
        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            return Entry::Text(&raw[1..raw.len() - 1]);
        }
        match raw {
            "true" => Entry::Flag(true),
            "false" => Entry::Flag(false),
            _ => raw
                .parse::<f64>()
                .map(Entry::Number)
                .unwrap_or(Entry::Text(raw)),
        }
    }

    /// Text, or the raw spelling of a value that parsed as something else
    fn as_name(&self, raw: &'a str) -> &'a str {
        match *self {
            Entry::Text(text) => text,
            _ => raw.trim(),
        }
    }

    fn as_flag(&self) -> Option<bool> {
        match self {
            Entry::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Entry::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn as_integer<T: TryFrom<u64>>(&self) -> Option<T> {
        let n = self.as_number()?;
        if n < 0.0 || libm::trunc(n) != n || n > u64::MAX as f64 {
            return None;
        }
        T::try_from(n as u64).ok()
    }
}

/// Extract the strip id from a file name such as `strips-3.csv`
pub fn strip_id_from_file_name(name: &str) -> Option<StripId> {
    name.strip_prefix(STRIPS_FILE_PREFIX)?
        .strip_suffix(STRIPS_FILE_SUFFIX)?
        .parse()
        .ok()
}

/// Parse one strips table into `table`
///
/// Returns the number of shelves added. Fails on the first malformed row;
/// shelves from earlier rows remain in `table`, so callers building a
/// replacement snapshot should discard it on error.
pub fn parse_strips(
    strip_id: StripId,
    input: &str,
    table: &mut LayoutTable,
) -> Result<usize, ParseError> {
    let mut added = 0;

    // Skip the header line
    for (index, line) in input.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fail = |kind| ParseError {
            line: index + 1,
            kind,
        };

        let raw: Vec<&str> = line.split(',').collect();
        if raw.len() <= FIXED_COLUMNS {
            return Err(fail(ParseErrorKind::MissingColumn));
        }
        let entries: Vec<Entry<'_>> = raw.iter().map(|entry| Entry::parse(entry)).collect();

        let (cart, shelf_id, shelf) =
            parse_row(strip_id, &raw, &entries).ok_or(fail(ParseErrorKind::InvalidValue))?;
        let shelf = shelf.map_err(|e| fail(ParseErrorKind::Layout(e)))?;

        table
            .insert_shelf(cart, shelf_id, shelf)
            .map_err(|e| fail(ParseErrorKind::Layout(e)))?;
        added += 1;
    }

    Ok(added)
}

/// Convert one row of entries into a shelf
///
/// Returns `None` for type errors; geometry errors come back inside.
fn parse_row<'a>(
    strip_id: StripId,
    raw: &[&'a str],
    entries: &[Entry<'a>],
) -> Option<(&'a str, u32, Result<Shelf, LayoutError>)> {
    let cart = entries[0].as_name(raw[0]);
    if cart.is_empty() {
        return None;
    }
    let shelf_id = entries[1].as_integer::<u32>()?;
    let width = entries[2].as_number()?;
    let strip_offset = entries[3].as_integer::<u16>()?;
    let strip_length = entries[4].as_integer::<u16>()?;
    let is_reverse = entries[5].as_flag()?;
    let bin_offsets = entries[FIXED_COLUMNS..]
        .iter()
        .map(Entry::as_number)
        .collect::<Option<Vec<f64>>>()?;

    let shelf = Shelf::new(
        width,
        strip_id,
        strip_offset,
        strip_length,
        is_reverse,
        bin_offsets,
    );
    Some((cart, shelf_id, shelf))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRIPS: &str = "\
cart,shelf,width,offset,length,reverse,bins
\"A\",1,100,10,50,false,0,50
\"A\",2,100,60,50,true,0,25,75\r

B7,1,80,110,40,false,0
";

    #[test]
    fn test_parse_strips() {
        let mut table = LayoutTable::new();
        let added = parse_strips(4, STRIPS, &mut table).unwrap();

        assert_eq!(added, 3);
        assert_eq!(table.strip_ids(), &[4]);

        let shelf = table.shelf("A", 2).unwrap();
        assert_eq!(shelf.strip_offset, 60);
        assert!(shelf.is_reverse);
        assert_eq!(shelf.bin_offsets, [0.0, 25.0, 75.0]);

        // Unquoted cart names are taken verbatim
        assert_eq!(table.shelf("B7", 1).map(|s| s.width), Some(80.0));
    }

    #[test]
    fn test_header_only() {
        let mut table = LayoutTable::new();
        assert_eq!(parse_strips(1, "cart,shelf\n", &mut table), Ok(0));
        assert!(table.is_empty());
    }

    #[test]
    fn test_row_without_bins() {
        let mut table = LayoutTable::new();
        let result = parse_strips(1, "header\n\"A\",1,100,0,10,false\n", &mut table);
        assert_eq!(
            result,
            Err(ParseError {
                line: 2,
                kind: ParseErrorKind::MissingColumn
            })
        );
    }

    #[test]
    fn test_row_with_bad_types() {
        let rows = [
            "\"A\",x,100,0,10,false,0",
            "\"A\",1,100,0,10,yes,0",
            "\"A\",1.5,100,0,10,false,0",
            "\"A\",1,100,-1,10,false,0",
            "\"A\",1,100,0,70000,false,0",
            "\"A\",1,\"wide\",0,10,false,0",
        ];
        for row in rows {
            let mut table = LayoutTable::new();
            let input = alloc::format!("header\n{row}\n");
            let result = parse_strips(1, &input, &mut table);
            assert_eq!(
                result.map_err(|e| e.kind),
                Err(ParseErrorKind::InvalidValue),
                "{row}"
            );
        }
    }

    #[test]
    fn test_row_with_bad_geometry() {
        let mut table = LayoutTable::new();
        let input = "header\n\"A\",1,100,0,10,false,0\n\"A\",2,100,0,10,false,0,120\n";
        let result = parse_strips(1, input, &mut table);
        assert_eq!(
            result,
            Err(ParseError {
                line: 3,
                kind: ParseErrorKind::Layout(LayoutError::BinOutOfRange)
            })
        );
    }

    #[test]
    fn test_strip_id_from_file_name() {
        assert_eq!(strip_id_from_file_name("strips-3.csv"), Some(3));
        assert_eq!(strip_id_from_file_name("strips-12.csv"), Some(12));
        assert_eq!(strip_id_from_file_name("strips-300.csv"), None);
        assert_eq!(strip_id_from_file_name("strips-x.csv"), None);
        assert_eq!(strip_id_from_file_name("strips-3.txt"), None);
        assert_eq!(strip_id_from_file_name("bins-3.csv"), None);
    }
}
