//! Cell addressing and cell records.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "AA100") and zero-indexed row/column coordinates, plus
//! the [`Cell`] record exchanged with the remote store.
//!
//! # Examples
//!
//! ```
//! use gridsync_core::CellRef;
//!
//! let cell = CellRef::parse_a1("B3").unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A reference to a cell by row and column indices (0-indexed).
///
/// Ordering is row-major, which is also the order keys are locked in when a
/// batch of writes is serialized.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference from spreadsheet notation (e.g., "A1", "B2", "AA10").
    /// Returns None if the input is invalid.
    pub fn parse_a1(name: &str) -> Option<CellRef> {
        static A1: OnceLock<Regex> = OnceLock::new();
        let re = A1.get_or_init(|| {
            Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$").expect("valid A1 pattern")
        });
        let caps = re.captures(name.trim())?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0usize;
        for c in letters.to_ascii_uppercase().bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;

        let row = numbers.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellRef::new(row, col))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}

/// One addressable grid position: the raw entered content and the content
/// computed for it by the remote store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    /// Formula or literal exactly as entered.
    #[serde(default)]
    pub raw_value: String,
    /// Remotely computed value shown when the cell is not being edited.
    #[serde(default)]
    pub display_value: String,
}

impl Cell {
    /// A cell that has never been written: raw and display are both empty.
    pub fn empty(at: CellRef) -> Cell {
        Cell {
            row: at.row,
            col: at.col,
            raw_value: String::new(),
            display_value: String::new(),
        }
    }

    pub fn new(
        at: CellRef,
        raw_value: impl Into<String>,
        display_value: impl Into<String>,
    ) -> Cell {
        Cell {
            row: at.row,
            col: at.col,
            raw_value: raw_value.into(),
            display_value: display_value.into(),
        }
    }

    pub fn at(&self) -> CellRef {
        CellRef::new(self.row, self.col)
    }
}

/// A single write in an insert-cells batch. Only the raw value travels; the
/// display value is always computed remotely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellWrite {
    pub row: usize,
    pub col: usize,
    pub raw_value: String,
}

impl CellWrite {
    pub fn new(at: CellRef, raw_value: impl Into<String>) -> CellWrite {
        CellWrite {
            row: at.row,
            col: at.col,
            raw_value: raw_value.into(),
        }
    }

    pub fn at(&self) -> CellRef {
        CellRef::new(self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, CellRef};

    #[test]
    fn test_parse_a1_single_and_multi_letter() {
        assert_eq!(CellRef::parse_a1("A1"), Some(CellRef::new(0, 0)));
        assert_eq!(CellRef::parse_a1("D3"), Some(CellRef::new(2, 3)));
        assert_eq!(CellRef::parse_a1("aa10"), Some(CellRef::new(9, 26)));
        assert_eq!(CellRef::parse_a1(" B2 "), Some(CellRef::new(1, 1)));
    }

    #[test]
    fn test_parse_a1_invalid_inputs() {
        assert!(CellRef::parse_a1("").is_none());
        assert!(CellRef::parse_a1("123").is_none());
        assert!(CellRef::parse_a1("A0").is_none());
        assert!(CellRef::parse_a1("1A").is_none());
        assert!(CellRef::parse_a1("A 1").is_none());
    }

    #[test]
    fn test_parse_a1_overflow_returns_none() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(CellRef::parse_a1(&huge).is_none());
    }

    #[test]
    fn test_display_uses_a1_notation() {
        assert_eq!(CellRef::new(0, 0).to_string(), "A1");
        assert_eq!(CellRef::new(19, 27).to_string(), "AB20");
        assert_eq!(CellRef::col_to_letters(25), "Z");
        assert_eq!(CellRef::col_to_letters(26), "AA");
    }

    #[test]
    fn test_refs_order_row_major() {
        let mut refs = vec![
            CellRef::new(1, 0),
            CellRef::new(0, 5),
            CellRef::new(0, 1),
        ];
        refs.sort();
        assert_eq!(
            refs,
            vec![CellRef::new(0, 1), CellRef::new(0, 5), CellRef::new(1, 0)]
        );
    }

    #[test]
    fn test_empty_cell_has_blank_values() {
        let cell = Cell::empty(CellRef::new(4, 2));
        assert_eq!(cell.at(), CellRef::new(4, 2));
        assert!(cell.raw_value.is_empty());
        assert!(cell.display_value.is_empty());
    }
}
