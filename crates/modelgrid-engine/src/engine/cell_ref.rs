//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "J100") and zero-indexed column/row coordinates.
//! Only single-letter columns exist, so a sheet has at most 26 columns.
//!
//! # Examples
//!
//! ```ignore
//! let size = GridSize::new(100, 10);
//! let cell = CellRef::parse("B3", size).unwrap();
//! assert_eq!(cell.col, 1);  // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Hard ceiling imposed by the single-letter column grammar.
pub const MAX_COLS: usize = 26;

/// Fixed dimensions of a sheet.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: usize,
    pub cols: usize,
}

impl GridSize {
    pub const fn new(rows: usize, cols: usize) -> GridSize {
        GridSize { rows, cols }
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }
}

impl Default for GridSize {
    fn default() -> Self {
        GridSize::new(100, 10)
    }
}

/// A reference to a cell by column and row indices (0-indexed).
///
/// Ordering is row-major, so sorted collections of references read like the sheet.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

fn cell_token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(r"^(?<letter>[A-Z])(?<numbers>[0-9]+)$").expect("cell token regex must compile")
    })
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference such as "A1" and validate it against `size`.
    /// Returns None for any other shape or for coordinates outside the sheet.
    pub fn parse(token: &str, size: GridSize) -> Option<CellRef> {
        let caps = cell_token_re().captures(token)?;
        let col = (caps["letter"].as_bytes()[0] - b'A') as usize;
        let row = caps["numbers"].parse::<usize>().ok()?.checked_sub(1)?;

        let cell = CellRef::new(col, row);
        size.contains(&cell).then_some(cell)
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

    /// Column index for a single column letter ("C" -> 2).
    pub fn letter_to_col(letter: &str, size: GridSize) -> Option<usize> {
        let [b] = letter.as_bytes() else {
            return None;
        };
        if !b.is_ascii_uppercase() {
            return None;
        }
        let col = (b - b'A') as usize;
        (col < size.cols).then_some(col)
    }

    /// Key used by the save endpoint: `"{row}-{col}"`, both 0-based.
    pub fn wire_key(&self) -> String {
        format!("{}-{}", self.row, self.col)
    }

    /// Inverse of [`CellRef::wire_key`]. Keys outside `size` are rejected.
    pub fn from_wire_key(key: &str, size: GridSize) -> Option<CellRef> {
        let (row, col) = key.split_once('-')?;
        let cell = CellRef::new(col.parse().ok()?, row.parse().ok()?);
        size.contains(&cell).then_some(cell)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}
