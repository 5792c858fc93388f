//! Keyboard focus movement.

use super::cell_ref::{CellRef, GridSize};

/// One navigation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nav {
    Up,
    Down,
    Left,
    Right,
    /// Tab: right, wrapping to the start of the next row.
    Next,
    /// Shift+Tab: left, wrapping to the end of the previous row.
    Prev,
}

impl Nav {
    /// Where focus lands when stepping from `from`. Arrows clamp at the edges;
    /// Tab wraps between rows but stops at the first and last cell.
    pub fn step(self, from: CellRef, size: GridSize) -> CellRef {
        let last_row = size.rows.saturating_sub(1);
        let last_col = size.cols.saturating_sub(1);
        let (col, row) = (from.col, from.row);
        match self {
            Nav::Up => CellRef::new(col, row.saturating_sub(1)),
            Nav::Down => CellRef::new(col, (row + 1).min(last_row)),
            Nav::Left => CellRef::new(col.saturating_sub(1), row),
            Nav::Right => CellRef::new((col + 1).min(last_col), row),
            Nav::Next => {
                if col < last_col {
                    CellRef::new(col + 1, row)
                } else if row < last_row {
                    CellRef::new(0, row + 1)
                } else {
                    from
                }
            }
            Nav::Prev => {
                if col > 0 {
                    CellRef::new(col - 1, row)
                } else if row > 0 {
                    CellRef::new(last_col, row - 1)
                } else {
                    from
                }
            }
        }
    }
}
