//! Rectangular selection driven by mouse drag.

use super::cell_ref::CellRef;

/// Normalized selection rectangle (inclusive on both ends).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

impl Bounds {
    pub fn new(a: CellRef, b: CellRef) -> Bounds {
        Bounds {
            min_row: a.row.min(b.row),
            max_row: a.row.max(b.row),
            min_col: a.col.min(b.col),
            max_col: a.col.max(b.col),
        }
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        cell.row >= self.min_row
            && cell.row <= self.max_row
            && cell.col >= self.min_col
            && cell.col <= self.max_col
    }

    pub fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    pub fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn cell_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Range label such as "B2:C4" (or "B2" for a single cell).
    pub fn label(&self) -> String {
        let start = CellRef::new(self.min_col, self.min_row);
        let end = CellRef::new(self.max_col, self.max_row);
        if start == end {
            start.to_string()
        } else {
            format!("{}:{}", start, end)
        }
    }
}

/// Selection state: two optional corners plus the dragging flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: Option<CellRef>,
    pub end: Option<CellRef>,
    pub selecting: bool,
}

impl Selection {
    /// Mouse down: anchor a new selection at `at`.
    pub fn begin(&mut self, at: CellRef) {
        self.start = Some(at);
        self.end = Some(at);
        self.selecting = true;
    }

    /// Mouse over: move the opposite corner. Ignored unless dragging.
    pub fn extend(&mut self, at: CellRef) -> bool {
        if !self.selecting {
            return false;
        }
        self.end = Some(at);
        true
    }

    /// Mouse up: stop dragging and return the cell that should take focus.
    pub fn finish(&mut self) -> Option<CellRef> {
        if !self.selecting {
            return None;
        }
        self.selecting = false;
        self.end
    }

    pub fn clear(&mut self) {
        *self = Selection::default();
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Some(Bounds::new(self.start?, self.end?))
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        self.bounds().is_some_and(|b| b.contains(cell))
    }
}
