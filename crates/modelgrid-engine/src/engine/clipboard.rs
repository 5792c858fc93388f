//! Clipboard interchange: tab-separated cells, newline-separated rows.

use super::cell::{Grid, raw_value};
use super::cell_ref::{CellRef, GridSize};
use super::selection::Bounds;

/// Serialize the raw values inside `bounds` as TSV.
pub fn copy_text(grid: &Grid, bounds: &Bounds) -> String {
    let mut out = String::new();
    for r in bounds.min_row..=bounds.max_row {
        if r != bounds.min_row {
            out.push('\n');
        }
        for c in bounds.min_col..=bounds.max_col {
            if c != bounds.min_col {
                out.push('\t');
            }
            out.push_str(&raw_value(grid, &CellRef::new(c, r)));
        }
    }
    out
}

/// Parse clipboard text into rows of values (handles `\r\n` and trailing newlines).
pub fn parse_clipboard_grid(s: &str) -> Vec<Vec<String>> {
    let s = s.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<&str> = s.split('\n').collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
        .iter()
        .map(|line| line.split('\t').map(|c| c.to_string()).collect())
        .collect()
}

/// Map pasted text onto target cells starting at `anchor`, dropping anything
/// that would land outside the sheet.
pub fn paste_targets(text: &str, anchor: CellRef, size: GridSize) -> Vec<(CellRef, String)> {
    let mut out = Vec::new();
    for (dr, row) in parse_clipboard_grid(text).into_iter().enumerate() {
        for (dc, value) in row.into_iter().enumerate() {
            let target = CellRef::new(anchor.col + dc, anchor.row + dr);
            if size.contains(&target) {
                out.push((target, value));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Cell, new_grid};

    fn grid_with(values: &[(usize, usize, &str)]) -> Grid {
        let grid = new_grid();
        for (col, row, raw) in values {
            grid.insert(CellRef::new(*col, *row), Cell::from_input(raw));
        }
        grid
    }

    #[test]
    fn test_copy_two_by_two() {
        let grid = grid_with(&[(0, 0, "a"), (1, 0, "b"), (0, 1, "c"), (1, 1, "d")]);
        let bounds = Bounds::new(CellRef::new(1, 1), CellRef::new(0, 0));
        assert_eq!(copy_text(&grid, &bounds), "a\tb\nc\td");
    }

    #[test]
    fn test_copy_uses_raw_formula_and_blanks() {
        let grid = grid_with(&[(0, 0, "=M(B1)"), (1, 1, "x")]);
        let bounds = Bounds::new(CellRef::new(0, 0), CellRef::new(1, 1));
        assert_eq!(copy_text(&grid, &bounds), "=M(B1)\t\n\tx");
    }

    #[test]
    fn test_paste_reproduces_block_at_new_anchor() {
        let targets = paste_targets("a\tb\nc\td", CellRef::new(3, 5), GridSize::default());
        assert_eq!(
            targets,
            vec![
                (CellRef::new(3, 5), "a".to_string()),
                (CellRef::new(4, 5), "b".to_string()),
                (CellRef::new(3, 6), "c".to_string()),
                (CellRef::new(4, 6), "d".to_string()),
            ]
        );
    }

    #[test]
    fn test_paste_clips_overflow() {
        let size = GridSize::new(2, 2);
        let targets = paste_targets("a\tb\tc\nd\te\tf\ng", CellRef::new(1, 1), size);
        assert_eq!(targets, vec![(CellRef::new(1, 1), "a".to_string())]);
    }

    #[test]
    fn test_parse_handles_crlf_and_trailing_newline() {
        let grid = parse_clipboard_grid("1\t2\r\n3\t4\r\n");
        assert_eq!(grid, vec![vec!["1", "2"], vec!["3", "4"]]);
        assert!(parse_clipboard_grid("").is_empty());
    }
}
