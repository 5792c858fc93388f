//! modelgrid_engine - Sheet engine: references, formula grammar, cell store.

pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;

    #[test]
    fn test_parse_single_letter_columns() {
        let size = GridSize::new(100, 26);
        let a1 = CellRef::parse("A1", size).unwrap();
        assert_eq!(a1.row, 0);
        assert_eq!(a1.col, 0);

        let b1 = CellRef::parse("B1", size).unwrap();
        assert_eq!(b1.col, 1);

        let z1 = CellRef::parse("Z1", size).unwrap();
        assert_eq!(z1.col, 25);
    }

    #[test]
    fn test_parse_row_numbers() {
        let size = GridSize::new(100, 10);
        assert_eq!(CellRef::parse("A1", size).unwrap().row, 0);
        assert_eq!(CellRef::parse("A10", size).unwrap().row, 9);
        assert_eq!(CellRef::parse("A100", size).unwrap().row, 99);
    }

    #[test]
    fn test_parse_rejects_out_of_bounds() {
        let size = GridSize::new(100, 10);
        // Column out of range on a 10-column grid.
        assert!(CellRef::parse("Z1", size).is_none());
        assert!(CellRef::parse("K1", size).is_none());
        assert!(CellRef::parse("J1", size).is_some());
        assert!(CellRef::parse("A101", size).is_none());
        assert!(CellRef::parse("A0", size).is_none());
    }

    #[test]
    fn test_parse_invalid_shapes() {
        let size = GridSize::default();
        assert!(CellRef::parse("", size).is_none());
        assert!(CellRef::parse("123", size).is_none());
        assert!(CellRef::parse("AB1", size).is_none());
        assert!(CellRef::parse("a1", size).is_none());
        assert!(CellRef::parse("1A", size).is_none());
        assert!(CellRef::parse("A 1", size).is_none());
        assert!(CellRef::parse(" A1", size).is_none());
    }

    #[test]
    fn test_parse_and_format_round_trip() {
        let size = GridSize::new(100, 26);
        for col in 0..size.cols {
            for row in [0usize, 1, 9, 42, 99] {
                let cell = CellRef::new(col, row);
                let token = cell.to_string();
                assert_eq!(CellRef::parse(&token, size), Some(cell), "token {token}");
            }
        }
    }

    #[test]
    fn test_formula_then_reference_resolution() {
        let size = GridSize::new(20, 10);
        let FormulaParse::Call(call) = parse_formula("=Price(A1, J20)") else {
            panic!("expected a call");
        };
        let refs: Vec<_> = call
            .args
            .iter()
            .map(|t| CellRef::parse(t, size))
            .collect();
        assert_eq!(
            refs,
            vec![Some(CellRef::new(0, 0)), Some(CellRef::new(9, 19))]
        );
    }
}
