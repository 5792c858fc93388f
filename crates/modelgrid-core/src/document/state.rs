use std::collections::BTreeMap;

use modelgrid_engine::engine::{
    Cell, CellRef, ColumnType, FormulaParse, Grid, GridSize, Selection, column_type, new_grid,
    parse_formula, raw_value,
};
use tracing::warn;

use super::actions::Effect;
use crate::backend::{ModelDescriptor, SheetSnapshot};

/// State of the model list panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ModelList {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Vec<ModelDescriptor>),
    Failed(String),
}

/// UI-agnostic sheet state.
pub struct Sheet {
    /// The cell store (DashMap is internally Arc-based, clones are cheap)
    pub grid: Grid,
    pub size: GridSize,
    /// Column letter -> display name
    pub column_names: BTreeMap<String, String>,
    /// Inferred type badge per column, refreshed on every edit
    pub column_types: Vec<Option<ColumnType>>,
    /// Focused cell
    pub focus: CellRef,
    pub selection: Selection,
    /// A save request is in flight; the manual save control is disabled.
    pub saving: bool,
    /// Whether cells changed since the last successful save
    pub modified: bool,
    pub models: ModelList,
}

impl Sheet {
    /// Create an empty sheet.
    ///
    /// This constructor is side-effect free: it does not touch the network.
    pub fn new(size: GridSize) -> Self {
        Sheet {
            grid: new_grid(),
            size,
            column_names: BTreeMap::new(),
            column_types: vec![None; size.cols],
            focus: CellRef::new(0, 0),
            selection: Selection::default(),
            saving: false,
            modified: false,
            models: ModelList::NotLoaded,
        }
    }

    /// Populate the sheet from persisted data. Returns the evaluations needed
    /// for the formula cells, followed by a model list load.
    pub fn load(&mut self, snapshot: SheetSnapshot) -> Vec<Effect> {
        self.grid.clear();
        self.column_names.clear();

        for (key, raw) in snapshot.data {
            let Some(at) = CellRef::from_wire_key(&key, self.size) else {
                warn!(%key, "dropping cell outside the grid");
                continue;
            };
            if !raw.is_empty() {
                self.grid.insert(at, Cell::from_input(&raw));
            }
        }
        for (letter, name) in snapshot.column_names {
            if CellRef::letter_to_col(&letter, self.size).is_some() && !name.trim().is_empty() {
                self.column_names.insert(letter, name.trim().to_string());
            }
        }
        for col in 0..self.size.cols {
            self.refresh_column_type(col);
        }

        let mut cells: Vec<CellRef> = self.grid.iter().map(|e| *e.key()).collect();
        cells.sort();
        let mut effects = Vec::new();
        for at in cells {
            effects.extend(self.start_evaluation(at));
        }
        effects.push(Effect::LoadModels);
        self.models = ModelList::Loading;
        self.modified = false;
        effects
    }

    /// Persisted form of the current cells and column names.
    pub fn snapshot(&self) -> SheetSnapshot {
        let mut snapshot = SheetSnapshot {
            column_names: self.column_names.clone(),
            ..SheetSnapshot::default()
        };
        for entry in self.grid.iter() {
            snapshot.insert(*entry.key(), entry.value().raw.clone());
        }
        snapshot
    }

    pub fn cell(&self, at: &CellRef) -> Option<Cell> {
        self.grid.get(at).map(|c| c.clone())
    }

    pub fn raw(&self, at: &CellRef) -> String {
        raw_value(&self.grid, at)
    }

    pub fn display(&self, at: &CellRef) -> String {
        self.grid
            .get(at)
            .map(|c| c.display().to_string())
            .unwrap_or_default()
    }

    /// Header text for a column: its override name or its letter.
    pub fn column_label(&self, col: usize) -> String {
        let letter = CellRef::col_to_letters(col);
        self.column_names.get(&letter).cloned().unwrap_or(letter)
    }

    pub fn column_type(&self, col: usize) -> Option<ColumnType> {
        self.column_types.get(col).copied().flatten()
    }

    pub(crate) fn refresh_column_type(&mut self, col: usize) {
        if let Some(slot) = self.column_types.get_mut(col) {
            *slot = column_type(&self.grid, col, self.size.rows);
        }
    }

    /// Put a stored formula cell into its first state and request evaluation.
    pub(crate) fn start_evaluation(&mut self, at: CellRef) -> Option<Effect> {
        let mut cell = self.grid.get_mut(&at)?;
        match parse_formula(&cell.raw) {
            FormulaParse::NotFormula => None,
            FormulaParse::Invalid => {
                cell.state = modelgrid_engine::engine::CellState::Error(
                    crate::error::EvalError::Parse.to_cell_error(),
                );
                None
            }
            FormulaParse::Call(call) => {
                cell.state = modelgrid_engine::engine::CellState::Pending;
                Some(Effect::Evaluate {
                    at,
                    formula: cell.raw.clone(),
                    call,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelgrid_engine::engine::{CellState, ErrorKind};

    fn snapshot(cells: &[(&str, &str)]) -> SheetSnapshot {
        SheetSnapshot {
            data: cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            column_names: BTreeMap::new(),
        }
    }

    #[test]
    fn test_load_drops_out_of_range_keys() {
        let mut sheet = Sheet::new(GridSize::new(20, 10));
        sheet.load(snapshot(&[("0-0", "1"), ("25-0", "x"), ("0-12", "y"), ("bad", "z")]));
        assert_eq!(sheet.grid.len(), 1);
        assert_eq!(sheet.raw(&CellRef::new(0, 0)), "1");
    }

    #[test]
    fn test_load_requests_evaluation_for_formula_cells() {
        let mut sheet = Sheet::new(GridSize::default());
        let effects = sheet.load(snapshot(&[("0-0", "2"), ("0-1", "=Price(A1)"), ("1-1", "=bad")]));

        assert_eq!(effects.len(), 2);
        assert!(matches!(
            &effects[0],
            Effect::Evaluate { at, formula, .. } if *at == CellRef::new(1, 0) && formula == "=Price(A1)"
        ));
        assert_eq!(effects[1], Effect::LoadModels);
        assert_eq!(sheet.models, ModelList::Loading);

        let pending = sheet.cell(&CellRef::new(1, 0)).unwrap();
        assert_eq!(pending.state, CellState::Pending);
        let broken = sheet.cell(&CellRef::new(1, 1)).unwrap();
        assert_eq!(broken.error().map(|e| e.kind), Some(ErrorKind::Parse));
        assert_eq!(broken.display(), "=bad");
    }

    #[test]
    fn test_load_computes_column_types_and_names() {
        let mut sheet = Sheet::new(GridSize::default());
        let mut snap = snapshot(&[("0-0", "1"), ("1-0", "x"), ("0-1", "2")]);
        snap.column_names.insert("A".into(), " Size ".into());
        snap.column_names.insert("Z".into(), "Out of range".into());
        sheet.load(snap);

        assert_eq!(sheet.column_type(0), Some(ColumnType::Mixed));
        assert_eq!(sheet.column_type(1), Some(ColumnType::Number));
        assert_eq!(sheet.column_type(2), None);
        assert_eq!(sheet.column_label(0), "Size");
        assert_eq!(sheet.column_label(1), "B");
        assert_eq!(sheet.column_names.len(), 1);
    }

    #[test]
    fn test_snapshot_uses_raw_values() {
        let mut sheet = Sheet::new(GridSize::default());
        sheet.load(snapshot(&[("3-2", "=M(A1)"), ("0-0", "5")]));
        let snap = sheet.snapshot();
        assert_eq!(snap.data.get("3-2").map(String::as_str), Some("=M(A1)"));
        assert_eq!(snap.data.get("0-0").map(String::as_str), Some("5"));
        assert_eq!(snap.data.len(), 2);
    }
}
