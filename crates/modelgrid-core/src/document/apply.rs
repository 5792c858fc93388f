use modelgrid_engine::engine::{Cell, CellRef, CellState, copy_text, paste_targets};
use tracing::{debug, warn};

use super::actions::{Action, Effect, Notice};
use super::state::{ModelList, Sheet};
use crate::backend::NewModel;

impl Sheet {
    /// Apply an action and return the effects the front end must carry out.
    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::EditCell { at, raw } => self.write_cell(at, raw),
            Action::Focus(at) => {
                self.move_focus(at);
                Vec::new()
            }
            Action::Navigate(nav) => {
                let to = nav.step(self.focus, self.size);
                self.move_focus(to);
                Vec::new()
            }
            Action::SelectionStart(at) => {
                if self.size.contains(&at) {
                    self.selection.begin(at);
                    self.focus = at;
                }
                Vec::new()
            }
            Action::SelectionExtend(at) => {
                if self.size.contains(&at) {
                    self.selection.extend(at);
                }
                Vec::new()
            }
            Action::SelectionEnd => {
                if let Some(end) = self.selection.finish() {
                    self.focus = end;
                }
                Vec::new()
            }
            Action::Copy => match self.selection.bounds() {
                Some(bounds) => vec![Effect::WriteClipboard(copy_text(&self.grid, &bounds))],
                None => Vec::new(),
            },
            Action::Paste(text) => {
                let mut effects = Vec::new();
                for (at, value) in paste_targets(&text, self.focus, self.size) {
                    effects.extend(self.write_cell(at, value));
                }
                effects
            }
            Action::RenameColumn { col, name } => {
                self.rename_column(col, &name);
                Vec::new()
            }
            Action::Save => {
                if self.saving {
                    debug!("save already in flight");
                    return Vec::new();
                }
                self.saving = true;
                vec![Effect::Save {
                    snapshot: self.snapshot(),
                    follow_up: None,
                }]
            }
            Action::SaveFinished { result, follow_up } => {
                // Chained saves never set the flag, so they must not clear it.
                if follow_up.is_none() {
                    self.saving = false;
                }
                match (result, follow_up) {
                    (Ok(()), None) => {
                        self.modified = false;
                        vec![Effect::Notify(Notice::success(
                            "Spreadsheet saved successfully!",
                        ))]
                    }
                    (Ok(()), Some(model)) => {
                        self.modified = false;
                        vec![Effect::CreateModel(model)]
                    }
                    (Err(msg), _) => vec![Effect::Notify(Notice::error(format!(
                        "Error saving spreadsheet: {msg}"
                    )))],
                }
            }
            Action::CreateModel(model) => match self.validate_new_model(&model) {
                Ok(()) => vec![Effect::Save {
                    snapshot: self.snapshot(),
                    follow_up: Some(model),
                }],
                Err(msg) => vec![Effect::Notify(Notice::error(msg))],
            },
            Action::ModelCreated(Ok(_)) => {
                self.models = ModelList::Loading;
                vec![
                    Effect::Notify(Notice::success("Model created successfully!")),
                    Effect::LoadModels,
                ]
            }
            Action::ModelCreated(Err(msg)) => vec![Effect::Notify(Notice::error(format!(
                "Error creating model: {msg}"
            )))],
            Action::LoadModels => {
                self.models = ModelList::Loading;
                vec![Effect::LoadModels]
            }
            Action::ModelsLoaded(Ok(models)) => {
                self.models = ModelList::Loaded(models);
                Vec::new()
            }
            Action::ModelsLoaded(Err(msg)) => {
                warn!(error = %msg, "failed to load model list");
                self.models = ModelList::Failed(msg);
                Vec::new()
            }
            Action::ReloadModels => {
                self.models = ModelList::Loading;
                vec![Effect::InvalidateModels, Effect::LoadModels]
            }
            Action::EvaluationFinished {
                at,
                formula,
                outcome,
            } => {
                // Only the cell's current formula may take a result; the raw
                // value is never rewritten here.
                if self.raw(&at) != formula {
                    debug!(cell = %at, formula = %formula, "stale evaluation dropped");
                    return Vec::new();
                }
                let Some(mut cell) = self.grid.get_mut(&at) else {
                    return Vec::new();
                };
                match outcome {
                    Ok(evaluation) => {
                        debug!(cell = %at, display = %evaluation.display, "evaluation finished");
                        cell.state = CellState::Evaluated(evaluation);
                    }
                    Err(err) => {
                        debug!(cell = %at, error = %err, "evaluation failed");
                        cell.state = CellState::Error(err.to_cell_error());
                    }
                }
                Vec::new()
            }
        }
    }

    /// Store a raw value. Unchanged values are ignored; an empty value clears
    /// the cell.
    fn write_cell(&mut self, at: CellRef, raw: String) -> Vec<Effect> {
        if !self.size.contains(&at) {
            warn!(cell = ?at, "write outside the grid ignored");
            return Vec::new();
        }
        if self.raw(&at) == raw {
            return Vec::new();
        }

        self.modified = true;
        if raw.is_empty() {
            self.grid.remove(&at);
            self.refresh_column_type(at.col);
            return Vec::new();
        }

        self.grid.insert(at, Cell::from_input(&raw));
        self.refresh_column_type(at.col);
        self.start_evaluation(at).into_iter().collect()
    }

    fn move_focus(&mut self, at: CellRef) {
        if !self.size.contains(&at) {
            return;
        }
        if !self.selection.selecting {
            self.selection.clear();
        }
        self.focus = at;
    }

    fn rename_column(&mut self, col: usize, name: &str) {
        if col >= self.size.cols {
            return;
        }
        let letter = CellRef::col_to_letters(col);
        let name = name.trim();
        if name.is_empty() {
            self.column_names.remove(&letter);
        } else {
            self.column_names.insert(letter, name.to_string());
        }
        self.modified = true;
    }

    fn validate_new_model(&self, model: &NewModel) -> Result<(), String> {
        if model.name.trim().is_empty() {
            return Err("Please enter a model name".to_string());
        }
        if model.input_columns.is_empty() {
            return Err("Please select at least one input column".to_string());
        }
        for column in model.input_columns.iter().chain([&model.output_column]) {
            if CellRef::letter_to_col(column, self.size).is_none() {
                return Err(format!("Column {column} is outside the sheet"));
            }
        }
        if model.input_columns.contains(&model.output_column) {
            return Err("Output column cannot also be an input column".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ModelDescriptor, ModelType};
    use crate::document::NoticeKind;
    use crate::error::EvalError;
    use modelgrid_engine::engine::{ColumnType, ErrorKind, Evaluation, GridSize, Nav};

    fn cell(name: &str) -> CellRef {
        CellRef::parse(name, GridSize::default()).unwrap()
    }

    fn edit(sheet: &mut Sheet, name: &str, raw: &str) -> Vec<Effect> {
        sheet.apply(Action::EditCell {
            at: cell(name),
            raw: raw.to_string(),
        })
    }

    fn new_model(inputs: &[&str], output: &str) -> NewModel {
        NewModel {
            name: "Price".into(),
            model_type: ModelType::Regression,
            input_columns: inputs.iter().map(|c| c.to_string()).collect(),
            output_column: output.into(),
        }
    }

    fn notice(effects: &[Effect]) -> Option<&Notice> {
        effects.iter().find_map(|e| match e {
            Effect::Notify(n) => Some(n),
            _ => None,
        })
    }

    #[test]
    fn test_literal_edit_has_no_effects() {
        let mut sheet = Sheet::new(GridSize::default());
        assert!(edit(&mut sheet, "A1", "hello").is_empty());
        let stored = sheet.cell(&cell("A1")).unwrap();
        assert_eq!(stored.state, CellState::Literal);
        assert_eq!(stored.display(), "hello");
        assert!(sheet.modified);
    }

    #[test]
    fn test_formula_edit_requests_evaluation() {
        let mut sheet = Sheet::new(GridSize::default());
        let effects = edit(&mut sheet, "C1", "=Price(A1, B1)");
        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::Evaluate { at, formula, call } => {
                assert_eq!(*at, cell("C1"));
                assert_eq!(formula, "=Price(A1, B1)");
                assert_eq!(call.model_name, "Price");
                assert_eq!(call.args, vec!["A1", "B1"]);
            }
            other => panic!("unexpected effect {other:?}"),
        }
        assert_eq!(sheet.cell(&cell("C1")).unwrap().state, CellState::Pending);
    }

    #[test]
    fn test_malformed_formula_is_parse_error_without_request() {
        let mut sheet = Sheet::new(GridSize::default());
        assert!(edit(&mut sheet, "A1", "=Price A1").is_empty());
        let stored = sheet.cell(&cell("A1")).unwrap();
        let err = stored.error().unwrap();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(
            err.message,
            "Invalid formula format. Use =ModelName(A1, B1, ...)"
        );
        assert_eq!(stored.raw, "=Price A1");
    }

    #[test]
    fn test_unchanged_edit_is_noop_and_empty_edit_clears() {
        let mut sheet = Sheet::new(GridSize::default());
        edit(&mut sheet, "A1", "=M(B1)");
        assert!(edit(&mut sheet, "A1", "=M(B1)").is_empty());

        edit(&mut sheet, "A1", "");
        assert!(sheet.cell(&cell("A1")).is_none());
        assert_eq!(sheet.display(&cell("A1")), "");
    }

    #[test]
    fn test_edit_outside_grid_is_ignored() {
        let mut sheet = Sheet::new(GridSize::new(20, 10));
        let effects = sheet.apply(Action::EditCell {
            at: CellRef::new(0, 25),
            raw: "1".into(),
        });
        assert!(effects.is_empty());
        assert!(sheet.grid.is_empty());
        assert!(!sheet.modified);
    }

    #[test]
    fn test_column_type_tracks_edits() {
        let mut sheet = Sheet::new(GridSize::default());
        edit(&mut sheet, "B1", "1.5");
        edit(&mut sheet, "B2", "2");
        assert_eq!(sheet.column_type(1), Some(ColumnType::Number));
        edit(&mut sheet, "B3", "n/a");
        assert_eq!(sheet.column_type(1), Some(ColumnType::Mixed));
        edit(&mut sheet, "B1", "");
        edit(&mut sheet, "B2", "");
        assert_eq!(sheet.column_type(1), Some(ColumnType::String));
        edit(&mut sheet, "B3", "");
        assert_eq!(sheet.column_type(1), None);
    }

    #[test]
    fn test_successful_evaluation_keeps_raw_formula() {
        let mut sheet = Sheet::new(GridSize::default());
        edit(&mut sheet, "C1", "=Price(A1)");
        sheet.apply(Action::EvaluationFinished {
            at: cell("C1"),
            formula: "=Price(A1)".into(),
            outcome: Ok(Evaluation {
                display: "0.7312".into(),
                result: "0.7312".into(),
            }),
        });
        let stored = sheet.cell(&cell("C1")).unwrap();
        assert_eq!(stored.raw, "=Price(A1)");
        assert_eq!(stored.display(), "0.7312");
        assert_eq!(stored.tooltip().as_deref(), Some("Formula result: 0.7312"));
        assert_eq!(sheet.snapshot().data["0-2"], "=Price(A1)");
    }

    #[test]
    fn test_failed_evaluation_keeps_raw_and_marks_error() {
        let mut sheet = Sheet::new(GridSize::default());
        edit(&mut sheet, "C1", "=Nope(A1)");
        sheet.apply(Action::EvaluationFinished {
            at: cell("C1"),
            formula: "=Nope(A1)".into(),
            outcome: Err(EvalError::ModelNotFound {
                name: "Nope".into(),
            }),
        });
        let stored = sheet.cell(&cell("C1")).unwrap();
        assert_eq!(stored.raw, "=Nope(A1)");
        assert_eq!(stored.display(), "=Nope(A1)");
        assert_eq!(stored.error().unwrap().message, "Model \"Nope\" not found");
    }

    fn finished(name: &str, formula: &str, display: &str) -> Action {
        Action::EvaluationFinished {
            at: cell(name),
            formula: formula.into(),
            outcome: Ok(Evaluation {
                display: display.into(),
                result: display.into(),
            }),
        }
    }

    #[test]
    fn test_last_response_for_current_formula_wins() {
        let mut sheet = Sheet::new(GridSize::default());
        edit(&mut sheet, "C1", "=A(A1)");
        edit(&mut sheet, "C1", "=B(A1)");
        sheet.apply(finished("C1", "=B(A1)", "2.0000"));
        sheet.apply(finished("C1", "=A(A1)", "1.0000"));

        let stored = sheet.cell(&cell("C1")).unwrap();
        assert_eq!(stored.raw, "=B(A1)");
        assert_eq!(stored.display(), "2.0000");

        sheet.apply(finished("C1", "=B(A1)", "3.0000"));
        assert_eq!(sheet.display(&cell("C1")), "3.0000");
    }

    #[test]
    fn test_late_results_never_rewrite_edited_cells() {
        let mut sheet = Sheet::new(GridSize::default());
        edit(&mut sheet, "C1", "=M(A1)");
        edit(&mut sheet, "C1", "");
        edit(&mut sheet, "D1", "=M(A1)");
        edit(&mut sheet, "D1", "5");

        sheet.apply(finished("C1", "=M(A1)", "1.0000"));
        sheet.apply(finished("D1", "=M(A1)", "1.0000"));
        sheet.apply(Action::EvaluationFinished {
            at: cell("D1"),
            formula: "=M(A1)".into(),
            outcome: Err(EvalError::ModelNotFound { name: "M".into() }),
        });

        assert!(sheet.cell(&cell("C1")).is_none());
        let literal = sheet.cell(&cell("D1")).unwrap();
        assert_eq!(literal.state, CellState::Literal);
        assert_eq!(literal.display(), "5");
        let data = sheet.snapshot().data;
        assert_eq!(data.len(), 1);
        assert_eq!(data["0-3"], "5");
    }

    #[test]
    fn test_navigation_clears_selection_outside_drag() {
        let mut sheet = Sheet::new(GridSize::default());
        sheet.apply(Action::SelectionStart(cell("A1")));
        sheet.apply(Action::SelectionExtend(cell("B2")));
        sheet.apply(Action::SelectionEnd);
        assert_eq!(sheet.focus, cell("B2"));
        assert_eq!(sheet.selection.bounds().map(|b| b.cell_count()), Some(4));

        sheet.apply(Action::Navigate(Nav::Down));
        assert_eq!(sheet.focus, cell("B3"));
        assert!(sheet.selection.bounds().is_none());
    }

    #[test]
    fn test_extend_without_drag_is_ignored() {
        let mut sheet = Sheet::new(GridSize::default());
        sheet.apply(Action::SelectionExtend(cell("C3")));
        assert!(sheet.selection.bounds().is_none());
    }

    #[test]
    fn test_copy_selection_as_tsv() {
        let mut sheet = Sheet::new(GridSize::default());
        edit(&mut sheet, "A1", "1");
        edit(&mut sheet, "B1", "=M(A1)");
        edit(&mut sheet, "A2", "x");
        assert!(sheet.apply(Action::Copy).is_empty());

        sheet.apply(Action::SelectionStart(cell("A1")));
        sheet.apply(Action::SelectionExtend(cell("B2")));
        sheet.apply(Action::SelectionEnd);
        assert_eq!(
            sheet.apply(Action::Copy),
            vec![Effect::WriteClipboard("1\t=M(A1)\nx\t".into())]
        );
    }

    #[test]
    fn test_paste_evaluates_each_formula_and_clips() {
        let mut sheet = Sheet::new(GridSize::new(2, 2));
        sheet.apply(Action::Focus(CellRef::new(0, 1)));
        let effects = sheet.apply(Action::Paste("=M(A1)\t5\textra\r\n=N(A1)\n".into()));

        let evaluated: Vec<CellRef> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::Evaluate { at, .. } => Some(*at),
                _ => None,
            })
            .collect();
        assert_eq!(evaluated, vec![CellRef::new(0, 1)]);
        assert_eq!(sheet.raw(&CellRef::new(1, 1)), "5");
        assert_eq!(sheet.grid.len(), 2);
    }

    #[test]
    fn test_paste_after_drag_starts_at_focus() {
        let mut sheet = Sheet::new(GridSize::default());
        sheet.apply(Action::SelectionStart(cell("A1")));
        sheet.apply(Action::SelectionExtend(cell("B2")));
        sheet.apply(Action::SelectionEnd);
        assert_eq!(sheet.focus, cell("B2"));

        sheet.apply(Action::Paste("x".into()));
        assert_eq!(sheet.raw(&cell("B2")), "x");
        assert_eq!(sheet.raw(&cell("A1")), "");
    }

    #[test]
    fn test_copy_then_paste_block() {
        let mut sheet = Sheet::new(GridSize::default());
        edit(&mut sheet, "A1", "a");
        edit(&mut sheet, "B1", "b");
        edit(&mut sheet, "A2", "c");
        edit(&mut sheet, "B2", "d");
        sheet.apply(Action::SelectionStart(cell("A1")));
        sheet.apply(Action::SelectionExtend(cell("B2")));
        sheet.apply(Action::SelectionEnd);
        let effects = sheet.apply(Action::Copy);
        let [Effect::WriteClipboard(text)] = &effects[..] else {
            panic!("expected a clipboard write");
        };
        assert_eq!(text, "a\tb\nc\td");

        sheet.apply(Action::Focus(cell("D5")));
        sheet.apply(Action::Paste(text.clone()));
        assert_eq!(sheet.raw(&cell("D5")), "a");
        assert_eq!(sheet.raw(&cell("E5")), "b");
        assert_eq!(sheet.raw(&cell("D6")), "c");
        assert_eq!(sheet.raw(&cell("E6")), "d");
    }

    #[test]
    fn test_rename_column() {
        let mut sheet = Sheet::new(GridSize::default());
        sheet.apply(Action::RenameColumn {
            col: 1,
            name: " Price ".into(),
        });
        assert_eq!(sheet.column_label(1), "Price");
        assert_eq!(sheet.snapshot().column_names["B"], "Price");

        sheet.apply(Action::RenameColumn {
            col: 1,
            name: "".into(),
        });
        assert_eq!(sheet.column_label(1), "B");
        assert!(sheet.column_names.is_empty());
    }

    #[test]
    fn test_manual_save_is_gated_while_in_flight() {
        let mut sheet = Sheet::new(GridSize::default());
        edit(&mut sheet, "A1", "1");
        let effects = sheet.apply(Action::Save);
        assert!(matches!(&effects[..], [Effect::Save { follow_up: None, .. }]));
        assert!(sheet.saving);
        assert!(sheet.apply(Action::Save).is_empty());

        let effects = sheet.apply(Action::SaveFinished {
            result: Ok(()),
            follow_up: None,
        });
        assert!(!sheet.saving);
        assert!(!sheet.modified);
        assert_eq!(
            notice(&effects).map(|n| n.text.as_str()),
            Some("Spreadsheet saved successfully!")
        );
    }

    #[test]
    fn test_save_failure_notice() {
        let mut sheet = Sheet::new(GridSize::default());
        sheet.apply(Action::Save);
        let effects = sheet.apply(Action::SaveFinished {
            result: Err("disk full".into()),
            follow_up: None,
        });
        let n = notice(&effects).unwrap();
        assert_eq!(n.kind, NoticeKind::Error);
        assert_eq!(n.text, "Error saving spreadsheet: disk full");
        assert!(!sheet.saving);
    }

    #[test]
    fn test_create_model_saves_first_then_creates() {
        let mut sheet = Sheet::new(GridSize::default());
        let model = new_model(&["A", "B"], "C");
        let effects = sheet.apply(Action::CreateModel(model.clone()));
        assert!(matches!(
            &effects[..],
            [Effect::Save { follow_up: Some(m), .. }] if *m == model
        ));
        assert!(!sheet.saving);

        let effects = sheet.apply(Action::SaveFinished {
            result: Ok(()),
            follow_up: Some(model.clone()),
        });
        assert_eq!(effects, vec![Effect::CreateModel(model)]);

        let effects = sheet.apply(Action::ModelCreated(Ok("created".into())));
        assert_eq!(
            notice(&effects).map(|n| n.text.as_str()),
            Some("Model created successfully!")
        );
        assert!(effects.contains(&Effect::LoadModels));
        assert!(!effects.contains(&Effect::InvalidateModels));
        assert_eq!(sheet.models, ModelList::Loading);
    }

    #[test]
    fn test_chained_save_leaves_manual_save_in_flight() {
        let mut sheet = Sheet::new(GridSize::default());
        let model = new_model(&["A"], "B");
        sheet.apply(Action::CreateModel(model.clone()));
        sheet.apply(Action::Save);
        assert!(sheet.saving);

        sheet.apply(Action::SaveFinished {
            result: Ok(()),
            follow_up: Some(model),
        });
        assert!(sheet.saving);
        assert!(sheet.apply(Action::Save).is_empty());

        sheet.apply(Action::SaveFinished {
            result: Ok(()),
            follow_up: None,
        });
        assert!(!sheet.saving);
    }

    #[test]
    fn test_create_model_validation() {
        let mut sheet = Sheet::new(GridSize::default());
        let cases = [
            (new_model(&[], "C"), "Please select at least one input column"),
            (
                new_model(&["A", "C"], "C"),
                "Output column cannot also be an input column",
            ),
            (new_model(&["A"], "Q"), "Column Q is outside the sheet"),
        ];
        for (model, expected) in cases {
            let effects = sheet.apply(Action::CreateModel(model));
            assert_eq!(effects.len(), 1);
            assert_eq!(notice(&effects).map(|n| n.text.as_str()), Some(expected));
        }
    }

    #[test]
    fn test_model_creation_failure_notice() {
        let mut sheet = Sheet::new(GridSize::default());
        let effects = sheet.apply(Action::ModelCreated(Err("Missing required fields".into())));
        assert_eq!(
            notice(&effects).map(|n| n.text.as_str()),
            Some("Error creating model: Missing required fields")
        );
    }

    #[test]
    fn test_model_list_states() {
        let mut sheet = Sheet::new(GridSize::default());
        assert_eq!(sheet.apply(Action::LoadModels), vec![Effect::LoadModels]);
        assert_eq!(sheet.models, ModelList::Loading);

        sheet.apply(Action::ModelsLoaded(Err("offline".into())));
        assert_eq!(sheet.models, ModelList::Failed("offline".into()));

        let model: ModelDescriptor = serde_json::from_str(
            r#"{"id":1,"name":"Price","type":"regression","input_columns":["A"],"output_column":"B"}"#,
        )
        .unwrap();
        sheet.apply(Action::ModelsLoaded(Ok(vec![model])));
        assert!(matches!(&sheet.models, ModelList::Loaded(models) if models.len() == 1));

        assert_eq!(
            sheet.apply(Action::ReloadModels),
            vec![Effect::InvalidateModels, Effect::LoadModels]
        );
    }
}
