use crossterm::event::{self, KeyCode, KeyModifiers};
use modelgrid_core::Action;
use modelgrid_core::backend::{ModelType, NewModel};
use modelgrid_engine::engine::CellRef;

use super::app::{App, Mode};

const MODEL_USAGE: &str = "Usage: :model <name> <regression|classification> <A,B,...> <OUT>";

/// Handle text editing operations on a buffer with UTF-8 aware cursor movement.
pub fn handle_text_input(buffer: &mut String, cursor: &mut usize, key: event::KeyEvent) {
    match key.code {
        KeyCode::Left => {
            if *cursor > 0 {
                let mut new_pos = *cursor - 1;
                while new_pos > 0 && !buffer.is_char_boundary(new_pos) {
                    new_pos -= 1;
                }
                *cursor = new_pos;
            }
        }
        KeyCode::Right => {
            if *cursor < buffer.len() {
                let mut new_pos = *cursor + 1;
                while new_pos < buffer.len() && !buffer.is_char_boundary(new_pos) {
                    new_pos += 1;
                }
                *cursor = new_pos;
            }
        }
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = buffer.len(),
        KeyCode::Backspace => {
            if *cursor > 0 {
                let mut del_start = *cursor - 1;
                while del_start > 0 && !buffer.is_char_boundary(del_start) {
                    del_start -= 1;
                }
                buffer.drain(del_start..*cursor);
                *cursor = del_start;
            }
        }
        KeyCode::Delete => {
            if *cursor < buffer.len() {
                let mut del_end = *cursor + 1;
                while del_end < buffer.len() && !buffer.is_char_boundary(del_end) {
                    del_end += 1;
                }
                buffer.drain(*cursor..del_end);
            }
        }
        KeyCode::Char(c) => {
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                buffer.insert(*cursor, c);
                *cursor += c.len_utf8();
            }
        }
        _ => {}
    }
}

/// Insert pasted text at the cursor of an open buffer.
pub fn insert_text(buffer: &mut String, cursor: &mut usize, text: &str) {
    let line = text.lines().next().unwrap_or_default();
    buffer.insert_str(*cursor, line);
    *cursor += line.len();
}

/// Result of applying an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyResult {
    Continue,
    Quit,
}

/// Run the command in the command buffer and return to normal mode.
pub fn execute_command(app: &mut App) -> ApplyResult {
    let cmd = app.command_buffer.trim().to_string();
    app.command_buffer.clear();
    app.command_cursor = 0;
    app.mode = Mode::Normal;

    let (command, args) = match cmd.split_once(' ') {
        Some((command, args)) => (command, args.trim()),
        None => (cmd.as_str(), ""),
    };

    match command {
        "" => {}
        "q" => {
            if app.sheet.modified {
                app.status_message =
                    "Unsaved changes! Use :w to save or :q! to force quit".to_string();
            } else {
                return ApplyResult::Quit;
            }
        }
        "q!" => return ApplyResult::Quit,
        "w" | "save" => app.dispatch(Action::Save),
        "models" => app.show_models = !app.show_models,
        "reload" => {
            app.show_models = true;
            app.dispatch(Action::ReloadModels);
        }
        "goto" | "g" => {
            if args.is_empty() {
                app.status_message = "Usage: :goto CELL (e.g., :goto A10)".to_string();
            } else {
                app.goto_cell(args);
            }
        }
        "name" => rename_command(app, args),
        "model" => match parse_new_model(args) {
            Ok(model) => {
                app.status_message = format!("Creating model {}...", model.name);
                app.dispatch(Action::CreateModel(model));
            }
            Err(msg) => app.status_message = msg,
        },
        other => app.status_message = format!("Unknown command: {}", other),
    }
    ApplyResult::Continue
}

/// `:name B Price` renames column B; `:name B` restores the letter.
fn rename_command(app: &mut App, args: &str) {
    let (letter, name) = match args.split_once(' ') {
        Some((letter, name)) => (letter, name.trim()),
        None => (args, ""),
    };
    let letter = letter.to_ascii_uppercase();
    match CellRef::letter_to_col(&letter, app.sheet.size) {
        Some(col) => app.dispatch(Action::RenameColumn {
            col,
            name: name.to_string(),
        }),
        None if letter.is_empty() => {
            app.status_message = "Usage: :name <COL> [display name]".to_string()
        }
        None => app.status_message = format!("Unknown column: {}", letter),
    }
}

/// Parse `<name> <type> <A,B,...> <OUT>`. Column checks happen in the sheet.
pub fn parse_new_model(args: &str) -> Result<NewModel, String> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let [name, kind, inputs, output] = parts[..] else {
        return Err(MODEL_USAGE.to_string());
    };
    let model_type =
        ModelType::parse(kind).ok_or_else(|| format!("Unknown model type: {}", kind))?;
    let input_columns = inputs
        .split(',')
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .collect();
    Ok(NewModel {
        name: name.to_string(),
        model_type,
        input_columns,
        output_column: output.to_ascii_uppercase(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::tests::test_app;
    use crossterm::event::KeyEvent;
    use modelgrid_core::Effect;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn run(app: &mut App, cmd: &str) -> ApplyResult {
        app.command_buffer = cmd.to_string();
        execute_command(app)
    }

    #[test]
    fn test_text_input_is_utf8_aware() {
        let mut buffer = String::from("aé");
        let mut cursor = buffer.len();
        handle_text_input(&mut buffer, &mut cursor, key(KeyCode::Left));
        assert_eq!(cursor, 1);
        handle_text_input(&mut buffer, &mut cursor, key(KeyCode::Char('x')));
        assert_eq!(buffer, "axé");
        handle_text_input(&mut buffer, &mut cursor, key(KeyCode::Delete));
        assert_eq!(buffer, "ax");
        handle_text_input(&mut buffer, &mut cursor, key(KeyCode::Backspace));
        assert_eq!(buffer, "a");
        assert_eq!(cursor, 1);
    }

    #[test]
    fn test_quit_requires_saved_sheet() {
        let (mut app, _) = test_app();
        assert_eq!(run(&mut app, "q"), ApplyResult::Quit);

        app.dispatch(Action::EditCell {
            at: CellRef::new(0, 0),
            raw: "1".into(),
        });
        assert_eq!(run(&mut app, "q"), ApplyResult::Continue);
        assert!(app.status_message.starts_with("Unsaved changes!"));
        assert_eq!(run(&mut app, "q!"), ApplyResult::Quit);
    }

    #[test]
    fn test_write_queues_save() {
        let (mut app, _) = test_app();
        run(&mut app, "w");
        assert!(matches!(&app.take_effects()[..], [Effect::Save { .. }]));
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_name_command() {
        let (mut app, _) = test_app();
        run(&mut app, "name b Unit Price");
        assert_eq!(app.sheet.column_label(1), "Unit Price");
        run(&mut app, "name B");
        assert_eq!(app.sheet.column_label(1), "B");
        run(&mut app, "name Q Nope");
        assert_eq!(app.status_message, "Unknown column: Q");
    }

    #[test]
    fn test_parse_new_model() {
        let err = parse_new_model("Price regression a, b c").unwrap_err();
        assert_eq!(err, MODEL_USAGE);

        let model = parse_new_model("Price regression a,b c").unwrap();
        assert_eq!(model.name, "Price");
        assert_eq!(model.model_type, ModelType::Regression);
        assert_eq!(model.input_columns, vec!["A", "B"]);
        assert_eq!(model.output_column, "C");

        assert_eq!(
            parse_new_model("Churn forest A B").unwrap_err(),
            "Unknown model type: forest"
        );
    }

    #[test]
    fn test_model_command_saves_first() {
        let (mut app, _) = test_app();
        run(&mut app, "model Price regression A,B C");
        assert!(matches!(
            &app.take_effects()[..],
            [Effect::Save { follow_up: Some(m), .. }] if m.name == "Price"
        ));
    }

    #[test]
    fn test_reload_and_unknown_command() {
        let (mut app, _) = test_app();
        run(&mut app, "reload");
        assert_eq!(
            app.take_effects(),
            vec![Effect::InvalidateModels, Effect::LoadModels]
        );
        run(&mut app, "frobnicate");
        assert_eq!(app.status_message, "Unknown command: frobnicate");
    }
}
