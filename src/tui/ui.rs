//! UI rendering

use super::app::{App, Mode};
use modelgrid_core::backend::{ModelDescriptor, ModelType};
use modelgrid_core::document::ModelList;
use modelgrid_core::{CellRef, NoticeKind};
use modelgrid_engine::engine::CellState;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

pub(crate) const FORMULA_BAR_HEIGHT: u16 = 3;
pub(crate) const GRID_MIN_HEIGHT: u16 = 10;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const ROW_HEADER_WIDTH: u16 = 4;
pub(crate) const GRID_COLUMN_SPACING: u16 = 1;
pub(crate) const MODELS_PANEL_PERCENT: u16 = 35;

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FORMULA_BAR_HEIGHT),
            Constraint::Min(GRID_MIN_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Split the middle area into the grid and, when shown, the model panel.
pub(crate) fn split_body(app: &App, area: Rect) -> (Rect, Option<Rect>) {
    if !app.show_models {
        return (area, None);
    }
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(100 - MODELS_PANEL_PERCENT),
            Constraint::Percentage(MODELS_PANEL_PERCENT),
        ])
        .split(area);
    (chunks[0], Some(chunks[1]))
}

/// What a mouse position in the grid area points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GridHit {
    Cell(CellRef),
    Header(usize),
}

/// Column under `mouse_col`, given the x where the first data column starts.
fn column_at(app: &App, first_x: u16, inner_right: u16, mouse_col: u16) -> Option<usize> {
    let mut x = first_x;
    for offset in 0..app.visible_cols {
        let col = app.viewport_col + offset;
        if col >= app.sheet.size.cols {
            break;
        }

        let cell_end = x.saturating_add(app.col_width as u16);
        if mouse_col >= x && mouse_col < cell_end && mouse_col < inner_right {
            return Some(col);
        }

        x = cell_end.saturating_add(GRID_COLUMN_SPACING);
        if mouse_col < x || x >= inner_right {
            break;
        }
    }
    None
}

pub(crate) fn grid_hit_at(
    app: &App,
    grid_area: Rect,
    mouse_col: u16,
    mouse_row: u16,
) -> Option<GridHit> {
    if grid_area.width < 3 || grid_area.height < 4 {
        return None;
    }

    let inner_x = grid_area.x.saturating_add(1);
    let inner_y = grid_area.y.saturating_add(1);
    let inner_right = inner_x.saturating_add(grid_area.width.saturating_sub(2));
    let inner_bottom = inner_y.saturating_add(grid_area.height.saturating_sub(2));

    if mouse_col < inner_x
        || mouse_col >= inner_right
        || mouse_row < inner_y
        || mouse_row >= inner_bottom
    {
        return None;
    }

    let first_x = inner_x
        .saturating_add(ROW_HEADER_WIDTH)
        .saturating_add(GRID_COLUMN_SPACING);
    if mouse_col < first_x {
        return None;
    }
    let col = column_at(app, first_x, inner_right, mouse_col)?;

    if mouse_row == inner_y {
        return Some(GridHit::Header(col));
    }

    let rel_row = mouse_row.saturating_sub(inner_y.saturating_add(1)) as usize;
    if rel_row >= app.visible_rows {
        return None;
    }
    let row = app.viewport_row.saturating_add(rel_row);
    if row >= app.sheet.size.rows {
        return None;
    }
    Some(GridHit::Cell(CellRef::new(col, row)))
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &mut App) {
    let [formula_area, body_area, status_area] = split_main_chunks(f.area());
    let (grid_area, models_area) = split_body(app, body_area);

    // Update visible dimensions based on actual size
    let available_width = grid_area.width.saturating_sub(ROW_HEADER_WIDTH + 2) as usize;
    let available_height = grid_area.height.saturating_sub(3) as usize; // header + borders
    app.visible_cols = (available_width / (app.col_width + 1)).max(1);
    app.visible_rows = available_height.max(1);
    app.update_viewport();

    draw_formula_bar(f, app, formula_area);
    draw_grid(f, app, grid_area);
    if let Some(area) = models_area {
        draw_models(f, app, area);
    }
    draw_status_bar(f, app, status_area);
}

fn draw_formula_bar(f: &mut Frame, app: &App, area: Rect) {
    let focus = app.focus();
    let cell_name = focus.to_string();

    let line = match app.mode {
        Mode::Edit => {
            let (before, after) = app.edit_buffer.split_at(app.edit_cursor);
            Line::from(format!("{}: {}│{}", cell_name, before, after))
        }
        Mode::Command => {
            let (before, after) = app.command_buffer.split_at(app.command_cursor);
            Line::from(format!(":{}│{}", before, after))
        }
        Mode::Rename(col) => {
            let (before, after) = app.edit_buffer.split_at(app.edit_cursor);
            Line::from(format!(
                "Column {}: {}│{}",
                CellRef::col_to_letters(col),
                before,
                after
            ))
        }
        Mode::Normal => {
            let mut spans = vec![Span::raw(match app.sheet.selection.bounds() {
                Some(b) if b.cell_count() > 1 => format!("{} ({})", cell_name, b.label()),
                _ => cell_name,
            })];
            match app.sheet.cell(&focus) {
                Some(cell) => {
                    spans.push(Span::raw(format!(": {}", cell.raw)));
                    if let Some(tip) = cell.tooltip() {
                        let style = match cell.state {
                            CellState::Error(_) => Style::default().fg(Color::Red),
                            _ => Style::default().fg(Color::DarkGray),
                        };
                        spans.push(Span::styled(format!("   {}", tip), style));
                    }
                }
                None => spans.push(Span::raw(": (empty)")),
            }
            Line::from(spans)
        }
    };

    let (title, color) = match app.mode {
        Mode::Edit => (" Edit ", Color::Yellow),
        Mode::Command => (" Command ", Color::Cyan),
        Mode::Rename(_) => (" Rename column ", Color::Magenta),
        Mode::Normal => (" Cell ", Color::White),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color));

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn header_text(app: &App, col: usize) -> String {
    let label = app.sheet.column_label(col);
    match app.sheet.column_type(col) {
        Some(ty) => format!("{} ({})", label, ty),
        None => label,
    }
}

fn draw_grid(f: &mut Frame, app: &App, area: Rect) {
    let size = app.sheet.size;
    let focus = app.focus();
    let cols: Vec<usize> = (app.viewport_col..app.viewport_col + app.visible_cols)
        .take_while(|&c| c < size.cols)
        .collect();

    let mut header_cells = vec![Cell::from(" ")]; // Corner
    for &col in &cols {
        let style = if col == focus.col {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else if matches!(app.mode, Mode::Rename(c) if c == col) {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        header_cells.push(Cell::from(header_text(app, col)).style(style));
    }
    let header = Row::new(header_cells).height(1);

    let mut rows = Vec::new();
    for row in app.viewport_row..app.viewport_row + app.visible_rows {
        if row >= size.rows {
            break;
        }

        let row_style = if row == focus.row {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut cells = vec![Cell::from(format!("{}", row + 1)).style(row_style)];

        for &col in &cols {
            let at = CellRef::new(col, row);
            let (display, state_style) = match app.sheet.cell(&at) {
                Some(cell) => match &cell.state {
                    CellState::Error(_) => (
                        format!("!{}", cell.raw),
                        Style::default().fg(Color::Red),
                    ),
                    CellState::Evaluated(_) => (
                        cell.display().to_string(),
                        Style::default().fg(Color::Green),
                    ),
                    CellState::Pending => (
                        cell.raw.clone(),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::ITALIC),
                    ),
                    CellState::Literal => (cell.raw.clone(), Style::default()),
                },
                None => (String::new(), Style::default()),
            };

            let style = if at == focus {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else if app.sheet.selection.contains(&at) {
                state_style.bg(Color::Blue)
            } else {
                state_style
            };

            cells.push(Cell::from(display).style(style));
        }

        rows.push(Row::new(cells));
    }

    let mut widths = vec![Constraint::Length(ROW_HEADER_WIDTH)];
    widths.extend(cols.iter().map(|_| Constraint::Length(app.col_width as u16)));

    let title = if app.sheet.modified {
        " Modelgrid [+] "
    } else {
        " Modelgrid "
    };
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(GRID_COLUMN_SPACING);

    f.render_widget(table, area);
}

fn column_line(model: &ModelDescriptor, column: &str) -> String {
    match model.source_column_types.get(column) {
        Some(ty) => format!("    {} [{}]", model.column_label(column), ty),
        None => format!("    {}", model.column_label(column)),
    }
}

fn metric_line(name: &str, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("  {}: {:.4}", name, v),
        None => format!("  {}: n/a", name),
    }
}

/// Lines describing one model, in list order.
pub(crate) fn model_lines(model: &ModelDescriptor, sheet_id: &str) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        model.name.clone(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))];
    if let Some(source) = &model.source_spreadsheet {
        if source.id.to_string() != sheet_id {
            lines.push(Line::from(Span::styled(
                format!("  Trained on spreadsheet: {}", source.name),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines.push(Line::from(format!("  Type: {}", model.model_type)));
    lines.push(Line::from("  Input Columns:"));
    for column in &model.input_columns {
        lines.push(Line::from(column_line(model, column)));
    }
    lines.push(Line::from("  Output Column:"));
    lines.push(Line::from(column_line(model, &model.output_column)));
    match model.model_type {
        ModelType::Regression => {
            lines.push(Line::from(metric_line("R² Score", model.metric("r2"))));
            lines.push(Line::from(metric_line(
                "Mean Squared Error",
                model.metric("mse"),
            )));
        }
        ModelType::Classification => {
            lines.push(Line::from(metric_line("Accuracy", model.metric("accuracy"))));
        }
    }
    lines.push(Line::from(vec![
        Span::raw("  Usage: "),
        Span::styled(model.usage_example(), Style::default().fg(Color::Green)),
    ]));
    lines
}

fn draw_models(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = match &app.sheet.models {
        ModelList::NotLoaded | ModelList::Loading => vec![Line::from("Loading models...")],
        ModelList::Failed(_) => vec![Line::from(Span::styled(
            "Error loading models.",
            Style::default().fg(Color::Red),
        ))],
        ModelList::Loaded(models) if models.is_empty() => {
            vec![Line::from("No models created yet.")]
        }
        ModelList::Loaded(models) => {
            let mut lines = Vec::new();
            for (i, model) in models.iter().enumerate() {
                if i > 0 {
                    lines.push(Line::from(""));
                }
                lines.extend(model_lines(model, &app.sheet_id));
            }
            lines
        }
    };

    let block = Block::default().borders(Borders::ALL).title(" Models ");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, kind) = app.status_line();
    let hint = ":w save  :model create  :models panel  :q quit";
    let (text, style) = match kind {
        Some(NoticeKind::Success) => (text, Style::default().fg(Color::Black).bg(Color::Green)),
        Some(NoticeKind::Error) => (text, Style::default().fg(Color::White).bg(Color::Red)),
        None if text.starts_with("Error") || text.starts_with("Unknown") => {
            (text, Style::default().fg(Color::Red))
        }
        None if !text.is_empty() => (text, Style::default().fg(Color::Yellow)),
        None => (hint.to_string(), Style::default().fg(Color::DarkGray)),
    };

    let mut spans = vec![Span::styled(text, style)];
    if app.sheet.saving {
        spans.push(Span::styled("  saving...", Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
