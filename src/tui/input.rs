use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use modelgrid_core::{Action, Dispatcher, ModelBackend};
use modelgrid_engine::engine::Nav;
use ratatui::prelude::*;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use super::actions::{ApplyResult, execute_command, handle_text_input, insert_text};
use super::app::{App, Mode};
use super::ui::{self, GridHit};

/// How often the loop wakes to pick up finished requests.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn handle_mouse_event(app: &mut App, terminal_area: Rect, mouse: MouseEvent) {
    if app.mode != Mode::Normal {
        return;
    }
    let [_formula_area, body_area, _status_area] = ui::split_main_chunks(terminal_area);
    let (grid_area, _) = ui::split_body(app, body_area);
    let hit = ui::grid_hit_at(app, grid_area, mouse.column, mouse.row);

    match (mouse.kind, hit) {
        (MouseEventKind::Down(MouseButton::Left), Some(GridHit::Cell(at))) => {
            app.dispatch(Action::SelectionStart(at));
        }
        (MouseEventKind::Down(MouseButton::Left), Some(GridHit::Header(col))) => {
            app.start_rename(col);
        }
        (MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved, Some(GridHit::Cell(at))) => {
            app.dispatch(Action::SelectionExtend(at));
        }
        (MouseEventKind::Up(MouseButton::Left), _) => app.dispatch(Action::SelectionEnd),
        _ => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> ApplyResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Char('c') if ctrl => app.copy(),
        KeyCode::Char('v') if ctrl => app.paste_from_clipboard(),
        KeyCode::Char('s') if ctrl => app.dispatch(Action::Save),
        KeyCode::Char('r') if ctrl => app.start_rename(app.focus().col),
        KeyCode::Char('q') if ctrl => return ApplyResult::Quit,
        KeyCode::Char(':') => app.enter_command_mode(),
        KeyCode::F(2) => app.start_edit(None),
        KeyCode::Up => app.dispatch(Action::Navigate(Nav::Up)),
        KeyCode::Down => app.dispatch(Action::Navigate(Nav::Down)),
        KeyCode::Left => app.dispatch(Action::Navigate(Nav::Left)),
        KeyCode::Right => app.dispatch(Action::Navigate(Nav::Right)),
        KeyCode::Tab => app.dispatch(Action::Navigate(Nav::Next)),
        KeyCode::BackTab => app.dispatch(Action::Navigate(Nav::Prev)),
        KeyCode::Enter if shift => app.dispatch(Action::Navigate(Nav::Up)),
        KeyCode::Enter => app.dispatch(Action::Navigate(Nav::Down)),
        KeyCode::Delete | KeyCode::Backspace => app.clear_focused_cell(),
        KeyCode::Esc => {
            let at = app.focus();
            app.status_message.clear();
            app.dispatch(Action::Focus(at));
        }
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.start_edit(Some(c));
        }
        _ => {}
    }
    ApplyResult::Continue
}

fn handle_edit_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => app.commit_edit(Nav::Up),
        KeyCode::Enter => app.commit_edit(Nav::Down),
        KeyCode::Tab => app.commit_edit(Nav::Next),
        KeyCode::BackTab => app.commit_edit(Nav::Prev),
        KeyCode::Esc => app.cancel_edit(),
        _ => handle_text_input(&mut app.edit_buffer, &mut app.edit_cursor, key),
    }
}

fn handle_rename_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.commit_rename(),
        KeyCode::Esc => app.cancel_edit(),
        _ => handle_text_input(&mut app.edit_buffer, &mut app.edit_cursor, key),
    }
}

fn handle_command_key(app: &mut App, key: KeyEvent) -> ApplyResult {
    match key.code {
        KeyCode::Enter => return execute_command(app),
        KeyCode::Esc => {
            app.command_buffer.clear();
            app.command_cursor = 0;
            app.mode = Mode::Normal;
        }
        KeyCode::Backspace if app.command_buffer.is_empty() => app.mode = Mode::Normal,
        _ => handle_text_input(&mut app.command_buffer, &mut app.command_cursor, key),
    }
    ApplyResult::Continue
}

pub(crate) fn handle_key(app: &mut App, key: KeyEvent) -> ApplyResult {
    // Only process key press events (Windows reports Press + Release)
    if key.kind != KeyEventKind::Press {
        return ApplyResult::Continue;
    }
    match app.mode {
        Mode::Normal => return handle_normal_key(app, key),
        Mode::Edit => handle_edit_key(app, key),
        Mode::Rename(_) => handle_rename_key(app, key),
        Mode::Command => return handle_command_key(app, key),
    }
    ApplyResult::Continue
}

fn handle_paste(app: &mut App, text: String) {
    match app.mode {
        Mode::Normal => app.dispatch(Action::Paste(text)),
        Mode::Edit | Mode::Rename(_) => {
            insert_text(&mut app.edit_buffer, &mut app.edit_cursor, &text)
        }
        Mode::Command => insert_text(&mut app.command_buffer, &mut app.command_cursor, &text),
    }
}

pub fn run_app<T: Backend, B: ModelBackend>(
    terminal: &mut Terminal<T>,
    app: &mut App,
    dispatcher: &Dispatcher<B>,
    completions: &mut UnboundedReceiver<Action>,
) -> io::Result<()> {
    loop {
        while let Ok(action) = completions.try_recv() {
            app.dispatch(action);
        }
        for effect in app.take_effects() {
            dispatcher.spawn(effect);
        }
        app.expire_notice();

        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                if handle_key(app, key) == ApplyResult::Quit {
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => {
                let size = terminal.size()?;
                let terminal_area = Rect::new(0, 0, size.width, size.height);
                handle_mouse_event(app, terminal_area, mouse);
            }
            Event::Paste(text) => handle_paste(app, text),
            _ => {}
        }
    }
}
