//! Application state and logic.
//!
//! [`App`] wraps the UI-agnostic [`Sheet`] with what only the terminal needs:
//! the modal editing buffers, the viewport, transient notices and the
//! clipboard. Every change to the sheet goes through [`App::dispatch`]; the
//! backend effects it produces are queued for the event loop to spawn.

use std::time::{Duration, Instant};

use modelgrid_core::backend::SheetSnapshot;
use modelgrid_core::{Action, CellRef, Effect, Notice, NoticeKind, Sheet};
use modelgrid_engine::engine::Nav;
use tracing::debug;

use super::clipboard::ClipboardProvider;

/// How long a save/create notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Modal editing state for the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Navigate the grid and select with the mouse.
    Normal,
    /// Edit the contents of the focused cell.
    Edit,
    /// Enter ex-style commands (`:w`, `:model`, ...).
    Command,
    /// Rename the header of the given column.
    Rename(usize),
}

pub struct App {
    pub sheet: Sheet,
    /// Sheet being edited, used to label models trained elsewhere
    pub sheet_id: String,
    pub mode: Mode,
    /// Edit buffer for cell editing and header renames
    pub edit_buffer: String,
    /// Cursor position within edit buffer (byte offset)
    pub edit_cursor: usize,
    pub command_buffer: String,
    pub command_cursor: usize,
    pub viewport_col: usize,
    pub viewport_row: usize,
    pub visible_cols: usize,
    pub visible_rows: usize,
    pub col_width: usize,
    /// Whether the model list panel is shown
    pub show_models: bool,
    /// Persistent status line text (command feedback)
    pub status_message: String,
    notice: Option<(Notice, Instant)>,
    /// Backend effects waiting to be spawned
    outbox: Vec<Effect>,
    clipboard: Box<dyn ClipboardProvider>,
}

impl App {
    pub fn new(sheet: Sheet, sheet_id: String, clipboard: Box<dyn ClipboardProvider>) -> Self {
        App {
            sheet,
            sheet_id,
            mode: Mode::Normal,
            edit_buffer: String::new(),
            edit_cursor: 0,
            command_buffer: String::new(),
            command_cursor: 0,
            viewport_col: 0,
            viewport_row: 0,
            visible_cols: 8,
            visible_rows: 20,
            col_width: 12,
            show_models: true,
            status_message: String::new(),
            notice: None,
            outbox: Vec::new(),
            clipboard,
        }
    }

    /// Populate the sheet and queue the start-up evaluations and model list.
    pub fn load(&mut self, snapshot: SheetSnapshot) {
        let effects = self.sheet.load(snapshot);
        self.route(effects);
    }

    /// Apply an action to the sheet and carry out the local effects.
    pub fn dispatch(&mut self, action: Action) {
        let effects = self.sheet.apply(action);
        self.route(effects);
        self.update_viewport();
    }

    fn route(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::WriteClipboard(text) => {
                    let cells = text.split('\n').map(|l| l.split('\t').count()).sum::<usize>();
                    self.status_message = if self.clipboard.set_text(text) {
                        format!("Copied {} cells", cells)
                    } else {
                        "Error: clipboard unavailable".to_string()
                    };
                }
                Effect::Notify(notice) => {
                    debug!(text = %notice.text, "notice");
                    self.notice = Some((notice, Instant::now()));
                }
                other => self.outbox.push(other),
            }
        }
    }

    /// Backend effects queued since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.outbox)
    }

    pub fn focus(&self) -> CellRef {
        self.sheet.focus
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice
            .as_ref()
            .filter(|(_, shown)| shown.elapsed() < NOTICE_TTL)
            .map(|(n, _)| n)
    }

    pub fn expire_notice(&mut self) {
        if self.notice.is_some() && self.notice().is_none() {
            self.notice = None;
        }
    }

    pub fn update_viewport(&mut self) {
        let focus = self.focus();
        if focus.col < self.viewport_col {
            self.viewport_col = focus.col;
        } else if focus.col >= self.viewport_col + self.visible_cols {
            self.viewport_col = focus.col + 1 - self.visible_cols;
        }

        if focus.row < self.viewport_row {
            self.viewport_row = focus.row;
        } else if focus.row >= self.viewport_row + self.visible_rows {
            self.viewport_row = focus.row + 1 - self.visible_rows;
        }
    }

    /// Enter edit mode for the focused cell. With `first`, typing replaces
    /// the cell contents; otherwise the raw value is edited in place.
    pub fn start_edit(&mut self, first: Option<char>) {
        self.edit_buffer = match first {
            Some(c) => c.to_string(),
            None => self.sheet.raw(&self.focus()),
        };
        self.edit_cursor = self.edit_buffer.len();
        self.mode = Mode::Edit;
    }

    /// Write the edit buffer to the focused cell, then move.
    pub fn commit_edit(&mut self, then: Nav) {
        let raw = std::mem::take(&mut self.edit_buffer);
        self.edit_cursor = 0;
        self.mode = Mode::Normal;
        let at = self.focus();
        self.dispatch(Action::EditCell { at, raw });
        self.dispatch(Action::Navigate(then));
    }

    pub fn cancel_edit(&mut self) {
        self.edit_buffer.clear();
        self.edit_cursor = 0;
        self.mode = Mode::Normal;
    }

    pub fn clear_focused_cell(&mut self) {
        let at = self.focus();
        self.dispatch(Action::EditCell {
            at,
            raw: String::new(),
        });
    }

    /// Start renaming the header of the focused column.
    pub fn start_rename(&mut self, col: usize) {
        if col >= self.sheet.size.cols {
            return;
        }
        self.edit_buffer = self
            .sheet
            .column_names
            .get(&CellRef::col_to_letters(col))
            .cloned()
            .unwrap_or_default();
        self.edit_cursor = self.edit_buffer.len();
        self.mode = Mode::Rename(col);
    }

    pub fn commit_rename(&mut self) {
        if let Mode::Rename(col) = self.mode {
            let name = std::mem::take(&mut self.edit_buffer);
            self.dispatch(Action::RenameColumn { col, name });
        }
        self.cancel_edit();
    }

    pub fn enter_command_mode(&mut self) {
        self.command_buffer.clear();
        self.command_cursor = 0;
        self.mode = Mode::Command;
    }

    pub fn copy(&mut self) {
        if self.sheet.selection.bounds().is_none() {
            return;
        }
        self.dispatch(Action::Copy);
    }

    pub fn paste_from_clipboard(&mut self) {
        match self.clipboard.get_text() {
            Some(text) => self.dispatch(Action::Paste(text)),
            None => self.status_message = "Clipboard is empty".to_string(),
        }
    }

    /// Focus a cell given in A1 form.
    pub fn goto_cell(&mut self, token: &str) {
        match CellRef::parse(&token.trim().to_ascii_uppercase(), self.sheet.size) {
            Some(at) => self.dispatch(Action::Focus(at)),
            None => self.status_message = format!("Invalid cell reference: {}", token.trim()),
        }
    }

    /// Text for the status bar: an unexpired notice wins over the status message.
    pub fn status_line(&self) -> (String, Option<NoticeKind>) {
        match self.notice() {
            Some(n) => (n.text.clone(), Some(n.kind)),
            None => (self.status_message.clone(), None),
        }
    }
}
