//! Terminal front end.

mod actions;
mod app;
mod clipboard;
mod input;
mod ui;

use std::io::{self, IsTerminal};

use anyhow::Context;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use modelgrid_core::backend::SheetSnapshot;
use modelgrid_core::{Dispatcher, ModelBackend, Session, Sheet};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing::info;

use app::App;
use clipboard::SystemClipboard;

/// Run the interactive sheet until the user quits. Backend requests run on
/// `runtime`; whatever is still in flight at exit is abandoned.
pub fn run<B: ModelBackend>(
    runtime: tokio::runtime::Runtime,
    sheet: Sheet,
    session: Session<B>,
    sheet_id: String,
    initial: Option<SheetSnapshot>,
) -> anyhow::Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("the sheet requires an interactive terminal (TTY)");
    }

    let (tx, mut completions) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(session, runtime.handle().clone(), tx);
    let mut app = App::new(sheet, sheet_id, Box::new(SystemClipboard));
    app.load(initial.unwrap_or_default());

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let res = input::run_app(&mut terminal, &mut app, &dispatcher, &mut completions);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )
    .ok();
    terminal.show_cursor().ok();

    info!(modified = app.sheet.modified, "exiting");
    runtime.shutdown_background();
    res.context("terminal I/O")
}
