//! Modelgrid - A spreadsheet whose formulas call trained models, with TUI

mod config;
mod error;
#[cfg(feature = "tui")]
mod tui;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use modelgrid_core::backend::SheetSnapshot;
use modelgrid_core::session::read_snapshot;
use modelgrid_core::{HttpBackend, Session, Sheet};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{Config, Overrides};

#[derive(Parser, Debug)]
#[command(name = "modelgrid", version, about)]
struct Cli {
    /// Config file (default: config.toml in the user config dir)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend root URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Sheet identifier used for listing models and saving
    #[arg(long, value_name = "ID")]
    sheet: Option<String>,

    #[arg(long)]
    rows: Option<usize>,

    #[arg(long)]
    cols: Option<usize>,

    /// Initial sheet data ({"data": {...}, "column_names": {...}})
    #[arg(long, value_name = "FILE")]
    initial: Option<PathBuf>,

    /// Evaluate one formula against the initial data, print it and exit
    #[arg(long, value_name = "FORMULA")]
    eval: Option<String>,

    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            sheet_id: self.sheet.clone(),
            rows: self.rows,
            cols: self.cols,
            log_file: self.log_file.clone(),
        }
    }
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let filter =
        EnvFilter::try_from_env("MODELGRID_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

/// Read the initial sheet. A missing or malformed file is logged and ignored.
fn load_initial(path: &Path) -> Option<SheetSnapshot> {
    match read_snapshot(path) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring initial data");
            None
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.overrides());
    let size = config.grid_size()?;
    init_logging(&config.log_path())?;
    info!(base_url = %config.base_url, sheet = %config.sheet_id, rows = size.rows, cols = size.cols, "starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let backend = HttpBackend::new(&config.base_url, config.sheet_id.clone())?;
    let mut sheet = Sheet::new(size);
    let session = Session::new(backend, sheet.grid.clone(), size);
    let initial = cli.initial.as_deref().and_then(load_initial);

    if let Some(formula) = cli.eval {
        if let Some(snapshot) = initial {
            // Only raw values are read; the other formulas are not evaluated.
            let _ = sheet.load(snapshot);
        }
        return Ok(match runtime.block_on(session.evaluate_text(&formula)) {
            Ok(evaluation) => {
                println!("{}", evaluation.display);
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("#ERR {}", e);
                ExitCode::FAILURE
            }
        });
    }

    #[cfg(feature = "tui")]
    {
        tui::run(runtime, sheet, session, config.sheet_id.clone(), initial)?;
        Ok(ExitCode::SUCCESS)
    }
    #[cfg(not(feature = "tui"))]
    {
        let _ = (sheet, session, runtime);
        anyhow::bail!("built without the terminal UI; use --eval")
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
