//! Configuration file and command-line overrides.
//!
//! Settings are read from `config.toml` in the user's config directory (or
//! the file given with `--config`). Command-line flags take precedence.

use directories::ProjectDirs;
use modelgrid_engine::engine::{GridSize, MAX_COLS};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

const MAX_CONFIG_FILE_BYTES: u64 = 65_536;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root URL of the backend serving `/ml/*` and `/spreadsheet/*`
    pub base_url: String,
    /// Identifier of the sheet being edited
    pub sheet_id: String,
    pub rows: usize,
    pub cols: usize,
    /// Where tracing output goes while the terminal UI owns the screen
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let size = GridSize::default();
        Config {
            base_url: "http://127.0.0.1:5000".to_string(),
            sheet_id: "1".to_string(),
            rows: size.rows,
            cols: size.cols,
            log_file: None,
        }
    }
}

/// Values given on the command line.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub sheet_id: Option<String>,
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load `path`, or the default config file when `path` is None.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Config::default()),
            },
        };
        if !path.exists() {
            if explicit {
                return Err(ConfigError::NotFound(path));
            }
            return Ok(Config::default());
        }

        let size = std::fs::metadata(&path)?.len();
        if size > MAX_CONFIG_FILE_BYTES {
            return Err(ConfigError::TooLarge {
                path,
                size,
                max: MAX_CONFIG_FILE_BYTES,
            });
        }
        let content = std::fs::read_to_string(&path)?;
        Config::from_toml(&content).map_err(|message| ConfigError::Parse { path, message })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Config, String> {
        toml::from_str::<Config>(content).map_err(|e| e.to_string())
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Config {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(sheet_id) = overrides.sheet_id {
            self.sheet_id = sheet_id;
        }
        if let Some(rows) = overrides.rows {
            self.rows = rows;
        }
        if let Some(cols) = overrides.cols {
            self.cols = cols;
        }
        if overrides.log_file.is_some() {
            self.log_file = overrides.log_file;
        }
        self
    }

    pub fn grid_size(&self) -> Result<GridSize> {
        if self.rows == 0 {
            return Err(ConfigError::GridSize("rows must be at least 1".to_string()));
        }
        if self.cols == 0 || self.cols > MAX_COLS {
            return Err(ConfigError::GridSize(format!(
                "cols must be between 1 and {}, got {}",
                MAX_COLS, self.cols
            )));
        }
        Ok(GridSize::new(self.rows, self.cols))
    }

    /// Log file location: configured, else the platform data dir, else the
    /// system temp dir.
    pub fn log_path(&self) -> PathBuf {
        if let Some(path) = &self.log_file {
            return path.clone();
        }
        match ProjectDirs::from("", "", "modelgrid") {
            Some(proj) => proj.data_local_dir().join("modelgrid.log"),
            None => std::env::temp_dir().join("modelgrid.log"),
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "modelgrid")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
