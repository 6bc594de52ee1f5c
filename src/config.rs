// SPDX-License-Identifier: MIT
//
// Configuration — loaded from `~/.config/cellwin/config.toml`.
//
// Every section and every key is optional; anything left out keeps its
// default. A missing file at the default location means "all defaults".
// A file that exists but does not parse is an error, reported with its
// path, rather than being silently ignored.
//
// ```toml
// [terminal]
// clear_screen = true
// raw_input = true
// disable_ctrl_c = true
// nonblocking = true
//
// [window]
// tabsize = 4
// wordwrap = true
// wrap_after = "-.,;:/\\)]}"
// wrap_before = "([{"
// skip_whitespace_at_eol = true
// fg = "white"
// bg = [30, 30, 46]
//
// [log]
// file = "/tmp/cellwin.log"
// level = "debug"
// ```

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cellwin_term::terminal::TerminalOptions;
use cellwin_window::WindowOptions;
use serde::{Deserialize, Serialize};

/// Default log filter when neither the config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ─── Sections ────────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub terminal: TerminalOptions,
    pub window: WindowOptions,
    pub log: LogConfig,
}

/// Where and how much to log. Logs never go to the terminal being drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file; defaults to `cellwin.log` in the temp directory.
    pub file: Option<PathBuf>,
    /// An `EnvFilter` directive such as `debug` or `cellwin_window=trace`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: DEFAULT_LOG_LEVEL.to_owned(),
        }
    }
}

impl LogConfig {
    /// The log file to write to.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| env::temp_dir().join("cellwin.log"))
    }
}

// ─── Loading ─────────────────────────────────────────────────────────────────

impl Config {
    /// `$XDG_CONFIG_HOME/cellwin/config.toml`, falling back to
    /// `~/.config/cellwin/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        let base = env::var_os("XDG_CONFIG_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
        Some(base.join("cellwin").join("config.toml"))
    }

    /// Load from `path`, or from [`default_path`](Self::default_path) when
    /// `None`.
    ///
    /// An explicitly given file must exist. A missing default file yields
    /// the defaults.
    ///
    /// # Errors
    ///
    /// The file cannot be read or is not valid configuration TOML.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::read(path);
        }
        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };
        match Self::read(&path) {
            Err(err) if is_not_found(&err) => Ok(Self::default()),
            other => other,
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Malformed TOML, unknown value types, or a zero tab size.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config.window.tabsize == 0 {
            bail!("window.tabsize must be at least 1");
        }
        Ok(config)
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
