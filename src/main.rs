// SPDX-License-Identifier: MIT
//
// cellwin — demo binary for the window toolkit.
//
// Two modes share one configuration file and one log file:
//
//   window → interactive child-window demo (the default)
//   keys   → prints the raw codepoints of each key press and its decoding
//
// Usage:
//
//   cellwin [window|keys] [--config PATH]
//
// Logs go to a file, never to the terminal being drawn. `RUST_LOG`
// overrides the level from the config.

mod config;
mod demo;
mod keys;

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, LogConfig};

const USAGE: &str = "\
usage: cellwin [window|keys] [--config PATH]

  window         interactive child-window demo (default)
  keys           print how each key press is decoded
  --config PATH  read configuration from PATH
  -h, --help     show this help";

// ─── Arguments ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Window,
    Keys,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    mode: Mode,
    config: Option<PathBuf>,
    help: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut mode_seen = false;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => parsed.help = true,
            "--config" => {
                let Some(path) = args.next() else {
                    bail!("--config needs a path");
                };
                parsed.config = Some(PathBuf::from(path));
            }
            "window" | "keys" if !mode_seen => {
                parsed.mode = if arg == "keys" { Mode::Keys } else { Mode::Window };
                mode_seen = true;
            }
            _ => bail!("unexpected argument '{arg}'"),
        }
    }
    Ok(parsed)
}

// ─── Logging ─────────────────────────────────────────────────────────────────

fn init_logging(log: &LogConfig) -> Result<()> {
    let path = log.path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&log.level)
            .with_context(|| format!("invalid log level '{}'", log.level))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init()
        .context("cannot install the log subscriber")?;
    Ok(())
}

// ─── Entry Point ─────────────────────────────────────────────────────────────

fn run() -> Result<()> {
    let args = parse_args(env::args().skip(1)).with_context(|| format!("\n{USAGE}"))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = Config::load(args.config.as_deref())?;
    init_logging(&config.log)?;
    info!(mode = ?args.mode, "cellwin starting");

    match args.mode {
        Mode::Window => demo::run(&config),
        Mode::Keys => keys::run(&config),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("cellwin: {e:#}");
        process::exit(1);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
