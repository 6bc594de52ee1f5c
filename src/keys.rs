// SPDX-License-Identifier: MIT
//
// Key printer — shows the raw codepoints of each key press and what the
// decoder makes of them. Ctrl+C twice in a row quits. On start it also
// asks the terminal where the cursor is.

use std::fmt::Write as _;
use std::io::{self, Write};

use anyhow::{Context, Result};
use cellwin_term::input::{decode_sequence, read_sequence};
use cellwin_term::key::Key;
use cellwin_term::terminal::{Terminal, TerminalOptions};
use tracing::{info, warn};

use crate::config::Config;

/// Consecutive Ctrl+C presses that end the printer.
const CTRL_C_TO_QUIT: usize = 2;

/// Describe one raw sequence: its codepoints in hex, then the decoded key.
#[must_use]
pub fn describe(seq: &[char]) -> String {
    let mut out = String::new();
    if let [ch] = seq {
        let _ = write!(out, "codepoint {:x}", u32::from(*ch));
    } else {
        out.push_str("sequence");
        for ch in seq {
            let _ = write!(out, " {:x}", u32::from(*ch));
        }
        out.push_str("  <ESC>");
        out.extend(seq.iter().skip(1));
    }
    if let Some(key) = decode_sequence(seq) {
        let _ = write!(out, "  =>  {key}");
    }
    out
}

/// The printer scrolls on the normal screen. Reads stay non-blocking;
/// `read_sequence` does the waiting.
const fn terminal_options(config: &Config) -> TerminalOptions {
    TerminalOptions {
        clear_screen: false,
        nonblocking: true,
        ..config.terminal
    }
}

pub fn run(config: &Config) -> Result<()> {
    let mut term =
        Terminal::new(terminal_options(config)).context("cannot set up the terminal")?;
    info!("key printer started");

    let mut stdout = io::stdout();
    match term.cursor_position() {
        Ok((col, row)) => write!(stdout, "cursor at column {col}, row {row}\r\n")?,
        Err(err) => warn!(%err, "cursor position unavailable"),
    }
    write!(stdout, "Press keys to see how they decode. Ctrl+C twice quits.\r\n")?;
    stdout.flush()?;

    let mut ctrl_c = 0;
    loop {
        let seq = read_sequence(&mut term);
        write!(stdout, "{}\r\n", describe(&seq))?;

        if decode_sequence(&seq) == Some(Key::ctrl('c')) {
            ctrl_c += 1;
            if ctrl_c >= CTRL_C_TO_QUIT {
                write!(stdout, "bye\r\n")?;
                stdout.flush()?;
                break;
            }
            write!(stdout, "press Ctrl+C again to quit\r\n")?;
        } else {
            ctrl_c = 0;
        }
        stdout.flush()?;
    }
    info!("key printer finished");
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
