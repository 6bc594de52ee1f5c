// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, screen setup, raw reads and RAII cleanup.
//
// Safety: termios (tcgetattr, tcsetattr), ioctl (TIOCGWINSZ), isatty,
// poll and raw fd reads/writes are the POSIX interfaces for terminal
// control and need `unsafe`. Each block is kept to the single call.
#![allow(unsafe_code)]
//
// `Terminal` owns the tty state for the lifetime of the program. Setup is
// driven by `TerminalOptions`:
//
//   clear_screen    switch to the alternate screen, clear it, home the
//                   cursor. Undone on drop.
//   raw_input       put stdin in raw mode (no echo, no line buffering).
//   disable_ctrl_c  in raw mode, also turn off ISIG so Ctrl+C arrives as
//                   the byte 0x03 instead of SIGINT.
//   nonblocking     `read_raw` returns immediately when nothing is
//                   pending. Without it only the first codepoint of a
//                   key waits; the rest of an escape sequence is read
//                   with a short timeout either way.
//
// Output post-processing (OPOST) stays on, so a lone `\n` written by a
// panic message still returns the carriage.
//
// The panic hook writes a pre-built restore sequence straight to fd 1,
// bypassing the stdout lock (the panic may have happened while holding
// it), restores termios from a global backup, then hands over to the
// previous hook so the message lands on a working terminal.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ansi;
use crate::error::{Error, Result};
use crate::input::RawInput;

/// Longest cursor-position report we are willing to read.
const MAX_REPORT_LEN: usize = 64;

/// Shortest well-formed report: `ESC [ r ; c R`.
const MIN_REPORT_LEN: usize = 6;

/// How long to wait for the rest of a multi-byte UTF-8 character.
const CONTINUATION_TIMEOUT_MS: i32 = 10;

// ─── Options ─────────────────────────────────────────────────────────────────

/// How [`Terminal::new`] sets up the tty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalOptions {
    pub clear_screen: bool,
    pub raw_input: bool,
    pub disable_ctrl_c: bool,
    pub nonblocking: bool,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            clear_screen: true,
            raw_input: true,
            disable_ctrl_c: true,
            nonblocking: true,
        }
    }
}

// ─── Terminal Queries ────────────────────────────────────────────────────────

/// Query the terminal size as `(cols, rows)` via `ioctl(TIOCGWINSZ)`.
///
/// `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<(usize, usize)> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some((usize::from(ws.ws_col), usize::from(ws.ws_row)))
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<(usize, usize)> {
    None
}

/// Whether stdin is connected to a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

/// Parse a cursor-position report `ESC [ row ; col R` into a 0-based
/// `(col, row)`.
///
/// Anything before the last `ESC [` is skipped, so keys that were typed
/// while the reply was in flight do not break parsing. Row and column are
/// 1-based on the wire; a zero is malformed.
///
/// # Errors
///
/// [`Error::Parse`] if the report is truncated or malformed.
pub fn parse_cursor_position_report(report: &str) -> Result<(usize, usize)> {
    if report.len() < MIN_REPORT_LEN {
        return Err(Error::Parse(format!("cursor report too short: {report:?}")));
    }
    let start = report
        .rfind("\x1b[")
        .ok_or_else(|| Error::Parse(format!("cursor report without CSI: {report:?}")))?;
    let body = report[start + 2..]
        .strip_suffix('R')
        .ok_or_else(|| Error::Parse(format!("cursor report not terminated: {report:?}")))?;
    let (row, col) = body
        .split_once(';')
        .ok_or_else(|| Error::Parse(format!("cursor report missing ';': {report:?}")))?;

    let number = |s: &str| {
        s.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(|| Error::Parse(format!("bad number {s:?} in cursor report")))
    };
    Ok((number(col)?, number(row)?))
}

// ─── Panic-Safe Terminal Restore ─────────────────────────────────────────────

/// Original termios, kept where the panic hook can reach it.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Whether the alternate screen is active, for the panic hook.
static ALT_SCREEN_ACTIVE: Mutex<bool> = Mutex::new(false);

#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Reset attributes and show the cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[0m\x1b[?25h";

/// Leave the alternate screen and restore the saved cursor.
const EMERGENCY_LEAVE_ALT: &[u8] = b"\x1b[?1049l\x1b8";

static PANIC_HOOK_INSTALLED: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_write(EMERGENCY_RESTORE);
            if ALT_SCREEN_ACTIVE.lock().is_ok_and(|active| *active) {
                emergency_write(EMERGENCY_LEAVE_ALT);
            }

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write directly to stdout's file descriptor, skipping the stdout lock.
fn emergency_write(bytes: &[u8]) {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            bytes.as_ptr().cast::<libc::c_void>(),
            bytes.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(bytes);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ────────────────────────────────────────────────────────────────

/// Terminal handle. Everything set up in [`new`](Self::new) is undone on
/// drop, and by the panic hook if the program panics first.
///
/// ```no_run
/// use cellwin_term::terminal::{Terminal, TerminalOptions};
///
/// let mut term = Terminal::new(TerminalOptions::default())?;
/// term.draw(b"hello")?;
/// # Ok::<(), cellwin_term::Error>(())
/// ```
pub struct Terminal {
    options: TerminalOptions,

    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    cols: usize,
    rows: usize,
}

impl Terminal {
    /// Set up the terminal according to `options`.
    ///
    /// Falls back to 80×24 when the size cannot be queried (pipes, tests).
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if raw mode cannot be entered or the setup sequences
    /// cannot be written.
    pub fn new(options: TerminalOptions) -> Result<Self> {
        let (cols, rows) = get_size().unwrap_or((80, 24));
        let mut term = Self {
            options,
            #[cfg(unix)]
            original_termios: None,
            cols,
            rows,
        };

        install_panic_hook();

        if options.raw_input {
            term.enable_raw_mode()?;
        }

        if options.clear_screen {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            ansi::enter_alt_screen(&mut lock)?;
            ansi::clear_screen(&mut lock)?;
            ansi::clear_scrollback(&mut lock)?;
            ansi::cursor_home(&mut lock)?;
            lock.flush()?;
            if let Ok(mut active) = ALT_SCREEN_ACTIVE.lock() {
                *active = true;
            }
        }

        debug!(?options, cols, rows, "terminal set up");
        Ok(term)
    }

    /// The options the terminal was set up with.
    #[inline]
    #[must_use]
    pub const fn options(&self) -> TerminalOptions {
        self.options
    }

    /// Width in columns, as of the last size query.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.cols
    }

    /// Height in rows, as of the last size query.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.rows
    }

    /// Re-query the size. Returns `true` if it changed.
    pub fn update_size(&mut self) -> bool {
        match get_size() {
            Some((cols, rows)) if (cols, rows) != (self.cols, self.rows) => {
                debug!(cols, rows, "terminal resized");
                self.cols = cols;
                self.rows = rows;
                true
            }
            _ => false,
        }
    }

    /// Write a rendered frame to stdout and flush.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if stdout is gone.
    pub fn draw(&mut self, frame: &[u8]) -> Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        lock.write_all(frame)?;
        lock.flush()?;
        Ok(())
    }

    /// Ask the terminal where its cursor is. Returns 0-based `(col, row)`.
    ///
    /// Requires raw input; the reply is read from stdin. Keys typed while
    /// the reply is in flight are lost.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] for a missing or malformed reply, [`Error::Io`] if
    /// the request cannot be written.
    pub fn cursor_position(&mut self) -> Result<(usize, usize)> {
        {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            ansi::request_cursor_position(&mut lock)?;
            lock.flush()?;
        }

        let mut report = String::new();
        for _ in 0..MAX_REPORT_LEN {
            let Some(ch) = Self::read_char(CONTINUATION_TIMEOUT_MS * 10) else {
                break;
            };
            report.push(ch);
            if ch == 'R' {
                break;
            }
        }

        parse_cursor_position_report(&report).inspect_err(|err| {
            warn!(%err, "cursor position query failed");
        })
    }

    // ── Raw reads ───────────────────────────────────────────────────

    /// Read one byte, waiting at most `timeout_ms` (negative waits forever).
    #[cfg(unix)]
    fn read_byte(timeout_ms: i32) -> Option<u8> {
        let mut pfd = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&raw mut pfd, 1, timeout_ms) };
        if ready <= 0 || pfd.revents & libc::POLLIN == 0 {
            return None;
        }

        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast::<libc::c_void>(), 1) };
        if n == 1 {
            Some(byte)
        } else {
            if n < 0 {
                warn!(err = %io::Error::last_os_error(), "stdin read failed");
            }
            None
        }
    }

    #[cfg(not(unix))]
    fn read_byte(_timeout_ms: i32) -> Option<u8> {
        use std::io::Read;
        let mut byte = [0u8; 1];
        match io::stdin().read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    /// Read one UTF-8 encoded codepoint. Malformed input yields U+FFFD.
    fn read_char(first_timeout_ms: i32) -> Option<char> {
        let lead = Self::read_byte(first_timeout_ms)?;
        let len = utf8_len(lead);
        if len == 1 {
            return Some(char::from(lead));
        }
        if len == 0 {
            return Some(char::REPLACEMENT_CHARACTER);
        }

        let mut buf = [lead, 0, 0, 0];
        for slot in buf.iter_mut().take(len).skip(1) {
            match Self::read_byte(CONTINUATION_TIMEOUT_MS) {
                Some(byte) if byte & 0xC0 == 0x80 => *slot = byte,
                _ => return Some(char::REPLACEMENT_CHARACTER),
            }
        }
        Some(decode_utf8(&buf[..len]))
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }

        let fd = libc::STDIN_FILENO;
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            termios.c_iflag &=
                !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            termios.c_cflag |= libc::CS8;
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN);
            if self.options.disable_ctrl_c {
                termios.c_lflag &= !libc::ISIG;
            }

            termios.c_cc[libc::VMIN] = u8::from(!self.options.nonblocking);
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        debug!("raw mode enabled");
        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            unsafe {
                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            self.original_termios = None;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::reset(&mut lock)?;
        ansi::cursor_show(&mut lock)?;
        if self.options.clear_screen {
            ansi::exit_alt_screen(&mut lock)?;
            if let Ok(mut active) = ALT_SCREEN_ACTIVE.lock() {
                *active = false;
            }
        }
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()
    }
}

impl RawInput for Terminal {
    /// Next codepoint from stdin. Waits for input unless the terminal was
    /// set up non-blocking.
    fn read_raw(&mut self) -> Option<char> {
        let timeout = if self.options.nonblocking { 0 } else { -1 };
        Self::read_char(timeout)
    }

    /// Rest of an escape sequence. Waits briefly even in blocking mode, so
    /// a lone ESC comes back as ESC instead of waiting for the next key.
    fn read_continuation(&mut self) -> Option<char> {
        Self::read_char(CONTINUATION_TIMEOUT_MS)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!(%err, "terminal restore failed");
        }
    }
}

// ─── UTF-8 ───────────────────────────────────────────────────────────────────

/// Sequence length announced by a UTF-8 lead byte; 0 for invalid leads.
const fn utf8_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

fn decode_utf8(bytes: &[u8]) -> char {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.chars().next())
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
