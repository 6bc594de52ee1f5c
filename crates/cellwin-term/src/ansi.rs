// SPDX-License-Identifier: MIT
//
// ANSI escape sequence builders.
//
// Stateless writers for every terminal command cellwin emits. Deciding
// WHEN to emit (only on attribute change) belongs to the renderer; this
// module only knows the bytes.
//
// Cursor positions are 0-indexed here and converted to the 1-indexed
// coordinates the terminal expects.
//
// Every function writes into an `impl Write`. Writing into a `Vec<u8>`
// cannot fail, so the renderer discards the `io::Result` there.

use std::io::{self, Write};

use crate::color::{Color, Style};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to column `x`, row `y` (CUP).
#[inline]
pub fn move_cursor(w: &mut impl Write, x: usize, y: usize) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Move the cursor to the top-left corner.
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Ask the terminal to report the cursor position (DSR 6).
///
/// The reply arrives on stdin as `ESC [ row ; col R`.
#[inline]
pub fn request_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the visible screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Clear the scrollback buffer (ED 3).
#[inline]
pub fn clear_scrollback(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[3J")
}

/// Save the cursor (DECSC) and switch to the alternate screen.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b7\x1b[?1049h")
}

/// Leave the alternate screen and restore the cursor (DECRC).
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l\x1b8")
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// Reset every SGR attribute (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Select a foreground color.
#[inline]
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    w.write_all(color.render_fg().as_bytes())
}

/// Select a background color.
#[inline]
pub fn bg(w: &mut impl Write, color: Color) -> io::Result<()> {
    w.write_all(color.render_bg().as_bytes())
}

/// Select a text style.
#[inline]
pub fn style(w: &mut impl Write, style: Style) -> io::Result<()> {
    w.write_all(style.render().as_bytes())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
