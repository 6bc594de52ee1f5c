// SPDX-License-Identifier: MIT
//
// Window options — the knobs a window is created with.
//
// Everything here can also be changed later through `Window` setters; the
// struct exists so the defaults can live in one place and be loaded from
// a config file:
//
// ```toml
// [window]
// tabsize = 8
// wordwrap = true
// wrap_after = "-.,;:/\\)]}"
// fg = "bright_white"
// bg = [30, 30, 46]
// ```

use cellwin_term::color::{Color, Style};
use serde::{Deserialize, Serialize};

/// Default tab stop distance.
pub const DEFAULT_TABSIZE: usize = 4;

// ─── Word Wrap ───────────────────────────────────────────────────────────────

/// Where word-wrapped text may be broken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapPolicy {
    /// A line may break after whitespace or any of these characters.
    pub wrap_after: String,
    /// A line may break before any of these characters.
    pub wrap_before: String,
    /// When a word exactly fills the line and is followed by whitespace,
    /// drop that one whitespace instead of carrying it to the next line.
    pub skip_whitespace_at_eol: bool,
}

impl Default for WrapPolicy {
    fn default() -> Self {
        Self {
            wrap_after: "-.,;:/\\)]}".to_owned(),
            wrap_before: "([{".to_owned(),
            skip_whitespace_at_eol: true,
        }
    }
}

impl WrapPolicy {
    #[inline]
    #[must_use]
    pub fn breaks_after(&self, ch: char) -> bool {
        ch.is_whitespace() || self.wrap_after.contains(ch)
    }

    #[inline]
    #[must_use]
    pub fn breaks_before(&self, ch: char) -> bool {
        self.wrap_before.contains(ch)
    }
}

// ─── Window Options ──────────────────────────────────────────────────────────

/// Initial settings for a [`Window`](crate::window::Window).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    pub tabsize: usize,
    /// Whether `Window::write` word-wraps.
    pub wordwrap: bool,
    #[serde(flatten)]
    pub wrap: WrapPolicy,
    /// Colors and style that `Unspecified` cells resolve to.
    pub fg: Color,
    pub bg: Color,
    pub style: Style,
    pub cursor_visible: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            tabsize: DEFAULT_TABSIZE,
            wordwrap: false,
            wrap: WrapPolicy::default(),
            fg: Color::RESET,
            bg: Color::RESET,
            style: Style::Reset,
            cursor_visible: true,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
