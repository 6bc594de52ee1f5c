// SPDX-License-Identifier: MIT
//
// Colors and text styles as the terminal understands them.
//
// A color is either one of the 16 named SGR colors or a 24-bit RGB
// triple. Two sentinels ride along in the named set:
//
//   reset        : the terminal's own default (SGR 39 / 49)
//   unspecified  : "whatever the owning window says". Cells start out
//                  unspecified and pick up the window defaults at read
//                  time, so changing a window's default recolors every
//                  cell that never chose for itself.
//
// The same `Color` value serves as foreground or background; the layer is
// chosen when rendering (`render_fg` / `render_bg`), which is where the
// SGR codes differ (30–37 vs 40–47, 38;2 vs 48;2).

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Named Colors ────────────────────────────────────────────────────────────

/// The 16 standard terminal colors plus the `Reset` and `Unspecified`
/// sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    /// The terminal's default color.
    Reset,
    /// Inherit from the owning window.
    Unspecified,
}

impl NamedColor {
    /// SGR parameter for this color as a foreground.
    ///
    /// `Unspecified` has no SGR code of its own and maps to reset (39).
    #[must_use]
    pub const fn fg_code(self) -> u8 {
        match self {
            Self::Black => 30,
            Self::Red => 31,
            Self::Green => 32,
            Self::Yellow => 33,
            Self::Blue => 34,
            Self::Magenta => 35,
            Self::Cyan => 36,
            Self::White => 37,
            Self::Reset | Self::Unspecified => 39,
            Self::Gray => 90,
            Self::BrightRed => 91,
            Self::BrightGreen => 92,
            Self::BrightYellow => 93,
            Self::BrightBlue => 94,
            Self::BrightMagenta => 95,
            Self::BrightCyan => 96,
            Self::BrightWhite => 97,
        }
    }

    /// SGR parameter for this color as a background (foreground + 10).
    #[must_use]
    pub const fn bg_code(self) -> u8 {
        self.fg_code() + 10
    }
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// A cell color: named 8-bit SGR color or 24-bit RGB.
///
/// Equality is structural: `Named(Red)` never equals `Rgb(255, 0, 0)`.
///
/// # Examples
///
/// ```
/// use cellwin_term::color::{Color, NamedColor};
///
/// let red = Color::Named(NamedColor::Red);
/// assert_eq!(red.render_fg(), "\x1b[31m");
/// assert_eq!(Color::Rgb(1, 2, 3).render_bg(), "\x1b[48;2;1;2;3m");
/// assert!(Color::UNSPECIFIED.is_unspecified());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// One of the named SGR colors (or a sentinel).
    Named(NamedColor),
    /// 24-bit `TrueColor`.
    Rgb(u8, u8, u8),
}

impl Color {
    /// The terminal default color.
    pub const RESET: Self = Self::Named(NamedColor::Reset);

    /// Inherit from the owning window's default.
    pub const UNSPECIFIED: Self = Self::Named(NamedColor::Unspecified);

    /// Whether this is the terminal-default sentinel.
    #[inline]
    #[must_use]
    pub const fn is_reset(self) -> bool {
        matches!(self, Self::Named(NamedColor::Reset))
    }

    /// Whether this is the inherit-from-window sentinel.
    #[inline]
    #[must_use]
    pub const fn is_unspecified(self) -> bool {
        matches!(self, Self::Named(NamedColor::Unspecified))
    }

    /// Whether this is a 24-bit color.
    #[inline]
    #[must_use]
    pub const fn is_rgb(self) -> bool {
        matches!(self, Self::Rgb(..))
    }

    /// Replace `Unspecified` with `fallback`; any other color is kept.
    #[inline]
    #[must_use]
    pub const fn or(self, fallback: Self) -> Self {
        if self.is_unspecified() { fallback } else { self }
    }

    /// Escape sequence selecting this color as the foreground.
    #[must_use]
    pub fn render_fg(self) -> String {
        match self {
            Self::Named(named) => format!("\x1b[{}m", named.fg_code()),
            Self::Rgb(r, g, b) => format!("\x1b[38;2;{r};{g};{b}m"),
        }
    }

    /// Escape sequence selecting this color as the background.
    #[must_use]
    pub fn render_bg(self) -> String {
        match self {
            Self::Named(named) => format!("\x1b[{}m", named.bg_code()),
            Self::Rgb(r, g, b) => format!("\x1b[48;2;{r};{g};{b}m"),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::UNSPECIFIED
    }
}

impl From<NamedColor> for Color {
    fn from(named: NamedColor) -> Self {
        Self::Named(named)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(named) => write!(f, "{named:?}"),
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Text style of a cell. One style per cell, mapped to a single SGR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    /// SGR 0, plain text. Resets colors as well.
    Reset,
    Bold,
    Dim,
    Italic,
    Underline,
    Blink,
    BlinkRapid,
    Reversed,
    Conceal,
    Crossed,
    Overline,
    /// Inherit from the owning window.
    #[default]
    Unspecified,
}

impl Style {
    /// SGR parameter. `Unspecified` maps to reset (0).
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Reset | Self::Unspecified => 0,
            Self::Bold => 1,
            Self::Dim => 2,
            Self::Italic => 3,
            Self::Underline => 4,
            Self::Blink => 5,
            Self::BlinkRapid => 6,
            Self::Reversed => 7,
            Self::Conceal => 8,
            Self::Crossed => 9,
            Self::Overline => 53,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_reset(self) -> bool {
        matches!(self, Self::Reset)
    }

    #[inline]
    #[must_use]
    pub const fn is_unspecified(self) -> bool {
        matches!(self, Self::Unspecified)
    }

    /// Replace `Unspecified` with `fallback`.
    #[inline]
    #[must_use]
    pub const fn or(self, fallback: Self) -> Self {
        if self.is_unspecified() { fallback } else { self }
    }

    /// Escape sequence selecting this style.
    #[must_use]
    pub fn render(self) -> String {
        format!("\x1b[{}m", self.code())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Named codes ──────────────────────────────────────────────────────

    #[test]
    fn standard_colors_use_30_range() {
        assert_eq!(NamedColor::Black.fg_code(), 30);
        assert_eq!(NamedColor::White.fg_code(), 37);
        assert_eq!(NamedColor::Black.bg_code(), 40);
        assert_eq!(NamedColor::White.bg_code(), 47);
    }

    #[test]
    fn bright_colors_use_90_range() {
        assert_eq!(NamedColor::Gray.fg_code(), 90);
        assert_eq!(NamedColor::BrightWhite.fg_code(), 97);
        assert_eq!(NamedColor::Gray.bg_code(), 100);
        assert_eq!(NamedColor::BrightWhite.bg_code(), 107);
    }

    #[test]
    fn reset_codes() {
        assert_eq!(NamedColor::Reset.fg_code(), 39);
        assert_eq!(NamedColor::Reset.bg_code(), 49);
    }

    // ── Rendering ────────────────────────────────────────────────────────

    #[test]
    fn render_named() {
        assert_eq!(Color::Named(NamedColor::Green).render_fg(), "\x1b[32m");
        assert_eq!(Color::Named(NamedColor::Green).render_bg(), "\x1b[42m");
    }

    #[test]
    fn render_rgb() {
        assert_eq!(Color::Rgb(10, 20, 30).render_fg(), "\x1b[38;2;10;20;30m");
        assert_eq!(Color::Rgb(10, 20, 30).render_bg(), "\x1b[48;2;10;20;30m");
    }

    #[test]
    fn unspecified_renders_as_reset() {
        assert_eq!(Color::UNSPECIFIED.render_fg(), Color::RESET.render_fg());
        assert_eq!(Color::UNSPECIFIED.render_bg(), Color::RESET.render_bg());
    }

    // ── Sentinels ────────────────────────────────────────────────────────

    #[test]
    fn sentinel_predicates() {
        assert!(Color::RESET.is_reset());
        assert!(!Color::RESET.is_unspecified());
        assert!(Color::UNSPECIFIED.is_unspecified());
        assert!(!Color::UNSPECIFIED.is_reset());
        assert!(Color::Rgb(0, 0, 0).is_rgb());
        assert!(!Color::Named(NamedColor::Black).is_rgb());
    }

    #[test]
    fn default_is_unspecified() {
        assert_eq!(Color::default(), Color::UNSPECIFIED);
        assert_eq!(Style::default(), Style::Unspecified);
    }

    #[test]
    fn or_only_replaces_unspecified() {
        let red = Color::Named(NamedColor::Red);
        assert_eq!(Color::UNSPECIFIED.or(red), red);
        assert_eq!(Color::RESET.or(red), Color::RESET);
        assert_eq!(Style::Unspecified.or(Style::Bold), Style::Bold);
        assert_eq!(Style::Italic.or(Style::Bold), Style::Italic);
    }

    // ── Equality ─────────────────────────────────────────────────────────

    #[test]
    fn equality_requires_same_tag() {
        assert_ne!(Color::Named(NamedColor::Red), Color::Rgb(255, 0, 0));
        assert_eq!(Color::Rgb(1, 2, 3), Color::Rgb(1, 2, 3));
        assert_ne!(Color::Rgb(1, 2, 3), Color::Rgb(1, 2, 4));
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Color::Rgb(255, 0, 16)), "#ff0010");
        assert_eq!(format!("{:?}", Color::Named(NamedColor::Cyan)), "Cyan");
    }

    // ── Style ────────────────────────────────────────────────────────────

    #[test]
    fn style_codes() {
        assert_eq!(Style::Reset.render(), "\x1b[0m");
        assert_eq!(Style::Bold.render(), "\x1b[1m");
        assert_eq!(Style::Crossed.render(), "\x1b[9m");
        assert_eq!(Style::Overline.render(), "\x1b[53m");
        assert_eq!(Style::Unspecified.code(), 0);
    }
}
