// SPDX-License-Identifier: MIT
//
// Cell — one character position of a window grid.
//
// A cell holds one grapheme cluster plus its foreground, background and
// style. The grapheme is stored inline (up to four codepoints, NFC), so a
// cell is `Copy` and grids are plain `Vec<Vec<Cell>>` with no per-cell
// allocation. Every cell occupies exactly one column; wide characters are
// not measured.
//
// Blank cells:
//
//   The default cell is a space with every attribute `Unspecified`. That
//   exact value is what "blank" means everywhere: trimming, clearing and
//   growing a grid all work in terms of `Cell::default()`.

use std::fmt;

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::color::{Color, Style};
use crate::error::{Error, Result};

/// Maximum number of codepoints a cell's grapheme may hold.
pub const MAX_GRAPHEME_LENGTH: usize = 4;

// ─── Grapheme ────────────────────────────────────────────────────────────────

/// A single grapheme cluster of 1..=4 codepoints, stored inline.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grapheme {
    len: u8,
    cps: [char; MAX_GRAPHEME_LENGTH],
}

impl Grapheme {
    /// A single space.
    pub const SPACE: Self = Self::from_char(' ');

    /// Wrap a single codepoint. Always valid.
    #[must_use]
    pub const fn from_char(ch: char) -> Self {
        Self {
            len: 1,
            cps: [ch, '\0', '\0', '\0'],
        }
    }

    /// Parse text that must normalize (NFC) to exactly one grapheme cluster
    /// of at most [`MAX_GRAPHEME_LENGTH`] codepoints.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGrapheme`] for empty input, more than one cluster, or
    /// a cluster that is too long.
    pub fn new(text: &str) -> Result<Self> {
        let normalized: String = text.nfc().collect();
        let mut clusters = normalized.graphemes(true);
        let (Some(cluster), None) = (clusters.next(), clusters.next()) else {
            return Err(Error::InvalidGrapheme(text.to_owned()));
        };

        let mut grapheme = Self {
            len: 0,
            cps: ['\0'; MAX_GRAPHEME_LENGTH],
        };
        for ch in cluster.chars() {
            let slot = grapheme
                .cps
                .get_mut(usize::from(grapheme.len))
                .ok_or_else(|| Error::InvalidGrapheme(text.to_owned()))?;
            *slot = ch;
            grapheme.len += 1;
        }
        Ok(grapheme)
    }

    /// The codepoints of this grapheme.
    #[inline]
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.cps[..usize::from(self.len)]
    }

    /// The first codepoint.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> char {
        self.cps[0]
    }

    /// Whether this grapheme is a single whitespace codepoint.
    #[inline]
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.len == 1 && self.cps[0].is_whitespace()
    }

    /// Append the grapheme's UTF-8 encoding to `out`.
    pub fn push_to(&self, out: &mut String) {
        out.extend(self.chars());
    }
}

impl Default for Grapheme {
    fn default() -> Self {
        Self::SPACE
    }
}

impl From<char> for Grapheme {
    fn from(ch: char) -> Self {
        Self::from_char(ch)
    }
}

impl TryFrom<&str> for Grapheme {
    type Error = Error;

    fn try_from(text: &str) -> Result<Self> {
        Self::new(text)
    }
}

impl fmt::Display for Grapheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars().iter().try_for_each(|ch| fmt::Write::write_char(f, *ch))
    }
}

impl fmt::Debug for Grapheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single styled character position.
///
/// ```
/// use cellwin_term::cell::Cell;
/// use cellwin_term::color::{NamedColor, Style};
///
/// let cell = Cell::new('x').with_fg(NamedColor::Red.into()).with_style(Style::Bold);
/// assert_eq!(cell.grapheme.to_string(), "x");
/// assert!(Cell::default().is_blank());
/// assert!(!cell.is_blank());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub grapheme: Grapheme,
    pub fg: Color,
    pub bg: Color,
    pub style: Style,
}

impl Cell {
    /// A cell with the given character and unspecified attributes.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            grapheme: Grapheme::from_char(ch),
            fg: Color::UNSPECIFIED,
            bg: Color::UNSPECIFIED,
            style: Style::Unspecified,
        }
    }

    /// A cell holding a validated grapheme cluster.
    ///
    /// # Errors
    ///
    /// See [`Grapheme::new`].
    pub fn from_grapheme(text: &str) -> Result<Self> {
        Ok(Self {
            grapheme: Grapheme::new(text)?,
            ..Self::default()
        })
    }

    /// A cell with every attribute set.
    #[must_use]
    pub const fn styled(grapheme: Grapheme, fg: Color, bg: Color, style: Style) -> Self {
        Self {
            grapheme,
            fg,
            bg,
            style,
        }
    }

    #[inline]
    #[must_use]
    pub const fn with_fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Whether this cell equals the default blank cell.
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    /// The same cell with `Unspecified` attributes replaced by the given
    /// defaults.
    #[must_use]
    pub const fn resolved(self, fg: Color, bg: Color, style: Style) -> Self {
        Self {
            grapheme: self.grapheme,
            fg: self.fg.or(fg),
            bg: self.bg.or(bg),
            style: self.style.or(style),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
