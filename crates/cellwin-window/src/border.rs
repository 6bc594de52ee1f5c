// SPDX-License-Identifier: MIT
//
// Border kinds and their glyph sets.

use serde::{Deserialize, Serialize};

/// Frame drawn around a child window (one cell outside its rectangle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Border {
    /// No frame at all.
    None,
    /// A frame of spaces, useful with a background color.
    Blank,
    /// `+-+` / `|`.
    Ascii,
    /// Single box-drawing lines.
    #[default]
    Line,
    /// Double box-drawing lines.
    DoubleLine,
}

/// The six glyphs of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderGlyphs {
    pub vertical: char,
    pub horizontal: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
}

impl BorderGlyphs {
    const fn from_array([vertical, horizontal, top_left, top_right, bottom_left, bottom_right]: [char; 6]) -> Self {
        Self {
            vertical,
            horizontal,
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }
}

impl Border {
    /// Glyphs for this border, `None` for [`Border::None`].
    #[must_use]
    pub const fn glyphs(self) -> Option<BorderGlyphs> {
        let set = match self {
            Self::None => return None,
            Self::Blank => [' '; 6],
            Self::Ascii => ['|', '-', '+', '+', '+', '+'],
            Self::Line => ['│', '─', '┌', '┐', '└', '┘'],
            Self::DoubleLine => ['║', '═', '╔', '╗', '╚', '╝'],
        };
        Some(BorderGlyphs::from_array(set))
    }

    /// Whether the border occupies cells.
    #[inline]
    #[must_use]
    pub const fn is_drawn(self) -> bool {
        !matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_has_no_glyphs() {
        assert_eq!(Border::None.glyphs(), None);
        assert!(!Border::None.is_drawn());
    }

    #[test]
    fn line_glyphs() {
        let g = Border::Line.glyphs().unwrap();
        assert_eq!(g.top_left, '┌');
        assert_eq!(g.bottom_right, '┘');
        assert_eq!(g.horizontal, '─');
        assert_eq!(g.vertical, '│');
    }

    #[test]
    fn ascii_and_double() {
        assert_eq!(Border::Ascii.glyphs().unwrap().top_right, '+');
        assert_eq!(Border::DoubleLine.glyphs().unwrap().bottom_left, '╚');
        assert_eq!(Border::Blank.glyphs().unwrap().vertical, ' ');
    }
}
