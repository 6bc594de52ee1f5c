// SPDX-License-Identifier: MIT
//
// Window — a fixed-or-growable grid of cells with a text cursor.
//
// Each dimension is either fixed (writes that reach the edge wrap or stop,
// addressing past it is an error) or auto-growing (the window expands to
// fit whatever is written or addressed). `Window::new(w, h)` fixes every
// non-zero dimension.
//
// Storage is sparse: `grid` may hold fewer rows than `height`, and any row
// may hold fewer cells than `width`. Missing cells read as
// `Cell::default()`. Nothing distinguishes an absent cell from a stored
// default one.
//
// Cursor invariant:
//
//   Once a window has any size, the cursor is strictly inside it after
//   every public mutation. Fixed dimensions hold the cursor back; auto
//   dimensions grow to keep it in.
//
// Text insertion:
//
//   `write` walks the input grapheme by grapheme. CR, LF and CRLF break
//   the line, TAB advances to the next tab stop, every other grapheme
//   fills one cell. At the right edge of a fixed width the cursor moves to
//   the next row (growing the height if it may). At the bottom-right
//   corner of a fixed window writing stops: the last grapheme written
//   stays there and the cursor stays on it.
//
//   The return value is the number of input bytes consumed, always on a
//   grapheme boundary. Running out of room is not an error; compare the
//   return value with the input length.

use cellwin_term::cell::{Cell, Grapheme};
use cellwin_term::color::{Color, Style};
use cellwin_term::error::{Error, Result};
use unicode_segmentation::UnicodeSegmentation;

use crate::border::Border;
use crate::options::{WindowOptions, WrapPolicy};

// ─── Cursor & Pen ────────────────────────────────────────────────────────────

/// Text cursor of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
    pub visible: bool,
}

/// Attributes applied to text as it is written.
///
/// `Unspecified` fields leave the written cells inheriting the window
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pen {
    pub fg: Color,
    pub bg: Color,
    pub style: Style,
}

impl Pen {
    /// Writes cells that inherit everything from the window.
    pub const PLAIN: Self = Self {
        fg: Color::UNSPECIFIED,
        bg: Color::UNSPECIFIED,
        style: Style::Unspecified,
    };

    #[must_use]
    pub const fn new(fg: Color, bg: Color, style: Style) -> Self {
        Self { fg, bg, style }
    }

    #[must_use]
    pub const fn fg(fg: Color) -> Self {
        Self {
            fg,
            ..Self::PLAIN
        }
    }

    #[must_use]
    pub const fn bg(bg: Color) -> Self {
        Self {
            bg,
            ..Self::PLAIN
        }
    }

    #[must_use]
    pub const fn style(style: Style) -> Self {
        Self {
            style,
            ..Self::PLAIN
        }
    }

    #[inline]
    const fn cell(self, grapheme: Grapheme) -> Cell {
        Cell::styled(grapheme, self.fg, self.bg, self.style)
    }
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// One unit of input text, after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    LineBreak,
    Tab,
    Glyph(Grapheme),
}

impl Token {
    fn is_whitespace(self) -> bool {
        match self {
            Self::LineBreak | Self::Tab => true,
            Self::Glyph(g) => g.is_whitespace(),
        }
    }
}

/// Split `text` into tokens, each paired with the byte offset just past it.
///
/// Validates every grapheme first so a failing write leaves the window
/// untouched.
fn tokenize(text: &str) -> Result<Vec<(usize, Token)>> {
    text.grapheme_indices(true)
        .map(|(start, cluster)| {
            let end = start + cluster.len();
            let token = match cluster {
                "\r" | "\n" | "\r\n" => Token::LineBreak,
                "\t" => Token::Tab,
                _ => Token::Glyph(Grapheme::new(cluster)?),
            };
            Ok((end, token))
        })
        .collect()
}

/// Outcome of placing one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Placed; more input fits.
    Placed,
    /// Placed, and the window is now full.
    Filled,
    /// Not placed: no room left.
    Blocked,
}

// ─── Window ──────────────────────────────────────────────────────────────────

/// A rectangular grid of styled cells.
///
/// ```
/// use cellwin_window::window::Window;
///
/// let mut win = Window::new(10, 5);
/// let consumed = win.write("Hello\nWorld").unwrap();
/// assert_eq!(consumed, 11);
/// assert_eq!((win.cursor().x, win.cursor().y), (5, 1));
/// assert_eq!(win.row_text(1), "World");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    width: usize,
    height: usize,
    width_fixed: bool,
    height_fixed: bool,
    cursor: Cursor,
    /// The last cell of a fully fixed window has been written. Further text
    /// is refused until the cursor is repositioned.
    full: bool,
    options: WindowOptions,
    grid: Vec<Vec<Cell>>,
}

impl Default for Window {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Window {
    /// A window of `width × height`. A zero dimension grows automatically,
    /// a non-zero one is fixed.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_options(width, height, WindowOptions::default())
    }

    /// Like [`new`](Self::new), with explicit options.
    #[must_use]
    pub fn with_options(width: usize, height: usize, options: WindowOptions) -> Self {
        let mut options = options;
        options.tabsize = options.tabsize.max(1);
        Self {
            width,
            height,
            width_fixed: width > 0,
            height_fixed: height > 0,
            cursor: Cursor {
                x: 0,
                y: 0,
                visible: options.cursor_visible,
            },
            full: false,
            options,
            grid: Vec::new(),
        }
    }

    // ── Dimensions ──────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn is_width_fixed(&self) -> bool {
        self.width_fixed
    }

    #[inline]
    #[must_use]
    pub const fn is_height_fixed(&self) -> bool {
        self.height_fixed
    }

    /// Fix or release the width. Fixing clamps the cursor inside.
    ///
    /// A fixed width of zero holds no cells: the cursor stays at column 0
    /// and every write consumes nothing.
    pub fn set_width_fixed(&mut self, fixed: bool) {
        self.width_fixed = fixed;
        self.clamp_cursor();
    }

    /// Fix or release the height. Fixing clamps the cursor inside. A
    /// fixed height of zero behaves like a fixed width of zero.
    pub fn set_height_fixed(&mut self, fixed: bool) {
        self.height_fixed = fixed;
        self.clamp_cursor();
    }

    /// Set the width, truncating rows that are now too long.
    pub fn set_w(&mut self, width: usize) {
        self.width = width;
        for row in &mut self.grid {
            row.truncate(width);
        }
        self.clamp_cursor();
    }

    /// Set the height, dropping rows below it.
    pub fn set_h(&mut self, height: usize) {
        self.height = height;
        self.grid.truncate(height);
        self.clamp_cursor();
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.set_w(width);
        self.set_h(height);
    }

    /// Shrink the width to the narrowest that still holds every non-blank
    /// cell and the cursor, but not below `min_width`. Never grows.
    pub fn trim_w(&mut self, min_width: usize) {
        let content = self
            .grid
            .iter()
            .map(|row| row.iter().rposition(|c| !c.is_blank()).map_or(0, |i| i + 1))
            .max()
            .unwrap_or(0);
        let target = min_width.max(content).max(self.cursor.x + 1);
        if target < self.width {
            self.set_w(target);
        }
    }

    /// Shrink the height to the shortest that still holds every non-blank
    /// row and the cursor, but not below `min_height`. Never grows.
    pub fn trim_h(&mut self, min_height: usize) {
        let content = self
            .grid
            .iter()
            .rposition(|row| row.iter().any(|c| !c.is_blank()))
            .map_or(0, |i| i + 1);
        let target = min_height.max(content).max(self.cursor.y + 1);
        if target < self.height {
            self.set_h(target);
        }
    }

    pub fn trim(&mut self, min_width: usize, min_height: usize) {
        self.trim_w(min_width);
        self.trim_h(min_height);
    }

    // ── Cursor ──────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Move the cursor. Grows auto-growing dimensions to contain it.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the position is outside a fixed dimension.
    pub fn set_cursor(&mut self, x: usize, y: usize) -> Result<()> {
        self.check(x, y)?;
        self.width = self.width.max(x + 1);
        self.height = self.height.max(y + 1);
        self.cursor.x = x;
        self.cursor.y = y;
        self.full = false;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub const fn is_cursor_visible(&self) -> bool {
        self.cursor.visible
    }

    pub fn show_cursor(&mut self) {
        self.cursor.visible = true;
    }

    pub fn hide_cursor(&mut self) {
        self.cursor.visible = false;
    }

    /// Pull the cursor back inside any fixed dimension.
    fn clamp_cursor(&mut self) {
        self.full = false;
        self.cursor.x = self.cursor.x.min(self.width.saturating_sub(1));
        self.cursor.y = self.cursor.y.min(self.height.saturating_sub(1));
    }

    // ── Options ─────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn tabsize(&self) -> usize {
        self.options.tabsize
    }

    /// Set the tab stop distance. Zero is treated as one.
    pub fn set_tabsize(&mut self, tabsize: usize) {
        self.options.tabsize = tabsize.max(1);
    }

    #[inline]
    #[must_use]
    pub const fn wordwrap(&self) -> bool {
        self.options.wordwrap
    }

    pub fn set_wordwrap(&mut self, on: bool) {
        self.options.wordwrap = on;
    }

    #[inline]
    #[must_use]
    pub const fn wrap_policy(&self) -> &WrapPolicy {
        &self.options.wrap
    }

    pub fn wrap_policy_mut(&mut self) -> &mut WrapPolicy {
        &mut self.options.wrap
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &WindowOptions {
        &self.options
    }

    // ── Defaults ────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn default_fg(&self) -> Color {
        self.options.fg
    }

    pub fn set_default_fg(&mut self, fg: Color) {
        self.options.fg = fg;
    }

    #[inline]
    #[must_use]
    pub const fn default_bg(&self) -> Color {
        self.options.bg
    }

    pub fn set_default_bg(&mut self, bg: Color) {
        self.options.bg = bg;
    }

    #[inline]
    #[must_use]
    pub const fn default_style(&self) -> Style {
        self.options.style
    }

    pub fn set_default_style(&mut self, style: Style) {
        self.options.style = style;
    }

    // ── Cell Access ─────────────────────────────────────────────────

    /// Fail if `(x, y)` lies outside a fixed dimension.
    fn check(&self, x: usize, y: usize) -> Result<()> {
        if (self.width_fixed && x >= self.width) || (self.height_fixed && y >= self.height) {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Storage for `(x, y)`, growing the window and the sparse grid as
    /// needed. Callers check fixed bounds first.
    fn slot(&mut self, x: usize, y: usize) -> &mut Cell {
        self.width = self.width.max(x + 1);
        self.height = self.height.max(y + 1);
        if self.grid.len() <= y {
            self.grid.resize_with(y + 1, Vec::new);
        }
        let row = &mut self.grid[y];
        if row.len() <= x {
            row.resize(x + 1, Cell::default());
        }
        &mut row[x]
    }

    /// The stored cell, `Unspecified` attributes included.
    ///
    /// Reading past an auto-growing dimension yields a blank cell.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] outside a fixed dimension.
    pub fn get_cell(&self, x: usize, y: usize) -> Result<Cell> {
        self.check(x, y)?;
        Ok(self.cell_or_blank(x, y))
    }

    /// Store a cell, growing auto-growing dimensions.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] outside a fixed dimension.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) -> Result<()> {
        self.check(x, y)?;
        *self.slot(x, y) = cell;
        Ok(())
    }

    #[inline]
    fn cell_or_blank(&self, x: usize, y: usize) -> Cell {
        self.grid
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or_default()
    }

    /// The cell at `(x, y)` with `Unspecified` attributes replaced by the
    /// window defaults. Positions outside the grid read as blank.
    #[must_use]
    pub fn resolved_cell(&self, x: usize, y: usize) -> Cell {
        self.cell_or_blank(x, y).resolved(
            self.options.fg,
            self.options.bg,
            self.options.style,
        )
    }

    /// # Errors
    ///
    /// [`Error::OutOfBounds`] outside a fixed dimension.
    pub fn get_grapheme(&self, x: usize, y: usize) -> Result<Grapheme> {
        Ok(self.get_cell(x, y)?.grapheme)
    }

    /// Replace the grapheme at `(x, y)`, keeping its attributes.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGrapheme`] unless `text` is one grapheme cluster,
    /// [`Error::OutOfBounds`] outside a fixed dimension.
    pub fn set_grapheme(&mut self, x: usize, y: usize, text: &str) -> Result<()> {
        let grapheme = Grapheme::new(text)?;
        self.check(x, y)?;
        self.slot(x, y).grapheme = grapheme;
        Ok(())
    }

    /// Replace the character at `(x, y)`, keeping its attributes.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] outside a fixed dimension.
    pub fn set_char(&mut self, x: usize, y: usize, ch: char) -> Result<()> {
        self.check(x, y)?;
        self.slot(x, y).grapheme = Grapheme::from(ch);
        Ok(())
    }

    /// Foreground at `(x, y)`, resolved against the window default.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] outside a fixed dimension.
    pub fn get_fg(&self, x: usize, y: usize) -> Result<Color> {
        Ok(self.get_cell(x, y)?.fg.or(self.options.fg))
    }

    /// # Errors
    ///
    /// [`Error::OutOfBounds`] outside a fixed dimension.
    pub fn set_fg(&mut self, x: usize, y: usize, fg: Color) -> Result<()> {
        self.check(x, y)?;
        self.slot(x, y).fg = fg;
        Ok(())
    }

    /// Background at `(x, y)`, resolved against the window default.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] outside a fixed dimension.
    pub fn get_bg(&self, x: usize, y: usize) -> Result<Color> {
        Ok(self.get_cell(x, y)?.bg.or(self.options.bg))
    }

    /// # Errors
    ///
    /// [`Error::OutOfBounds`] outside a fixed dimension.
    pub fn set_bg(&mut self, x: usize, y: usize, bg: Color) -> Result<()> {
        self.check(x, y)?;
        self.slot(x, y).bg = bg;
        Ok(())
    }

    /// Style at `(x, y)`, resolved against the window default.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] outside a fixed dimension.
    pub fn get_style(&self, x: usize, y: usize) -> Result<Style> {
        Ok(self.get_cell(x, y)?.style.or(self.options.style))
    }

    /// # Errors
    ///
    /// [`Error::OutOfBounds`] outside a fixed dimension.
    pub fn set_style(&mut self, x: usize, y: usize, style: Style) -> Result<()> {
        self.check(x, y)?;
        self.slot(x, y).style = style;
        Ok(())
    }

    /// The graphemes of row `y` as a string, trailing blanks removed.
    #[must_use]
    pub fn row_text(&self, y: usize) -> String {
        let mut out = String::new();
        if let Some(row) = self.grid.get(y) {
            for cell in row {
                cell.grapheme.push_to(&mut out);
            }
        }
        out.truncate(out.trim_end_matches(' ').len());
        out
    }

    // ── Text Insertion ──────────────────────────────────────────────

    /// Write `text` at the cursor with plain attributes. Word-wraps when
    /// [`wordwrap`](Self::wordwrap) is on.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGrapheme`] if a grapheme cluster holds more than
    /// four codepoints. Nothing is written in that case.
    pub fn write(&mut self, text: &str) -> Result<usize> {
        self.write_with(text, Pen::PLAIN)
    }

    /// [`write`](Self::write) with explicit attributes.
    ///
    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_with(&mut self, text: &str, pen: Pen) -> Result<usize> {
        if self.options.wordwrap {
            self.write_wordwrap_with(text, pen)
        } else {
            self.write_plain_with(text, pen)
        }
    }

    /// Write without word-wrapping.
    ///
    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_plain(&mut self, text: &str) -> Result<usize> {
        self.write_plain_with(text, Pen::PLAIN)
    }

    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_plain_with(&mut self, text: &str, pen: Pen) -> Result<usize> {
        let tokens = tokenize(text)?;
        let mut consumed = 0;
        for (end, token) in tokens {
            match self.place(token, pen) {
                Step::Placed => consumed = end,
                Step::Filled => return Ok(end),
                Step::Blocked => break,
            }
        }
        Ok(consumed)
    }

    /// Write a single character. Never word-wraps. Returns 1 if it was
    /// written, 0 if there was no room.
    pub fn write_char(&mut self, ch: char) -> usize {
        self.write_char_with(ch, Pen::PLAIN)
    }

    pub fn write_char_with(&mut self, ch: char, pen: Pen) -> usize {
        let token = match ch {
            '\r' | '\n' => Token::LineBreak,
            '\t' => Token::Tab,
            _ => Token::Glyph(Grapheme::from(ch)),
        };
        usize::from(self.place(token, pen) != Step::Blocked)
    }

    /// Write `text`, breaking lines at word boundaries where possible.
    ///
    /// A line may break after whitespace or a `wrap_after` character and
    /// before a `wrap_before` character. A word that does not fit on the
    /// current line moves to the next; a word longer than a whole line is
    /// split at the edge. A tab never moves a word: like in a plain write
    /// it stops at the right edge. On an auto-growing width this is a plain
    /// write.
    ///
    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_wordwrap(&mut self, text: &str) -> Result<usize> {
        self.write_wordwrap_with(text, Pen::PLAIN)
    }

    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn write_wordwrap_with(&mut self, text: &str, pen: Pen) -> Result<usize> {
        if !self.width_fixed {
            return self.write_plain_with(text, pen);
        }
        let tokens = tokenize(text)?;
        let mut consumed = 0;
        let mut start = 0;
        while start < tokens.len() {
            let end = self.run_end(&tokens, start);
            let run = &tokens[start..end];
            match self.place_run(run, pen) {
                RunOutcome::Done => consumed = run[run.len() - 1].0,
                RunOutcome::Stopped(Some(last)) => return Ok(last),
                RunOutcome::Stopped(None) => return Ok(consumed),
            }
            start = end;
        }
        Ok(consumed)
    }

    /// Index one past the end of the run starting at `start`.
    ///
    /// A run ends after whitespace or a `wrap_after` character, before a
    /// `wrap_before` character, and a line break is a run of its own.
    fn run_end(&self, tokens: &[(usize, Token)], start: usize) -> usize {
        let policy = &self.options.wrap;
        for (i, &(_, token)) in tokens.iter().enumerate().skip(start) {
            match token {
                Token::LineBreak => return if i == start { i + 1 } else { i },
                Token::Tab => return i + 1,
                Token::Glyph(g) => {
                    let ch = g.base();
                    if i > start && policy.breaks_before(ch) {
                        return i;
                    }
                    if g.is_whitespace() || policy.breaks_after(ch) {
                        return i + 1;
                    }
                }
            }
        }
        tokens.len()
    }

    /// Columns a run occupies when started at column `x`. A tab stops at
    /// the right edge, as it does in a plain write.
    fn run_width(&self, run: &[(usize, Token)], x: usize) -> usize {
        let tab = self.options.tabsize;
        run.iter().fold(0, |w, &(_, token)| match token {
            Token::LineBreak => w,
            Token::Tab => {
                let stop = ((x + w) / tab * tab + tab).min(self.width);
                stop.max(x + w) - x
            }
            Token::Glyph(_) => w + 1,
        })
    }

    fn place_run(&mut self, run: &[(usize, Token)], pen: Pen) -> RunOutcome {
        loop {
            let x = self.cursor.x;
            let available = self.width.saturating_sub(x);
            let width = self.run_width(run, x);
            let trailing_ws = run.last().is_some_and(|&(_, t)| t.is_whitespace());

            if width <= available || matches!(run, [(_, Token::LineBreak)]) {
                return self.place_all(run, pen);
            }

            if trailing_ws
                && self.options.wrap.skip_whitespace_at_eol
                && self.run_width(&run[..run.len() - 1], x) == available
            {
                let (body, ws) = run.split_at(run.len() - 1);
                return match self.place_all(body, pen) {
                    RunOutcome::Done => {
                        if self.cursor.x == 0 {
                            // The edge already broke the line; drop the space.
                            RunOutcome::Done
                        } else {
                            self.place_all(ws, pen)
                        }
                    }
                    stopped => stopped,
                };
            }

            if x > 0 {
                if self.place(Token::LineBreak, pen) == Step::Blocked {
                    return RunOutcome::Stopped(None);
                }
                continue;
            }

            return self.place_all(run, pen);
        }
    }

    fn place_all(&mut self, run: &[(usize, Token)], pen: Pen) -> RunOutcome {
        let mut last = None;
        for &(end, token) in run {
            match self.place(token, pen) {
                Step::Placed => last = Some(end),
                Step::Filled => return RunOutcome::Stopped(Some(end)),
                Step::Blocked => return RunOutcome::Stopped(last),
            }
        }
        RunOutcome::Done
    }

    /// Place one token at the cursor and advance it.
    fn place(&mut self, token: Token, pen: Pen) -> Step {
        if self.full
            || (self.width_fixed && self.width == 0)
            || (self.height_fixed && self.height == 0)
        {
            return Step::Blocked;
        }
        match token {
            Token::LineBreak => {
                if self.next_line() {
                    Step::Placed
                } else {
                    Step::Blocked
                }
            }
            Token::Tab => {
                let tab = self.options.tabsize;
                let mut stop = (self.cursor.x / tab + 1) * tab;
                if self.width_fixed {
                    stop = stop.min(self.width);
                }
                let (x0, y) = (self.cursor.x, self.cursor.y);
                for x in x0..stop {
                    *self.slot(x, y) = pen.cell(Grapheme::SPACE);
                }
                self.cursor.x = stop;
                self.after_advance()
            }
            Token::Glyph(grapheme) => {
                let (x, y) = (self.cursor.x, self.cursor.y);
                *self.slot(x, y) = pen.cell(grapheme);
                self.cursor.x += 1;
                self.after_advance()
            }
        }
    }

    /// Wrap if the cursor ran off a fixed right edge, grow an auto width
    /// to keep it inside.
    fn after_advance(&mut self) -> Step {
        if !self.width_fixed {
            self.width = self.width.max(self.cursor.x + 1);
            return Step::Placed;
        }
        if self.cursor.x < self.width {
            return Step::Placed;
        }
        if self.next_line() {
            Step::Placed
        } else {
            self.cursor.x = self.width - 1;
            self.full = true;
            Step::Filled
        }
    }

    /// Move to the start of the next row, growing an auto height.
    fn next_line(&mut self) -> bool {
        let y = self.cursor.y + 1;
        if y >= self.height {
            if self.height_fixed {
                return false;
            }
            self.height = y + 1;
        }
        self.cursor.x = 0;
        self.cursor.y = y;
        true
    }

    // ── Fills & Rectangles ──────────────────────────────────────────

    /// Check that a whole rectangle is addressable.
    fn check_rect(&self, x: usize, y: usize, w: usize, h: usize) -> Result<bool> {
        if w == 0 || h == 0 {
            return Ok(false);
        }
        self.check(x + w - 1, y + h - 1)?;
        Ok(true)
    }

    fn fill_with(
        &mut self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        mut apply: impl FnMut(&mut Cell),
    ) -> Result<()> {
        if !self.check_rect(x, y, w, h)? {
            return Ok(());
        }
        for row in y..y + h {
            for col in x..x + w {
                apply(self.slot(col, row));
            }
        }
        Ok(())
    }

    /// Set the foreground of every cell in the rectangle.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the rectangle leaves a fixed dimension.
    pub fn fill_fg(&mut self, x: usize, y: usize, w: usize, h: usize, fg: Color) -> Result<()> {
        self.fill_with(x, y, w, h, |cell| cell.fg = fg)
    }

    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the rectangle leaves a fixed dimension.
    pub fn fill_bg(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) -> Result<()> {
        self.fill_with(x, y, w, h, |cell| cell.bg = bg)
    }

    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if the rectangle leaves a fixed dimension.
    pub fn fill_style(
        &mut self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        style: Style,
    ) -> Result<()> {
        self.fill_with(x, y, w, h, |cell| cell.style = style)
    }

    /// Draw a frame whose outer corners are `(x, y)` and
    /// `(x + w - 1, y + h - 1)`.
    ///
    /// The origin may be negative. Parts outside the window are clipped;
    /// drawing never grows the window.
    #[allow(clippy::too_many_arguments)]
    pub fn print_rect(
        &mut self,
        x: isize,
        y: isize,
        w: usize,
        h: usize,
        border: Border,
        fg: Color,
        bg: Color,
    ) {
        let Some(glyphs) = border.glyphs() else {
            return;
        };
        if w == 0 || h == 0 {
            return;
        }
        let (right, bottom) = (x + to_signed(w) - 1, y + to_signed(h) - 1);

        let pen = Pen::new(fg, bg, Style::Unspecified);
        let mut put = |px: isize, py: isize, ch: char| {
            self.put_clipped(px, py, pen.cell(Grapheme::from(ch)));
        };

        for px in x + 1..right {
            put(px, y, glyphs.horizontal);
            put(px, bottom, glyphs.horizontal);
        }
        for py in y + 1..bottom {
            put(x, py, glyphs.vertical);
            put(right, py, glyphs.vertical);
        }
        put(x, y, glyphs.top_left);
        put(right, y, glyphs.top_right);
        put(x, bottom, glyphs.bottom_left);
        put(right, bottom, glyphs.bottom_right);
    }

    /// Store `cell` at a signed position if it lies inside the current
    /// size. Never grows the window.
    pub(crate) fn put_clipped(&mut self, x: isize, y: isize, cell: Cell) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if x < self.width && y < self.height {
            *self.slot(x, y) = cell;
        }
    }

    // ── Clearing & Copying ──────────────────────────────────────────

    /// Blank row `y`.
    pub fn clear_row(&mut self, y: usize) {
        if let Some(row) = self.grid.get_mut(y) {
            row.clear();
        }
    }

    /// Blank every cell and home the cursor. Dimensions are kept.
    pub fn clear_grid(&mut self) {
        self.grid.clear();
        self.cursor.x = 0;
        self.cursor.y = 0;
        self.full = false;
    }

    /// A new fixed-size window holding a copy of the given rectangle.
    /// Options carry over; the cursor starts at the origin.
    #[must_use]
    pub fn cutout(&self, x: usize, y: usize, w: usize, h: usize) -> Self {
        let mut out = Self::with_options(w, h, self.options.clone());
        out.grid = self
            .grid
            .iter()
            .skip(y)
            .take(h)
            .map(|row| row.iter().skip(x).take(w).copied().collect())
            .collect();
        out
    }

    /// Replace this window's cells with `other`'s, clipped to any fixed
    /// dimension and growing auto-growing ones.
    pub fn copy_grid_from(&mut self, other: &Self) {
        let rows = if self.height_fixed {
            other.grid.len().min(self.height)
        } else {
            other.grid.len()
        };
        self.grid = other.grid[..rows]
            .iter()
            .map(|row| {
                if self.width_fixed {
                    row.iter().take(self.width).copied().collect()
                } else {
                    row.clone()
                }
            })
            .collect();
        if !self.width_fixed {
            self.width = self.width.max(other.width);
        }
        if !self.height_fixed {
            self.height = self.height.max(other.height);
        }
    }

    /// Copy `src` onto this window with its top-left at `(x, y)`, clipped
    /// to this window's current size. Cells are resolved against `src`'s
    /// defaults so they keep their look.
    pub(crate) fn blit(&mut self, src: &Self, x: isize, y: isize) {
        for sy in 0..src.height {
            let Ok(dy) = usize::try_from(y + to_signed(sy)) else {
                continue;
            };
            if dy >= self.height {
                break;
            }
            for sx in 0..src.width {
                let Ok(dx) = usize::try_from(x + to_signed(sx)) else {
                    continue;
                };
                if dx >= self.width {
                    break;
                }
                *self.slot(dx, dy) = src.resolved_cell(sx, sy);
            }
        }
    }
}

/// Outcome of placing a word-wrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunOutcome {
    /// The whole run was placed.
    Done,
    /// Writing stopped; carries the byte offset consumed so far within the
    /// run, if any.
    Stopped(Option<usize>),
}

/// Window sizes are bounded by memory, far below `isize::MAX`.
#[allow(clippy::cast_possible_wrap)]
#[inline]
pub(crate) const fn to_signed(n: usize) -> isize {
    n as isize
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use cellwin_term::color::NamedColor;
    use pretty_assertions::assert_eq;

    fn red() -> Color {
        Color::Named(NamedColor::Red)
    }

    fn pos(win: &Window) -> (usize, usize) {
        (win.cursor().x, win.cursor().y)
    }

    fn rows(win: &Window) -> Vec<String> {
        (0..win.height()).map(|y| win.row_text(y)).collect()
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn nonzero_dimensions_are_fixed() {
        let win = Window::new(10, 0);
        assert!(win.is_width_fixed());
        assert!(!win.is_height_fixed());
        assert_eq!(pos(&win), (0, 0));
        assert!(win.is_cursor_visible());
    }

    #[test]
    fn options_apply() {
        let opts = WindowOptions {
            tabsize: 0,
            wordwrap: true,
            fg: red(),
            ..WindowOptions::default()
        };
        let win = Window::with_options(5, 5, opts);
        assert_eq!(win.tabsize(), 1);
        assert!(win.wordwrap());
        assert_eq!(win.default_fg(), red());
    }

    // ── Plain write ──────────────────────────────────────────────────

    #[test]
    fn hello_world_scenario() {
        let mut win = Window::new(10, 5);
        assert_eq!(win.write("Hello\nWorld").unwrap(), 11);
        assert_eq!(pos(&win), (5, 1));
        assert_eq!(win.row_text(0), "Hello");
        assert_eq!(win.row_text(1), "World");
    }

    #[test]
    fn crlf_is_one_line_break() {
        let mut win = Window::new(10, 5);
        win.write("a\r\nb\rc").unwrap();
        assert_eq!(&rows(&win)[..3], &["a", "b", "c"]);
    }

    #[test]
    fn wraps_at_fixed_right_edge() {
        let mut win = Window::new(3, 3);
        assert_eq!(win.write("abcde").unwrap(), 5);
        assert_eq!(win.row_text(0), "abc");
        assert_eq!(win.row_text(1), "de");
        assert_eq!(pos(&win), (2, 1));
    }

    #[test]
    fn stops_at_bottom_right_corner() {
        let mut win = Window::new(2, 2);
        let consumed = win.write("abcdef").unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(rows(&win), ["ab", "cd"]);
        assert_eq!(pos(&win), (1, 1));
    }

    #[test]
    fn full_window_refuses_later_writes() {
        let mut win = Window::new(2, 2);
        assert_eq!(win.write("abcd").unwrap(), 4);
        let before = win.clone();

        assert_eq!(win.write("e").unwrap(), 0);
        assert_eq!(win.write_char('f'), 0);
        assert_eq!(win.write_wordwrap("g h").unwrap(), 0);
        assert_eq!(win.write("\t").unwrap(), 0);
        assert_eq!(win, before);
        assert_eq!(win.get_grapheme(1, 1).unwrap(), Grapheme::from('d'));
    }

    #[test]
    fn full_window_writes_again_after_cursor_moves() {
        let mut win = Window::new(2, 2);
        win.write("abcd").unwrap();
        win.set_cursor(0, 1).unwrap();
        assert_eq!(win.write("x").unwrap(), 1);
        assert_eq!(rows(&win), ["ab", "xd"]);

        win.clear_grid();
        assert_eq!(win.write("wxyz").unwrap(), 4);
        assert_eq!(rows(&win), ["wx", "yz"]);
    }

    #[test]
    fn fixed_zero_width_holds_nothing() {
        let mut win = Window::new(0, 3);
        win.set_width_fixed(true);
        assert_eq!(pos(&win), (0, 0));
        assert_eq!(win.write("abc").unwrap(), 0);
        assert_eq!(win.write_char('x'), 0);
        assert_eq!((win.width(), win.height()), (0, 3));
        assert!(win.set_char(0, 0, 'x').is_err());
    }

    #[test]
    fn newline_on_last_row_is_not_consumed() {
        let mut win = Window::new(5, 1);
        assert_eq!(win.write("ab\ncd").unwrap(), 2);
        assert_eq!(pos(&win), (2, 0));
    }

    #[test]
    fn fixed_width_grows_height_when_allowed() {
        let mut win = Window::new(2, 0);
        win.write("abcdef").unwrap();
        assert_eq!(win.height(), 4);
        assert_eq!(rows(&win), ["ab", "cd", "ef", ""]);
        assert_eq!(pos(&win), (0, 3));
    }

    #[test]
    fn auto_width_grows_instead_of_wrapping() {
        let mut win = Window::new(0, 0);
        win.write("hello").unwrap();
        assert_eq!(win.width(), 6);
        assert_eq!(win.height(), 1);
        assert_eq!(pos(&win), (5, 0));
        win.write("\nxy").unwrap();
        assert_eq!(win.height(), 2);
        assert_eq!(win.row_text(1), "xy");
    }

    #[test]
    fn tab_advances_to_next_stop() {
        let mut win = Window::new(20, 1);
        win.write("ab\tc").unwrap();
        assert_eq!(win.get_grapheme(4, 0).unwrap(), Grapheme::from('c'));
        assert_eq!(pos(&win), (5, 0));
    }

    #[test]
    fn tab_clamped_to_fixed_edge() {
        let mut win = Window::new(6, 2);
        win.write("abcde\tx").unwrap();
        assert_eq!(win.row_text(0), "abcde");
        assert_eq!(win.row_text(1), "x");
    }

    #[test]
    fn multi_codepoint_grapheme_takes_one_cell() {
        let mut win = Window::new(0, 0);
        win.write("q\u{301}z").unwrap();
        assert_eq!(win.width(), 3);
        assert_eq!(win.get_grapheme(0, 0).unwrap().chars(), &['q', '\u{301}']);
    }

    #[test]
    fn overlong_grapheme_rejects_whole_write() {
        let mut win = Window::new(10, 2);
        let before = win.clone();
        let err = win.write("ok q\u{316}\u{317}\u{318}\u{319}");
        assert!(matches!(err, Err(Error::InvalidGrapheme(_))));
        assert_eq!(win, before);
    }

    #[test]
    fn consumed_counts_bytes() {
        let mut win = Window::new(2, 1);
        assert_eq!(win.write("éxé").unwrap(), "éx".len());
    }

    #[test]
    fn pen_attributes_are_stored() {
        let mut win = Window::new(5, 1);
        win.write_with("hi", Pen::new(red(), Color::UNSPECIFIED, Style::Bold))
            .unwrap();
        let cell = win.get_cell(1, 0).unwrap();
        assert_eq!(cell.fg, red());
        assert!(cell.bg.is_unspecified());
        assert_eq!(cell.style, Style::Bold);
    }

    #[test]
    fn write_char_reports_room() {
        let mut win = Window::new(1, 1);
        assert_eq!(win.write_char('a'), 1);
        assert_eq!(win.write_char('\n'), 0);
        assert_eq!(pos(&win), (0, 0));
    }

    #[test]
    fn zero_sized_fixed_window_takes_nothing() {
        let mut win = Window::new(3, 1);
        win.set_h(0);
        win.set_height_fixed(true);
        assert_eq!(win.write("abc").unwrap(), 0);
    }

    #[test]
    fn write_plain_ignores_wordwrap() {
        let mut win = Window::new(5, 3);
        win.set_wordwrap(true);
        assert_eq!(win.write_plain("hello world").unwrap(), 11);
        assert_eq!(rows(&win), ["hello", " worl", "d"]);
        assert!(win.wordwrap());
    }

    // ── Word wrap ────────────────────────────────────────────────────

    #[test]
    fn wordwrap_moves_word_to_next_line() {
        let mut win = Window::new(10, 3);
        win.write_wordwrap("hello wonderful world").unwrap();
        assert_eq!(rows(&win), ["hello", "wonderful", "world"]);
    }

    #[test]
    fn wordwrap_skips_space_at_exact_fit() {
        let mut win = Window::new(5, 3);
        win.write_wordwrap("hello world").unwrap();
        assert_eq!(rows(&win), ["hello", "world", ""]);
        assert_eq!(win.get_cell(0, 1).unwrap().grapheme, Grapheme::from('w'));
    }

    #[test]
    fn wordwrap_carries_space_when_skipping_disabled() {
        let mut win = Window::new(5, 3);
        win.wrap_policy_mut().skip_whitespace_at_eol = false;
        assert_eq!(win.write_wordwrap("hello world").unwrap(), 11);
        // The space is carried to the second row, so the next word starts
        // a row further down.
        assert_eq!(rows(&win), ["hello", "", "world"]);
    }

    #[test]
    fn wordwrap_tab_stops_at_edge_like_plain_write() {
        let text = "ab cd\tx";
        let mut wrapped = Window::new(6, 3);
        assert_eq!(wrapped.write_wordwrap(text).unwrap(), text.len());
        let mut plain = Window::new(6, 3);
        assert_eq!(plain.write_plain(text).unwrap(), text.len());

        assert_eq!(rows(&wrapped), ["ab cd", "x", ""]);
        assert_eq!(rows(&wrapped), rows(&plain));
    }

    #[test]
    fn wordwrap_breaks_after_punctuation() {
        let mut win = Window::new(8, 3);
        win.write_wordwrap("one-two-three").unwrap();
        assert_eq!(&rows(&win)[..2], &["one-two-", "three"]);
    }

    #[test]
    fn wordwrap_breaks_before_opening_bracket() {
        let mut win = Window::new(6, 3);
        win.write_wordwrap("abc(def)").unwrap();
        assert_eq!(&rows(&win)[..2], &["abc", "(def)"]);
    }

    #[test]
    fn wordwrap_hard_splits_long_word() {
        let mut win = Window::new(4, 3);
        win.write_wordwrap("abcdefgh").unwrap();
        assert_eq!(&rows(&win)[..2], &["abcd", "efgh"]);
    }

    #[test]
    fn wordwrap_long_word_starts_on_fresh_line() {
        let mut win = Window::new(4, 4);
        win.write_wordwrap("a abcdefg").unwrap();
        assert_eq!(&rows(&win)[..3], &["a", "abcd", "efg"]);
    }

    #[test]
    fn wordwrap_honors_newlines() {
        let mut win = Window::new(10, 3);
        win.write_wordwrap("ab\ncd").unwrap();
        assert_eq!(&rows(&win)[..2], &["ab", "cd"]);
    }

    #[test]
    fn wordwrap_reports_truncation() {
        let mut win = Window::new(5, 1);
        let text = "hello world";
        let consumed = win.write_wordwrap(text).unwrap();
        assert!(consumed < text.len());
        assert_eq!(win.row_text(0), "hello");
    }

    #[test]
    fn write_dispatches_on_wordwrap_flag() {
        let mut win = Window::new(7, 3);
        win.set_wordwrap(true);
        win.write("abc defgh").unwrap();
        assert_eq!(&rows(&win)[..2], &["abc", "defgh"]);
    }

    #[test]
    fn wordwrap_on_auto_width_is_plain() {
        let mut win = Window::new(0, 0);
        win.write_wordwrap("some long line").unwrap();
        assert_eq!(win.width(), 15);
    }

    // ── Resize & trim ────────────────────────────────────────────────

    #[test]
    fn shrinking_clamps_cursor() {
        let mut win = Window::new(10, 10);
        win.set_cursor(8, 8).unwrap();
        win.resize(4, 3);
        assert_eq!(pos(&win), (3, 2));
    }

    #[test]
    fn shrinking_truncates_cells() {
        let mut win = Window::new(5, 2);
        win.write("abcde").unwrap();
        win.set_w(2);
        assert_eq!(win.row_text(0), "ab");
        win.set_w(5);
        assert_eq!(win.row_text(0), "ab");
    }

    #[test]
    fn trim_shrinks_to_content_and_cursor() {
        let mut win = Window::new(20, 10);
        win.write("abc\nde").unwrap();
        win.trim(0, 0);
        assert_eq!((win.width(), win.height()), (3, 2));
        assert_eq!(pos(&win), (2, 1));
    }

    #[test]
    fn trim_never_goes_below_cursor() {
        let mut win = Window::new(20, 10);
        win.set_cursor(7, 4).unwrap();
        win.trim(0, 0);
        assert_eq!((win.width(), win.height()), (8, 5));
    }

    #[test]
    fn trim_respects_minimum_and_never_grows() {
        let mut win = Window::new(4, 4);
        win.trim(10, 2);
        assert_eq!((win.width(), win.height()), (4, 2));
    }

    #[test]
    fn colored_blank_counts_as_content() {
        let mut win = Window::new(10, 10);
        win.set_bg(6, 3, red()).unwrap();
        win.trim(0, 0);
        assert_eq!((win.width(), win.height()), (7, 4));
    }

    // ── Cell access ──────────────────────────────────────────────────

    #[test]
    fn fixed_bounds_are_enforced() {
        let mut win = Window::new(3, 2);
        assert!(matches!(
            win.set_char(3, 0, 'x'),
            Err(Error::OutOfBounds { x: 3, y: 0, width: 3, height: 2 })
        ));
        assert!(win.get_cell(0, 2).is_err());
        assert!(win.set_cursor(0, 2).is_err());
        assert_eq!(pos(&win), (0, 0));
    }

    #[test]
    fn auto_dimensions_grow_on_set() {
        let mut win = Window::new(0, 0);
        win.set_char(4, 2, 'x').unwrap();
        assert_eq!((win.width(), win.height()), (5, 3));
        assert!(win.get_cell(9, 9).unwrap().is_blank());
    }

    #[test]
    fn getters_resolve_defaults() {
        let mut win = Window::new(3, 3);
        win.set_default_fg(red());
        win.set_default_style(Style::Italic);
        assert_eq!(win.get_fg(0, 0).unwrap(), red());
        assert!(win.get_bg(0, 0).unwrap().is_reset());
        assert_eq!(win.get_style(0, 0).unwrap(), Style::Italic);
        assert!(win.get_cell(0, 0).unwrap().fg.is_unspecified());
    }

    #[test]
    fn set_cell_stores_whole_cell() {
        let mut win = Window::new(3, 1);
        let cell = Cell::new('x').with_fg(red()).with_style(Style::Bold);
        win.set_cell(1, 0, cell).unwrap();
        assert_eq!(win.get_cell(1, 0).unwrap(), cell);
        assert!(win.set_cell(3, 0, cell).is_err());
        assert_eq!(win.row_text(0), " x");
    }

    #[test]
    fn defaults_come_from_options() {
        let options = WindowOptions {
            bg: Color::Rgb(30, 30, 46),
            style: Style::Dim,
            ..WindowOptions::default()
        };
        let win = Window::with_options(2, 2, options);
        assert_eq!(win.default_bg(), Color::Rgb(30, 30, 46));
        assert_eq!(win.default_style(), Style::Dim);
        assert_eq!(win.get_bg(1, 1).unwrap(), Color::Rgb(30, 30, 46));
        assert!(win.wrap_policy().wrap_after.contains('-'));
        assert!(win.wrap_policy().skip_whitespace_at_eol);
    }

    #[test]
    fn set_grapheme_validates() {
        let mut win = Window::new(3, 3);
        win.set_grapheme(1, 1, "e\u{301}").unwrap();
        assert_eq!(win.get_grapheme(1, 1).unwrap().chars(), &['é']);
        assert!(win.set_grapheme(1, 1, "ab").is_err());
    }

    // ── Fills & rectangles ───────────────────────────────────────────

    #[test]
    fn fill_sets_rectangle() {
        let mut win = Window::new(5, 5);
        win.fill_bg(1, 1, 2, 2, red()).unwrap();
        assert_eq!(win.get_bg(2, 2).unwrap(), red());
        assert!(win.get_bg(3, 3).unwrap().is_reset());
        assert!(win.fill_style(4, 4, 2, 1, Style::Bold).is_err());
        assert_eq!(win.get_style(4, 4).unwrap(), Style::Reset);
        win.fill_fg(0, 4, 5, 1, red()).unwrap();
        assert_eq!(win.get_fg(4, 4).unwrap(), red());
        assert_eq!(win.get_fg(4, 3).unwrap(), win.default_fg());
    }

    #[test]
    fn print_rect_draws_frame() {
        let mut win = Window::new(4, 3);
        win.print_rect(0, 0, 4, 3, Border::Ascii, Color::UNSPECIFIED, Color::UNSPECIFIED);
        assert_eq!(rows(&win), ["+--+", "|  |", "+--+"]);
    }

    #[test]
    fn print_rect_clips_negative_origin() {
        let mut win = Window::new(3, 3);
        win.print_rect(-1, -1, 3, 3, Border::Line, Color::UNSPECIFIED, Color::UNSPECIFIED);
        assert_eq!(win.row_text(0), " │");
        assert_eq!(win.row_text(1), "─┘");
        assert_eq!((win.width(), win.height()), (3, 3));
    }

    #[test]
    fn print_rect_never_grows() {
        let mut win = Window::new(0, 0);
        win.print_rect(0, 0, 5, 5, Border::Line, Color::UNSPECIFIED, Color::UNSPECIFIED);
        assert_eq!((win.width(), win.height()), (0, 0));
    }

    // ── Clearing & copying ───────────────────────────────────────────

    #[test]
    fn clear_grid_blanks_and_homes() {
        let mut win = Window::new(5, 2);
        win.write("abc\nde").unwrap();
        win.clear_row(0);
        assert_eq!(win.row_text(0), "");
        win.clear_grid();
        assert_eq!(rows(&win), ["", ""]);
        assert_eq!(pos(&win), (0, 0));
    }

    #[test]
    fn cutout_copies_region() {
        let mut win = Window::new(5, 3);
        win.write("abcdefghijklmno").unwrap();
        let cut = win.cutout(1, 1, 3, 2);
        assert_eq!((cut.width(), cut.height()), (3, 2));
        assert!(cut.is_width_fixed());
        assert_eq!(rows(&cut), ["ghi", "lmn"]);
    }

    #[test]
    fn copy_grid_clips_to_fixed_size() {
        let mut src = Window::new(0, 0);
        src.write("abcdef\nghijkl").unwrap();
        let mut dst = Window::new(3, 1);
        dst.copy_grid_from(&src);
        assert_eq!(rows(&dst), ["abc"]);
    }
}
