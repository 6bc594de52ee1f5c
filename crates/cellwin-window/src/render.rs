// SPDX-License-Identifier: MIT
//
// Renderer — turns a grid of cells into the bytes that draw it.
//
// Rows are emitted top to bottom, cells left to right, rows separated by
// `\r\n` (raw mode turns off output post-processing, so a bare `\n` would
// not return the carriage). Attribute codes are emitted only when they
// change from the previous cell, in the order style, foreground,
// background.
//
// SGR 0 clears colors as well as the style. So whenever the style changes
// away from something other than `Reset`, a reset goes out first and any
// non-default colors are sent again after the new style.
//
// A non-default background is reset before each row separator, otherwise
// some terminals paint the rest of the line with it.

use cellwin_term::ansi;
use cellwin_term::color::{Color, Style};
use cellwin_term::error::Result;
use tracing::trace;

use crate::tree::{WindowId, WindowTree};
use crate::window::Window;

// ─── SGR State ───────────────────────────────────────────────────────────────

/// The attributes the terminal is currently drawing with.
struct SgrState {
    fg: Color,
    bg: Color,
    style: Style,
}

impl SgrState {
    const fn new() -> Self {
        Self {
            fg: Color::RESET,
            bg: Color::RESET,
            style: Style::Reset,
        }
    }

    /// Emit whatever it takes to draw with `fg`, `bg` and `style`.
    fn apply(&mut self, out: &mut Vec<u8>, fg: Color, bg: Color, style: Style) {
        if style != self.style {
            if self.style != Style::Reset {
                ansi::reset(out).ok();
                self.fg = Color::RESET;
                self.bg = Color::RESET;
            }
            if style != Style::Reset {
                ansi::style(out, style).ok();
            }
            self.style = style;
        }
        if fg != self.fg {
            ansi::fg(out, fg).ok();
            self.fg = fg;
        }
        if bg != self.bg {
            ansi::bg(out, bg).ok();
            self.bg = bg;
        }
    }

    /// Return the terminal to default attributes.
    fn finish(&mut self, out: &mut Vec<u8>) {
        if self.style == Style::Reset {
            if self.fg != Color::RESET {
                ansi::fg(out, Color::RESET).ok();
            }
            if self.bg != Color::RESET {
                ansi::bg(out, Color::RESET).ok();
            }
        } else {
            ansi::reset(out).ok();
        }
        *self = Self::new();
    }
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Render every cell of `win`, resolving `Unspecified` attributes against
/// its defaults. Cursor state is left alone.
#[must_use]
pub fn render_window(win: &Window) -> Vec<u8> {
    let mut out = Vec::with_capacity(win.width() * win.height() * 2);
    render_into(&mut out, win);
    out
}

fn render_into(out: &mut Vec<u8>, win: &Window) {
    let mut state = SgrState::new();
    let mut text = String::with_capacity(4);

    for y in 0..win.height() {
        if y > 0 {
            if state.bg != Color::RESET {
                ansi::bg(out, Color::RESET).ok();
                state.bg = Color::RESET;
            }
            out.extend_from_slice(b"\r\n");
        }
        for x in 0..win.width() {
            let cell = win.resolved_cell(x, y);
            state.apply(
                out,
                cell.fg.or(Color::RESET),
                cell.bg.or(Color::RESET),
                cell.style.or(Style::Reset),
            );
            text.clear();
            cell.grapheme.push_to(&mut text);
            out.extend_from_slice(text.as_bytes());
        }
    }
    state.finish(out);
}

impl WindowTree {
    /// Flatten `id` and render it.
    ///
    /// Rendering the root also hides the cursor and homes it first, and
    /// afterwards places the cursor where [`visual_cursor`] says, showing
    /// or hiding it accordingly.
    ///
    /// [`visual_cursor`]: WindowTree::visual_cursor
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchWindow`](cellwin_term::Error::NoSuchWindow) for a
    /// dead handle.
    pub fn render(&self, id: WindowId) -> Result<Vec<u8>> {
        let flat = self.merge_children(id)?;
        let mut out = Vec::with_capacity(flat.width() * flat.height() * 2 + 32);
        let is_root = id == self.root();

        if is_root {
            ansi::cursor_hide(&mut out).ok();
            ansi::cursor_home(&mut out).ok();
        }
        render_into(&mut out, &flat);
        if is_root {
            let cursor = self.visual_cursor();
            ansi::move_cursor(&mut out, cursor.x, cursor.y).ok();
            if cursor.visible {
                ansi::cursor_show(&mut out).ok();
            } else {
                ansi::cursor_hide(&mut out).ok();
            }
        }

        trace!(%id, bytes = out.len(), "rendered");
        Ok(out)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::border::Border;
    use crate::window::Pen;
    use cellwin_term::color::NamedColor;
    use pretty_assertions::assert_eq;

    const RED: Color = Color::Named(NamedColor::Red);
    const BLUE: Color = Color::Named(NamedColor::Blue);

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    // ── Plain text ───────────────────────────────────────────────────

    #[test]
    fn plain_grid_has_no_codes() {
        let mut win = Window::new(3, 2);
        win.write("ab\ncd").unwrap();
        assert_eq!(text(&render_window(&win)), "ab \r\ncd ");
    }

    #[test]
    fn empty_window_renders_nothing() {
        assert_eq!(render_window(&Window::new(0, 0)), b"");
    }

    // ── Colors ───────────────────────────────────────────────────────

    #[test]
    fn color_emitted_only_on_change() {
        let mut win = Window::new(4, 1);
        win.write_with("ab", Pen::fg(RED)).unwrap();
        win.write("c").unwrap();
        assert_eq!(text(&render_window(&win)), "\x1b[31mab\x1b[39mc ");
    }

    #[test]
    fn trailing_color_is_reset() {
        let mut win = Window::new(2, 1);
        win.write_with("ab", Pen::new(RED, BLUE, Style::Unspecified))
            .unwrap();
        assert_eq!(
            text(&render_window(&win)),
            "\x1b[31m\x1b[44mab\x1b[39m\x1b[49m"
        );
    }

    #[test]
    fn background_reset_before_row_break() {
        let mut win = Window::new(1, 2);
        win.fill_bg(0, 0, 1, 2, BLUE).unwrap();
        assert_eq!(
            text(&render_window(&win)),
            "\x1b[44m \x1b[49m\r\n\x1b[44m \x1b[49m"
        );
    }

    #[test]
    fn window_defaults_are_used() {
        let mut win = Window::new(1, 1);
        win.set_default_fg(RED);
        assert_eq!(text(&render_window(&win)), "\x1b[31m \x1b[39m");
    }

    #[test]
    fn rgb_colors() {
        let mut win = Window::new(1, 1);
        win.set_fg(0, 0, Color::Rgb(1, 2, 3)).unwrap();
        assert_eq!(text(&render_window(&win)), "\x1b[38;2;1;2;3m \x1b[39m");
    }

    // ── Styles ───────────────────────────────────────────────────────

    #[test]
    fn style_change_resets_and_restores_colors() {
        let mut win = Window::new(3, 1);
        win.set_default_fg(RED);
        win.set_style(0, 0, Style::Bold).unwrap();
        win.set_style(1, 0, Style::Italic).unwrap();
        assert_eq!(
            text(&render_window(&win)),
            concat!(
                "\x1b[1m\x1b[31m ",
                "\x1b[0m\x1b[3m\x1b[31m ",
                "\x1b[0m\x1b[31m ",
                "\x1b[39m",
            )
        );
    }

    #[test]
    fn style_from_reset_needs_no_reset() {
        let mut win = Window::new(2, 1);
        win.set_style(1, 0, Style::Underline).unwrap();
        assert_eq!(text(&render_window(&win)), " \x1b[4m \x1b[0m");
    }

    // ── Tree rendering ───────────────────────────────────────────────

    #[test]
    fn root_render_places_cursor() {
        let mut tree = WindowTree::new(Window::new(2, 1));
        let root = tree.root();
        tree.window_mut(root).unwrap().write("a").unwrap();
        let out = text(&tree.render(root).unwrap());
        assert_eq!(out, "\x1b[?25l\x1b[Ha \x1b[1;2H\x1b[?25h");
    }

    #[test]
    fn root_render_hides_obscured_cursor() {
        let mut tree = WindowTree::new(Window::new(3, 3));
        let root = tree.root();
        let child = tree.new_child(root, 1, 1, 1, 1, Border::None).unwrap();
        tree.show(child).unwrap();
        tree.window_mut(root).unwrap().set_cursor(1, 1).unwrap();
        let out = text(&tree.render(root).unwrap());
        assert!(out.ends_with("\x1b[2;2H\x1b[?25l"));
    }

    #[test]
    fn child_render_has_no_cursor_codes() {
        let mut tree = WindowTree::new(Window::new(4, 4));
        let child = tree
            .new_child(tree.root(), 0, 0, 2, 1, Border::None)
            .unwrap();
        tree.window_mut(child).unwrap().write("hi").unwrap();
        assert_eq!(text(&tree.render(child).unwrap()), "hi");
    }
}
