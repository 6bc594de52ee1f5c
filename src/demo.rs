// SPDX-License-Identifier: MIT
//
// Window demo — four bordered child windows over a word-wrapped backdrop.
//
// Keys:
//
//   F1..F4            select window 1..4 (its border turns double)
//   Shift+F1..F4      bring the window to the front
//   Ctrl+F1..F4       hide or show the window
//   Arrows            move the selected window by one cell
//   Ctrl+Arrows       move it by its own size (PageUp/PageDown too)
//   text, Enter, BS   edit the selected window's text
//   Ctrl+C            quit
//
// Window 1 has a fixed size, window 2 grows in width, window 3 grows in
// height and word-wraps, window 4 sits inside window 1 and starts hidden.
// Text that would push a window out of its parent is refused.

use anyhow::{Context, Result};
use cellwin_term::color::{Color, NamedColor};
use cellwin_term::input::{POLL_INTERVAL, poll_key};
use cellwin_term::key::{Key, KeyCode, Modifiers};
use cellwin_term::terminal::Terminal;
use cellwin_window::{Border, Window, WindowId, WindowOptions, WindowTree};
use tracing::{debug, info};

use crate::config::Config;

const BACKDROP: &str = "Each bordered box is a child window composited over this text, \
    which lives in the root window and word-wraps to the terminal width. \
    F1 to F4 pick a window; typing edits it and Backspace takes text away. \
    Arrows move the picked window, Ctrl+Arrows jump by a whole window. \
    Shift+F1 to F4 raise a window above its siblings and Ctrl+F1 to F4 \
    toggle it. Window 4 is nested inside window 1 and starts out hidden. \
    Resize the terminal and the backdrop reflows. Ctrl+C quits. --- ";

/// Layout of one demo window.
struct Layout {
    x: isize,
    y: isize,
    width: usize,
    height: usize,
    fixed_width: bool,
    fixed_height: bool,
    wordwrap: bool,
    color: NamedColor,
    title: &'static str,
}

static LAYOUTS: [Layout; 4] = [
    Layout {
        x: 5,
        y: 7,
        width: 14,
        height: 8,
        fixed_width: true,
        fixed_height: true,
        wordwrap: false,
        color: NamedColor::Green,
        title: "1",
    },
    Layout {
        x: 22,
        y: 14,
        width: 8,
        height: 2,
        fixed_width: false,
        fixed_height: true,
        wordwrap: false,
        color: NamedColor::Red,
        title: "2",
    },
    Layout {
        x: 37,
        y: 8,
        width: 10,
        height: 4,
        fixed_width: true,
        fixed_height: false,
        wordwrap: true,
        color: NamedColor::BrightBlue,
        title: "3",
    },
    Layout {
        x: 4,
        y: 3,
        width: 5,
        height: 3,
        fixed_width: true,
        fixed_height: true,
        wordwrap: false,
        color: NamedColor::Yellow,
        title: "4",
    },
];

/// Whether the event loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

// ─── Demo State ──────────────────────────────────────────────────────────────

pub struct Demo {
    tree: WindowTree,
    windows: [WindowId; 4],
    text: [String; 4],
    active: usize,
    dirty: bool,
}

impl Demo {
    /// Build the demo for a `width × height` terminal.
    pub fn new(width: usize, height: usize, options: &WindowOptions) -> Result<Self> {
        let mut root_options = options.clone();
        root_options.wordwrap = true;
        let mut tree = WindowTree::new(Window::with_options(
            width.max(1),
            height.max(1),
            root_options,
        ));
        fill_backdrop(tree.window_mut(tree.root())?)?;

        let mut windows = Vec::with_capacity(LAYOUTS.len());
        for (i, layout) in LAYOUTS.iter().enumerate() {
            let parent = if i < 3 { tree.root() } else { windows[0] };
            let id = tree.new_child(
                parent,
                layout.x,
                layout.y,
                layout.width,
                layout.height,
                Border::Line,
            )?;
            let color = Color::Named(layout.color);
            tree.set_border_fg(id, color)?;
            tree.set_title(id, layout.title)?;
            let win = tree.window_mut(id)?;
            win.set_width_fixed(layout.fixed_width);
            win.set_height_fixed(layout.fixed_height);
            win.set_wordwrap(layout.wordwrap);
            win.set_default_fg(color);
            win.set_default_bg(Color::RESET);
            win.show_cursor();
            if i < 3 {
                tree.show(id)?;
            }
            windows.push(id);
        }
        let windows: [WindowId; 4] = windows
            .try_into()
            .map_err(|_| anyhow::anyhow!("expected four demo windows"))?;

        let mut demo = Self {
            tree,
            windows,
            text: Default::default(),
            active: 0,
            dirty: true,
        };
        demo.select(0)?;
        Ok(demo)
    }

    #[must_use]
    pub const fn tree(&self) -> &WindowTree {
        &self.tree
    }

    #[must_use]
    pub const fn active(&self) -> WindowId {
        self.windows[self.active]
    }

    /// Whether the screen needs redrawing.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Render the whole tree and mark the screen clean.
    pub fn frame(&mut self) -> Result<Vec<u8>> {
        self.dirty = false;
        Ok(self.tree.render(self.tree.root())?)
    }

    /// Resize the root to a new terminal size and reflow the backdrop.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        let root = self.tree.window_mut(self.tree.root())?;
        root.clear_grid();
        root.resize(width.max(1), height.max(1));
        fill_backdrop(root)?;
        self.dirty = true;
        Ok(())
    }

    // ── Keys ────────────────────────────────────────────────────────

    pub fn handle(&mut self, key: Key) -> Result<Flow> {
        if key == Key::ctrl('c') {
            return Ok(Flow::Quit);
        }
        let mods = key.modifiers;
        match key.code {
            KeyCode::F(n @ 1..=4) => {
                let index = usize::from(n - 1);
                if mods == Modifiers::CTRL {
                    self.toggle(index)?;
                } else if mods == Modifiers::SHIFT {
                    self.raise(index)?;
                } else if mods.is_empty() {
                    self.select(index)?;
                }
            }
            KeyCode::ArrowUp if mods.is_empty() => self.nudge(0, -1)?,
            KeyCode::ArrowDown if mods.is_empty() => self.nudge(0, 1)?,
            KeyCode::ArrowLeft if mods.is_empty() => self.nudge(-1, 0)?,
            KeyCode::ArrowRight if mods.is_empty() => self.nudge(1, 0)?,
            KeyCode::PageUp => self.jump(0, -1)?,
            KeyCode::PageDown => self.jump(0, 1)?,
            KeyCode::ArrowUp if mods == Modifiers::CTRL => self.jump(0, -1)?,
            KeyCode::ArrowDown if mods == Modifiers::CTRL => self.jump(0, 1)?,
            KeyCode::ArrowLeft if mods == Modifiers::CTRL => self.jump(-1, 0)?,
            KeyCode::ArrowRight if mods == Modifiers::CTRL => self.jump(1, 0)?,
            KeyCode::Char(_) => self.edit(key)?,
            _ => return Ok(Flow::Continue),
        }
        self.dirty = true;
        Ok(Flow::Continue)
    }

    fn select(&mut self, index: usize) -> Result<()> {
        let previous = self.windows[self.active];
        self.tree.set_border(previous, Border::Line)?;
        self.active = index;
        let id = self.windows[index];
        self.tree.set_border(id, Border::DoubleLine)?;
        self.tree.take_cursor(id)?;
        debug!(window = index + 1, "selected");
        Ok(())
    }

    fn toggle(&mut self, index: usize) -> Result<()> {
        let id = self.windows[index];
        if self.tree.is_visible(id)? {
            self.tree.hide(id)?;
        } else {
            self.tree.show(id)?;
        }
        Ok(())
    }

    /// Bring a window, and for a nested one its parent, to the front.
    fn raise(&mut self, index: usize) -> Result<()> {
        let id = self.windows[index];
        self.tree.to_foreground(id)?;
        match self.tree.parent(id)? {
            Some(parent) if parent != self.tree.root() => self.tree.to_foreground(parent)?,
            _ => {}
        }
        Ok(())
    }

    /// Width and height of the active window and of its parent, and the
    /// border margin to keep.
    fn geometry(&self) -> Result<(isize, isize, isize, isize, isize)> {
        let id = self.active();
        let win = self.tree.window(id)?;
        let parent = self
            .tree
            .parent(id)?
            .context("demo windows always have a parent")?;
        let parent = self.tree.window(parent)?;
        let margin = isize::from(self.tree.border(id)?.is_drawn());
        Ok((
            signed(win.width()),
            signed(win.height()),
            signed(parent.width()),
            signed(parent.height()),
            margin,
        ))
    }

    /// Move the active window one cell, staying inside its parent.
    fn nudge(&mut self, dx: isize, dy: isize) -> Result<()> {
        let id = self.active();
        let (w, h, pw, ph, margin) = self.geometry()?;
        let (x, y) = self.tree.offset(id)?;
        let (nx, ny) = (x + dx, y + dy);
        if nx >= margin && ny >= margin && nx + w <= pw && ny + h <= ph {
            self.tree.move_to(id, nx, ny)?;
        }
        Ok(())
    }

    /// Move the active window by its own size plus border, clamped to the
    /// parent.
    fn jump(&mut self, dx: isize, dy: isize) -> Result<()> {
        let id = self.active();
        let (w, h, pw, ph, margin) = self.geometry()?;
        let (x, y) = self.tree.offset(id)?;
        let nx = (x + dx * (w + 1)).min(pw - margin - w).max(margin);
        let ny = (y + dy * (h + 1)).min(ph - margin - h).max(margin);
        self.tree.move_to(id, nx, ny)?;
        Ok(())
    }

    /// Apply a text key to the active window.
    fn edit(&mut self, key: Key) -> Result<()> {
        if !self.tree.visual_cursor().visible {
            return Ok(());
        }
        let KeyCode::Char(ch) = key.code else {
            return Ok(());
        };
        let text = &mut self.text[self.active];
        if key == Key::ENTER {
            text.push('\n');
        } else if key == Key::BACKSPACE {
            text.pop();
        } else if key.modifiers.is_empty() && !ch.is_control() {
            text.push(ch);
        } else {
            return Ok(());
        }
        self.redraw_text()
    }

    /// Rewrite the active window's text, refusing whatever does not fit.
    fn redraw_text(&mut self) -> Result<()> {
        let id = self.active();
        let layout = &LAYOUTS[self.active];
        loop {
            let win = self.tree.window_mut(id)?;
            win.clear_grid();
            let text = &mut self.text[self.active];
            let consumed = win.write(text)?;
            text.truncate(consumed);
            win.trim(layout.width, layout.height);
            if self.tree.is_inside_parent(id)? || self.text[self.active].pop().is_none() {
                return Ok(());
            }
        }
    }
}

fn fill_backdrop(root: &mut Window) -> Result<()> {
    while root.write(BACKDROP)? == BACKDROP.len() {}
    Ok(())
}

#[allow(clippy::cast_possible_wrap)]
const fn signed(n: usize) -> isize {
    n as isize
}

// ─── Event Loop ──────────────────────────────────────────────────────────────

pub fn run(config: &Config) -> Result<()> {
    let mut term = Terminal::new(config.terminal).context("cannot set up the terminal")?;
    let mut demo = Demo::new(term.width(), term.height(), &config.window)?;
    info!(cols = term.width(), rows = term.height(), "window demo started");

    loop {
        if term.update_size() {
            demo.resize(term.width(), term.height())?;
        }
        if demo.is_dirty() {
            let frame = demo.frame()?;
            term.draw(&frame)?;
        }
        let Some(key) = poll_key(&mut term) else {
            std::thread::sleep(POLL_INTERVAL);
            continue;
        };
        if demo.handle(key)? == Flow::Quit {
            break;
        }
    }
    info!("window demo finished");
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn demo() -> Demo {
        Demo::new(80, 24, &WindowOptions::default()).unwrap()
    }

    fn type_text(demo: &mut Demo, text: &str) {
        for ch in text.chars() {
            demo.handle(Key::char(ch)).unwrap();
        }
    }

    #[test]
    fn starts_with_window_one_selected() {
        let demo = demo();
        let one = demo.active();
        assert_eq!(demo.tree().cursor_holder(), one);
        assert_eq!(demo.tree().border(one).unwrap(), Border::DoubleLine);
        assert!(demo.tree().visual_cursor().visible);
        assert!(demo.is_dirty());
    }

    #[test]
    fn window_four_starts_hidden_inside_one() {
        let demo = demo();
        let four = demo.windows[3];
        assert!(!demo.tree().is_visible(four).unwrap());
        assert_eq!(demo.tree().parent(four).unwrap(), Some(demo.windows[0]));
    }

    #[test]
    fn typing_fills_active_window() {
        let mut demo = demo();
        type_text(&mut demo, "hi\rthere");
        let win = demo.tree().window(demo.active()).unwrap();
        assert_eq!(win.row_text(0), "hi");
        assert_eq!(win.row_text(1), "there");
        demo.handle(Key::BACKSPACE).unwrap();
        let win = demo.tree().window(demo.active()).unwrap();
        assert_eq!(win.row_text(1), "ther");
    }

    #[test]
    fn growing_window_is_trimmed_back() {
        let mut demo = demo();
        demo.handle(Key::new(KeyCode::F(2), Modifiers::empty())).unwrap();
        type_text(&mut demo, "0123456789ab");
        let two = demo.active();
        assert_eq!(demo.tree().window(two).unwrap().width(), 13);
        for _ in 0..12 {
            demo.handle(Key::BACKSPACE).unwrap();
        }
        assert_eq!(demo.tree().window(two).unwrap().width(), 8);
    }

    #[test]
    fn arrows_move_and_ctrl_f_toggles() {
        let mut demo = demo();
        let one = demo.active();
        demo.handle(Key::plain(KeyCode::ArrowRight)).unwrap();
        assert_eq!(demo.tree().offset(one).unwrap(), (6, 7));
        demo.handle(Key::new(KeyCode::F(1), Modifiers::CTRL)).unwrap();
        assert!(!demo.tree().is_visible(one).unwrap());
        assert!(!demo.tree().visual_cursor().visible);
    }

    #[test]
    fn jump_is_clamped_to_parent() {
        let mut demo = demo();
        let one = demo.active();
        for _ in 0..10 {
            demo.handle(Key::new(KeyCode::ArrowLeft, Modifiers::CTRL))
                .unwrap();
        }
        assert_eq!(demo.tree().offset(one).unwrap().0, 1);
    }

    #[test]
    fn frame_renders_and_cleans() {
        let mut demo = demo();
        let frame = demo.frame().unwrap();
        assert!(!frame.is_empty());
        assert!(!demo.is_dirty());
    }

    #[test]
    fn ctrl_c_quits() {
        let mut demo = demo();
        assert_eq!(demo.handle(Key::ctrl('c')).unwrap(), Flow::Quit);
    }
}
