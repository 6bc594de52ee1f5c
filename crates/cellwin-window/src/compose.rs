// SPDX-License-Identifier: MIT
//
// Compositor — flattens a window and its visible descendants into one grid.
//
// The result starts as a copy of the window's own grid. Each visible child
// is flattened the same way, then copied on top at its offset, back to
// front, so a child in front wins every cell it shares with one behind it.
// Its border and title go one cell outside its rectangle. Anything that
// falls outside the window being flattened is dropped.
//
// Cells copied from a child are resolved against the child's defaults, so
// a child with its own colors keeps them on a parent with different ones.
// The window's own cells stay as they are and resolve at render time.
//
// Flattening only reads the tree. The output is a fresh `Window` the
// caller owns.

use cellwin_term::cell::Cell;
use cellwin_term::color::Style;
use cellwin_term::error::Result;

use crate::tree::{ChildFrame, WindowId, WindowTree};
use crate::window::{Window, to_signed};

impl WindowTree {
    /// Flatten `id` and its visible descendants into a new window of the
    /// same size. The cursor is `id`'s own.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchWindow`](cellwin_term::Error::NoSuchWindow) for a
    /// dead handle.
    pub fn merge_children(&self, id: WindowId) -> Result<Window> {
        let node = self.node(id)?;
        let mut out = node.window.clone();

        for &child_id in &node.children {
            let Some(frame) = self.node(child_id)?.frame() else {
                continue;
            };
            if !frame.visible {
                continue;
            }
            let flat = self.merge_children(child_id)?;
            out.blit(&flat, frame.x, frame.y);
            draw_frame(&mut out, frame, flat.width(), flat.height());
        }
        Ok(out)
    }
}

/// Border and centered title around a `width × height` child.
fn draw_frame(out: &mut Window, frame: &ChildFrame, width: usize, height: usize) {
    if !frame.border.is_drawn() {
        return;
    }
    out.print_rect(
        frame.x - 1,
        frame.y - 1,
        width + 2,
        height + 2,
        frame.border,
        frame.border_fg,
        frame.border_bg,
    );

    let title = &frame.title[..frame.title.len().min(width)];
    let start = frame.x + to_signed((width - title.len()) / 2);
    for (i, &grapheme) in title.iter().enumerate() {
        out.put_clipped(
            start + to_signed(i),
            frame.y - 1,
            Cell::styled(grapheme, frame.border_fg, frame.border_bg, Style::Unspecified),
        );
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
