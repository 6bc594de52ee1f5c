// SPDX-License-Identifier: MIT
//
// cellwin-window — the window model of cellwin.
//
// A `Window` is a grid of styled cells with a text cursor. A `WindowTree`
// nests child windows inside a root, each with an offset, a border, a
// title and a place in its siblings' z-order. Compositing flattens a tree
// into one window and rendering turns a window into escape-coded bytes
// for `cellwin_term::terminal::Terminal::draw`.
//
// Everything here is plain in-memory computation. No terminal access.

pub mod border;
pub mod compose;
pub mod options;
pub mod render;
pub mod tree;
pub mod window;

pub use border::Border;
pub use options::{WindowOptions, WrapPolicy};
pub use render::render_window;
pub use tree::{ChildFrame, WindowId, WindowTree};
pub use window::{Cursor, Pen, Window};
