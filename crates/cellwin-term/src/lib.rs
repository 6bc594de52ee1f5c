// SPDX-License-Identifier: MIT
//
// cellwin-term — the terminal-facing half of cellwin.
//
// Leaf types (colors, styles, cells) shared by the window model, the
// escape sequences the renderer emits, and the input side: raw codepoint
// reads from a tty in raw mode and the table-driven decoder that turns
// them into keys.
//
// Nothing here knows about windows. The model crate builds on these types
// and hands finished byte streams back to `Terminal::draw`.

pub mod ansi;
pub mod cell;
pub mod color;
pub mod error;
pub mod input;
pub mod key;
pub mod terminal;

pub use error::{Error, Result};
