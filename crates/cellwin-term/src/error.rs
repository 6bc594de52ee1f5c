// SPDX-License-Identifier: MIT
//
// Error type shared by every cellwin crate.
//
// Three kinds of failure are part of the model itself: addressing a cell
// outside a fixed-size window, building a cell from text that is not
// exactly one grapheme cluster, and receiving a garbled cursor-position
// report from the terminal. Everything else is plumbing (dead window
// handles, I/O on the tty).
//
// Running out of room while writing text is NOT an error. Writes return
// how much input they consumed and the caller compares.

use std::io;

use thiserror::Error;

/// Errors produced by cellwin operations.
///
/// Mutating operations check their arguments before touching any state,
/// so an `Err` always leaves the target exactly as it was.
#[derive(Debug, Error)]
pub enum Error {
    /// A position outside a fixed-size window was addressed.
    #[error("position ({x}, {y}) is outside the fixed {width}x{height} window")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Text that does not normalize to exactly one grapheme cluster of at
    /// most [`MAX_GRAPHEME_LENGTH`](crate::cell::MAX_GRAPHEME_LENGTH)
    /// codepoints.
    #[error("invalid grapheme {0:?}: expected one cluster of at most 4 codepoints")]
    InvalidGrapheme(String),

    /// A malformed or truncated terminal response.
    #[error("could not parse terminal response: {0}")]
    Parse(String),

    /// A window handle that no longer (or never did) name a live window.
    #[error("no window with id {0}")]
    NoSuchWindow(u32),

    /// The operation is only defined for child windows.
    #[error("operation not permitted on the root window")]
    RootWindow,

    /// I/O failure talking to the terminal.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias used across cellwin.
pub type Result<T> = std::result::Result<T, Error>;

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_message_names_position_and_size() {
        let err = Error::OutOfBounds {
            x: 12,
            y: 3,
            width: 10,
            height: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("(12, 3)"));
        assert!(msg.contains("10x5"));
    }

    #[test]
    fn io_errors_convert() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn parse_error_keeps_detail() {
        let err = Error::Parse("missing ';'".into());
        assert!(err.to_string().contains("missing ';'"));
    }
}
