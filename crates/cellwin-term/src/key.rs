// SPDX-License-Identifier: MIT
//
// Symbolic key values produced by the input decoder.
//
// A key is a code plus modifier flags. Printable input and the C0 control
// characters travel as `KeyCode::Char`, so Ctrl+A is `Char('\x01')` (the
// byte the terminal actually sends) and Enter is `Char('\r')`. Everything
// the terminal can only express as an escape sequence gets its own
// variant.
//
// Modifier flags follow the xterm CSI encoding, where the parameter in
// `ESC [ 1 ; m X` is `1 + bitmask`.

use std::fmt;

use bitflags::bitflags;

// ─── Modifiers ───────────────────────────────────────────────────────────────

bitflags! {
    /// Keyboard modifier flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const ALT   = 0b010;
        const CTRL  = 0b100;
    }
}

impl Modifiers {
    /// Decode an xterm modifier parameter (`2..=8`). Out-of-range values
    /// carry no modifiers.
    #[must_use]
    pub const fn from_param(param: u8) -> Self {
        if param < 2 {
            Self::empty()
        } else {
            Self::from_bits_truncate(param - 1)
        }
    }

    /// The xterm parameter for this modifier set (`1` when empty).
    #[must_use]
    pub const fn to_param(self) -> u8 {
        self.bits() + 1
    }
}

// ─── Key Codes ───────────────────────────────────────────────────────────────

/// Identity of a key, without modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A codepoint, including C0 control characters.
    Char(char),
    ArrowUp,
    ArrowDown,
    ArrowRight,
    ArrowLeft,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    /// "5" on the keypad with Num Lock off.
    Numeric5,
    /// F1 through F12.
    F(u8),
    /// An escape sequence with no entry in the decoder table.
    Unknown,
}

// ─── Key ─────────────────────────────────────────────────────────────────────

/// A decoded key press.
///
/// ```
/// use cellwin_term::key::{Key, KeyCode, Modifiers};
///
/// let key = Key::new(KeyCode::ArrowUp, Modifiers::CTRL);
/// assert_eq!(key.to_string(), "CTRL+ARROW_UP");
/// assert_eq!(Key::ctrl('c'), Key::char('\x03'));
/// assert_eq!(Key::ENTER.name(), "ENTER");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl Key {
    pub const BACKSPACE: Self = Self::char('\x08');
    pub const TAB: Self = Self::char('\t');
    pub const ENTER: Self = Self::char('\r');
    pub const ESC: Self = Self::char('\x1b');
    pub const DEL: Self = Self::char('\x7f');
    pub const UNKNOWN: Self = Self::new(KeyCode::Unknown, Modifiers::empty());

    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// An unmodified codepoint.
    #[inline]
    #[must_use]
    pub const fn char(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::empty())
    }

    /// An unmodified named key.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// The control character a terminal sends for Ctrl+`letter`.
    ///
    /// Letters map to `0x01..=0x1a` regardless of case; anything else is
    /// returned unchanged with the CTRL flag set.
    #[must_use]
    pub const fn ctrl(letter: char) -> Self {
        let upper = letter.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Self::char((upper as u8 - b'@') as char)
        } else {
            Self::new(KeyCode::Char(letter), Modifiers::CTRL)
        }
    }

    /// The same key with additional modifiers.
    #[inline]
    #[must_use]
    pub const fn with(self, modifiers: Modifiers) -> Self {
        Self::new(self.code, self.modifiers.union(modifiers))
    }

    /// Whether this is the decoder's "no table entry" sentinel.
    #[inline]
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self.code, KeyCode::Unknown)
    }

    /// Human-readable name such as `SHIFT+F5`, `CTRL_C` or `a`.
    #[must_use]
    pub fn name(self) -> String {
        self.to_string()
    }
}

impl From<char> for Key {
    fn from(ch: char) -> Self {
        Self::char(ch)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, label) in [
            (Modifiers::SHIFT, "SHIFT+"),
            (Modifiers::ALT, "ALT+"),
            (Modifiers::CTRL, "CTRL+"),
        ] {
            if self.modifiers.contains(flag) {
                f.write_str(label)?;
            }
        }

        match self.code {
            KeyCode::Char(ch) => write_char_name(f, ch),
            KeyCode::ArrowUp => f.write_str("ARROW_UP"),
            KeyCode::ArrowDown => f.write_str("ARROW_DOWN"),
            KeyCode::ArrowRight => f.write_str("ARROW_RIGHT"),
            KeyCode::ArrowLeft => f.write_str("ARROW_LEFT"),
            KeyCode::PageUp => f.write_str("PAGE_UP"),
            KeyCode::PageDown => f.write_str("PAGE_DOWN"),
            KeyCode::Home => f.write_str("HOME"),
            KeyCode::End => f.write_str("END"),
            KeyCode::Insert => f.write_str("INSERT"),
            KeyCode::Numeric5 => f.write_str("NUMERIC_5"),
            KeyCode::F(n) => write!(f, "F{n}"),
            KeyCode::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

fn write_char_name(f: &mut fmt::Formatter<'_>, ch: char) -> fmt::Result {
    match ch {
        '\x08' => f.write_str("BACKSPACE"),
        '\t' => f.write_str("TAB"),
        '\r' => f.write_str("ENTER"),
        '\x1b' => f.write_str("ESC"),
        '\x7f' => f.write_str("DEL"),
        ' ' => f.write_str("SPACE"),
        '\x01'..='\x1a' => write!(f, "CTRL_{}", char::from(ch as u8 + b'@')),
        '\x1c'..='\x1f' => write!(f, "CTRL_{}", ch as u8 - 0x1c + 4),
        '\0' => f.write_str("NUL"),
        _ if ch.is_control() => write!(f, "U+{:04X}", u32::from(ch)),
        _ => write!(f, "{ch}"),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
