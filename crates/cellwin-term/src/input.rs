// SPDX-License-Identifier: MIT
//
// Input decoder — raw codepoints in, symbolic keys out.
//
// Reading happens in two steps:
//
//   1. `poll_sequence` pulls one "sequence" off a `RawInput`: a single
//      codepoint, or ESC plus whatever follows it. After `ESC [` or
//      `ESC O` it keeps reading until a codepoint >= 0x40 arrives (that
//      final byte is part of the sequence).
//
//   2. `decode_sequence` looks the sequence up in a fixed table of known
//      CSI / SS3 encodings. There is no grammar: a sequence either matches
//      an entry exactly or it does not.
//
// Unmatched sequences are not errors. A two-codepoint `ESC x` is Alt+x;
// a longer unmatched CSI / SS3 sequence decodes to `KeyCode::Unknown` and
// the caller decides what to do with it.
//
// Two single-codepoint normalizations apply: LF is reported as Enter
// (Ctrl+Enter sends LF on some platforms), and since most terminals send
// DEL for the Backspace key, DEL is Backspace while BS is Ctrl+Backspace.

use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use tracing::{trace, warn};

use crate::key::{Key, KeyCode, Modifiers};

/// Delay between polls in the blocking readers.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

// ─── Raw Input ───────────────────────────────────────────────────────────────

/// A source of raw input codepoints.
///
/// `read_raw` returns `None` when nothing is pending. `read_continuation`
/// fetches the rest of an escape sequence that has already started and
/// must never wait longer than a sequence takes to arrive, otherwise a
/// lone ESC would swallow the next key press.
pub trait RawInput {
    fn read_raw(&mut self) -> Option<char>;

    fn read_continuation(&mut self) -> Option<char> {
        self.read_raw()
    }
}

/// Scripted input, mainly for tests.
impl RawInput for VecDeque<char> {
    fn read_raw(&mut self) -> Option<char> {
        self.pop_front()
    }
}

impl<T: RawInput + ?Sized> RawInput for &mut T {
    fn read_raw(&mut self) -> Option<char> {
        (**self).read_raw()
    }

    fn read_continuation(&mut self) -> Option<char> {
        (**self).read_continuation()
    }
}

// ─── Sequence Table ──────────────────────────────────────────────────────────

/// Keys whose modified forms are `ESC [ 1 ; m <final>`.
const CSI_LETTER_KEYS: [(char, KeyCode); 7] = [
    ('A', KeyCode::ArrowUp),
    ('B', KeyCode::ArrowDown),
    ('C', KeyCode::ArrowRight),
    ('D', KeyCode::ArrowLeft),
    ('H', KeyCode::Home),
    ('F', KeyCode::End),
    ('E', KeyCode::Numeric5),
];

/// F1-F4: unmodified `ESC O <final>`, modified `ESC [ 1 ; m <final>`.
const SS3_FUNCTION_KEYS: [(char, u8); 4] = [('P', 1), ('Q', 2), ('R', 3), ('S', 4)];

/// Keys encoded as `ESC [ n ~` / `ESC [ n ; m ~`.
const TILDE_KEYS: [(u8, Key); 12] = [
    (5, Key::plain(KeyCode::PageUp)),
    (6, Key::plain(KeyCode::PageDown)),
    (3, Key::DEL),
    (2, Key::plain(KeyCode::Insert)),
    (15, Key::plain(KeyCode::F(5))),
    (17, Key::plain(KeyCode::F(6))),
    (18, Key::plain(KeyCode::F(7))),
    (19, Key::plain(KeyCode::F(8))),
    (20, Key::plain(KeyCode::F(9))),
    (21, Key::plain(KeyCode::F(10))),
    (23, Key::plain(KeyCode::F(11))),
    (24, Key::plain(KeyCode::F(12))),
];

/// Modifier parameters a terminal may append (`2` = Shift .. `8` = all).
const MODIFIER_PARAMS: std::ops::RangeInclusive<u8> = 2..=8;

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn build_table() -> HashMap<Vec<char>, Key> {
    let mut table = HashMap::new();

    for &(fin, code) in &CSI_LETTER_KEYS {
        table.insert(chars(&format!("\x1b[{fin}")), Key::plain(code));
        for m in MODIFIER_PARAMS {
            let key = Key::new(code, Modifiers::from_param(m));
            table.insert(chars(&format!("\x1b[1;{m}{fin}")), key);
        }
    }

    for &(fin, n) in &SS3_FUNCTION_KEYS {
        table.insert(chars(&format!("\x1bO{fin}")), Key::plain(KeyCode::F(n)));
        for m in MODIFIER_PARAMS {
            let key = Key::new(KeyCode::F(n), Modifiers::from_param(m));
            table.insert(chars(&format!("\x1b[1;{m}{fin}")), key);
        }
    }

    for &(n, key) in &TILDE_KEYS {
        table.insert(chars(&format!("\x1b[{n}~")), key);
        for m in MODIFIER_PARAMS {
            table.insert(
                chars(&format!("\x1b[{n};{m}~")),
                key.with(Modifiers::from_param(m)),
            );
        }
    }

    table.insert(chars("\x1b\x7f"), Key::BACKSPACE.with(Modifiers::ALT));
    table.insert(
        chars("\x1b\x08"),
        Key::BACKSPACE.with(Modifiers::CTRL | Modifiers::ALT),
    );
    table.insert(chars("\x1b\r"), Key::ENTER.with(Modifiers::ALT));
    table.insert(chars("\x1b[Z"), Key::TAB.with(Modifiers::SHIFT));

    table
}

/// The escape-sequence table, built on first use.
pub fn sequences() -> &'static HashMap<Vec<char>, Key> {
    static TABLE: OnceLock<HashMap<Vec<char>, Key>> = OnceLock::new();
    TABLE.get_or_init(build_table)
}

// ─── Reading ─────────────────────────────────────────────────────────────────

/// Read one raw sequence without blocking.
///
/// Returns an empty vector when no input is pending. A sequence cut short
/// because input ran dry is returned as far as it got.
pub fn poll_sequence(input: &mut impl RawInput) -> Vec<char> {
    let mut seq = Vec::new();
    let Some(first) = input.read_raw() else {
        return seq;
    };
    seq.push(first);
    if first != '\x1b' {
        return seq;
    }

    let Some(second) = input.read_continuation() else {
        return seq;
    };
    seq.push(second);
    if second != '[' && second != 'O' {
        return seq;
    }

    while let Some(ch) = input.read_continuation() {
        seq.push(ch);
        if u32::from(ch) >= 0x40 {
            break;
        }
    }
    seq
}

/// Read one raw sequence, polling every [`POLL_INTERVAL`] until input
/// arrives.
pub fn read_sequence(input: &mut impl RawInput) -> Vec<char> {
    loop {
        let seq = poll_sequence(input);
        if !seq.is_empty() {
            return seq;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Decode a raw sequence into a key. `None` for an empty sequence.
///
/// ```
/// use cellwin_term::input::decode_sequence;
/// use cellwin_term::key::{Key, KeyCode, Modifiers};
///
/// let up: Vec<char> = "\x1b[1;5A".chars().collect();
/// assert_eq!(decode_sequence(&up), Some(Key::new(KeyCode::ArrowUp, Modifiers::CTRL)));
/// assert_eq!(decode_sequence(&['\r']), Some(Key::ENTER));
/// ```
#[must_use]
pub fn decode_sequence(seq: &[char]) -> Option<Key> {
    let key = match seq {
        [] => return None,
        ['\n'] => Key::ENTER,
        ['\x7f'] => Key::BACKSPACE,
        ['\x08'] => Key::BACKSPACE.with(Modifiers::CTRL),
        [ch] => Key::char(*ch),
        _ => {
            if let Some(key) = sequences().get(seq) {
                *key
            } else if let [_, second] = seq {
                Key::char(*second).with(Modifiers::ALT)
            } else {
                warn!(sequence = ?seq, "unknown escape sequence");
                Key::UNKNOWN
            }
        }
    };
    trace!(sequence = ?seq, key = %key, "decoded");
    Some(key)
}

/// Decode the next pending key without blocking.
pub fn poll_key(input: &mut impl RawInput) -> Option<Key> {
    decode_sequence(&poll_sequence(input))
}

/// Wait for the next key, polling every [`POLL_INTERVAL`].
pub fn read_key(input: &mut impl RawInput) -> Key {
    loop {
        if let Some(key) = poll_key(input) {
            return key;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
