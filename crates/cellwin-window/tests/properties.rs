// SPDX-License-Identifier: MIT
//
// Property tests for the window model: text round-trips through an
// auto-growing window, the cursor stays inside fixed windows, word-wrap
// respects the width without tearing grapheme clusters, compositing
// honors z-order, and hidden ancestors hide the cursor.

use cellwin_window::{Border, Window, WindowTree};
use proptest::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

fn row_graphemes(win: &Window, y: usize) -> Vec<String> {
    (0..win.width())
        .map(|x| win.get_grapheme(x, y).unwrap().to_string())
        .collect()
}

// ─── Text Insertion ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn auto_window_round_trips(lines in prop::collection::vec("[a-zA-Z0-9 !?.é日ß-]{0,30}", 1..6)) {
        let text = lines.join("\n");
        let mut win = Window::new(0, 0);
        prop_assert_eq!(win.write(&text).unwrap(), text.len());

        for (y, line) in lines.iter().enumerate() {
            let expected: Vec<String> = line.graphemes(true).map(str::to_owned).collect();
            let got = row_graphemes(&win, y);
            prop_assert_eq!(&got[..expected.len()], &expected[..]);
            prop_assert!(got[expected.len()..].iter().all(|g| g == " "));
        }
    }

    #[test]
    fn cursor_stays_inside_fixed_window(
        w in 1usize..12,
        h in 1usize..6,
        text in "[a-z \t\r\n-]{0,80}",
        wordwrap in any::<bool>(),
    ) {
        let mut win = Window::new(w, h);
        win.set_wordwrap(wordwrap);
        let consumed = win.write(&text).unwrap();
        prop_assert!(consumed <= text.len());
        prop_assert!(text.is_char_boundary(consumed));
        let cursor = win.cursor();
        prop_assert!(cursor.x < w, "x {} >= {}", cursor.x, w);
        prop_assert!(cursor.y < h, "y {} >= {}", cursor.y, h);
        prop_assert_eq!((win.width(), win.height()), (w, h));
    }

    #[test]
    fn wordwrap_respects_width_and_clusters(
        w in 1usize..16,
        words in prop::collection::vec("(q\u{301}|[a-z]){1,12}", 0..20),
    ) {
        let text = words.join(" ");
        let mut win = Window::new(w, 0);
        prop_assert_eq!(win.write_wordwrap(&text).unwrap(), text.len());
        prop_assert_eq!(win.width(), w);

        let written: Vec<String> = (0..win.height())
            .flat_map(|y| row_graphemes(&win, y))
            .filter(|g| g != " ")
            .collect();
        let expected: Vec<String> = text
            .graphemes(true)
            .filter(|g| *g != " ")
            .map(str::to_owned)
            .collect();
        prop_assert_eq!(written, expected);
    }
}

// ─── Tree ────────────────────────────────────────────────────────────────────

fn rect() -> impl Strategy<Value = (isize, isize, usize, usize)> {
    (-2isize..8, -2isize..4, 1usize..5, 1usize..4)
}

fn inside((x, y, w, h): (isize, isize, usize, usize), px: isize, py: isize) -> bool {
    let (w, h) = (isize::try_from(w).unwrap(), isize::try_from(h).unwrap());
    px >= x && py >= y && px < x + w && py < y + h
}

proptest! {
    #[test]
    fn front_child_dominates_overlap(a in rect(), b in rect(), swap in any::<bool>()) {
        let mut tree = WindowTree::new(Window::new(8, 4));
        let root = tree.root();
        let mut spawn = |(x, y, w, h): (isize, isize, usize, usize), ch: char| {
            let id = tree.new_child(root, x, y, w, h, Border::None).unwrap();
            let fill: String = std::iter::repeat_n(ch, w * h).collect();
            tree.window_mut(id).unwrap().write(&fill).unwrap();
            tree.show(id).unwrap();
            id
        };
        let id_a = spawn(a, 'a');
        spawn(b, 'b');
        let (front, back) = if swap {
            tree.to_foreground(id_a).unwrap();
            ((a, "a"), (b, "b"))
        } else {
            ((b, "b"), (a, "a"))
        };

        let flat = tree.merge_children(root).unwrap();
        for py in 0..4usize {
            for px in 0..8usize {
                let (sx, sy) = (isize::try_from(px).unwrap(), isize::try_from(py).unwrap());
                let expected = if inside(front.0, sx, sy) {
                    front.1
                } else if inside(back.0, sx, sy) {
                    back.1
                } else {
                    " "
                };
                let got = flat.get_grapheme(px, py).unwrap().to_string();
                prop_assert_eq!(got, expected, "at ({}, {})", px, py);
            }
        }
    }

    #[test]
    fn hidden_ancestor_hides_cursor(depth in 1usize..5, hidden in 0usize..5) {
        let hidden = hidden % depth;
        let mut tree = WindowTree::new(Window::new(40, 40));
        let mut chain = Vec::new();
        let mut parent = tree.root();
        for _ in 0..depth {
            let id = tree.new_child(parent, 1, 1, 30, 30, Border::Line).unwrap();
            tree.show(id).unwrap();
            chain.push(id);
            parent = id;
        }
        tree.take_cursor(parent).unwrap();
        prop_assert!(tree.visual_cursor().visible);

        tree.hide(chain[hidden]).unwrap();
        prop_assert!(!tree.visual_cursor().visible);
    }
}
