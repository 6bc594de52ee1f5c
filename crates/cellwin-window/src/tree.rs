// SPDX-License-Identifier: MIT
//
// WindowTree — a root window and its nested child windows.
//
// Every window lives in one map keyed by `WindowId`. A node is either the
// root or a child; a child's frame records its parent, its offset inside
// the parent, its border and title, and whether it is shown. Each node
// keeps its children in z-order: the first is at the back, the last is in
// front.
//
// Handles are never reused. A destroyed window's id stays dead, so a
// stale handle fails with `Error::NoSuchWindow` instead of silently
// naming some newer window.
//
// Visual cursor:
//
//   Exactly one window in the tree holds the cursor that is shown on the
//   terminal (the root, unless `take_cursor` hands it to a child). Where
//   that cursor appears, and whether it appears at all, is derived on
//   demand by `visual_cursor`; nothing is cached. Destroying the holder
//   hands the cursor back to the root.

use std::collections::HashMap;
use std::fmt;

use cellwin_term::cell::Grapheme;
use cellwin_term::color::Color;
use cellwin_term::error::{Error, Result};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::border::Border;
use crate::window::{Cursor, Window, to_signed};

// ─── Handles ─────────────────────────────────────────────────────────────────

/// Stable handle to a window in a [`WindowTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u32);

impl WindowId {
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────────

/// Placement and decoration of a child window inside its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildFrame {
    pub parent: WindowId,
    /// Offset of the child's top-left cell in parent coordinates. May be
    /// negative or past the parent's edge; such parts are clipped.
    pub x: isize,
    pub y: isize,
    pub border: Border,
    pub border_fg: Color,
    pub border_bg: Color,
    pub title: Vec<Grapheme>,
    pub visible: bool,
}

impl ChildFrame {
    /// Whether `(px, py)` in parent coordinates falls on the child or on
    /// its border.
    fn covers(&self, width: usize, height: usize, px: isize, py: isize) -> bool {
        let pad = isize::from(self.border.is_drawn());
        let (w, h) = (to_signed(width), to_signed(height));
        px >= self.x - pad && px < self.x + w + pad && py >= self.y - pad && py < self.y + h + pad
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Root,
    Child(ChildFrame),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) window: Window,
    pub(crate) kind: NodeKind,
    /// Back to front.
    pub(crate) children: Vec<WindowId>,
}

impl Node {
    pub(crate) const fn frame(&self) -> Option<&ChildFrame> {
        match &self.kind {
            NodeKind::Root => None,
            NodeKind::Child(frame) => Some(frame),
        }
    }

    /// Shown as part of its parent. The root always is.
    const fn is_shown(&self) -> bool {
        match &self.kind {
            NodeKind::Root => true,
            NodeKind::Child(frame) => frame.visible,
        }
    }
}

// ─── WindowTree ──────────────────────────────────────────────────────────────

/// A root window owning a tree of child windows.
#[derive(Debug, Clone)]
pub struct WindowTree {
    nodes: HashMap<WindowId, Node>,
    root: WindowId,
    next_id: u32,
    cursor_holder: WindowId,
}

impl WindowTree {
    /// A tree holding only `root`.
    #[must_use]
    pub fn new(root: Window) -> Self {
        let id = WindowId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            id,
            Node {
                window: root,
                kind: NodeKind::Root,
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            root: id,
            next_id: 1,
            cursor_holder: id,
        }
    }

    #[inline]
    #[must_use]
    pub const fn root(&self) -> WindowId {
        self.root
    }

    /// Whether `id` names a live window.
    #[must_use]
    pub fn contains(&self, id: WindowId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of live windows, the root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root cannot be destroyed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: WindowId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(Error::NoSuchWindow(id.0))
    }

    fn node_mut(&mut self, id: WindowId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(Error::NoSuchWindow(id.0))
    }

    fn frame_mut(&mut self, id: WindowId) -> Result<&mut ChildFrame> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Root => Err(Error::RootWindow),
            NodeKind::Child(frame) => Ok(frame),
        }
    }

    /// The child frame of `id`.
    ///
    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn frame(&self, id: WindowId) -> Result<&ChildFrame> {
        self.node(id)?.frame().ok_or(Error::RootWindow)
    }

    /// # Errors
    ///
    /// [`Error::NoSuchWindow`] for a dead handle.
    pub fn window(&self, id: WindowId) -> Result<&Window> {
        Ok(&self.node(id)?.window)
    }

    /// # Errors
    ///
    /// [`Error::NoSuchWindow`] for a dead handle.
    pub fn window_mut(&mut self, id: WindowId) -> Result<&mut Window> {
        Ok(&mut self.node_mut(id)?.window)
    }

    // ── Structure ───────────────────────────────────────────────────

    /// Create a `width × height` child of `parent` at `(x, y)` in the
    /// parent's coordinates, in front of its siblings.
    ///
    /// The child starts hidden and inherits the parent's window options.
    /// Zero dimensions grow automatically, as with [`Window::new`].
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchWindow`] if `parent` is dead.
    pub fn new_child(
        &mut self,
        parent: WindowId,
        x: isize,
        y: isize,
        width: usize,
        height: usize,
        border: Border,
    ) -> Result<WindowId> {
        let options = self.node(parent)?.window.options().clone();
        let id = WindowId(self.next_id);
        self.next_id += 1;

        self.nodes.insert(
            id,
            Node {
                window: Window::with_options(width, height, options),
                kind: NodeKind::Child(ChildFrame {
                    parent,
                    x,
                    y,
                    border,
                    border_fg: Color::UNSPECIFIED,
                    border_bg: Color::UNSPECIFIED,
                    title: Vec::new(),
                    visible: false,
                }),
                children: Vec::new(),
            },
        );
        self.node_mut(parent)?.children.push(id);
        debug!(%id, %parent, x, y, width, height, ?border, "child window created");
        Ok(id)
    }

    /// Destroy `id` and everything below it.
    ///
    /// A cursor holder inside the removed subtree hands the cursor back to
    /// the root.
    ///
    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn destroy(&mut self, id: WindowId) -> Result<()> {
        let parent = self.frame(id)?.parent;
        self.node_mut(parent)?.children.retain(|&c| c != id);

        let mut stack = vec![id];
        let mut removed = 0usize;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
                removed += 1;
            }
            if next == self.cursor_holder {
                self.cursor_holder = self.root;
                debug!(from = %next, "cursor holder destroyed, cursor returned to root");
            }
        }
        debug!(%id, %parent, removed, "child window destroyed");
        Ok(())
    }

    /// The parent of `id`, `None` for the root.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchWindow`] for a dead handle.
    pub fn parent(&self, id: WindowId) -> Result<Option<WindowId>> {
        Ok(self.node(id)?.frame().map(|f| f.parent))
    }

    /// Children of `id`, back to front.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchWindow`] for a dead handle.
    pub fn children(&self, id: WindowId) -> Result<&[WindowId]> {
        Ok(&self.node(id)?.children)
    }

    /// Position of `id` among its siblings; 0 is the back.
    ///
    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn child_index(&self, id: WindowId) -> Result<usize> {
        let parent = self.frame(id)?.parent;
        self.node(parent)?
            .children
            .iter()
            .position(|&c| c == id)
            .ok_or(Error::NoSuchWindow(id.0))
    }

    // ── Z-order ─────────────────────────────────────────────────────

    /// Move `id` in front of its siblings.
    ///
    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn to_foreground(&mut self, id: WindowId) -> Result<()> {
        let parent = self.frame(id)?.parent;
        let siblings = &mut self.node_mut(parent)?.children;
        siblings.retain(|&c| c != id);
        siblings.push(id);
        debug!(%id, "child window to foreground");
        Ok(())
    }

    /// Move `id` behind its siblings.
    ///
    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn to_background(&mut self, id: WindowId) -> Result<()> {
        let parent = self.frame(id)?.parent;
        let siblings = &mut self.node_mut(parent)?.children;
        siblings.retain(|&c| c != id);
        siblings.insert(0, id);
        debug!(%id, "child window to background");
        Ok(())
    }

    // ── Frame ───────────────────────────────────────────────────────

    /// Move `id` to `(x, y)` in its parent. Returns the previous offset.
    ///
    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn move_to(&mut self, id: WindowId, x: isize, y: isize) -> Result<(isize, isize)> {
        let frame = self.frame_mut(id)?;
        let previous = (frame.x, frame.y);
        frame.x = x;
        frame.y = y;
        Ok(previous)
    }

    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn offset(&self, id: WindowId) -> Result<(isize, isize)> {
        let frame = self.frame(id)?;
        Ok((frame.x, frame.y))
    }

    /// Whether the child's rectangle, border excluded, lies entirely
    /// inside its parent.
    ///
    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn is_inside_parent(&self, id: WindowId) -> Result<bool> {
        let node = self.node(id)?;
        let frame = node.frame().ok_or(Error::RootWindow)?;
        let parent = &self.node(frame.parent)?.window;
        Ok(frame.x >= 0
            && frame.y >= 0
            && frame.x + to_signed(node.window.width()) <= to_signed(parent.width())
            && frame.y + to_signed(node.window.height()) <= to_signed(parent.height()))
    }

    /// Set the title drawn centered on the top border.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGrapheme`] if a cluster of `title` holds more than
    /// four codepoints, [`Error::RootWindow`] for the root,
    /// [`Error::NoSuchWindow`] for a dead handle.
    pub fn set_title(&mut self, id: WindowId, title: &str) -> Result<()> {
        let graphemes = title
            .graphemes(true)
            .map(Grapheme::new)
            .collect::<Result<Vec<_>>>()?;
        self.frame_mut(id)?.title = graphemes;
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn title(&self, id: WindowId) -> Result<String> {
        let mut out = String::new();
        for g in &self.frame(id)?.title {
            g.push_to(&mut out);
        }
        Ok(out)
    }

    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn set_border(&mut self, id: WindowId, border: Border) -> Result<()> {
        self.frame_mut(id)?.border = border;
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn border(&self, id: WindowId) -> Result<Border> {
        Ok(self.frame(id)?.border)
    }

    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn set_border_fg(&mut self, id: WindowId, fg: Color) -> Result<()> {
        self.frame_mut(id)?.border_fg = fg;
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn set_border_bg(&mut self, id: WindowId, bg: Color) -> Result<()> {
        self.frame_mut(id)?.border_bg = bg;
        Ok(())
    }

    // ── Visibility ──────────────────────────────────────────────────

    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn show(&mut self, id: WindowId) -> Result<()> {
        self.frame_mut(id)?.visible = true;
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::RootWindow`] for the root, [`Error::NoSuchWindow`] for a
    /// dead handle.
    pub fn hide(&mut self, id: WindowId) -> Result<()> {
        self.frame_mut(id)?.visible = false;
        Ok(())
    }

    /// Whether `id` itself is shown. The root always is. Says nothing
    /// about its ancestors.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchWindow`] for a dead handle.
    pub fn is_visible(&self, id: WindowId) -> Result<bool> {
        Ok(self.node(id)?.is_shown())
    }

    // ── Visual Cursor ───────────────────────────────────────────────

    /// Hand the terminal cursor to `id`.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchWindow`] for a dead handle.
    pub fn take_cursor(&mut self, id: WindowId) -> Result<()> {
        self.node(id)?;
        if self.cursor_holder != id {
            debug!(from = %self.cursor_holder, to = %id, "cursor holder reassigned");
            self.cursor_holder = id;
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub const fn cursor_holder(&self) -> WindowId {
        self.cursor_holder
    }

    /// Where the holder's cursor lands on the root, and whether it can be
    /// seen there.
    ///
    /// The cursor is hidden when the holder's own cursor is hidden, when
    /// the holder or any ancestor is hidden, when it lands on one of the
    /// holder's visible children (border included), when it falls outside
    /// any window on the way up, or when a visible sibling in front of the
    /// path covers it at any level.
    #[must_use]
    pub fn visual_cursor(&self) -> Cursor {
        let hidden = |x: isize, y: isize| Cursor {
            x: usize::try_from(x).unwrap_or(0),
            y: usize::try_from(y).unwrap_or(0),
            visible: false,
        };

        let Ok(holder) = self.node(self.cursor_holder) else {
            return hidden(0, 0);
        };
        let local = holder.window.cursor();
        let (mut x, mut y) = (to_signed(local.x), to_signed(local.y));

        if !local.visible
            || local.x >= holder.window.width()
            || local.y >= holder.window.height()
        {
            return hidden(x, y);
        }
        if self.covered_by_children(&holder.children, x, y) {
            return hidden(x, y);
        }

        let mut id = self.cursor_holder;
        let mut node = holder;
        while let Some(frame) = node.frame() {
            if !frame.visible {
                return hidden(x, y);
            }
            let Ok(parent) = self.node(frame.parent) else {
                return hidden(x, y);
            };
            x += frame.x;
            y += frame.y;
            if x < 0
                || y < 0
                || x >= to_signed(parent.window.width())
                || y >= to_signed(parent.window.height())
            {
                return hidden(x, y);
            }
            let in_front = parent
                .children
                .iter()
                .skip_while(|&&c| c != id)
                .skip(1)
                .copied()
                .collect::<Vec<_>>();
            if self.covered_by_children(&in_front, x, y) {
                return hidden(x, y);
            }
            id = frame.parent;
            node = parent;
        }

        Cursor {
            x: usize::try_from(x).unwrap_or(0),
            y: usize::try_from(y).unwrap_or(0),
            visible: true,
        }
    }

    /// Whether any visible window among `ids` covers `(x, y)` in their
    /// parent's coordinates.
    fn covered_by_children(&self, ids: &[WindowId], x: isize, y: isize) -> bool {
        ids.iter().filter_map(|c| self.nodes.get(c)).any(|child| {
            child.frame().is_some_and(|f| {
                f.visible && f.covers(child.window.width(), child.window.height(), x, y)
            })
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
