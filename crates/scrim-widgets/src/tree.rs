#![forbid(unsafe_code)]

//! Virtualized tree container.
//!
//! The logical collection is a depth-first flattening of an
//! expand/collapse forest. Expansion state lives on the data node, not
//! on the flattened row, so it survives re-flattening; toggling a node
//! re-flattens in full before the next frame's window computation.

use crate::arbiter::PointerArbiter;
use crate::component::{Component, ComponentCore, CoreConfig, Layers};
use crate::hit::HitState;
use crate::scroll::ScrollWindow;
use crate::scrollbar::Scrollbar;
use crate::{Palette, refresh_chrome};
use scrim_core::geometry::{Insets, Rect};
use scrim_core::input::{InputSnapshot, LogicalKey};
use scrim_render::surface::{SurfaceError, SurfaceFactory, TextAlign};

/// A node in the tree forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
    expanded: bool,
}

impl TreeNode {
    /// Create a collapsed leaf node.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
            expanded: false,
        }
    }

    /// Add a child node.
    #[must_use]
    pub fn child(mut self, node: TreeNode) -> Self {
        self.children.push(node);
        self
    }

    /// Set the expanded flag.
    #[must_use]
    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    /// The node's label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Child nodes.
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// Whether this node is expanded.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Toggle the expanded flag.
    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }
}

/// One row of the depth-first flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FlatRow {
    /// Child-index path from the forest roots to the node.
    path: Vec<usize>,
    depth: usize,
    has_children: bool,
    expanded: bool,
}

/// Construction options for [`TreeView`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeConfig {
    pub core: CoreConfig,
    pub palette: Palette,
    pub row_height: i32,
    /// Indent per depth level, in pixels.
    pub indent: i32,
    pub scrollbar: bool,
    pub focused: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            palette: Palette::default(),
            row_height: 24,
            indent: 16,
            scrollbar: true,
            focused: false,
        }
    }
}

impl TreeConfig {
    /// Set the row height (clamped to >= 1).
    #[must_use]
    pub fn with_row_height(mut self, row_height: i32) -> Self {
        self.row_height = row_height.max(1);
        self
    }

    /// Set the per-level indent.
    #[must_use]
    pub fn with_indent(mut self, indent: i32) -> Self {
        self.indent = indent.max(0);
        self
    }

    /// Replace the core options.
    #[must_use]
    pub fn with_core(mut self, core: CoreConfig) -> Self {
        self.core = core;
        self
    }

    /// Consume navigation keys.
    #[must_use]
    pub fn focused(mut self) -> Self {
        self.focused = true;
        self
    }
}

/// A scrolling view over an expand/collapse forest.
pub struct TreeView {
    core: ComponentCore,
    window: ScrollWindow,
    roots: Vec<TreeNode>,
    rows: Vec<FlatRow>,
    selected: Option<usize>,
    hover_row: Option<usize>,
    hit: HitState,
    palette: Palette,
    scrollbar: Option<Scrollbar>,
    indent: i32,
    focused: bool,
    on_toggle: Option<Box<dyn FnMut(&[usize], bool)>>,
}

impl TreeView {
    /// Create a tree with explicit geometry and an initial forest.
    pub fn new(
        bounds: Rect,
        roots: Vec<TreeNode>,
        config: TreeConfig,
        surfaces: &mut dyn SurfaceFactory,
    ) -> Result<Self, SurfaceError> {
        let core = ComponentCore::new(bounds, config.core, surfaces)?;
        let window = ScrollWindow::new(0, config.row_height, core.content_rect().height);
        let mut tree = Self {
            core,
            window,
            roots,
            rows: Vec::new(),
            selected: None,
            hover_row: None,
            hit: HitState::default(),
            palette: config.palette,
            scrollbar: config.scrollbar.then(Scrollbar::new),
            indent: config.indent,
            focused: config.focused,
            on_toggle: None,
        };
        tree.reflatten();
        Ok(tree)
    }

    /// The forest roots.
    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    /// Replace the forest and re-flatten.
    pub fn set_roots(&mut self, roots: Vec<TreeNode>) {
        self.roots = roots;
        self.hover_row = None;
        self.reflatten();
        self.core.mark_dirty(self.scroll_layers());
    }

    /// Number of rows in the current flattening.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Currently selected flattened index.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select a flattened index (clamped) and scroll it into view.
    pub fn select(&mut self, index: Option<usize>) {
        let index = if self.rows.is_empty() {
            None
        } else {
            index.map(|i| i.min(self.rows.len() - 1))
        };
        if index != self.selected {
            self.selected = index;
            self.core.mark_dirty(Layers::CONTENT);
        }
        if let Some(i) = index
            && self.window.ensure_visible(i)
        {
            self.core.mark_dirty(self.scroll_layers());
        }
    }

    /// Row hovered by the pointer this frame, as a flattened index.
    pub fn hover_row(&self) -> Option<usize> {
        self.hover_row
    }

    /// The scroll window, for host-driven scrolling and tests.
    pub fn window(&self) -> &ScrollWindow {
        &self.window
    }

    /// Look up a node by child-index path.
    pub fn node(&self, path: &[usize]) -> Option<&TreeNode> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.roots.get(first)?;
        for &idx in rest {
            node = node.children.get(idx)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, path: &[usize]) -> Option<&mut TreeNode> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.roots.get_mut(first)?;
        for &idx in rest {
            node = node.children.get_mut(idx)?;
        }
        Some(node)
    }

    /// Install the toggle handler, fired with the node path and its new
    /// expanded state.
    pub fn set_on_toggle(&mut self, callback: Box<dyn FnMut(&[usize], bool)>) {
        self.on_toggle = Some(callback);
    }

    /// Toggle the node at a flattened index.
    ///
    /// Leaf rows are ignored. Re-flattens immediately so the next
    /// frame's window computation sees the new row set; the selection
    /// stays on the same flattened index, clamped to the new length.
    pub fn toggle_at(&mut self, index: usize) {
        let Some(row) = self.rows.get(index) else {
            return;
        };
        if !row.has_children {
            return;
        }
        let path = row.path.clone();
        let expanded = {
            let node = self
                .node_mut(&path)
                .unwrap_or_else(|| unreachable!("flattened row points at a live node"));
            node.toggle_expanded();
            node.expanded
        };
        self.reflatten();
        self.core.mark_dirty(self.scroll_layers());
        if let Some(callback) = self.on_toggle.as_mut() {
            callback(&path, expanded);
        }
    }

    fn reflatten(&mut self) {
        self.rows.clear();
        let mut stack: Vec<(Vec<usize>, usize)> = Vec::new();
        for (i, _) in self.roots.iter().enumerate().rev() {
            stack.push((vec![i], 0));
        }
        while let Some((path, depth)) = stack.pop() {
            let node = self
                .node(&path)
                .unwrap_or_else(|| unreachable!("path produced by flattening"));
            let has_children = !node.children.is_empty();
            let expanded = node.expanded;
            let child_count = node.children.len();
            self.rows.push(FlatRow {
                path: path.clone(),
                depth,
                has_children,
                expanded,
            });
            if expanded {
                for i in (0..child_count).rev() {
                    let mut child_path = path.clone();
                    child_path.push(i);
                    stack.push((child_path, depth + 1));
                }
            }
        }
        self.window.set_item_count(self.rows.len());
        self.selected = match self.selected {
            Some(_) if self.rows.is_empty() => None,
            Some(s) => Some(s.min(self.rows.len() - 1)),
            None => None,
        };
        self.hover_row = None;
    }

    fn scroll_layers(&self) -> Layers {
        if self.scrollbar.is_some() {
            Layers::CONTENT | Layers::OVERLAY
        } else {
            Layers::CONTENT
        }
    }

    fn pointer_row(&self, input: &InputSnapshot) -> Option<usize> {
        let (px, py) = input.pointer();
        let (lx, ly) = self.core.to_local(px, py);
        let (cw, _) = self.core.content_size();
        if lx < 0 || lx >= cw {
            return None;
        }
        self.window.index_at(ly)
    }

    fn handle_keys(&mut self, input: &InputSnapshot) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        let current = self.selected;
        let next = if input.is_key_triggered(LogicalKey::Up) {
            Some(current.map_or(0, |s| s.saturating_sub(1)))
        } else if input.is_key_triggered(LogicalKey::Down) {
            Some(current.map_or(0, |s| (s + 1).min(last)))
        } else {
            None
        };
        if let Some(next) = next {
            self.select(Some(next));
        }
        if let Some(selected) = self.selected {
            let (has_children, expanded) = {
                let row = &self.rows[selected];
                (row.has_children, row.expanded)
            };
            if input.is_key_triggered(LogicalKey::Right) && has_children && !expanded {
                self.toggle_at(selected);
            } else if input.is_key_triggered(LogicalKey::Left) && has_children && expanded {
                self.toggle_at(selected);
            } else if input.is_key_triggered(LogicalKey::Ok) && has_children {
                self.toggle_at(selected);
            }
        }
    }
}

impl Component for TreeView {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn update(&mut self, input: &InputSnapshot, _arbiter: &PointerArbiter) {
        if self.core.is_destroyed() || !self.core.visible() {
            if self.hit.reset() || self.hover_row.take().is_some() {
                self.core.mark_dirty(Layers::CONTENT);
            }
            return;
        }

        let (px, py) = input.pointer();
        let inside = self.core.is_inside(px, py);

        if inside && input.wheel_delta() != 0 && self.window.scroll_rows(input.wheel_delta()) {
            self.core.mark_dirty(self.scroll_layers());
        }

        let ev = self.hit.update(inside, self.core.enabled(), input);
        let hover = if self.hit.is_hovering() {
            self.pointer_row(input)
        } else {
            None
        };
        if hover != self.hover_row {
            self.hover_row = hover;
            self.core.mark_dirty(Layers::CONTENT);
        }

        if ev.clicked
            && let Some(row) = self.hover_row
        {
            self.select(Some(row));
            self.toggle_at(row);
        }

        if self.focused {
            self.handle_keys(input);
        }
    }

    fn refresh(&mut self) {
        if !self.core.visible() {
            return;
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("refresh", widget = "TreeView").entered();

        let mut drew = self.core.begin_refresh();
        drew |= refresh_chrome(&mut self.core, &self.palette);

        if self.core.take_dirty(Layers::CONTENT) {
            let (cw, ch) = self.core.content_size();
            let row_height = self.window.row_height();
            self.core
                .content()
                .fill_rect(Rect::from_size(cw, ch), self.palette.background);
            self.core.content().set_text_color(self.palette.text);

            for idx in self.window.visible_range() {
                let y = self.window.row_top(idx);
                let row_rect = Rect::new(0, y, cw, row_height);
                if self.selected == Some(idx) {
                    self.core
                        .content()
                        .fill_rect(row_rect, self.palette.highlight);
                } else if self.hover_row == Some(idx) {
                    self.core
                        .content()
                        .fill_rect(row_rect, self.palette.highlight.with_alpha(80));
                }

                let row = &self.rows[idx];
                let marker = if !row.has_children {
                    "  "
                } else if row.expanded {
                    "- "
                } else {
                    "+ "
                };
                let label = self
                    .node(&row.path)
                    .map(|n| n.label.as_str())
                    .unwrap_or_default();
                let text = format!("{marker}{label}");
                let x = self.indent * row.depth as i32;
                let text_rect =
                    Rect::new(x, y, (cw - x).max(0), row_height).inner(Insets::new(0, 4, 0, 4));
                self.core
                    .content()
                    .draw_text(&text, text_rect, TextAlign::Left);
            }
            drew = true;
        }

        if self.core.take_dirty(Layers::OVERLAY) {
            if let Some(scrollbar) = &self.scrollbar {
                let (cw, ch) = self.core.content_size();
                scrollbar.render(&self.window, Rect::from_size(cw, ch), self.core.content());
            }
            drew = true;
        }

        self.core.finish_refresh(drew);
    }
}
