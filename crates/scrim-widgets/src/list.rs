#![forbid(unsafe_code)]

//! Virtualized list container.
//!
//! Holds a logical collection of text rows and renders only the
//! visible window. Hover and selection are tracked as logical indices,
//! so scrolling never invalidates them.

use crate::arbiter::PointerArbiter;
use crate::component::{Component, ComponentCore, CoreConfig, Layers};
use crate::hit::HitState;
use crate::scroll::ScrollWindow;
use crate::scrollbar::Scrollbar;
use crate::{Palette, refresh_chrome};
use scrim_core::geometry::{Insets, Rect};
use scrim_core::input::{InputSnapshot, LogicalKey};
use scrim_render::surface::{SurfaceError, SurfaceFactory, TextAlign};

/// Construction options for [`ListView`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListConfig {
    pub core: CoreConfig,
    pub palette: Palette,
    /// Uniform row height in pixels.
    pub row_height: i32,
    /// Draw a derivative scrollbar on the overlay layer.
    pub scrollbar: bool,
    /// Consume navigation keys.
    pub focused: bool,
    /// Ask the arbitration registry before arming hover, so an overlay
    /// stacked above this list wins the pointer.
    pub guarded: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            palette: Palette::default(),
            row_height: 24,
            scrollbar: true,
            focused: false,
            guarded: false,
        }
    }
}

impl ListConfig {
    /// Set the row height (clamped to >= 1).
    #[must_use]
    pub fn with_row_height(mut self, row_height: i32) -> Self {
        self.row_height = row_height.max(1);
        self
    }

    /// Replace the core options.
    #[must_use]
    pub fn with_core(mut self, core: CoreConfig) -> Self {
        self.core = core;
        self
    }

    /// Replace the palette.
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Disable the scrollbar overlay.
    #[must_use]
    pub fn without_scrollbar(mut self) -> Self {
        self.scrollbar = false;
        self
    }

    /// Consume navigation keys.
    #[must_use]
    pub fn focused(mut self) -> Self {
        self.focused = true;
        self
    }

    /// Defer to the arbitration registry for hover ties.
    #[must_use]
    pub fn guarded(mut self) -> Self {
        self.guarded = true;
        self
    }
}

/// Horizontal text inset inside a row.
const ROW_TEXT_INSET: i32 = 8;

/// A scrolling list of text items.
pub struct ListView {
    core: ComponentCore,
    window: ScrollWindow,
    items: Vec<String>,
    selected: Option<usize>,
    hover_row: Option<usize>,
    hit: HitState,
    palette: Palette,
    scrollbar: Option<Scrollbar>,
    focused: bool,
    guarded: bool,
    on_activate: Option<Box<dyn FnMut(usize)>>,
}

impl ListView {
    /// Create a list with explicit geometry and initial items.
    pub fn new(
        bounds: Rect,
        items: Vec<String>,
        config: ListConfig,
        surfaces: &mut dyn SurfaceFactory,
    ) -> Result<Self, SurfaceError> {
        let core = ComponentCore::new(bounds, config.core, surfaces)?;
        let window = ScrollWindow::new(items.len(), config.row_height, core.content_rect().height);
        Ok(Self {
            core,
            window,
            items,
            selected: None,
            hover_row: None,
            hit: HitState::default(),
            palette: config.palette,
            scrollbar: config.scrollbar.then(Scrollbar::new),
            focused: config.focused,
            guarded: config.guarded,
            on_activate: None,
        })
    }

    /// The logical items.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Number of logical items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the collection. Scroll offset and selection are
    /// re-clamped; hover recomputes next frame.
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.window.set_item_count(self.items.len());
        self.selected = match self.selected {
            Some(_) if self.items.is_empty() => None,
            Some(s) => Some(s.min(self.items.len() - 1)),
            None => None,
        };
        self.hover_row = None;
        self.core.mark_dirty(self.scroll_layers());
    }

    /// Currently selected logical index.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select a logical index (clamped), or clear with `None`.
    /// Scrolls the selection into view.
    pub fn select(&mut self, index: Option<usize>) {
        let index = index.map(|i| i.min(self.items.len().saturating_sub(1)));
        let index = if self.items.is_empty() { None } else { index };
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

    /// Row hovered by the pointer this frame, as a logical index.
    pub fn hover_row(&self) -> Option<usize> {
        self.hover_row
    }

    /// The scroll window, for host-driven scrolling and tests.
    pub fn window(&self) -> &ScrollWindow {
        &self.window
    }

    /// Grant or revoke key focus.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Install the activation handler, fired on click and on Ok.
    pub fn set_on_activate(&mut self, callback: Box<dyn FnMut(usize)>) {
        self.on_activate = Some(callback);
    }

    /// Move and resize, keeping the window viewport in sync. On
    /// allocation failure the previous geometry is kept.
    pub fn set_bounds(&mut self, bounds: Rect) -> Result<(), SurfaceError> {
        self.core.set_bounds(bounds)?;
        self.window
            .set_viewport_height(self.core.content_rect().height);
        Ok(())
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

    fn activate(&mut self, row: usize) {
        if self.selected != Some(row) {
            self.selected = Some(row);
            self.core.mark_dirty(Layers::CONTENT);
        }
        if let Some(callback) = self.on_activate.as_mut() {
            callback(row);
        }
    }

    fn handle_keys(&mut self, input: &InputSnapshot) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() - 1;
        let page = self.window.rows_per_page();
        let current = self.selected;
        let next = if input.is_key_triggered(LogicalKey::Up) {
            Some(current.map_or(0, |s| s.saturating_sub(1)))
        } else if input.is_key_triggered(LogicalKey::Down) {
            Some(current.map_or(0, |s| (s + 1).min(last)))
        } else if input.is_key_triggered(LogicalKey::PageUp) {
            Some(current.map_or(0, |s| s.saturating_sub(page)))
        } else if input.is_key_triggered(LogicalKey::PageDown) {
            Some(current.map_or(0, |s| (s + page).min(last)))
        } else if input.is_key_triggered(LogicalKey::Home) {
            Some(0)
        } else if input.is_key_triggered(LogicalKey::End) {
            Some(last)
        } else {
            None
        };
        if let Some(next) = next {
            self.select(Some(next));
        }
        if input.is_key_triggered(LogicalKey::Ok)
            && let Some(row) = self.selected
        {
            self.activate(row);
        }
    }
}

impl Component for ListView {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn update(&mut self, input: &InputSnapshot, arbiter: &PointerArbiter) {
        if self.core.is_destroyed() || !self.core.visible() {
            if self.hit.reset() || self.hover_row.take().is_some() {
                self.core.mark_dirty(Layers::CONTENT);
            }
            return;
        }

        let (px, py) = input.pointer();
        let mut inside = self.core.is_inside(px, py);
        if inside && self.guarded && !arbiter.allows(self.core.id(), px, py) {
            inside = false;
        }

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
            self.activate(row);
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
        let _span = tracing::debug_span!("refresh", widget = "ListView").entered();

        let mut drew = self.core.begin_refresh();
        drew |= refresh_chrome(&mut self.core, &self.palette);

        if self.core.take_dirty(Layers::CONTENT) {
            let (cw, ch) = self.core.content_size();
            let viewport = Rect::from_size(cw, ch);
            let range = self.window.visible_range();
            let surface = self.core.content();
            surface.fill_rect(viewport, self.palette.background);
            surface.set_text_color(self.palette.text);
            for idx in range {
                let row = Rect::new(0, self.window.row_top(idx), cw, self.window.row_height());
                if self.selected == Some(idx) {
                    surface.fill_rect(row, self.palette.highlight);
                } else if self.hover_row == Some(idx) {
                    surface.fill_rect(row, self.palette.highlight.with_alpha(80));
                }
                surface.draw_text(
                    &self.items[idx],
                    row.inner(Insets::new(0, ROW_TEXT_INSET, 0, ROW_TEXT_INSET)),
                    TextAlign::Left,
                );
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
