#![forbid(unsafe_code)]

//! Virtualized table container.
//!
//! Fixed-width columns over a scrolling body of rows. The header row
//! sits above the scroll window and never scrolls; the body shares the
//! list's virtualization and selection rules.

use crate::arbiter::PointerArbiter;
use crate::component::{Component, ComponentCore, CoreConfig, Layers};
use crate::hit::HitState;
use crate::scroll::ScrollWindow;
use crate::scrollbar::Scrollbar;
use crate::{Palette, refresh_chrome};
use scrim_core::geometry::{Insets, Rect};
use scrim_core::input::{InputSnapshot, LogicalKey};
use scrim_render::surface::{SurfaceError, SurfaceFactory, TextAlign};

/// A table column: caption plus fixed pixel width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub title: String,
    pub width: i32,
}

impl Column {
    /// Create a column.
    pub fn new(title: impl Into<String>, width: i32) -> Self {
        Self {
            title: title.into(),
            width: width.max(1),
        }
    }
}

/// Construction options for [`TableView`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub core: CoreConfig,
    pub palette: Palette,
    pub row_height: i32,
    pub scrollbar: bool,
    pub focused: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            palette: Palette::default(),
            row_height: 24,
            scrollbar: true,
            focused: false,
        }
    }
}

impl TableConfig {
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

    /// Consume navigation keys.
    #[must_use]
    pub fn focused(mut self) -> Self {
        self.focused = true;
        self
    }
}

/// Horizontal text inset inside a cell.
const CELL_TEXT_INSET: i32 = 6;

/// A scrolling table of rows with fixed columns.
pub struct TableView {
    core: ComponentCore,
    window: ScrollWindow,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    selected: Option<usize>,
    hover_row: Option<usize>,
    hit: HitState,
    palette: Palette,
    scrollbar: Option<Scrollbar>,
    focused: bool,
    on_activate: Option<Box<dyn FnMut(usize)>>,
}

impl TableView {
    /// Create a table with explicit geometry.
    ///
    /// The header consumes one row height at the top of the content
    /// area; the scroll viewport is what remains.
    pub fn new(
        bounds: Rect,
        columns: Vec<Column>,
        rows: Vec<Vec<String>>,
        config: TableConfig,
        surfaces: &mut dyn SurfaceFactory,
    ) -> Result<Self, SurfaceError> {
        let core = ComponentCore::new(bounds, config.core, surfaces)?;
        let body_height = (core.content_rect().height - config.row_height).max(0);
        let window = ScrollWindow::new(rows.len(), config.row_height, body_height);
        Ok(Self {
            core,
            window,
            columns,
            rows,
            selected: None,
            hover_row: None,
            hit: HitState::default(),
            palette: config.palette,
            scrollbar: config.scrollbar.then(Scrollbar::new),
            focused: config.focused,
            on_activate: None,
        })
    }

    /// The column set.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of body rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no body rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Replace the body rows, re-clamping scroll and selection.
    pub fn set_rows(&mut self, rows: Vec<Vec<String>>) {
        self.rows = rows;
        self.window.set_item_count(self.rows.len());
        self.selected = match self.selected {
            Some(_) if self.rows.is_empty() => None,
            Some(s) => Some(s.min(self.rows.len() - 1)),
            None => None,
        };
        self.hover_row = None;
        self.core.mark_dirty(self.scroll_layers());
    }

    /// Currently selected row index.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select a row (clamped) and scroll it into view.
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

    /// Row hovered by the pointer this frame.
    pub fn hover_row(&self) -> Option<usize> {
        self.hover_row
    }

    /// The scroll window, for host-driven scrolling and tests.
    pub fn window(&self) -> &ScrollWindow {
        &self.window
    }

    /// Install the activation handler, fired on click and on Ok.
    pub fn set_on_activate(&mut self, callback: Box<dyn FnMut(usize)>) {
        self.on_activate = Some(callback);
    }

    /// Header height in pixels.
    fn header_height(&self) -> i32 {
        self.window.row_height()
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
        // The header is not a row.
        self.window.index_at(ly - self.header_height())
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
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
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

    fn draw_cells(&mut self, y: i32, cells: &[String], align: TextAlign) {
        let row_height = self.window.row_height();
        let mut x = 0;
        for (column, text) in self.columns.iter().zip(cells) {
            let cell = Rect::new(x, y, column.width, row_height)
                .inner(Insets::new(0, CELL_TEXT_INSET, 0, CELL_TEXT_INSET));
            self.core.content().draw_text(text, cell, align);
            x += column.width;
        }
    }
}

impl Component for TableView {
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
        let _span = tracing::debug_span!("refresh", widget = "TableView").entered();

        let mut drew = self.core.begin_refresh();
        drew |= refresh_chrome(&mut self.core, &self.palette);

        if self.core.take_dirty(Layers::CONTENT) {
            let (cw, ch) = self.core.content_size();
            let header_h = self.header_height();
            let row_height = self.window.row_height();

            self.core
                .content()
                .fill_rect(Rect::from_size(cw, ch), self.palette.background);
            self.core.content().set_text_color(self.palette.text);

            // Header strip.
            self.core.content().fill_rect(
                Rect::new(0, 0, cw, header_h),
                self.palette.highlight.with_alpha(48),
            );
            let titles: Vec<String> = self.columns.iter().map(|c| c.title.clone()).collect();
            self.draw_cells(0, &titles, TextAlign::Left);

            // Body window, offset below the header.
            for idx in self.window.visible_range() {
                let y = header_h + self.window.row_top(idx);
                if y >= ch {
                    break;
                }
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
                let cells = self.rows[idx].clone();
                self.draw_cells(y, &cells, TextAlign::Left);
            }
            drew = true;
        }

        if self.core.take_dirty(Layers::OVERLAY) {
            if let Some(scrollbar) = &self.scrollbar {
                let (cw, ch) = self.core.content_size();
                let header_h = self.header_height();
                let body = Rect::new(0, header_h, cw, (ch - header_h).max(0));
                scrollbar.render(&self.window, body, self.core.content());
            }
            drew = true;
        }

        self.core.finish_refresh(drew);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_render::recording::{DrawLog, RecordingFactory};

    fn body(n: usize) -> Vec<Vec<String>> {
        (0..n)
            .map(|i| vec![format!("name {i}"), format!("{i}")])
            .collect()
    }

    /// Content 184x264: one 24px header plus a 240px body viewport.
    fn fixture(n: usize) -> (TableView, DrawLog) {
        let mut factory = RecordingFactory::new();
        let table = TableView::new(
            Rect::new(0, 0, 200, 280),
            vec![Column::new("name", 120), Column::new("qty", 60)],
            body(n),
            TableConfig::default(),
            &mut factory,
        )
        .unwrap();
        let log = factory.log(0).unwrap();
        (table, log)
    }

    #[test]
    fn header_shrinks_body_viewport() {
        let (table, _) = fixture(100);
        assert_eq!(table.window().viewport_height(), 240);
        assert_eq!(table.window().visible_range(), 0..11);
    }

    #[test]
    fn refresh_draws_header_and_visible_cells() {
        let (mut table, log) = fixture(100);
        table.refresh();
        let texts = log.drawn_text();
        // 2 header captions + 11 rows x 2 columns.
        assert_eq!(texts.len(), 2 + 22);
        assert_eq!(texts[0], "name");
        assert_eq!(texts[2], "name 0");
    }

    #[test]
    fn header_row_is_not_hit_testable() {
        let (mut table, _) = fixture(100);
        let arbiter = PointerArbiter::new();
        // Pointer in the header strip (content-local y = 10).
        table.update(&InputSnapshot::at(50, 18), &arbiter);
        assert_eq!(table.hover_row(), None);
        // First body row starts below the header.
        table.update(&InputSnapshot::at(50, 18 + 24), &arbiter);
        assert_eq!(table.hover_row(), Some(0));
    }

    #[test]
    fn hover_only_within_visible_window() {
        let (mut table, _) = fixture(5);
        let arbiter = PointerArbiter::new();
        // Past the last row: content-local body y = 5 * 24 + 10.
        table.update(&InputSnapshot::at(50, 8 + 24 + 5 * 24 + 10), &arbiter);
        assert_eq!(table.hover_row(), None);
    }

    #[test]
    fn scroll_then_hover_maps_to_logical_row() {
        let (mut table, _) = fixture(100);
        let arbiter = PointerArbiter::new();
        table.update(&InputSnapshot::at(50, 60).with_wheel(10), &arbiter);
        assert_eq!(table.window().first_visible(), 10);
        // Body-local y = 60 - 8 - 24 = 28 -> row 11.
        assert_eq!(table.hover_row(), Some(11));
    }

    #[test]
    fn click_activates_row() {
        let (mut table, _) = fixture(100);
        let arbiter = PointerArbiter::new();
        let hits = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let probe = hits.clone();
        table.set_on_activate(Box::new(move |row| probe.borrow_mut().push(row)));

        table.update(&InputSnapshot::at(50, 40).press_edge(), &arbiter);
        table.update(&InputSnapshot::at(50, 40).release_edge(), &arbiter);
        assert_eq!(table.selected(), Some(0));
        assert_eq!(*hits.borrow(), vec![0]);
    }

    #[test]
    fn set_rows_reclamps() {
        let (mut table, _) = fixture(100);
        table.select(Some(90));
        table.set_rows(body(3));
        assert_eq!(table.selected(), Some(2));
        assert_eq!(table.window().offset(), 0);
    }

    #[test]
    fn static_table_is_free_after_first_refresh() {
        let (mut table, log) = fixture(100);
        let arbiter = PointerArbiter::new();
        table.refresh();
        log.reset();
        table.update(&InputSnapshot::at(-5, -5), &arbiter);
        table.refresh();
        assert!(log.is_empty());
    }
}
