#![forbid(unsafe_code)]

//! Command menu container.
//!
//! A cursor-driven list of commands with per-command enabled flags.
//! Menus are usually registered as overlays, so the guarded hover path
//! (defer to the arbitration registry for overlap ties) defaults on.

use crate::arbiter::PointerArbiter;
use crate::component::{Component, ComponentCore, CoreConfig, Layers};
use crate::hit::HitState;
use crate::scroll::ScrollWindow;
use crate::scrollbar::Scrollbar;
use crate::{Palette, refresh_chrome};
use scrim_core::geometry::{Insets, Rect};
use scrim_core::input::{InputSnapshot, LogicalKey};
use scrim_render::surface::{SurfaceError, SurfaceFactory, TextAlign};

/// One menu command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub enabled: bool,
}

impl MenuItem {
    /// Create an enabled command.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: true,
        }
    }

    /// Create a greyed-out command.
    pub fn disabled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: false,
        }
    }
}

/// Construction options for [`MenuView`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuConfig {
    pub core: CoreConfig,
    pub palette: Palette,
    pub row_height: i32,
    /// Cursor wraps from last to first command and back.
    pub wrap: bool,
    pub scrollbar: bool,
    pub focused: bool,
    pub guarded: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            palette: Palette::default(),
            row_height: 28,
            wrap: true,
            scrollbar: false,
            focused: true,
            guarded: true,
        }
    }
}

impl MenuConfig {
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

    /// Stop the cursor at the ends instead of wrapping.
    #[must_use]
    pub fn without_wrap(mut self) -> Self {
        self.wrap = false;
        self
    }

    /// Draw a scrollbar for long menus.
    #[must_use]
    pub fn with_scrollbar(mut self) -> Self {
        self.scrollbar = true;
        self
    }
}

/// A cursor-driven command menu.
pub struct MenuView {
    core: ComponentCore,
    window: ScrollWindow,
    items: Vec<MenuItem>,
    cursor: Option<usize>,
    hit: HitState,
    palette: Palette,
    scrollbar: Option<Scrollbar>,
    wrap: bool,
    focused: bool,
    guarded: bool,
    on_activate: Option<Box<dyn FnMut(usize)>>,
    on_cancel: Option<Box<dyn FnMut()>>,
}

impl MenuView {
    /// Create a menu with explicit geometry. The cursor starts on the
    /// first command if any exist.
    pub fn new(
        bounds: Rect,
        items: Vec<MenuItem>,
        config: MenuConfig,
        surfaces: &mut dyn SurfaceFactory,
    ) -> Result<Self, SurfaceError> {
        let core = ComponentCore::new(bounds, config.core, surfaces)?;
        let window = ScrollWindow::new(items.len(), config.row_height, core.content_rect().height);
        let cursor = (!items.is_empty()).then_some(0);
        Ok(Self {
            core,
            window,
            items,
            cursor,
            hit: HitState::default(),
            palette: config.palette,
            scrollbar: config.scrollbar.then(Scrollbar::new),
            wrap: config.wrap,
            focused: config.focused,
            guarded: config.guarded,
            on_activate: None,
            on_cancel: None,
        })
    }

    /// The command set.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Current cursor index.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Replace the command set, resetting the cursor to the top.
    pub fn set_items(&mut self, items: Vec<MenuItem>) {
        self.items = items;
        self.window.set_item_count(self.items.len());
        self.cursor = (!self.items.is_empty()).then_some(0);
        self.core.mark_dirty(self.scroll_layers());
    }

    /// Enable or disable one command in place.
    pub fn set_item_enabled(&mut self, index: usize, enabled: bool) {
        if let Some(item) = self.items.get_mut(index)
            && item.enabled != enabled
        {
            item.enabled = enabled;
            self.core.mark_dirty(Layers::CONTENT);
        }
    }

    /// The scroll window, for host-driven scrolling and tests.
    pub fn window(&self) -> &ScrollWindow {
        &self.window
    }

    /// Grant or revoke key focus.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Install the activation handler, fired only for enabled commands.
    pub fn set_on_activate(&mut self, callback: Box<dyn FnMut(usize)>) {
        self.on_activate = Some(callback);
    }

    /// Install the cancel handler, fired on the Cancel key.
    pub fn set_on_cancel(&mut self, callback: Box<dyn FnMut()>) {
        self.on_cancel = Some(callback);
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

    fn move_cursor(&mut self, step: i32) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() - 1;
        let current = self.cursor.unwrap_or(0) as i32;
        let next = if self.wrap {
            (current + step).rem_euclid(self.items.len() as i32) as usize
        } else {
            (current + step).clamp(0, last as i32) as usize
        };
        self.set_cursor(Some(next));
    }

    fn set_cursor(&mut self, cursor: Option<usize>) {
        if cursor != self.cursor {
            self.cursor = cursor;
            self.core.mark_dirty(Layers::CONTENT);
        }
        if let Some(i) = cursor
            && self.window.ensure_visible(i)
        {
            self.core.mark_dirty(self.scroll_layers());
        }
    }

    fn activate(&mut self, index: usize) {
        if !self.items.get(index).is_some_and(|item| item.enabled) {
            return;
        }
        if let Some(callback) = self.on_activate.as_mut() {
            callback(index);
        }
    }
}

impl Component for MenuView {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn update(&mut self, input: &InputSnapshot, arbiter: &PointerArbiter) {
        if self.core.is_destroyed() || !self.core.visible() {
            self.hit.reset();
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
        // Pointer hover moves the cursor, menu-style.
        if self.hit.is_hovering()
            && let Some(row) = self.pointer_row(input)
        {
            self.set_cursor(Some(row));
        }

        if ev.clicked
            && let Some(row) = self.pointer_row(input)
        {
            self.activate(row);
        }

        if self.focused {
            if input.is_key_triggered(LogicalKey::Up) {
                self.move_cursor(-1);
            }
            if input.is_key_triggered(LogicalKey::Down) {
                self.move_cursor(1);
            }
            if input.is_key_triggered(LogicalKey::Ok)
                && let Some(cursor) = self.cursor
            {
                self.activate(cursor);
            }
            if input.is_key_triggered(LogicalKey::Cancel)
                && let Some(callback) = self.on_cancel.as_mut()
            {
                callback();
            }
        }
    }

    fn refresh(&mut self) {
        if !self.core.visible() {
            return;
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("refresh", widget = "MenuView").entered();

        let mut drew = self.core.begin_refresh();
        drew |= refresh_chrome(&mut self.core, &self.palette);

        if self.core.take_dirty(Layers::CONTENT) {
            let (cw, ch) = self.core.content_size();
            let row_height = self.window.row_height();
            self.core
                .content()
                .fill_rect(Rect::from_size(cw, ch), self.palette.background);

            for idx in self.window.visible_range() {
                let row = Rect::new(0, self.window.row_top(idx), cw, row_height);
                if self.cursor == Some(idx) {
                    self.core.content().fill_rect(row, self.palette.highlight);
                }
                let item = &self.items[idx];
                let color = if item.enabled {
                    self.palette.text
                } else {
                    self.palette.muted
                };
                let label = item.label.clone();
                self.core.content().set_text_color(color);
                self.core.content().draw_text(
                    &label,
                    row.inner(Insets::new(0, 10, 0, 10)),
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

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_render::recording::{DrawLog, RecordingFactory};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn commands() -> Vec<MenuItem> {
        vec![
            MenuItem::new("attack"),
            MenuItem::new("defend"),
            MenuItem::disabled("flee"),
        ]
    }

    fn fixture() -> (MenuView, DrawLog) {
        let mut factory = RecordingFactory::new();
        let menu = MenuView::new(
            Rect::new(0, 0, 160, 120),
            commands(),
            MenuConfig::default(),
            &mut factory,
        )
        .unwrap();
        let log = factory.log(0).unwrap();
        (menu, log)
    }

    #[test]
    fn cursor_starts_on_first_command() {
        let (menu, _) = fixture();
        assert_eq!(menu.cursor(), Some(0));
    }

    #[test]
    fn cursor_wraps_both_ways() {
        let (mut menu, _) = fixture();
        let arbiter = PointerArbiter::new();
        let away = || InputSnapshot::at(-5, -5);

        menu.update(&away().with_key(LogicalKey::Up), &arbiter);
        assert_eq!(menu.cursor(), Some(2));
        menu.update(&away().with_key(LogicalKey::Down), &arbiter);
        assert_eq!(menu.cursor(), Some(0));
    }

    #[test]
    fn no_wrap_clamps_at_ends() {
        let mut factory = RecordingFactory::new();
        let mut menu = MenuView::new(
            Rect::new(0, 0, 160, 120),
            commands(),
            MenuConfig::default().without_wrap(),
            &mut factory,
        )
        .unwrap();
        let arbiter = PointerArbiter::new();
        menu.update(&InputSnapshot::at(-5, -5).with_key(LogicalKey::Up), &arbiter);
        assert_eq!(menu.cursor(), Some(0));
    }

    #[test]
    fn ok_activates_enabled_command() {
        let (mut menu, _) = fixture();
        let arbiter = PointerArbiter::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let probe = fired.clone();
        menu.set_on_activate(Box::new(move |i| probe.borrow_mut().push(i)));

        menu.update(&InputSnapshot::at(-5, -5).with_key(LogicalKey::Ok), &arbiter);
        assert_eq!(*fired.borrow(), vec![0]);
    }

    #[test]
    fn disabled_command_never_activates() {
        let (mut menu, _) = fixture();
        let arbiter = PointerArbiter::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let probe = fired.clone();
        menu.set_on_activate(Box::new(move |i| probe.borrow_mut().push(i)));

        // Cursor onto "flee" (disabled) and press Ok.
        menu.update(&InputSnapshot::at(-5, -5).with_key(LogicalKey::Up), &arbiter);
        assert_eq!(menu.cursor(), Some(2));
        menu.update(&InputSnapshot::at(-5, -5).with_key(LogicalKey::Ok), &arbiter);
        assert!(fired.borrow().is_empty());

        // Clicking it is equally inert. Row 2 spans local y 56..84.
        menu.update(&InputSnapshot::at(50, 8 + 70).press_edge(), &arbiter);
        menu.update(&InputSnapshot::at(50, 8 + 70).release_edge(), &arbiter);
        assert!(fired.borrow().is_empty());
    }

    #[test]
    fn hover_moves_cursor() {
        let (mut menu, _) = fixture();
        let arbiter = PointerArbiter::new();
        // Row 1 spans content-local y 28..56.
        menu.update(&InputSnapshot::at(50, 8 + 40), &arbiter);
        assert_eq!(menu.cursor(), Some(1));
    }

    #[test]
    fn click_activates_hovered_command() {
        let (mut menu, _) = fixture();
        let arbiter = PointerArbiter::new();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let probe = fired.clone();
        menu.set_on_activate(Box::new(move |i| probe.borrow_mut().push(i)));

        menu.update(&InputSnapshot::at(50, 8 + 40).press_edge(), &arbiter);
        menu.update(&InputSnapshot::at(50, 8 + 40).release_edge(), &arbiter);
        assert_eq!(*fired.borrow(), vec![1]);
    }

    #[test]
    fn cancel_fires_callback() {
        let (mut menu, _) = fixture();
        let arbiter = PointerArbiter::new();
        let cancelled = Rc::new(RefCell::new(0u32));
        let probe = cancelled.clone();
        menu.set_on_cancel(Box::new(move || *probe.borrow_mut() += 1));

        menu.update(
            &InputSnapshot::at(-5, -5).with_key(LogicalKey::Cancel),
            &arbiter,
        );
        assert_eq!(*cancelled.borrow(), 1);
    }

    #[test]
    fn set_item_enabled_dirties_content() {
        let (mut menu, log) = fixture();
        menu.refresh();
        log.reset();
        menu.set_item_enabled(2, true);
        menu.refresh();
        assert!(log.texts() > 0);
        // Same value again is a no-op.
        log.reset();
        menu.set_item_enabled(2, true);
        menu.refresh();
        assert!(log.is_empty());
    }

    #[test]
    fn disabled_commands_draw_muted() {
        let (mut menu, log) = fixture();
        menu.refresh();
        let colors: Vec<_> = log
            .ops()
            .iter()
            .filter_map(|op| match op {
                scrim_render::DrawOp::TextColor(c) => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(colors.len(), 3);
        let palette = Palette::default();
        assert_eq!(colors[0], palette.text);
        assert_eq!(colors[2], palette.muted);
    }
}
