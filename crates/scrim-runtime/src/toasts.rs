#![forbid(unsafe_code)]

//! Toast rack: admission, stacking, and disposal of transient toasts.
//!
//! The rack owns the live toasts and a [`TransientPool`] of released
//! instances. Admission past the live cap evicts the oldest toast
//! through the same disposal path as ttl expiry and click dismissal
//! (unregister, dispose, release to the pool), so there is exactly one
//! way for a toast to die regardless of the trigger.

use crate::pool::{Reusable, TransientPool};
use crate::stage::{UiContext, isolated_update};
use scrim_core::geometry::Rect;
use scrim_core::input::InputSnapshot;
use scrim_render::surface::SurfaceError;
use scrim_widgets::component::Component;
use scrim_widgets::toast::{Toast, ToastConfig};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

impl Reusable for Toast {
    fn set_pooled(&mut self, pooled: bool) {
        Toast::set_pooled(self, pooled);
    }

    fn is_pooled(&self) -> bool {
        Toast::is_pooled(self)
    }
}

/// Screen corner toasts stack from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastCorner {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Construction options for [`ToastRack`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToastRackConfig {
    /// Maximum simultaneously live toasts; admission past this evicts
    /// the oldest.
    pub max_live: usize,
    pub corner: ToastCorner,
    pub toast_width: i32,
    pub toast_height: i32,
    /// Distance from the screen edges.
    pub margin: i32,
    /// Vertical gap between stacked toasts.
    pub gap: i32,
    /// Default time to live, in ticks.
    pub ttl: u32,
    pub toast: ToastConfig,
}

impl Default for ToastRackConfig {
    fn default() -> Self {
        Self {
            max_live: 3,
            corner: ToastCorner::TopRight,
            toast_width: 260,
            toast_height: 48,
            margin: 12,
            gap: 8,
            ttl: 180,
            toast: ToastConfig::default(),
        }
    }
}

impl ToastRackConfig {
    /// Set the live cap (at least 1).
    #[must_use]
    pub fn with_max_live(mut self, max_live: usize) -> Self {
        self.max_live = max_live.max(1);
        self
    }

    /// Set the stacking corner.
    #[must_use]
    pub fn with_corner(mut self, corner: ToastCorner) -> Self {
        self.corner = corner;
        self
    }

    /// Set the default ttl in ticks.
    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl.max(1);
        self
    }
}

/// Lifecycle manager for transient toasts.
pub struct ToastRack {
    config: ToastRackConfig,
    pool: TransientPool<Toast>,
    live: Vec<Rc<RefCell<Toast>>>,
    screen_width: i32,
    screen_height: i32,
}

impl ToastRack {
    /// Create a rack for a screen of the given size.
    pub fn new(screen_width: i32, screen_height: i32, config: ToastRackConfig) -> Self {
        Self {
            config,
            pool: TransientPool::new(),
            live: Vec::new(),
            screen_width,
            screen_height,
        }
    }

    /// Number of live toasts.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of pooled instances waiting for reuse.
    pub fn pooled_count(&self) -> usize {
        self.pool.free_len()
    }

    /// Borrow a live toast by age order (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&Rc<RefCell<Toast>>> {
        self.live.get(index)
    }

    /// Track a screen resize; live toasts are restacked.
    pub fn set_screen_size(&mut self, width: i32, height: i32) {
        self.screen_width = width;
        self.screen_height = height;
        self.relayout();
    }

    /// Show a toast with the default ttl.
    ///
    /// At the live cap the oldest toast is evicted first, through the
    /// same disposal path as natural expiry.
    pub fn push(&mut self, message: &str, ctx: &mut UiContext) -> Result<(), SurfaceError> {
        while self.live.len() >= self.config.max_live {
            debug!(message, "toast cap reached; evicting oldest");
            self.dispose_at(0, ctx);
        }

        let bounds = Rect::from_size(self.config.toast_width, self.config.toast_height);
        let toast_config = self.config.toast;
        let mut toast = self
            .pool
            .try_acquire(|| Toast::new(bounds, toast_config, ctx.surfaces.as_mut()))?;
        toast.present(message, self.config.ttl);

        let toast: Rc<RefCell<Toast>> = Rc::new(RefCell::new(toast));
        let as_component: Rc<RefCell<dyn Component>> = toast.clone();
        ctx.arbiter.register(&as_component);
        self.live.push(toast);
        self.relayout();
        Ok(())
    }

    /// Advance every live toast one frame and dispose the expired.
    pub fn tick(&mut self, input: &InputSnapshot, ctx: &mut UiContext) {
        for toast in &self.live {
            let as_component: Rc<RefCell<dyn Component>> = toast.clone();
            isolated_update(&as_component, input, &ctx.arbiter);
        }

        let mut index = 0;
        let mut removed = false;
        while index < self.live.len() {
            let expired = self.live[index].borrow().is_expired();
            if expired {
                self.dispose_at(index, ctx);
                removed = true;
            } else {
                index += 1;
            }
        }
        if removed {
            self.relayout();
        }
    }

    /// Refresh every live toast.
    pub fn refresh(&mut self) {
        for toast in &self.live {
            toast.borrow_mut().refresh();
        }
    }

    /// Dispose every live toast. Scene teardown.
    pub fn clear(&mut self, ctx: &mut UiContext) {
        while !self.live.is_empty() {
            self.dispose_at(0, ctx);
        }
    }

    /// The single disposal path: unregister, dispose, release to the
    /// pool. Eviction, expiry, and teardown all come through here.
    fn dispose_at(&mut self, index: usize, ctx: &mut UiContext) {
        let toast = self.live.remove(index);
        {
            let mut toast = toast.borrow_mut();
            ctx.arbiter.unregister(toast.core().id());
            toast.core_mut().dispose();
        }
        match Rc::try_unwrap(toast) {
            Ok(cell) => {
                self.pool
                    .release(cell.into_inner(), Toast::reset_for_pool);
            }
            Err(_) => {
                warn!("toast still externally referenced at disposal; dropping rack handle");
            }
        }
    }

    fn relayout(&mut self) {
        let w = self.config.toast_width;
        let h = self.config.toast_height;
        let margin = self.config.margin;
        let gap = self.config.gap;
        for (slot, toast) in self.live.iter().enumerate() {
            let step = (h + gap) * slot as i32;
            let (x, y) = match self.config.corner {
                ToastCorner::TopLeft => (margin, margin + step),
                ToastCorner::TopRight => (self.screen_width - w - margin, margin + step),
                ToastCorner::BottomLeft => (margin, self.screen_height - h - margin - step),
                ToastCorner::BottomRight => (
                    self.screen_width - w - margin,
                    self.screen_height - h - margin - step,
                ),
            };
            toast.borrow_mut().core_mut().set_position(x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_render::recording::RecordingFactory;

    fn context() -> UiContext {
        UiContext::new(Box::new(RecordingFactory::new()))
    }

    fn rack() -> ToastRack {
        ToastRack::new(640, 360, ToastRackConfig::default().with_ttl(5))
    }

    fn away() -> InputSnapshot {
        InputSnapshot::at(-50, -50)
    }

    #[test]
    fn push_stacks_from_corner() {
        let mut ctx = context();
        let mut rack = rack();
        rack.push("one", &mut ctx).unwrap();
        rack.push("two", &mut ctx).unwrap();

        let first = rack.get(0).unwrap().borrow().core().bounds();
        let second = rack.get(1).unwrap().borrow().core().bounds();
        // Top-right corner: x pinned to the right edge, second slot
        // below the first.
        assert_eq!(first.x, 640 - 260 - 12);
        assert_eq!(first.y, 12);
        assert_eq!(second.y, 12 + 48 + 8);
    }

    #[test]
    fn cap_evicts_oldest_into_pool() {
        let mut ctx = context();
        let mut rack = rack();
        rack.push("one", &mut ctx).unwrap();
        rack.push("two", &mut ctx).unwrap();
        rack.push("three", &mut ctx).unwrap();
        assert_eq!(rack.live_count(), 3);

        rack.push("four", &mut ctx).unwrap();
        assert_eq!(rack.live_count(), 3);
        // The evicted instance went through the pool and was reused
        // for the new toast straight away.
        assert_eq!(rack.pooled_count(), 0);
        // "one" is gone; the oldest survivor is "two".
        assert_eq!(rack.get(0).unwrap().borrow().message(), "two");
        assert_eq!(rack.get(2).unwrap().borrow().message(), "four");
        // Survivors restacked from the corner.
        assert_eq!(rack.get(0).unwrap().borrow().core().bounds().y, 12);
    }

    #[test]
    fn expiry_disposes_and_pools() {
        let mut ctx = context();
        let mut rack = rack();
        rack.push("fleeting", &mut ctx).unwrap();

        for _ in 0..5 {
            rack.tick(&away(), &mut ctx);
        }
        assert_eq!(rack.live_count(), 0);
        assert_eq!(rack.pooled_count(), 1);
    }

    #[test]
    fn reuse_does_not_leak_callbacks() {
        let mut ctx = context();
        let mut rack = rack();
        rack.push("first", &mut ctx).unwrap();
        rack.get(0)
            .unwrap()
            .borrow_mut()
            .set_on_dismiss(Box::new(|| {}));

        for _ in 0..5 {
            rack.tick(&away(), &mut ctx);
        }
        assert_eq!(rack.pooled_count(), 1);

        // The pooled instance is reused and must carry nothing over.
        rack.push("second", &mut ctx).unwrap();
        assert_eq!(rack.pooled_count(), 0);
        let toast = rack.get(0).unwrap().borrow();
        assert_eq!(toast.message(), "second");
        assert!(!toast.has_dismiss_callback());
        assert_eq!(toast.ttl(), 5);
    }

    #[test]
    fn click_dismissal_uses_same_disposal_path() {
        let mut ctx = context();
        let mut rack = rack();
        rack.push("clickme", &mut ctx).unwrap();
        let bounds = rack.get(0).unwrap().borrow().core().bounds();
        let (cx, cy) = (bounds.x + 5, bounds.y + 5);

        rack.tick(&InputSnapshot::at(cx, cy).press_edge(), &mut ctx);
        rack.tick(&InputSnapshot::at(cx, cy).release_edge(), &mut ctx);
        assert_eq!(rack.live_count(), 0);
        assert_eq!(rack.pooled_count(), 1);
    }

    #[test]
    fn toasts_block_pointer_while_live() {
        let mut ctx = context();
        let mut rack = rack();
        rack.push("shield", &mut ctx).unwrap();
        let bounds = rack.get(0).unwrap().borrow().core().bounds();

        // Commit runs at frame end; next frame's host hooks see it.
        ctx.arbiter.commit();
        assert!(ctx.arbiter.is_blocking(bounds.x + 1, bounds.y + 1));

        rack.clear(&mut ctx);
        ctx.arbiter.commit();
        assert!(!ctx.arbiter.is_blocking(bounds.x + 1, bounds.y + 1));
    }

    #[test]
    fn clear_returns_everything_to_pool() {
        let mut ctx = context();
        let mut rack = rack();
        rack.push("a", &mut ctx).unwrap();
        rack.push("b", &mut ctx).unwrap();
        rack.clear(&mut ctx);
        assert_eq!(rack.live_count(), 0);
        assert_eq!(rack.pooled_count(), 2);
    }
}
