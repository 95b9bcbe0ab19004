#![forbid(unsafe_code)]

//! Transient toast notification.
//!
//! A short-lived message component managed by a rack that pools and
//! reuses instances. The toast itself only counts down its time to
//! live, fades near the end, and dismisses on click; admission,
//! stacking, and disposal belong to the manager.

use crate::arbiter::PointerArbiter;
use crate::component::{Component, ComponentCore, CoreConfig, Layers};
use crate::hit::HitState;
use crate::{Palette, refresh_chrome};
use scrim_core::geometry::Rect;
use scrim_core::input::InputSnapshot;
use scrim_render::surface::{SurfaceError, SurfaceFactory, TextAlign};

/// Ticks over which an expiring toast fades out.
const FADE_TICKS: u32 = 20;

/// Construction options for [`Toast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToastConfig {
    pub core: CoreConfig,
    pub palette: Palette,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            core: CoreConfig::default().with_padding(6),
            palette: Palette::default(),
        }
    }
}

impl ToastConfig {
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
}

/// A pooled, transient notification.
pub struct Toast {
    core: ComponentCore,
    message: String,
    ttl: u32,
    expired: bool,
    pooled: bool,
    hit: HitState,
    palette: Palette,
    on_dismiss: Option<Box<dyn FnMut()>>,
}

impl Toast {
    /// Construct a fresh (unpresented) toast.
    pub fn new(
        bounds: Rect,
        config: ToastConfig,
        surfaces: &mut dyn SurfaceFactory,
    ) -> Result<Self, SurfaceError> {
        Ok(Self {
            core: ComponentCore::new(bounds, config.core, surfaces)?,
            message: String::new(),
            ttl: 0,
            expired: false,
            pooled: false,
            hit: HitState::default(),
            palette: config.palette,
            on_dismiss: None,
        })
    }

    /// (Re)initialize for display. Called for both fresh and pooled
    /// instances, so it sets every presentation field.
    pub fn present(&mut self, message: impl Into<String>, ttl: u32) {
        self.message = message.into();
        self.ttl = ttl.max(1);
        self.expired = false;
        self.hit.reset();
        self.core.set_visible(true);
        self.core.set_enabled(true);
        self.core.set_opacity(1.0);
        self.core.mark_all_dirty();
    }

    /// The displayed message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Remaining ticks.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// True once the ttl ran out or the toast was dismissed.
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Dismiss early, firing the dismiss handler.
    pub fn dismiss(&mut self) {
        if !self.expired {
            self.expired = true;
            if let Some(callback) = self.on_dismiss.as_mut() {
                callback();
            }
        }
    }

    /// Install the dismiss handler.
    pub fn set_on_dismiss(&mut self, callback: Box<dyn FnMut()>) {
        self.on_dismiss = Some(callback);
    }

    /// True if a dismiss handler is installed. Pool hygiene tests use
    /// this to prove callbacks do not leak across reuses.
    pub fn has_dismiss_callback(&self) -> bool {
        self.on_dismiss.is_some()
    }

    /// Pool reuse-state flag.
    pub fn is_pooled(&self) -> bool {
        self.pooled
    }

    /// Set the pool reuse-state flag.
    pub fn set_pooled(&mut self, pooled: bool) {
        self.pooled = pooled;
    }

    /// Null out every per-use field before the instance returns to the
    /// pool. The next [`Toast::present`] starts from a blank slate with
    /// no stale callbacks.
    pub fn reset_for_pool(&mut self) {
        self.message.clear();
        self.ttl = 0;
        self.expired = false;
        self.on_dismiss = None;
        self.hit.reset();
        self.core.set_visible(false);
        self.core.set_enabled(true);
        self.core.mark_all_dirty();
    }
}

impl Component for Toast {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn update(&mut self, input: &InputSnapshot, _arbiter: &PointerArbiter) {
        if self.core.is_destroyed() || !self.core.visible() {
            self.hit.reset();
            return;
        }

        if self.ttl > 0 {
            self.ttl -= 1;
            if self.ttl == 0 {
                self.dismiss();
            } else if self.ttl < FADE_TICKS {
                let opacity = self.ttl as f32 / FADE_TICKS as f32;
                self.core.set_opacity(opacity);
            }
        }

        let (px, py) = input.pointer();
        let ev = self
            .hit
            .update(self.core.is_inside(px, py), self.core.enabled(), input);
        if ev.clicked {
            self.dismiss();
        }
    }

    fn refresh(&mut self) {
        if !self.core.visible() {
            return;
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("refresh", widget = "Toast").entered();

        let mut drew = self.core.begin_refresh();
        drew |= refresh_chrome(&mut self.core, &self.palette);

        if self.core.take_dirty(Layers::CONTENT) {
            let (cw, ch) = self.core.content_size();
            // An empty message draws nothing; the layer is still clean
            // because there is nothing to retry.
            if !self.message.is_empty() {
                let message = self.message.clone();
                self.core.content().set_text_color(self.palette.text);
                self.core
                    .content()
                    .draw_text(&message, Rect::from_size(cw, ch), TextAlign::Center);
            }
            drew = true;
        }
        self.core.mark_layer_clean(Layers::OVERLAY);

        self.core.finish_refresh(drew);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_render::recording::{DrawLog, RecordingFactory};
    use std::cell::Cell;
    use std::rc::Rc;

    fn fixture() -> (Toast, DrawLog) {
        let mut factory = RecordingFactory::new();
        let toast = Toast::new(
            Rect::new(0, 0, 260, 48),
            ToastConfig::default(),
            &mut factory,
        )
        .unwrap();
        let log = factory.log(0).unwrap();
        (toast, log)
    }

    #[test]
    fn ttl_counts_down_and_expires() {
        let (mut toast, _) = fixture();
        let arbiter = PointerArbiter::new();
        toast.present("saved", 3);
        let away = InputSnapshot::at(-50, -50);

        toast.update(&away, &arbiter);
        toast.update(&away, &arbiter);
        assert!(!toast.is_expired());
        toast.update(&away, &arbiter);
        assert!(toast.is_expired());
    }

    #[test]
    fn fades_near_expiry() {
        let (mut toast, _) = fixture();
        let arbiter = PointerArbiter::new();
        toast.present("saved", 10);
        toast.update(&InputSnapshot::at(-50, -50), &arbiter);
        assert!(toast.core().opacity() < 1.0);
    }

    #[test]
    fn click_dismisses_and_fires_handler() {
        let (mut toast, _) = fixture();
        let arbiter = PointerArbiter::new();
        let dismissed = Rc::new(Cell::new(0u32));
        let probe = dismissed.clone();
        toast.present("saved", 100);
        toast.set_on_dismiss(Box::new(move || probe.set(probe.get() + 1)));

        toast.update(&InputSnapshot::at(10, 10).press_edge(), &arbiter);
        toast.update(&InputSnapshot::at(10, 10).release_edge(), &arbiter);
        assert!(toast.is_expired());
        assert_eq!(dismissed.get(), 1);

        // Dismiss is edge-triggered, not repeated.
        toast.dismiss();
        assert_eq!(dismissed.get(), 1);
    }

    #[test]
    fn refresh_draws_message() {
        let (mut toast, log) = fixture();
        toast.present("file saved", 100);
        toast.refresh();
        assert_eq!(log.drawn_text(), vec!["file saved".to_string()]);
    }

    #[test]
    fn reset_for_pool_clears_every_per_use_field() {
        let (mut toast, _) = fixture();
        toast.present("saved", 100);
        toast.set_on_dismiss(Box::new(|| {}));

        toast.reset_for_pool();
        assert_eq!(toast.message(), "");
        assert_eq!(toast.ttl(), 0);
        assert!(!toast.is_expired());
        assert!(!toast.has_dismiss_callback());
        assert!(!toast.core().visible());
    }

    #[test]
    fn present_after_reset_restores_display_state() {
        let (mut toast, _) = fixture();
        toast.present("one", 5);
        let away = InputSnapshot::at(-50, -50);
        let arbiter = PointerArbiter::new();
        for _ in 0..5 {
            toast.update(&away, &arbiter);
        }
        assert!(toast.is_expired());
        toast.reset_for_pool();

        toast.present("two", 7);
        assert_eq!(toast.message(), "two");
        assert_eq!(toast.ttl(), 7);
        assert!(toast.core().visible());
        assert_eq!(toast.core().opacity(), 1.0);
        assert!(!toast.is_expired());
    }
}
