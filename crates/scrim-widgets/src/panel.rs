#![forbid(unsafe_code)]

//! Plain chrome panel.
//!
//! A background-and-frame component with an optional click callback.
//! Useful on its own as a modal backdrop (register it last and it
//! claims every pointer action behind a dialog) and as the smallest
//! concrete component for exercising the frame protocol.

use crate::arbiter::PointerArbiter;
use crate::component::{Component, ComponentCore, CoreConfig, Layers};
use crate::hit::HitState;
use crate::{Palette, refresh_chrome};
use scrim_core::geometry::Rect;
use scrim_core::input::InputSnapshot;
use scrim_render::surface::{SurfaceError, SurfaceFactory};

/// Construction options for [`Panel`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanelConfig {
    pub core: CoreConfig,
    pub palette: Palette,
}

impl PanelConfig {
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

/// A chrome-only component.
pub struct Panel {
    core: ComponentCore,
    hit: HitState,
    palette: Palette,
    on_click: Option<Box<dyn FnMut()>>,
}

impl Panel {
    /// Create a panel with explicit geometry.
    pub fn new(
        bounds: Rect,
        config: PanelConfig,
        surfaces: &mut dyn SurfaceFactory,
    ) -> Result<Self, SurfaceError> {
        Ok(Self {
            core: ComponentCore::new(bounds, config.core, surfaces)?,
            hit: HitState::default(),
            palette: config.palette,
            on_click: None,
        })
    }

    /// Install a click handler.
    pub fn set_on_click(&mut self, callback: Box<dyn FnMut()>) {
        self.on_click = Some(callback);
    }

    /// Current hit phase, for tests and host logic.
    pub fn hit(&self) -> &HitState {
        &self.hit
    }
}

impl Component for Panel {
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
        let (px, py) = input.pointer();
        let ev = self
            .hit
            .update(self.core.is_inside(px, py), self.core.enabled(), input);
        if ev.clicked
            && let Some(callback) = self.on_click.as_mut()
        {
            callback();
        }
    }

    fn refresh(&mut self) {
        if !self.core.visible() {
            return;
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("refresh", widget = "Panel").entered();

        let mut drew = self.core.begin_refresh();
        drew |= refresh_chrome(&mut self.core, &self.palette);
        // No content or overlay to draw.
        self.core.mark_layer_clean(Layers::CONTENT | Layers::OVERLAY);
        self.core.finish_refresh(drew);
    }
}
