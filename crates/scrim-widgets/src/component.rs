#![forbid(unsafe_code)]

//! Component base: shared geometry and per-layer invalidation state.
//!
//! There is no widget base class. Every concrete widget embeds a
//! [`ComponentCore`] for the fields all components share and implements
//! the object-safe [`Component`] trait for the per-frame protocol.
//!
//! # Invalidation discipline
//!
//! A visual change marks dirty exactly the layers whose pixels it
//! affects, and `refresh` redraws only layers observed dirty, cleaning
//! each one it handled. A component whose state stops changing performs
//! zero redraw work on subsequent frames; this is the property the
//! whole framework exists for, since refresh runs inside a fixed-tick
//! loop shared with the world simulation. Dirtiness never propagates
//! implicitly between components; two components with a visual
//! relationship mark each other explicitly.

use crate::arbiter::PointerArbiter;
use scrim_core::geometry::{Insets, Rect};
use scrim_core::input::InputSnapshot;
use scrim_render::surface::{Surface, SurfaceError, SurfaceFactory};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

bitflags::bitflags! {
    /// Named visual layers, tracked independently for redraw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Layers: u8 {
        /// Base fill.
        const BACKGROUND = 1 << 0;
        /// Border chrome.
        const FRAME = 1 << 1;
        /// The component's main content (rows, text, cells).
        const CONTENT = 1 << 2;
        /// Decorations drawn above content (scrollbar thumb).
        const OVERLAY = 1 << 3;
    }
}

/// Process-unique component identity.
///
/// Used by the arbitration registry and the stage to refer to a
/// component without owning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl ComponentId {
    fn fresh() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for logging.
    pub fn value(&self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn fresh_for_tests() -> Self {
        Self::fresh()
    }
}

/// Construction options shared by all components.
///
/// Unset values fall back to safe defaults rather than failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreConfig {
    /// Content inset from the outer bounds, in pixels.
    pub padding: i32,
    /// Initial visibility.
    pub visible: bool,
    /// Initial interactivity.
    pub enabled: bool,
    /// Composite opacity in [0, 1].
    pub opacity: f32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            padding: 8,
            visible: true,
            enabled: true,
            opacity: 1.0,
        }
    }
}

impl CoreConfig {
    /// Set the content padding.
    #[must_use]
    pub fn with_padding(mut self, padding: i32) -> Self {
        self.padding = padding.max(0);
        self
    }

    /// Start hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Start disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set the initial opacity, clamped to [0, 1].
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// The fields every component shares: geometry, visibility, and the
/// per-layer dirty mask, plus the owned content drawing target.
pub struct ComponentCore {
    id: ComponentId,
    bounds: Rect,
    padding: i32,
    visible: bool,
    enabled: bool,
    opacity: f32,
    opacity_stale: bool,
    dirty: Layers,
    destroyed: bool,
    content: Box<dyn Surface>,
}

impl fmt::Debug for ComponentCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCore")
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .field("padding", &self.padding)
            .field("visible", &self.visible)
            .field("enabled", &self.enabled)
            .field("opacity", &self.opacity)
            .field("dirty", &self.dirty)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl ComponentCore {
    /// Create a core with explicit geometry, allocating a content
    /// drawing target of the padding-inset size.
    ///
    /// Every layer starts dirty so the first `refresh` draws everything.
    pub fn new(
        bounds: Rect,
        config: CoreConfig,
        surfaces: &mut dyn SurfaceFactory,
    ) -> Result<Self, SurfaceError> {
        let padding = config.padding.max(0);
        let inner = bounds.inner(Insets::uniform(padding));
        let content = surfaces.create(inner.width, inner.height)?;
        Ok(Self {
            id: ComponentId::fresh(),
            bounds,
            padding,
            visible: config.visible,
            enabled: config.enabled,
            opacity: config.opacity.clamp(0.0, 1.0),
            opacity_stale: true,
            dirty: Layers::all(),
            destroyed: false,
            content,
        })
    }

    /// This component's identity.
    #[inline]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Outer bounds in surface coordinates.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Content padding in pixels.
    #[inline]
    pub fn padding(&self) -> i32 {
        self.padding
    }

    /// The padding-inset content rectangle, in surface coordinates.
    #[inline]
    pub fn content_rect(&self) -> Rect {
        self.bounds.inner(Insets::uniform(self.padding))
    }

    /// Size of the content drawing target.
    #[inline]
    pub fn content_size(&self) -> (i32, i32) {
        let inner = self.content_rect();
        (inner.width, inner.height)
    }

    /// Outer-rectangle hit test, used for both hover detection and
    /// arbitration queries.
    #[inline]
    pub fn is_inside(&self, px: i32, py: i32) -> bool {
        self.bounds.contains(px, py)
    }

    /// Convert a surface point to content-local coordinates,
    /// subtracting the origin and padding.
    #[inline]
    pub fn to_local(&self, px: i32, py: i32) -> (i32, i32) {
        (
            px - self.bounds.x - self.padding,
            py - self.bounds.y - self.padding,
        )
    }

    /// Current visibility flag.
    #[inline]
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the component. Hiding does not discard drawn
    /// content; dirty layers keep their marks until the next refresh
    /// while visible.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Current enabled flag.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable interaction.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Composite opacity in [0, 1].
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set the composite opacity. Opacity affects every drawn pixel, so
    /// all layers are dirtied.
    pub fn set_opacity(&mut self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity != self.opacity {
            self.opacity = opacity;
            self.opacity_stale = true;
            self.mark_all_dirty();
        }
    }

    /// Mark every layer dirty.
    pub fn mark_all_dirty(&mut self) {
        self.dirty = Layers::all();
    }

    /// Mark specific layers dirty. Schedules a redraw on the next
    /// `refresh`; never draws synchronously.
    pub fn mark_dirty(&mut self, layers: Layers) {
        self.dirty |= layers;
    }

    /// True if any of the given layers is dirty.
    #[inline]
    pub fn is_layer_dirty(&self, layers: Layers) -> bool {
        self.dirty.intersects(layers)
    }

    /// Clear the dirty mark on the given layers. Consumed only inside a
    /// component's own `refresh` after it redrew them.
    pub fn mark_layer_clean(&mut self, layers: Layers) {
        self.dirty.remove(layers);
    }

    /// Check-and-clean in one step: true if any of `layers` was dirty,
    /// clearing the mark.
    pub fn take_dirty(&mut self, layers: Layers) -> bool {
        if self.dirty.intersects(layers) {
            self.dirty.remove(layers);
            true
        } else {
            false
        }
    }

    /// True if any layer is dirty.
    #[inline]
    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Move without resizing. Compositing position is the host's
    /// concern, so no layer is dirtied.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.bounds = self.bounds.at(x, y);
    }

    /// Resize the component and its content target.
    ///
    /// If the target cannot be reallocated the component keeps its
    /// previous geometry in full, with no partial application.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<(), SurfaceError> {
        let inner_w = (width - 2 * self.padding).max(0);
        let inner_h = (height - 2 * self.padding).max(0);
        self.content.try_resize(inner_w, inner_h)?;
        self.bounds = Rect::new(self.bounds.x, self.bounds.y, width, height);
        self.mark_all_dirty();
        Ok(())
    }

    /// Move and resize in one step, with the same all-or-nothing
    /// guarantee as [`ComponentCore::resize`].
    pub fn set_bounds(&mut self, bounds: Rect) -> Result<(), SurfaceError> {
        self.resize(bounds.width, bounds.height)?;
        self.bounds = bounds;
        Ok(())
    }

    /// Mark this component destroyed. It stops consuming input, the
    /// stage prunes it after the current update pass, and the
    /// arbitration registry skips it.
    pub fn dispose(&mut self) {
        self.destroyed = true;
        self.visible = false;
    }

    /// True once [`ComponentCore::dispose`] has run.
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The owned content drawing target.
    pub fn content(&mut self) -> &mut dyn Surface {
        self.content.as_mut()
    }

    /// Forward pending opacity to the surface at the start of a
    /// refresh. Returns true if anything was pushed.
    pub fn begin_refresh(&mut self) -> bool {
        if self.opacity_stale {
            self.opacity_stale = false;
            let opacity = self.opacity;
            self.content.set_opacity(opacity);
            true
        } else {
            false
        }
    }

    /// Signal the surface if this refresh drew anything.
    pub fn finish_refresh(&mut self, drew: bool) {
        if drew {
            self.content.mark_changed();
        }
    }
}

/// The per-frame protocol every retained component follows.
///
/// `update` polls the frozen input snapshot and mutates state, marking
/// dirty layers; `refresh` redraws only what `update` dirtied. The host
/// calls both once per tick, update pass first, in tree order.
pub trait Component {
    /// Shared fields, read side.
    fn core(&self) -> &ComponentCore;

    /// Shared fields, write side.
    fn core_mut(&mut self) -> &mut ComponentCore;

    /// Poll input and advance state. Runs before any `refresh` in the
    /// same frame; callbacks fire synchronously from here.
    fn update(&mut self, input: &InputSnapshot, arbiter: &PointerArbiter);

    /// Redraw dirty layers onto the content target.
    fn refresh(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_render::recording::RecordingFactory;

    fn core_with(bounds: Rect, config: CoreConfig) -> (ComponentCore, RecordingFactory) {
        let mut factory = RecordingFactory::new();
        let probe = factory.clone();
        let core = ComponentCore::new(bounds, config, &mut factory).unwrap();
        (core, probe)
    }

    // --- Geometry ---

    #[test]
    fn content_target_is_padding_inset() {
        let (core, probe) = core_with(Rect::new(10, 10, 100, 60), CoreConfig::default());
        assert_eq!(core.content_size(), (84, 44));
        assert_eq!(core.content_rect(), Rect::new(18, 18, 84, 44));
        assert_eq!(probe.created(), 1);
    }

    #[test]
    fn to_local_subtracts_origin_and_padding() {
        let (core, _) = core_with(
            Rect::new(10, 20, 100, 60),
            CoreConfig::default().with_padding(4),
        );
        assert_eq!(core.to_local(14, 24), (0, 0));
        assert_eq!(core.to_local(10, 20), (-4, -4));
        assert_eq!(core.to_local(50, 50), (36, 26));
    }

    #[test]
    fn is_inside_tests_outer_rect() {
        let (core, _) = core_with(Rect::new(10, 10, 100, 60), CoreConfig::default());
        assert!(core.is_inside(10, 10));
        assert!(core.is_inside(109, 69));
        assert!(!core.is_inside(110, 10));
        assert!(!core.is_inside(9, 10));
    }

    // --- Dirty bookkeeping ---

    #[test]
    fn all_layers_start_dirty() {
        let (core, _) = core_with(Rect::new(0, 0, 50, 50), CoreConfig::default());
        assert!(core.is_layer_dirty(Layers::BACKGROUND));
        assert!(core.is_layer_dirty(Layers::FRAME));
        assert!(core.is_layer_dirty(Layers::CONTENT));
        assert!(core.is_layer_dirty(Layers::OVERLAY));
    }

    #[test]
    fn take_dirty_cleans_exactly_once() {
        let (mut core, _) = core_with(Rect::new(0, 0, 50, 50), CoreConfig::default());
        assert!(core.take_dirty(Layers::CONTENT));
        assert!(!core.take_dirty(Layers::CONTENT));
        // Other layers untouched.
        assert!(core.is_layer_dirty(Layers::BACKGROUND));
    }

    #[test]
    fn mark_dirty_is_additive() {
        let (mut core, _) = core_with(Rect::new(0, 0, 50, 50), CoreConfig::default());
        core.mark_layer_clean(Layers::all());
        assert!(!core.has_dirty());
        core.mark_dirty(Layers::CONTENT | Layers::OVERLAY);
        assert!(core.is_layer_dirty(Layers::CONTENT));
        assert!(core.is_layer_dirty(Layers::OVERLAY));
        assert!(!core.is_layer_dirty(Layers::FRAME));
    }

    #[test]
    fn opacity_change_dirties_all_layers() {
        let (mut core, _) = core_with(Rect::new(0, 0, 50, 50), CoreConfig::default());
        core.mark_layer_clean(Layers::all());
        core.set_opacity(0.5);
        assert_eq!(core.opacity(), 0.5);
        assert!(core.is_layer_dirty(Layers::all()));

        // Same value again is a no-op.
        core.mark_layer_clean(Layers::all());
        core.set_opacity(0.5);
        assert!(!core.has_dirty());
    }

    #[test]
    fn begin_refresh_pushes_opacity_once() {
        let (mut core, probe) = core_with(Rect::new(0, 0, 50, 50), CoreConfig::default());
        let log = probe.log(0).unwrap();
        assert!(core.begin_refresh());
        assert!(!core.begin_refresh());
        assert_eq!(log.count(|op| matches!(op, scrim_render::DrawOp::Opacity(_))), 1);
    }

    // --- Resize semantics ---

    #[test]
    fn resize_updates_bounds_and_dirties() {
        let (mut core, _) = core_with(Rect::new(5, 5, 100, 60), CoreConfig::default());
        core.mark_layer_clean(Layers::all());
        core.resize(200, 80).unwrap();
        assert_eq!(core.bounds(), Rect::new(5, 5, 200, 80));
        assert_eq!(core.content_size(), (184, 64));
        assert!(core.is_layer_dirty(Layers::all()));
    }

    #[test]
    fn failed_resize_leaves_state_consistent() {
        let (mut core, probe) = core_with(Rect::new(5, 5, 100, 60), CoreConfig::default());
        core.mark_layer_clean(Layers::all());
        probe.log(0).unwrap().fail_next_resizes(1);

        assert!(core.resize(200, 80).is_err());
        // Previous dimensions kept, nothing dirtied.
        assert_eq!(core.bounds(), Rect::new(5, 5, 100, 60));
        assert_eq!(core.content_size(), (84, 44));
        assert!(!core.has_dirty());

        // A later attempt succeeds normally.
        assert!(core.resize(200, 80).is_ok());
        assert_eq!(core.bounds(), Rect::new(5, 5, 200, 80));
    }

    #[test]
    fn set_position_moves_without_dirtying() {
        let (mut core, _) = core_with(Rect::new(0, 0, 50, 50), CoreConfig::default());
        core.mark_layer_clean(Layers::all());
        core.set_position(30, 40);
        assert_eq!(core.bounds(), Rect::new(30, 40, 50, 50));
        assert!(!core.has_dirty());
    }

    // --- Lifecycle ---

    #[test]
    fn dispose_hides_and_marks_destroyed() {
        let (mut core, _) = core_with(Rect::new(0, 0, 50, 50), CoreConfig::default());
        assert!(!core.is_destroyed());
        core.dispose();
        assert!(core.is_destroyed());
        assert!(!core.visible());
    }

    #[test]
    fn ids_are_unique() {
        let (a, _) = core_with(Rect::new(0, 0, 1, 1), CoreConfig::default());
        let (b, _) = core_with(Rect::new(0, 0, 1, 1), CoreConfig::default());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn finish_refresh_signals_only_when_drawn() {
        let (mut core, probe) = core_with(Rect::new(0, 0, 50, 50), CoreConfig::default());
        let log = probe.log(0).unwrap();
        core.finish_refresh(false);
        assert_eq!(log.changed_signals(), 0);
        core.finish_refresh(true);
        assert_eq!(log.changed_signals(), 1);
    }
}
