#![forbid(unsafe_code)]

//! Pointer arbitration registry.
//!
//! The registry answers one question for the host: "is this screen
//! point claimed by UI?" Host input hooks must ask *before* committing
//! a world-interaction action at the same coordinates; the reverse
//! order is the classic click-through bug.
//!
//! # Design
//!
//! - Entries hold weak references; the registry owns nothing. A
//!   destroyed component that was never unregistered is skipped on
//!   every query, not assumed absent.
//! - Queries scan most-recently-registered first, so later-added (and
//!   therefore typically topmost overlay) components win ties. This is
//!   the only z-order in the framework; widgets that need topmost-wins
//!   hover semantics ask [`PointerArbiter::allows`] instead of
//!   re-deriving their own.
//! - Registration and unregistration queue until [`PointerArbiter::commit`],
//!   which the frame driver calls after the update pass. Host queries
//!   therefore observe the registry as of the end of the previous
//!   frame's updates, so a component never blocks input before it has
//!   been laid out.
//!
//! A linear scan is deliberate: the registry holds top-level overlays,
//! tens of entries at most, and a spatial index would be dead weight.

use crate::component::{Component, ComponentId};
use scrim_core::geometry::Rect;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug)]
struct Entry {
    id: ComponentId,
    handle: Weak<RefCell<dyn Component>>,
    /// Bounds as of the last commit.
    bounds: Rect,
    /// Visible and not destroyed as of the last commit.
    visible: bool,
}

impl Entry {
    fn alive(&self) -> bool {
        self.handle.strong_count() > 0
    }
}

#[derive(Debug)]
enum PendingOp {
    Register {
        id: ComponentId,
        handle: Weak<RefCell<dyn Component>>,
    },
    Unregister(ComponentId),
}

/// Registry of interactive components consulted by host input hooks.
#[derive(Debug, Default)]
pub struct PointerArbiter {
    entries: Vec<Entry>,
    pending: Vec<PendingOp>,
}

impl PointerArbiter {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a component for registration. Idempotent: registering an
    /// already-registered component is a no-op at commit. Takes effect
    /// for the next frame's queries.
    pub fn register(&mut self, component: &Rc<RefCell<dyn Component>>) {
        let id = component.borrow().core().id();
        self.pending.push(PendingOp::Register {
            id,
            handle: Rc::downgrade(component),
        });
    }

    /// Queue removal. Unregistering a never-registered component is a
    /// no-op.
    pub fn unregister(&mut self, id: ComponentId) {
        self.pending.push(PendingOp::Unregister(id));
    }

    /// Apply queued operations and refresh per-entry snapshots.
    ///
    /// The frame driver calls this once per tick, after the update and
    /// refresh passes. Dead and destroyed entries are dropped here.
    pub fn commit(&mut self) {
        for op in self.pending.drain(..) {
            match op {
                PendingOp::Register { id, handle } => {
                    if !self.entries.iter().any(|e| e.id == id) {
                        self.entries.push(Entry {
                            id,
                            handle,
                            bounds: Rect::default(),
                            visible: false,
                        });
                    }
                }
                PendingOp::Unregister(id) => {
                    self.entries.retain(|e| e.id != id);
                }
            }
        }

        self.entries.retain_mut(|entry| {
            let Some(rc) = entry.handle.upgrade() else {
                return false;
            };
            // Nothing is borrowed at commit time; if something is, keep
            // the previous snapshot rather than guessing.
            if let Ok(component) = rc.try_borrow() {
                let core = component.core();
                if core.is_destroyed() {
                    return false;
                }
                entry.bounds = core.bounds();
                entry.visible = core.visible();
            }
            true
        });
    }

    /// True if a registered, visible component claims (x, y).
    pub fn is_blocking(&self, x: i32, y: i32) -> bool {
        self.top_claimant(x, y).is_some()
    }

    /// The topmost claimant at (x, y): most recently registered wins.
    pub fn top_claimant(&self, x: i32, y: i32) -> Option<ComponentId> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.alive() && e.visible && e.bounds.contains(x, y))
            .map(|e| e.id)
    }

    /// True unless some *other* component is the topmost claimant at
    /// (x, y). Guarded widgets call this before arming hover.
    pub fn allows(&self, id: ComponentId, x: i32, y: i32) -> bool {
        match self.top_claimant(x, y) {
            None => true,
            Some(top) => top == id,
        }
    }

    /// True if any registered component is visible; gates broader host
    /// behaviors (e.g. suppressing camera pan while menus are open).
    pub fn has_visible_ui(&self) -> bool {
        self.entries.iter().any(|e| e.alive() && e.visible)
    }

    /// Drop everything, committed and pending. Scene teardown.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pending.clear();
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries are committed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if the component is in the committed set.
    pub fn is_registered(&self, id: ComponentId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::CoreConfig;
    use crate::panel::{Panel, PanelConfig};
    use scrim_render::recording::RecordingFactory;

    fn panel(bounds: Rect) -> Rc<RefCell<dyn Component>> {
        let mut factory = RecordingFactory::new();
        let panel = Panel::new(bounds, PanelConfig::default(), &mut factory).unwrap();
        Rc::new(RefCell::new(panel))
    }

    fn hidden_panel(bounds: Rect) -> Rc<RefCell<dyn Component>> {
        let mut factory = RecordingFactory::new();
        let config = PanelConfig::default().with_core(CoreConfig::default().hidden());
        let panel = Panel::new(bounds, config, &mut factory).unwrap();
        Rc::new(RefCell::new(panel))
    }

    #[test]
    fn registration_takes_effect_at_commit() {
        let mut arbiter = PointerArbiter::new();
        let a = panel(Rect::new(0, 0, 100, 100));
        arbiter.register(&a);
        // Mid-frame: not yet visible to queries.
        assert!(!arbiter.is_blocking(10, 10));
        arbiter.commit();
        assert!(arbiter.is_blocking(10, 10));
        assert!(!arbiter.is_blocking(150, 150));
    }

    #[test]
    fn last_registered_wins_overlap() {
        let mut arbiter = PointerArbiter::new();
        let a = panel(Rect::new(0, 0, 100, 100));
        let b = panel(Rect::new(50, 50, 150, 150));
        arbiter.register(&a);
        arbiter.register(&b);
        arbiter.commit();

        let b_id = b.borrow().core().id();
        let a_id = a.borrow().core().id();
        // Both contain (75, 75); B was registered last.
        assert_eq!(arbiter.top_claimant(75, 75), Some(b_id));
        // Only A contains (10, 10).
        assert_eq!(arbiter.top_claimant(10, 10), Some(a_id));
        assert!(arbiter.allows(b_id, 75, 75));
        assert!(!arbiter.allows(a_id, 75, 75));
    }

    #[test]
    fn register_is_idempotent() {
        let mut arbiter = PointerArbiter::new();
        let a = panel(Rect::new(0, 0, 100, 100));
        arbiter.register(&a);
        arbiter.register(&a);
        arbiter.commit();
        assert_eq!(arbiter.len(), 1);

        arbiter.unregister(a.borrow().core().id());
        arbiter.commit();
        assert!(arbiter.is_empty());
        assert!(!arbiter.is_blocking(10, 10));
    }

    #[test]
    fn unregister_unknown_is_noop() {
        let mut arbiter = PointerArbiter::new();
        let a = panel(Rect::new(0, 0, 100, 100));
        arbiter.register(&a);
        arbiter.unregister(ComponentId::fresh_for_tests());
        arbiter.commit();
        assert_eq!(arbiter.len(), 1);
    }

    #[test]
    fn hidden_components_do_not_block() {
        let mut arbiter = PointerArbiter::new();
        let a = hidden_panel(Rect::new(0, 0, 100, 100));
        arbiter.register(&a);
        arbiter.commit();
        assert!(!arbiter.is_blocking(10, 10));
        assert!(!arbiter.has_visible_ui());

        a.borrow_mut().core_mut().set_visible(true);
        // Visibility change is observed at the next commit.
        assert!(!arbiter.is_blocking(10, 10));
        arbiter.commit();
        assert!(arbiter.is_blocking(10, 10));
        assert!(arbiter.has_visible_ui());
    }

    #[test]
    fn dropped_component_is_skipped_then_collected() {
        let mut arbiter = PointerArbiter::new();
        let a = panel(Rect::new(0, 0, 100, 100));
        arbiter.register(&a);
        arbiter.commit();
        assert!(arbiter.is_blocking(10, 10));

        // Destroyed without unregistering: the registry defends itself.
        drop(a);
        assert!(!arbiter.is_blocking(10, 10));
        assert!(!arbiter.has_visible_ui());
        arbiter.commit();
        assert!(arbiter.is_empty());
    }

    #[test]
    fn disposed_component_is_dropped_at_commit() {
        let mut arbiter = PointerArbiter::new();
        let a = panel(Rect::new(0, 0, 100, 100));
        arbiter.register(&a);
        arbiter.commit();

        a.borrow_mut().core_mut().dispose();
        arbiter.commit();
        assert!(arbiter.is_empty());
    }

    #[test]
    fn clear_empties_everything() {
        let mut arbiter = PointerArbiter::new();
        let a = panel(Rect::new(0, 0, 100, 100));
        let b = panel(Rect::new(0, 0, 50, 50));
        arbiter.register(&a);
        arbiter.commit();
        arbiter.register(&b);
        arbiter.clear();
        arbiter.commit();
        assert!(arbiter.is_empty());
        assert!(!arbiter.has_visible_ui());
    }

    #[test]
    fn bounds_snapshot_follows_moves() {
        let mut arbiter = PointerArbiter::new();
        let a = panel(Rect::new(0, 0, 100, 100));
        arbiter.register(&a);
        arbiter.commit();

        a.borrow_mut().core_mut().set_position(500, 500);
        // Old bounds until commit.
        assert!(arbiter.is_blocking(10, 10));
        arbiter.commit();
        assert!(!arbiter.is_blocking(10, 10));
        assert!(arbiter.is_blocking(510, 510));
    }
}
