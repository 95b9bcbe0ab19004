#![forbid(unsafe_code)]

//! Per-frame driver.
//!
//! One [`Stage::tick`] per host game tick: update pass over every
//! top-level component (each isolated so a panicking callback cannot
//! break dispatch for the rest), pruning of disposed components,
//! refresh pass, then the arbitration commit. Host input hooks that
//! query [`UiContext::arbiter`] between ticks therefore observe the
//! registry as of the end of the previous frame's updates.

use scrim_core::input::InputSnapshot;
use scrim_render::surface::{Surface, SurfaceError, SurfaceFactory};
use scrim_widgets::arbiter::PointerArbiter;
use scrim_widgets::component::{Component, ComponentId};
use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use tracing::{debug, error};

/// Shared services handed to components at construction and to the
/// stage at tick time. One per scene; [`UiContext::reset`] tears the
/// scene down without leaking registrations into the next one.
pub struct UiContext {
    /// The pointer arbitration registry host hooks query.
    pub arbiter: PointerArbiter,
    /// Allocator for component content surfaces.
    pub surfaces: Box<dyn SurfaceFactory>,
}

impl UiContext {
    /// Create a context around the host's surface factory.
    pub fn new(surfaces: Box<dyn SurfaceFactory>) -> Self {
        Self {
            arbiter: PointerArbiter::new(),
            surfaces,
        }
    }

    /// Allocate a content surface.
    pub fn create_surface(&mut self, width: i32, height: i32) -> Result<Box<dyn Surface>, SurfaceError> {
        self.surfaces.create(width, height)
    }

    /// Scene teardown: drop every registration.
    pub fn reset(&mut self) {
        self.arbiter.clear();
    }
}

/// The set of live top-level components, updated and refreshed in
/// insertion order each tick.
#[derive(Default)]
pub struct Stage {
    roots: Vec<Rc<RefCell<dyn Component>>>,
}

impl Stage {
    /// Create an empty stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level component and register it for arbitration.
    /// Later additions are treated as topmost by the registry.
    pub fn add(&mut self, component: Rc<RefCell<dyn Component>>, ctx: &mut UiContext) {
        ctx.arbiter.register(&component);
        self.roots.push(component);
    }

    /// Remove a component by id, unregistering it.
    pub fn remove(&mut self, id: ComponentId, ctx: &mut UiContext) {
        self.roots.retain(|root| {
            let keep = root.borrow().core().id() != id;
            if !keep {
                ctx.arbiter.unregister(id);
            }
            keep
        });
    }

    /// Number of live top-level components.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// True if the stage is empty.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Run one frame: update pass, prune, refresh pass, arbitration
    /// commit.
    pub fn tick(&mut self, input: &InputSnapshot, ctx: &mut UiContext) {
        for root in &self.roots {
            isolated_update(root, input, &ctx.arbiter);
        }

        // A callback may have disposed its own component; drop it here
        // so refresh never touches stale state.
        self.roots.retain(|root| {
            let (id, destroyed) = {
                let component = root.borrow();
                (component.core().id(), component.core().is_destroyed())
            };
            if destroyed {
                debug!(id = id.value(), "pruning disposed component");
                ctx.arbiter.unregister(id);
            }
            !destroyed
        });

        for root in &self.roots {
            root.borrow_mut().refresh();
        }

        ctx.arbiter.commit();
    }
}

/// Run one component's update inside a panic boundary.
///
/// A user callback that panics must not corrupt dispatch for the other
/// components in the same frame; the panic is captured and logged, and
/// the frame goes on.
pub(crate) fn isolated_update(
    component: &Rc<RefCell<dyn Component>>,
    input: &InputSnapshot,
    arbiter: &PointerArbiter,
) {
    let result = catch_unwind(AssertUnwindSafe(|| {
        component.borrow_mut().update(input, arbiter);
    }));
    if let Err(payload) = result {
        error!(message = panic_message(&payload), "component update panicked");
    }
}

/// Extract a readable message from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
