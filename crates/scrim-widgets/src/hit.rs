#![forbid(unsafe_code)]

//! Hover/press hit-state machine.
//!
//! Evaluated once per frame inside a component's `update` from the
//! frozen input snapshot. There is no z-order here: each component
//! tests independently against the device; topmost-wins semantics are
//! the arbitration registry's job.
//!
//! # Invariants
//!
//! 1. A press can only arm while the pointer is inside bounds at the
//!    press-down edge. A press that starts outside never arms, even if
//!    the pointer drags in while held. Drag-in arms drag gestures
//!    only, which are widget-specific behavior layered on top.
//! 2. A release while armed fires at most one click, and only if the
//!    pointer is still inside.
//! 3. Hover and the armed press both drop when the component becomes
//!    disabled or hidden; no click fires from a disable mid-press.

use scrim_core::input::InputSnapshot;

/// Dispatch phase of an interactive component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitPhase {
    /// Pointer outside, no press armed.
    #[default]
    Idle,
    /// Pointer inside, no press armed.
    Hover,
    /// A press started inside and has not been released.
    Pressed,
}

/// Edge events produced by one frame's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitEvents {
    /// Pointer entered bounds this frame.
    pub entered: bool,
    /// Pointer left bounds this frame.
    pub exited: bool,
    /// A press armed this frame.
    pub pressed: bool,
    /// An armed press released this frame (inside or out).
    pub released: bool,
    /// An armed press released inside bounds: fire the callback.
    pub clicked: bool,
}

impl HitEvents {
    /// True if hover changed either way.
    #[inline]
    pub fn hover_changed(&self) -> bool {
        self.entered || self.exited
    }
}

/// Per-component hover/press tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitState {
    hovering: bool,
    armed: bool,
}

impl HitState {
    /// Current phase. While a press is armed the phase stays `Pressed`
    /// even if the pointer wanders outside; it releases back through
    /// the edge events.
    pub fn phase(&self) -> HitPhase {
        if self.armed {
            HitPhase::Pressed
        } else if self.hovering {
            HitPhase::Hover
        } else {
            HitPhase::Idle
        }
    }

    /// True if the pointer was inside bounds at the last evaluation.
    #[inline]
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// True if a press is currently armed.
    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Advance one frame.
    ///
    /// `inside` is the caller's bounds test at the snapshot's pointer;
    /// guarded widgets pass false when another component claims the
    /// point.
    pub fn update(&mut self, inside: bool, enabled: bool, input: &InputSnapshot) -> HitEvents {
        let inside = inside && enabled;
        let mut ev = HitEvents {
            entered: inside && !self.hovering,
            exited: !inside && self.hovering,
            ..HitEvents::default()
        };
        self.hovering = inside;

        if !enabled {
            self.armed = false;
            return ev;
        }

        if self.armed {
            if input.is_released() {
                self.armed = false;
                ev.released = true;
                ev.clicked = inside;
            } else if !input.is_pressed() {
                // Release edge lost (host focus change); disarm, no click.
                self.armed = false;
            }
        } else if inside && input.is_triggered() {
            self.armed = true;
            ev.pressed = true;
        }

        ev
    }

    /// Drop all state, e.g. when the component is hidden. Returns true
    /// if anything was set, so callers know to dirty hover visuals.
    pub fn reset(&mut self) -> bool {
        let had = self.hovering || self.armed;
        self.hovering = false;
        self.armed = false;
        had
    }
}
