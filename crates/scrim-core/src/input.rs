#![forbid(unsafe_code)]

//! Per-frame input snapshot.
//!
//! Interactive components do not receive discrete events. Once per host
//! tick the device is polled and frozen into an [`InputSnapshot`]; every
//! component's `update` reads the same immutable value. This keeps
//! dispatch deterministic within a frame and unit-testable without a
//! running host loop.
//!
//! # Invariants
//!
//! 1. `is_triggered()` implies `is_pressed()` (a press-down edge is a
//!    held button by definition).
//! 2. `is_released()` and `is_pressed()` are mutually exclusive within
//!    one snapshot.
//! 3. A snapshot is never mutated after construction; the builder
//!    methods consume and return by value.

use smallvec::SmallVec;

/// Logical key identifiers polled by widgets.
///
/// These name intents, not physical keys; the host's input layer owns
/// the physical binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    /// Confirm / activate.
    Ok,
    /// Dismiss / back out.
    Cancel,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Tab,
}

/// Immutable snapshot of the pointer/key device for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pointer_x: i32,
    pointer_y: i32,
    triggered: bool,
    pressed: bool,
    released: bool,
    wheel: i32,
    keys: SmallVec<[LogicalKey; 4]>,
}

impl InputSnapshot {
    /// A snapshot with the pointer at (x, y) and no button or key activity.
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            pointer_x: x,
            pointer_y: y,
            ..Self::default()
        }
    }

    /// Build a snapshot from raw device polls.
    ///
    /// `prev_pressed` is the held flag from the previous frame's
    /// snapshot; the release edge is derived from it, since devices
    /// typically expose only "down edge" and "held".
    pub fn poll(
        x: i32,
        y: i32,
        triggered: bool,
        pressed: bool,
        wheel: i32,
        prev_pressed: bool,
    ) -> Self {
        Self {
            pointer_x: x,
            pointer_y: y,
            triggered,
            // Edge implies held; tolerate devices reporting them apart.
            pressed: pressed || triggered,
            released: prev_pressed && !pressed && !triggered,
            wheel,
            keys: SmallVec::new(),
        }
    }

    /// Mark a press-down edge this frame (also sets held).
    #[must_use]
    pub fn press_edge(mut self) -> Self {
        self.triggered = true;
        self.pressed = true;
        self.released = false;
        self
    }

    /// Mark the button as held (no edge).
    #[must_use]
    pub fn held(mut self) -> Self {
        self.pressed = true;
        self.released = false;
        self
    }

    /// Mark a release edge this frame.
    #[must_use]
    pub fn release_edge(mut self) -> Self {
        self.released = true;
        self.pressed = false;
        self.triggered = false;
        self
    }

    /// Set the wheel delta for this frame, in row steps.
    ///
    /// Positive scrolls content down (offset increases).
    #[must_use]
    pub fn with_wheel(mut self, delta: i32) -> Self {
        self.wheel = delta;
        self
    }

    /// Add a key triggered this frame.
    #[must_use]
    pub fn with_key(mut self, key: LogicalKey) -> Self {
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
        self
    }

    /// Current pointer position in surface pixels.
    #[inline]
    pub fn pointer(&self) -> (i32, i32) {
        (self.pointer_x, self.pointer_y)
    }

    /// True if the primary button went down this frame.
    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// True if the primary button is held this frame.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// True if the primary button was released this frame.
    #[inline]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Wheel delta for this frame, in row steps.
    #[inline]
    pub fn wheel_delta(&self) -> i32 {
        self.wheel
    }

    /// True if the given logical key was triggered this frame.
    #[inline]
    pub fn is_key_triggered(&self, key: LogicalKey) -> bool {
        self.keys.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::{InputSnapshot, LogicalKey};

    #[test]
    fn default_is_inert() {
        let snap = InputSnapshot::at(10, 20);
        assert_eq!(snap.pointer(), (10, 20));
        assert!(!snap.is_triggered());
        assert!(!snap.is_pressed());
        assert!(!snap.is_released());
        assert_eq!(snap.wheel_delta(), 0);
        assert!(!snap.is_key_triggered(LogicalKey::Ok));
    }

    #[test]
    fn press_edge_implies_held() {
        let snap = InputSnapshot::at(0, 0).press_edge();
        assert!(snap.is_triggered());
        assert!(snap.is_pressed());
        assert!(!snap.is_released());
    }

    #[test]
    fn release_clears_held() {
        let snap = InputSnapshot::at(0, 0).release_edge();
        assert!(snap.is_released());
        assert!(!snap.is_pressed());
        assert!(!snap.is_triggered());
    }

    #[test]
    fn poll_derives_release_edge() {
        let held = InputSnapshot::poll(0, 0, true, true, 0, false);
        assert!(held.is_triggered() && held.is_pressed() && !held.is_released());

        let after = InputSnapshot::poll(0, 0, false, false, 0, held.is_pressed());
        assert!(after.is_released());
        assert!(!after.is_pressed());

        // No release edge when the button was never held.
        let idle = InputSnapshot::poll(0, 0, false, false, 0, false);
        assert!(!idle.is_released());
    }

    #[test]
    fn poll_edge_without_held_is_normalized() {
        let snap = InputSnapshot::poll(0, 0, true, false, 0, false);
        assert!(snap.is_pressed());
        assert!(!snap.is_released());
    }

    #[test]
    fn keys_deduplicate() {
        let snap = InputSnapshot::at(0, 0)
            .with_key(LogicalKey::Down)
            .with_key(LogicalKey::Down)
            .with_key(LogicalKey::Ok);
        assert!(snap.is_key_triggered(LogicalKey::Down));
        assert!(snap.is_key_triggered(LogicalKey::Ok));
        assert!(!snap.is_key_triggered(LogicalKey::Cancel));
    }

    #[test]
    fn wheel_sign_passthrough() {
        assert_eq!(InputSnapshot::at(0, 0).with_wheel(3).wheel_delta(), 3);
        assert_eq!(InputSnapshot::at(0, 0).with_wheel(-2).wheel_delta(), -2);
    }
}
