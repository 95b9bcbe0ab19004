#![forbid(unsafe_code)]

//! Scrollbar decoration.
//!
//! Purely derivative: track and thumb geometry come from the owning
//! container's [`ScrollWindow`] each time the overlay layer redraws.
//! Dragging the thumb is not a scroll source; the window's offset is
//! the single source of truth.

use crate::scroll::ScrollWindow;
use scrim_core::geometry::Rect;
use scrim_render::surface::{Rgba, Surface};

/// Vertical scrollbar drawn along the right edge of a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scrollbar {
    track_width: i32,
    margin: i32,
    track_color: Rgba,
    thumb_color: Rgba,
}

impl Default for Scrollbar {
    fn default() -> Self {
        Self {
            track_width: 6,
            margin: 2,
            track_color: Rgba::new(255, 255, 255, 28),
            thumb_color: Rgba::new(255, 255, 255, 120),
        }
    }
}

impl Scrollbar {
    /// Create a scrollbar with default styling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the track width in pixels.
    #[must_use]
    pub fn with_track_width(mut self, width: i32) -> Self {
        self.track_width = width.max(1);
        self
    }

    /// Set the track and thumb colors.
    #[must_use]
    pub fn with_colors(mut self, track: Rgba, thumb: Rgba) -> Self {
        self.track_color = track;
        self.thumb_color = thumb;
        self
    }

    /// Draw the track and thumb along the right edge of `viewport`.
    ///
    /// Draws nothing when the content fits the viewport.
    pub fn render(&self, window: &ScrollWindow, viewport: Rect, target: &mut dyn Surface) {
        let Some((pos, len)) = window.thumb_span(viewport.height) else {
            return;
        };
        let x = viewport
            .right()
            .saturating_sub(self.track_width + self.margin);
        let track = Rect::new(x, viewport.y, self.track_width, viewport.height);
        target.fill_rect(track, self.track_color);
        target.fill_rect(
            Rect::new(x, viewport.y.saturating_add(pos), self.track_width, len),
            self.thumb_color,
        );
    }
}
