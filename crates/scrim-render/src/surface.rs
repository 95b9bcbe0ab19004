#![forbid(unsafe_code)]

//! Drawing-target capability consumed by every component.
//!
//! A [`Surface`] is an addressable 2D pixel target with primitive draw
//! operations and a content-changed signal the compositor uses to know
//! it must re-upload. Components own their content surface and draw in
//! content-local coordinates; compositing the surface to screen is the
//! host's job and out of scope here.

use scrim_core::geometry::Rect;
use std::fmt;

/// Packed 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    /// Opaque white.
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    /// Create an RGBA color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// This color with a different alpha.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Horizontal text alignment within a draw rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Failures from surface allocation or resize.
///
/// These are the only renderer errors the core reacts to: a component
/// whose content target cannot be (re)sized keeps its previous geometry
/// rather than partially applying the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The host could not allocate or resize a drawing target.
    AllocationFailed {
        /// Requested width in pixels.
        width: i32,
        /// Requested height in pixels.
        height: i32,
    },
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed { width, height } => {
                write!(f, "surface allocation failed for {width}x{height}")
            }
        }
    }
}

impl std::error::Error for SurfaceError {}

/// An addressable 2D drawing target.
///
/// All coordinates are local to this surface. Implementations are free
/// to clip out-of-range draws; callers do not pre-clip.
pub trait Surface {
    /// Current width in pixels.
    fn width(&self) -> i32;

    /// Current height in pixels.
    fn height(&self) -> i32;

    /// Resize the target, preserving nothing.
    ///
    /// On `Err` the surface keeps its previous dimensions and contents.
    fn try_resize(&mut self, width: i32, height: i32) -> Result<(), SurfaceError>;

    /// Erase the whole target to transparent.
    fn clear(&mut self);

    /// Fill a rectangle with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    /// Stroke a rectangle outline.
    fn stroke_rect(&mut self, rect: Rect, color: Rgba, thickness: i32);

    /// Set the color used by subsequent [`Surface::draw_text`] calls.
    fn set_text_color(&mut self, color: Rgba);

    /// Draw a line of text inside `rect` with the given alignment.
    ///
    /// Measurement, shaping, and fonts belong to the implementation; a
    /// glyph source that is not ready yet draws nothing this frame.
    fn draw_text(&mut self, text: &str, rect: Rect, align: TextAlign);

    /// Copy a region of another surface onto this one, scaling if the
    /// rectangles differ in size.
    fn blit(&mut self, source: &dyn Surface, src: Rect, dst: Rect);

    /// Set the opacity applied when this surface is composited, in [0, 1].
    fn set_opacity(&mut self, opacity: f32);

    /// Signal that drawn content changed and must be re-composited.
    fn mark_changed(&mut self);
}

/// Allocator for content surfaces, injected at component construction.
pub trait SurfaceFactory {
    /// Allocate a new surface of the given size.
    fn create(&mut self, width: i32, height: i32) -> Result<Box<dyn Surface>, SurfaceError>;
}
