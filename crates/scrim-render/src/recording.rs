#![forbid(unsafe_code)]

//! Recording surface used as a redraw probe in tests.
//!
//! Since pixels are opaque to the core, invalidation correctness is
//! observed through the draw-op log: after `refresh`, every layer that
//! was dirty has produced ops, and a clean component produces none.
//! The log is shared through a cheap handle so a test can keep
//! observing after the surface is boxed into a component.

use crate::surface::{Rgba, Surface, SurfaceError, SurfaceFactory, TextAlign};
use scrim_core::geometry::Rect;
use std::cell::RefCell;
use std::rc::Rc;

/// One recorded draw operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    FillRect {
        rect: Rect,
        color: Rgba,
    },
    StrokeRect {
        rect: Rect,
        color: Rgba,
        thickness: i32,
    },
    TextColor(Rgba),
    Text {
        text: String,
        rect: Rect,
        align: TextAlign,
    },
    Blit {
        src: Rect,
        dst: Rect,
    },
    Opacity(f32),
    Resize {
        width: i32,
        height: i32,
    },
}

#[derive(Debug, Default)]
struct LogInner {
    ops: Vec<DrawOp>,
    changed_signals: u32,
    fail_next_resizes: u32,
}

/// Shared handle onto a [`RecordingSurface`]'s op log.
#[derive(Debug, Clone, Default)]
pub struct DrawLog {
    inner: Rc<RefCell<LogInner>>,
}

impl DrawLog {
    /// Number of recorded ops since the last [`DrawLog::reset`].
    pub fn len(&self) -> usize {
        self.inner.borrow().ops.len()
    }

    /// True if no ops were recorded since the last reset.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all recorded ops.
    pub fn ops(&self) -> Vec<DrawOp> {
        self.inner.borrow().ops.clone()
    }

    /// Count of ops matching a predicate.
    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.inner.borrow().ops.iter().filter(|op| pred(op)).count()
    }

    /// Count of fill ops.
    pub fn fills(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::FillRect { .. }))
    }

    /// Count of stroke ops.
    pub fn strokes(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::StrokeRect { .. }))
    }

    /// Count of text ops.
    pub fn texts(&self) -> usize {
        self.count(|op| matches!(op, DrawOp::Text { .. }))
    }

    /// All recorded text strings, in draw order.
    pub fn drawn_text(&self) -> Vec<String> {
        self.inner
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of content-changed signals observed.
    pub fn changed_signals(&self) -> u32 {
        self.inner.borrow().changed_signals
    }

    /// Drop all recorded ops and signals; failure arming is kept.
    pub fn reset(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.ops.clear();
        inner.changed_signals = 0;
    }

    /// Arm the surface to fail its next `n` resize attempts.
    pub fn fail_next_resizes(&self, n: u32) {
        self.inner.borrow_mut().fail_next_resizes = n;
    }

    fn record(&self, op: DrawOp) {
        self.inner.borrow_mut().ops.push(op);
    }
}

/// A [`Surface`] that records every operation instead of rasterizing.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    width: i32,
    height: i32,
    log: DrawLog,
}

impl RecordingSurface {
    /// Create a recording surface of the given size.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
            log: DrawLog::default(),
        }
    }

    /// Handle onto this surface's op log.
    pub fn log(&self) -> DrawLog {
        self.log.clone()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn try_resize(&mut self, width: i32, height: i32) -> Result<(), SurfaceError> {
        {
            let mut inner = self.log.inner.borrow_mut();
            if inner.fail_next_resizes > 0 {
                inner.fail_next_resizes -= 1;
                return Err(SurfaceError::AllocationFailed { width, height });
            }
        }
        self.width = width.max(0);
        self.height = height.max(0);
        self.log.record(DrawOp::Resize { width, height });
        Ok(())
    }

    fn clear(&mut self) {
        self.log.record(DrawOp::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.log.record(DrawOp::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, thickness: i32) {
        self.log.record(DrawOp::StrokeRect {
            rect,
            color,
            thickness,
        });
    }

    fn set_text_color(&mut self, color: Rgba) {
        self.log.record(DrawOp::TextColor(color));
    }

    fn draw_text(&mut self, text: &str, rect: Rect, align: TextAlign) {
        self.log.record(DrawOp::Text {
            text: text.to_string(),
            rect,
            align,
        });
    }

    fn blit(&mut self, source: &dyn Surface, src: Rect, dst: Rect) {
        let bounds = Rect::from_size(source.width(), source.height());
        self.log.record(DrawOp::Blit {
            src: src.intersection(&bounds),
            dst,
        });
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.log.record(DrawOp::Opacity(opacity.clamp(0.0, 1.0)));
    }

    fn mark_changed(&mut self) {
        self.log.inner.borrow_mut().changed_signals += 1;
    }
}

/// Factory producing [`RecordingSurface`]s and retaining a log handle
/// for each, in creation order.
///
/// Clones share state, so a test can keep a probe clone after moving
/// the factory into a context.
#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    inner: Rc<RefCell<FactoryInner>>,
}

#[derive(Debug, Default)]
struct FactoryInner {
    logs: Vec<DrawLog>,
    fail_next_creates: u32,
}

impl RecordingFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of surfaces created so far.
    pub fn created(&self) -> usize {
        self.inner.borrow().logs.len()
    }

    /// Log handle for the `idx`-th created surface.
    pub fn log(&self, idx: usize) -> Option<DrawLog> {
        self.inner.borrow().logs.get(idx).cloned()
    }

    /// Log handle for the most recently created surface.
    pub fn last_log(&self) -> Option<DrawLog> {
        self.inner.borrow().logs.last().cloned()
    }

    /// Arm the factory to fail its next `n` create calls.
    pub fn fail_next_creates(&self, n: u32) {
        self.inner.borrow_mut().fail_next_creates = n;
    }
}

impl SurfaceFactory for RecordingFactory {
    fn create(&mut self, width: i32, height: i32) -> Result<Box<dyn Surface>, SurfaceError> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.fail_next_creates > 0 {
                inner.fail_next_creates -= 1;
                return Err(SurfaceError::AllocationFailed { width, height });
            }
        }
        let surface = RecordingSurface::new(width, height);
        self.inner.borrow_mut().logs.push(surface.log());
        Ok(Box::new(surface))
    }
}
