#![forbid(unsafe_code)]

//! Renderer surface boundary for scrim.
//!
//! The host engine owns the real drawing surface; this crate defines the
//! capability traits components draw through ([`Surface`],
//! [`SurfaceFactory`]) and a recording implementation used by tests as a
//! redraw probe.

pub mod recording;
pub mod surface;

pub use recording::{DrawLog, DrawOp, RecordingFactory, RecordingSurface};
pub use surface::{Rgba, Surface, SurfaceError, SurfaceFactory, TextAlign};
