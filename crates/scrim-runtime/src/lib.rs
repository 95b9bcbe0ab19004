#![forbid(unsafe_code)]

//! Frame driver and shared services for scrim.
//!
//! The host builds a [`UiContext`] (arbitration registry + surface
//! factory) and a [`Stage`] of top-level components, then calls
//! [`Stage::tick`] once per game tick. Transient notifications go
//! through a [`ToastRack`], which pools instances in a
//! [`TransientPool`]. All shared mutable state lives in these
//! explicitly constructed objects; there are no module-level globals,
//! and scene transitions reset them directly.

pub mod pool;
pub mod stage;
pub mod toasts;

pub use pool::{Reusable, TransientPool};
pub use stage::{Stage, UiContext};
pub use toasts::{ToastCorner, ToastRack, ToastRackConfig};
