#![forbid(unsafe_code)]

//! Public facade for the scrim overlay-UI framework.
//!
//! Re-exports the member crates and a prelude with the types most
//! hosts need: build a [`runtime::UiContext`] around your surface
//! factory, put components on a [`runtime::Stage`], and call
//! `Stage::tick` once per game tick. Before the world simulation acts
//! on a pointer event, ask `ctx.arbiter.is_blocking(x, y)`; the reverse
//! order lets UI clicks fall through to the world underneath.

pub use scrim_core as core;
pub use scrim_render as render;
pub use scrim_runtime as runtime;
pub use scrim_widgets as widgets;

/// The commonly used types in one import.
pub mod prelude {
    pub use scrim_core::geometry::{Insets, Rect};
    pub use scrim_core::input::{InputSnapshot, LogicalKey};
    pub use scrim_render::surface::{Rgba, Surface, SurfaceError, SurfaceFactory, TextAlign};
    pub use scrim_runtime::pool::{Reusable, TransientPool};
    pub use scrim_runtime::stage::{Stage, UiContext};
    pub use scrim_runtime::toasts::{ToastCorner, ToastRack, ToastRackConfig};
    pub use scrim_widgets::Palette;
    pub use scrim_widgets::arbiter::PointerArbiter;
    pub use scrim_widgets::component::{Component, ComponentCore, ComponentId, CoreConfig, Layers};
    pub use scrim_widgets::hit::{HitEvents, HitPhase, HitState};
    pub use scrim_widgets::list::{ListConfig, ListView};
    pub use scrim_widgets::menu::{MenuConfig, MenuItem, MenuView};
    pub use scrim_widgets::panel::{Panel, PanelConfig};
    pub use scrim_widgets::scroll::ScrollWindow;
    pub use scrim_widgets::table::{Column, TableConfig, TableView};
    pub use scrim_widgets::toast::{Toast, ToastConfig};
    pub use scrim_widgets::tree::{TreeConfig, TreeNode, TreeView};
}
