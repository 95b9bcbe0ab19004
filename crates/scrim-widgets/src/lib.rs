#![forbid(unsafe_code)]

//! Retained-mode overlay components for scrim.
//!
//! Every widget composes the same three pieces instead of inheriting
//! from a base class: a [`ComponentCore`] (geometry, padding,
//! visibility, per-layer dirty flags), a [`HitState`] (per-frame
//! hover/press dispatch), and, for the scrolling containers, a
//! [`ScrollWindow`] (virtualized visible-range math).

pub mod arbiter;
pub mod component;
pub mod hit;
pub mod list;
pub mod menu;
pub mod panel;
pub mod scroll;
pub mod scrollbar;
pub mod table;
pub mod toast;
pub mod tree;

pub use arbiter::PointerArbiter;
pub use component::{Component, ComponentCore, ComponentId, CoreConfig, Layers};
pub use hit::{HitEvents, HitPhase, HitState};
pub use list::{ListConfig, ListView};
pub use menu::{MenuConfig, MenuItem, MenuView};
pub use panel::{Panel, PanelConfig};
pub use scroll::ScrollWindow;
pub use scrollbar::Scrollbar;
pub use table::{Column, TableConfig, TableView};
pub use toast::{Toast, ToastConfig};
pub use tree::{TreeConfig, TreeNode, TreeView};

use component::Layers as L;
use scrim_core::geometry::Rect;
use scrim_render::surface::Rgba;

/// Neutral colors used by the built-in widgets.
///
/// The host theme replaces these per widget through the config records;
/// the defaults only need to be legible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Base fill behind all content.
    pub background: Rgba,
    /// Border stroke.
    pub frame: Rgba,
    /// Primary text.
    pub text: Rgba,
    /// De-emphasized text (disabled commands).
    pub muted: Rgba,
    /// Selection / cursor fill.
    pub highlight: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgba::new(16, 20, 26, 208),
            frame: Rgba::new(96, 104, 116, 255),
            text: Rgba::WHITE,
            muted: Rgba::new(140, 146, 155, 255),
            highlight: Rgba::new(64, 110, 180, 160),
        }
    }
}

/// Border stroke thickness shared by the built-in widgets.
pub(crate) const FRAME_THICKNESS: i32 = 2;

/// Redraw the background and frame layers if dirty.
///
/// Returns true if anything was drawn. Shared by every widget so the
/// chrome layers stay consistent across the set.
pub(crate) fn refresh_chrome(core: &mut ComponentCore, palette: &Palette) -> bool {
    let (w, h) = core.content_size();
    let full = Rect::from_size(w, h);
    let mut drew = false;
    if core.take_dirty(L::BACKGROUND) {
        core.content().fill_rect(full, palette.background);
        drew = true;
    }
    if core.take_dirty(L::FRAME) {
        core.content().stroke_rect(full, palette.frame, FRAME_THICKNESS);
        drew = true;
    }
    drew
}
