pub mod hud;
pub mod labels;
pub mod panel;
pub mod tooltips;

pub use hud::hud_overlay;
pub use labels::draw_labels;
pub use panel::ui_panel;
pub use tooltips::hover_tooltip;

pub(crate) const PANEL_W: f32 = 300.0;
pub(crate) const HUD_PANEL_GAP: f32 = 12.0;
pub(crate) const HUD_EDGE_PADDING: f32 = 8.0;
