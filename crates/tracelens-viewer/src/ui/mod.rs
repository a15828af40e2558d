pub mod browser;
pub mod canvas;
pub mod help;
pub mod hud;
pub mod layout;
pub mod legend;
pub mod panel;
pub mod shortcuts;
pub mod tooltips;
pub mod trace;

pub use browser::browser_window;
pub use canvas::canvas_panel;
pub use help::help_overlay;
pub use hud::hud_overlay;
pub use layout::UiLayout;
pub use legend::legend_panel;
pub use panel::ui_panel;
pub use shortcuts::handle_shortcuts;
pub use trace::trace_panel;

pub const PANEL_W: f32 = 260.0;
pub const TRACE_PANEL_W: f32 = 340.0;

pub const HUD_EDGE_PADDING: f32 = 8.0;
pub const HUD_MIN_CONTENT_W: f32 = 160.0;
pub const HUD_FALLBACK_Y_OFFSET: f32 = 40.0;

/// Tooltip offset from the cursor, logical pixels.
pub const TOOLTIP_OFFSET: [f32; 2] = [12.0, -8.0];
