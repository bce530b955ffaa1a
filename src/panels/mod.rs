mod canvas_panel;
mod controls_panel;

pub use canvas_panel::canvas_panel;
pub use controls_panel::{PRESET_COLORS, controls_panel};
