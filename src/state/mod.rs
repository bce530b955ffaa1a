mod color;
mod persistence;
mod scene;

pub use color::{format_hex_color, parse_hex_color};
pub use persistence::DesignRecord;
pub use scene::{
    DEFAULT_DESIGN_NAME, DEFAULT_IMAGE_SCALE, DEFAULT_TEXT_COLOR, DEFAULT_TEXT_FONT, ImageSource, Layer, Preview,
    SceneField, SceneState,
};
