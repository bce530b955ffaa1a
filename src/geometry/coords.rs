use egui::{Pos2, Rect, pos2};

use crate::raster::RasterSize;

/// Maps pointer positions from screen space into scene (raster) space.
///
/// The canvas may be displayed larger or smaller than its backing raster,
/// so every pointer position is rescaled by `raster / on-screen size`
/// before any hit testing or dragging happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    /// Where the canvas element sits on screen
    pub element: Rect,
    pub raster: RasterSize,
}

impl CoordinateMapper {
    pub fn new(element: Rect, raster: RasterSize) -> Self {
        Self { element, raster }
    }

    /// `None` when the element has no on-screen area to map from
    pub fn to_scene_space(&self, screen: Pos2) -> Option<Pos2> {
        to_scene_space(screen, self.element, self.raster)
    }
}

/// `x = (screen.x - box.left) * (raster.width / box.width)`, likewise for y
pub fn to_scene_space(screen: Pos2, element: Rect, raster: RasterSize) -> Option<Pos2> {
    if !(element.width() > 0.0 && element.height() > 0.0) {
        return None;
    }
    Some(pos2(
        (screen.x - element.left()) * (raster.width as f32 / element.width()),
        (screen.y - element.top()) * (raster.height as f32 / element.height()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    #[test]
    fn corners_map_to_raster_corners() {
        let element = Rect::from_min_size(pos2(30.0, 70.0), vec2(200.0, 250.0));
        let raster = RasterSize::new(400, 500);
        assert_eq!(to_scene_space(element.left_top(), element, raster), Some(pos2(0.0, 0.0)));
        assert_eq!(to_scene_space(element.right_bottom(), element, raster), Some(pos2(400.0, 500.0)));
        assert_eq!(to_scene_space(element.center(), element, raster), Some(pos2(200.0, 250.0)));
    }

    #[test]
    fn shrunken_display_scales_up() {
        let mapper = CoordinateMapper::new(
            Rect::from_min_size(pos2(10.0, 10.0), vec2(100.0, 125.0)),
            RasterSize::new(400, 500),
        );
        assert_eq!(mapper.to_scene_space(pos2(35.0, 60.0)), Some(pos2(100.0, 200.0)));
        // Outside the element still maps; hit testing decides what it means.
        assert_eq!(mapper.to_scene_space(pos2(0.0, 0.0)), Some(pos2(-40.0, -40.0)));
    }

    #[test]
    fn collapsed_element_maps_nothing() {
        let element = Rect::from_min_size(pos2(0.0, 0.0), vec2(0.0, 100.0));
        assert_eq!(to_scene_space(pos2(0.0, 0.0), element, RasterSize::new(400, 500)), None);
    }
}
