use egui::Pos2;
use log::trace;

use super::layout::SceneLayout;
use crate::raster::RasterSize;
use crate::state::{Layer, SceneState};
use crate::text::FontBook;

/// Picks the layer under a scene-space point.
///
/// Text is drawn last, so it is tested first and wins where the two
/// layers overlap.
pub fn hit_test_layout(point: Pos2, layout: &SceneLayout) -> Option<Layer> {
    if let Some(text) = &layout.text {
        if text.hit_rect().contains(point) {
            trace!("Hit text at {point:?}");
            return Some(Layer::Text);
        }
    }

    if let Some(image) = &layout.image {
        if image.rect.contains(point) {
            trace!("Hit image at {point:?}");
            return Some(Layer::Image);
        }
    }

    None
}

/// Hit tester bound to the fonts the renderer measures text with
#[derive(Debug, Clone, Copy)]
pub struct HitTester<'a> {
    fonts: &'a FontBook,
}

impl<'a> HitTester<'a> {
    pub fn new(fonts: &'a FontBook) -> Self {
        Self { fonts }
    }

    pub fn hit_test(&self, point: Pos2, scene: &SceneState, canvas: RasterSize) -> Option<Layer> {
        let layout = SceneLayout::compute(scene, self.fonts, canvas)?;
        hit_test_layout(point, &layout)
    }
}
