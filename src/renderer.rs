// src/renderer.rs
use egui::{Pos2, Rect};
use log::trace;

use crate::assets::RasterSource;
use crate::geometry::{SceneLayout, hit_test_layout};
use crate::raster::{RasterBuffer, RasterSize};
use crate::state::{Layer, SceneState};
use crate::text::FontBook;

/// Composites a scene into a raster.
///
/// Layers are drawn back to front: garment template, multiply tint,
/// uploaded image, text. Rendering is a pure function of the scene, the
/// template handle and the target size.
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    fonts: FontBook,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(FontBook::with_default_fonts())
    }
}

impl RenderPipeline {
    pub fn new(fonts: FontBook) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Placement of every layer for `canvas`, as used by both drawing and hit testing
    pub fn layout(&self, scene: &SceneState, canvas: RasterSize) -> Option<SceneLayout> {
        SceneLayout::compute(scene, &self.fonts, canvas)
    }

    pub fn hit_test(&self, point: Pos2, scene: &SceneState, canvas: RasterSize) -> Option<Layer> {
        let layout = self.layout(scene, canvas)?;
        hit_test_layout(point, &layout)
    }

    /// Renders into a fresh buffer of `canvas` size
    pub fn render(&self, scene: &SceneState, garment: Option<&RasterSource>, canvas: RasterSize) -> RasterBuffer {
        let mut target = RasterBuffer::new(canvas);
        self.render_into(&mut target, scene, garment);
        target
    }

    /// Re-renders into an existing buffer, keeping its size
    pub fn render_into(&self, target: &mut RasterBuffer, scene: &SceneState, garment: Option<&RasterSource>) {
        target.clear();
        let canvas = target.size();
        let Some(layout) = self.layout(scene, canvas) else {
            trace!("Skipping render of degenerate {}x{} canvas", canvas.width, canvas.height);
            return;
        };

        // Tint only applies over the garment; without a template there is nothing to shade.
        if let Some(template) = garment {
            let full = Rect::from_min_size(Pos2::ZERO, canvas.to_vec2());
            target.draw_image(template.pixels(), full);
            target.multiply_fill(scene.garment_color());
        }

        if let (Some(placement), Some(raster)) = (
            layout.image,
            scene.image_source().and_then(|source| source.raster()),
        ) {
            target.draw_image(raster.pixels(), placement.rect);
        }

        if let Some(text) = layout.text {
            self.fonts.draw(
                target,
                scene.text_font(),
                text.font_size,
                scene.text(),
                text.origin(),
                scene.text_color(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::procedural_garment;
    use crate::state::ImageSource;
    use egui::{Color32, pos2};
    use image::{Rgba, RgbaImage};

    const CANVAS: RasterSize = RasterSize::new(400, 500);

    #[test]
    fn zero_sized_canvas_is_a_no_op() {
        let pipeline = RenderPipeline::default();
        let garment = procedural_garment(CANVAS);
        let buffer = pipeline.render(&SceneState::new(), Some(&garment), RasterSize::new(0, 300));
        assert!(buffer.is_empty());
    }

    #[test]
    fn missing_template_leaves_a_clear_canvas() {
        let pipeline = RenderPipeline::default();
        let buffer = pipeline.render(&SceneState::new(), None, CANVAS);
        assert_eq!(buffer.pixel(200, 250), Some([0, 0, 0, 0]));
    }

    #[test]
    fn garment_color_tints_the_template() {
        let pipeline = RenderPipeline::default();
        let garment = procedural_garment(CANVAS);
        let mut scene = SceneState::new();
        scene.set_garment_color(Color32::from_rgb(255, 0, 0));
        let buffer = pipeline.render(&scene, Some(&garment), CANVAS);
        let [r, g, b, a] = buffer.pixel(200, 300).unwrap();
        assert!(r > 150);
        assert_eq!((g, b, a), (0, 0, 255));
    }

    #[test]
    fn image_is_drawn_centered_in_the_printable_area() {
        let pipeline = RenderPipeline::default();
        let mut scene = SceneState::new();
        let logo = RasterSource::new(RgbaImage::from_pixel(30, 30, Rgba([0, 0, 255, 255])));
        scene.set_image_source(ImageSource::decoded("logo", logo));
        let buffer = pipeline.render(&scene, None, CANVAS);

        // 30px at scale 1 on a 200px printable area is 20px wide around (200, 225).
        assert_eq!(buffer.pixel(200, 225), Some([0, 0, 255, 255]));
        assert_eq!(buffer.pixel(191, 216), Some([0, 0, 255, 255]));
        assert_eq!(buffer.pixel(212, 225), Some([0, 0, 0, 0]));
    }

    #[test]
    fn text_is_drawn_over_the_image() {
        let pipeline = RenderPipeline::default();
        let mut scene = SceneState::new();
        let logo = RasterSource::new(RgbaImage::from_pixel(300, 300, Rgba([0, 0, 255, 255])));
        scene.set_image_source(ImageSource::decoded("logo", logo));
        scene.set_text("HI");
        scene.set_text_color(Color32::from_rgb(255, 255, 0));
        scene.set_text_position(pos2(200.0, 240.0));
        let buffer = pipeline.render(&scene, None, CANVAS);

        let has_yellow = (220..240)
            .flat_map(|y| (170..230).map(move |x| (x, y)))
            .any(|(x, y)| matches!(buffer.pixel(x, y), Some([r, _, b, _]) if r > 128 && b < 128));
        assert!(has_yellow);
    }

    #[test]
    fn rendering_is_deterministic() {
        let pipeline = RenderPipeline::default();
        let garment = procedural_garment(CANVAS);
        let mut scene = SceneState::new();
        scene.set_text("Same");
        let first = pipeline.render(&scene, Some(&garment), CANVAS);
        let second = pipeline.render(&scene, Some(&garment), CANVAS);
        assert_eq!(first, second);
    }
}
