//! Where each layer goes.
//!
//! Renderer and hit tester both read placements from [`SceneLayout`], so
//! what is clickable is exactly what was drawn. All sizes derive from the
//! printable area, which is a fixed fraction of the canvas; a layout keeps
//! its proportions when the canvas is resized.

use egui::{Pos2, Rect, Vec2, pos2, vec2};

use crate::raster::RasterSize;
use crate::state::{Layer, SceneState};
use crate::text::FontBook;

pub const PRINTABLE_LEFT: f32 = 0.25;
pub const PRINTABLE_TOP: f32 = 0.25;
pub const PRINTABLE_WIDTH: f32 = 0.5;
pub const PRINTABLE_HEIGHT: f32 = 0.4;

/// Source width that maps to exactly the printable width at scale 1
pub const REFERENCE_IMAGE_WIDTH: f32 = 300.0;
/// Font size as a fraction of the printable width
pub const FONT_SIZE_FACTOR: f32 = 0.10;

pub const TEXT_HIT_PADDING_X: f32 = 10.0;
/// Band above the baseline that counts as the text (roughly cap height)
pub const TEXT_HIT_ABOVE: f32 = 30.0;
pub const TEXT_HIT_BELOW: f32 = 10.0;

/// Centered sub-rectangle of the canvas that holds the image and text layers
pub fn printable_area(canvas: Vec2) -> Rect {
    Rect::from_min_size(
        pos2(canvas.x * PRINTABLE_LEFT, canvas.y * PRINTABLE_TOP),
        vec2(canvas.x * PRINTABLE_WIDTH, canvas.y * PRINTABLE_HEIGHT),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub center: Pos2,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    /// Horizontal center on the alphabetic baseline
    pub anchor: Pos2,
    pub font_size: f32,
    pub width: f32,
}

impl TextPlacement {
    /// Left end of the baseline, where glyph drawing starts
    pub fn origin(&self) -> Pos2 {
        pos2(self.anchor.x - self.width / 2.0, self.anchor.y)
    }

    /// Approximate grab box: measured width padded sideways, a fixed band around the baseline
    pub fn hit_rect(&self) -> Rect {
        Rect::from_min_max(
            pos2(
                self.anchor.x - self.width / 2.0 - TEXT_HIT_PADDING_X,
                self.anchor.y - TEXT_HIT_ABOVE,
            ),
            pos2(
                self.anchor.x + self.width / 2.0 + TEXT_HIT_PADDING_X,
                self.anchor.y + TEXT_HIT_BELOW,
            ),
        )
    }
}

/// Resolved placement of every layer for one canvas size
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub canvas: RasterSize,
    pub printable: Rect,
    pub image: Option<ImagePlacement>,
    pub text: Option<TextPlacement>,
}

impl SceneLayout {
    /// `None` for a degenerate canvas, where nothing can be placed
    pub fn compute(scene: &SceneState, fonts: &FontBook, canvas: RasterSize) -> Option<Self> {
        if canvas.is_empty() {
            return None;
        }
        let printable = printable_area(canvas.to_vec2());

        let image = scene
            .image_source()
            .and_then(|source| source.raster())
            .filter(|raster| raster.width() > 0 && raster.height() > 0)
            .map(|raster| {
                let factor = scene.image_scale() * (printable.width() / REFERENCE_IMAGE_WIDTH);
                let center = scene.image_position().unwrap_or(printable.center());
                ImagePlacement {
                    center,
                    rect: Rect::from_center_size(center, raster.size() * factor),
                }
            });

        let text = scene.has_text().then(|| {
            let font_size = printable.width() * FONT_SIZE_FACTOR;
            TextPlacement {
                anchor: scene.text_position().unwrap_or(printable.center()),
                font_size,
                width: fonts.measure(scene.text_font(), font_size, scene.text()),
            }
        });

        Some(Self {
            canvas,
            printable,
            image,
            text,
        })
    }

    /// Where `layer` is anchored right now, whether explicit or defaulted
    pub fn position_of(&self, layer: Layer) -> Option<Pos2> {
        match layer {
            Layer::Text => self.text.map(|text| text.anchor),
            Layer::Image => self.image.map(|image| image.center),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::RasterSource;
    use crate::state::ImageSource;
    use image::RgbaImage;

    #[test]
    fn printable_area_stays_inside_the_canvas() {
        for (w, h) in [(1.0, 1.0), (400.0, 500.0), (37.0, 1999.0), (3000.0, 2.0)] {
            let canvas = Rect::from_min_size(Pos2::ZERO, vec2(w, h));
            assert!(canvas.contains_rect(printable_area(vec2(w, h))), "{w}x{h}");
        }
    }

    #[test]
    fn reference_canvas_numbers() {
        let area = printable_area(vec2(400.0, 500.0));
        assert_eq!(area, Rect::from_min_size(pos2(100.0, 125.0), vec2(200.0, 200.0)));
        assert_eq!(area.center(), pos2(200.0, 225.0));
    }

    #[test]
    fn image_size_follows_scale_and_printable_width() {
        let mut scene = SceneState::new();
        let raster = RasterSource::new(RgbaImage::new(300, 150));
        scene.set_image_source(ImageSource::decoded("logo", raster));
        let fonts = FontBook::default();

        let layout = SceneLayout::compute(&scene, &fonts, RasterSize::new(400, 500)).unwrap();
        let image = layout.image.unwrap();
        assert_eq!(image.rect.size(), vec2(200.0, 100.0));
        assert_eq!(image.center, pos2(200.0, 225.0));

        scene.set_image_scale(2.0).unwrap();
        let layout = SceneLayout::compute(&scene, &fonts, RasterSize::new(400, 500)).unwrap();
        assert_eq!(layout.image.unwrap().rect.size(), vec2(400.0, 200.0));
    }

    #[test]
    fn undecoded_image_and_empty_text_are_absent() {
        let mut scene = SceneState::new();
        scene.set_image_source(ImageSource::pending("still-loading"));
        let layout = SceneLayout::compute(&scene, &FontBook::default(), RasterSize::new(400, 500)).unwrap();
        assert!(layout.image.is_none());
        assert!(layout.text.is_none());
    }

    #[test]
    fn degenerate_canvas_has_no_layout() {
        let scene = SceneState::new();
        assert!(SceneLayout::compute(&scene, &FontBook::default(), RasterSize::new(0, 500)).is_none());
    }

    #[test]
    fn text_hit_band_is_asymmetric() {
        let text = TextPlacement {
            anchor: pos2(100.0, 100.0),
            font_size: 20.0,
            width: 40.0,
        };
        assert_eq!(text.hit_rect(), Rect::from_min_max(pos2(70.0, 70.0), pos2(130.0, 110.0)));
        assert_eq!(text.origin(), pos2(80.0, 100.0));
    }
}
