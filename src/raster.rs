//! Pixel storage and the handful of compositing operations the designer needs.
//!
//! Pixels are kept straight-alpha (`image::RgbaImage`), blending happens in
//! premultiplied `f32` space. Operations follow the 2D canvas compositing
//! model: `source-over` for layers and `multiply` for the garment tint.

use egui::{Color32, Rect, Vec2};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Pixel dimensions of a raster target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RasterSize {
    pub width: u32,
    pub height: u32,
}

impl Default for RasterSize {
    fn default() -> Self {
        Self::new(400, 500)
    }
}

impl RasterSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Truncates fractional layout sizes the way a canvas `width`/`height` attribute does
    pub fn from_logical(width: f32, height: f32) -> Self {
        let clamp = |v: f32| if v.is_finite() && v > 0.0 { v.floor() as u32 } else { 0 };
        Self::new(clamp(width), clamp(height))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// The composited output of a render pass
#[derive(Clone, PartialEq)]
pub struct RasterBuffer {
    pixels: RgbaImage,
}

impl std::fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterBuffer")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish_non_exhaustive()
    }
}

impl Default for RasterBuffer {
    fn default() -> Self {
        Self::new(RasterSize::new(0, 0))
    }
}

impl RasterBuffer {
    /// Creates a fully transparent buffer
    pub fn new(size: RasterSize) -> Self {
        Self {
            pixels: RgbaImage::new(size.width, size.height),
        }
    }

    pub fn size(&self) -> RasterSize {
        RasterSize::new(self.pixels.width(), self.pixels.height())
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    /// Straight-alpha RGBA of a single pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.pixels.width() && y < self.pixels.height() {
            Some(self.pixels.get_pixel(x, y).0)
        } else {
            None
        }
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Copy suitable for uploading as an egui texture
    pub fn to_color_image(&self) -> egui::ColorImage {
        let size = [self.pixels.width() as usize, self.pixels.height() as usize];
        egui::ColorImage::from_rgba_unmultiplied(size, self.pixels.as_raw())
    }

    /// Draws `source` stretched into `dest` with bilinear sampling and `source-over` blending.
    /// Parts of `dest` outside the buffer are clipped.
    pub fn draw_image(&mut self, source: &RgbaImage, dest: Rect) {
        let (src_w, src_h) = source.dimensions();
        if src_w == 0 || src_h == 0 || self.is_empty() {
            return;
        }
        if !(dest.width() > 0.0 && dest.height() > 0.0) {
            return;
        }

        let (buf_w, buf_h) = self.pixels.dimensions();
        let x_start = dest.min.x.floor().max(0.0) as u32;
        let y_start = dest.min.y.floor().max(0.0) as u32;
        let x_end = dest.max.x.ceil().min(buf_w as f32) as u32;
        let y_end = dest.max.y.ceil().min(buf_h as f32) as u32;
        if x_start >= x_end || y_start >= y_end {
            return;
        }

        let step_x = src_w as f32 / dest.width();
        let step_y = src_h as f32 / dest.height();

        for y in y_start..y_end {
            let center_y = y as f32 + 0.5;
            if center_y < dest.min.y || center_y >= dest.max.y {
                continue;
            }
            let v = (center_y - dest.min.y) * step_y - 0.5;
            for x in x_start..x_end {
                let center_x = x as f32 + 0.5;
                if center_x < dest.min.x || center_x >= dest.max.x {
                    continue;
                }
                let u = (center_x - dest.min.x) * step_x - 0.5;
                let sample = sample_bilinear(source, u, v);
                let dst = self.pixels.get_pixel_mut(x, y);
                *dst = source_over(premultiply(*dst), sample);
            }
        }
    }

    /// Fills the whole buffer with `color` using the `multiply` blend mode.
    ///
    /// Shading already in the buffer darkens the color instead of being
    /// replaced by it. Transparent pixels take the plain fill color.
    pub fn multiply_fill(&mut self, color: Color32) {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        let src = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];
        let src_a = a as f32 / 255.0;

        for pixel in self.pixels.pixels_mut() {
            let dst_a = pixel[3] as f32 / 255.0;
            let out_a = src_a + dst_a * (1.0 - src_a);
            if out_a <= 0.0 {
                continue;
            }
            let mut out = [0.0f32; 4];
            for c in 0..3 {
                let dst = pixel[c] as f32 / 255.0;
                let mixed = (1.0 - dst_a) * src[c] + dst_a * src[c] * dst;
                out[c] = src_a * mixed + (1.0 - src_a) * dst_a * dst;
            }
            out[3] = out_a;
            *pixel = unpremultiply(out);
        }
    }

    /// Blends `color` into one pixel scaled by `coverage` (0..=1). Out-of-bounds writes are dropped.
    pub fn blend_coverage(&mut self, x: i32, y: i32, color: Color32, coverage: f32) {
        if x < 0 || y < 0 || x as u32 >= self.pixels.width() || y as u32 >= self.pixels.height() {
            return;
        }
        let coverage = coverage.clamp(0.0, 1.0);
        if coverage <= 0.0 {
            return;
        }
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        let alpha = a as f32 / 255.0 * coverage;
        let src = [
            r as f32 / 255.0 * alpha,
            g as f32 / 255.0 * alpha,
            b as f32 / 255.0 * alpha,
            alpha,
        ];
        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        *dst = source_over(premultiply(*dst), src);
    }
}

fn premultiply(pixel: Rgba<u8>) -> [f32; 4] {
    let a = pixel[3] as f32 / 255.0;
    [
        pixel[0] as f32 / 255.0 * a,
        pixel[1] as f32 / 255.0 * a,
        pixel[2] as f32 / 255.0 * a,
        a,
    ]
}

fn unpremultiply(color: [f32; 4]) -> Rgba<u8> {
    let a = color[3].clamp(0.0, 1.0);
    if a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |v: f32| ((v / a).clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        (a * 255.0).round() as u8,
    ])
}

fn source_over(dst: [f32; 4], src: [f32; 4]) -> Rgba<u8> {
    let inv = 1.0 - src[3];
    unpremultiply([
        src[0] + dst[0] * inv,
        src[1] + dst[1] * inv,
        src[2] + dst[2] * inv,
        src[3] + dst[3] * inv,
    ])
}

/// Premultiplied bilinear sample at continuous pixel coordinates (pixel centers at integers)
fn sample_bilinear(source: &RgbaImage, u: f32, v: f32) -> [f32; 4] {
    let (w, h) = source.dimensions();
    let u = u.clamp(0.0, (w - 1) as f32);
    let v = v.clamp(0.0, (h - 1) as f32);
    let x0 = u.floor() as u32;
    let y0 = v.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = u - x0 as f32;
    let fy = v - y0 as f32;

    let p00 = premultiply(*source.get_pixel(x0, y0));
    let p10 = premultiply(*source.get_pixel(x1, y0));
    let p01 = premultiply(*source.get_pixel(x0, y1));
    let p11 = premultiply(*source.get_pixel(x1, y1));

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = p00[c] + (p10[c] - p00[c]) * fx;
        let bottom = p01[c] + (p11[c] - p01[c]) * fx;
        out[c] = top + (bottom - top) * fy;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(rgba))
    }

    #[test]
    fn logical_size_truncates_like_a_canvas() {
        assert_eq!(RasterSize::from_logical(399.7, 499.6), RasterSize::new(399, 499));
        assert!(RasterSize::from_logical(-3.0, 10.0).is_empty());
        assert!(RasterSize::from_logical(f32::NAN, 10.0).is_empty());
    }

    #[test]
    fn multiply_keeps_existing_shading() {
        let mut buffer = RasterBuffer::new(RasterSize::new(2, 1));
        buffer.draw_image(&solid(2, 1, [128, 128, 128, 255]), Rect::from_min_max(pos2(0.0, 0.0), pos2(2.0, 1.0)));
        buffer.multiply_fill(Color32::from_rgb(255, 0, 0));
        assert_eq!(buffer.pixel(0, 0), Some([128, 0, 0, 255]));
    }

    #[test]
    fn multiply_over_transparent_takes_fill_color() {
        let mut buffer = RasterBuffer::new(RasterSize::new(1, 1));
        buffer.multiply_fill(Color32::from_rgb(10, 20, 30));
        assert_eq!(buffer.pixel(0, 0), Some([10, 20, 30, 255]));
    }

    #[test]
    fn white_multiply_is_identity_on_opaque_pixels() {
        let mut buffer = RasterBuffer::new(RasterSize::new(1, 1));
        buffer.draw_image(&solid(1, 1, [90, 140, 200, 255]), Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)));
        buffer.multiply_fill(Color32::WHITE);
        assert_eq!(buffer.pixel(0, 0), Some([90, 140, 200, 255]));
    }

    #[test]
    fn draw_image_is_clipped_to_the_buffer() {
        let mut buffer = RasterBuffer::new(RasterSize::new(10, 10));
        buffer.draw_image(&solid(4, 4, [0, 255, 0, 255]), Rect::from_min_max(pos2(-5.0, -5.0), pos2(5.0, 5.0)));
        assert_eq!(buffer.pixel(0, 0), Some([0, 255, 0, 255]));
        assert_eq!(buffer.pixel(4, 4), Some([0, 255, 0, 255]));
        assert_eq!(buffer.pixel(5, 5), Some([0, 0, 0, 0]));

        // Entirely off-canvas draws nothing and does not panic.
        buffer.draw_image(&solid(4, 4, [255, 0, 0, 255]), Rect::from_min_max(pos2(50.0, 50.0), pos2(60.0, 60.0)));
        assert_eq!(buffer.pixel(9, 9), Some([0, 0, 0, 0]));
    }

    #[test]
    fn coverage_blending_is_partial() {
        let mut buffer = RasterBuffer::new(RasterSize::new(1, 1));
        buffer.blend_coverage(0, 0, Color32::BLACK, 0.5);
        let [_, _, _, a] = buffer.pixel(0, 0).unwrap();
        assert!((126..=129).contains(&a));
        buffer.blend_coverage(-1, 0, Color32::BLACK, 1.0);
        buffer.blend_coverage(0, 7, Color32::BLACK, 1.0);
    }

    #[test]
    fn clear_resets_to_transparent() {
        let mut buffer = RasterBuffer::new(RasterSize::new(3, 3));
        buffer.multiply_fill(Color32::WHITE);
        buffer.clear();
        assert_eq!(buffer.pixel(1, 1), Some([0, 0, 0, 0]));
    }
}
