use std::sync::Arc;

use base64::Engine as _;
use futures::channel::oneshot;
use image::{Rgba, RgbaImage};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DesignerError, Result};
use crate::raster::RasterSize;

/// Opaque handle to a decoded raster. Cloning is cheap.
#[derive(Clone)]
pub struct RasterSource {
    id: Uuid,
    pixels: Arc<RgbaImage>,
}

impl std::fmt::Debug for RasterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSource")
            .field("id", &self.id)
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish()
    }
}

impl PartialEq for RasterSource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl RasterSource {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            pixels: Arc::new(pixels),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Intrinsic size in pixels
    pub fn size(&self) -> egui::Vec2 {
        egui::vec2(self.pixels.width() as f32, self.pixels.height() as f32)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Decodes any format the `image` crate understands
pub fn decode_raster(bytes: &[u8]) -> Result<RasterSource> {
    let decoded = image::load_from_memory(bytes).map_err(DesignerError::Decode)?;
    let pixels = decoded.to_rgba8();
    debug!("Decoded raster: {}x{}", pixels.width(), pixels.height());
    Ok(RasterSource::new(pixels))
}

/// A decode running off the render loop
#[derive(Debug)]
pub struct PendingDecode {
    receiver: oneshot::Receiver<Result<RasterSource>>,
}

impl PendingDecode {
    /// Non-blocking check. Returns `Some` once the decode has finished; drop the handle after that.
    pub fn try_take(&mut self) -> Option<Result<RasterSource>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(DesignerError::DecodeCanceled)),
        }
    }
}

/// Starts decoding `bytes` on a worker thread
#[cfg(not(target_arch = "wasm32"))]
pub fn decode_in_background(bytes: Vec<u8>) -> PendingDecode {
    let (sender, receiver) = oneshot::channel();
    info!("Decoding {} bytes in the background", bytes.len());
    std::thread::spawn(move || {
        // The receiver may already be gone if the session ended; nothing to report then.
        let _ = sender.send(decode_raster(&bytes));
    });
    PendingDecode { receiver }
}

/// No worker threads on the web; the result is ready on the next poll
#[cfg(target_arch = "wasm32")]
pub fn decode_in_background(bytes: Vec<u8>) -> PendingDecode {
    let (sender, receiver) = oneshot::channel();
    let _ = sender.send(decode_raster(&bytes));
    PendingDecode { receiver }
}

/// Extracts the payload of a base64 `data:` URL
pub fn data_url_bytes(url: &str) -> Result<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| DesignerError::InvalidDataUrl("missing data: scheme".to_owned()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DesignerError::InvalidDataUrl("missing ',' separator".to_owned()))?;
    if !header.ends_with(";base64") {
        return Err(DesignerError::InvalidDataUrl(format!(
            "only base64 payloads are supported, got {header:?}"
        )));
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
}

/// Packs `bytes` into a base64 `data:` URL
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// MIME type sniffed from the encoded bytes, if `image` recognizes them
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|format| format.to_mime_type())
}

pub fn is_data_url(reference: &str) -> bool {
    reference.starts_with("data:")
}

/// A neutral, shaded t-shirt silhouette on a transparent background.
///
/// Used when no template asset is configured. Light grey shading lets the
/// multiply tint show folds instead of a flat fill.
pub fn procedural_garment(size: RasterSize) -> RasterSource {
    let mut pixels = RgbaImage::new(size.width, size.height);
    if size.is_empty() {
        warn!("Requested an empty garment template");
        return RasterSource::new(pixels);
    }

    let w = size.width as f32;
    let h = size.height as f32;
    // Outline in canvas fractions, clockwise from the left shoulder.
    let outline: Vec<(f32, f32)> = [
        (0.36, 0.08),
        (0.44, 0.06),
        (0.50, 0.11),
        (0.56, 0.06),
        (0.64, 0.08),
        (0.95, 0.22),
        (0.86, 0.38),
        (0.76, 0.32),
        (0.76, 0.94),
        (0.24, 0.94),
        (0.24, 0.32),
        (0.14, 0.38),
        (0.05, 0.22),
    ]
    .iter()
    .map(|(x, y)| (x * w, y * h))
    .collect();

    for y in 0..size.height {
        for x in 0..size.width {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            if !point_in_polygon(px, py, &outline) {
                continue;
            }
            // Soft vertical falloff plus darker flanks.
            let across = ((px / w) - 0.5).abs() * 2.0;
            let down = py / h;
            let shade = 0.97 - 0.10 * across * across - 0.06 * down;
            let value = (shade.clamp(0.0, 1.0) * 255.0).round() as u8;
            pixels.put_pixel(x, y, Rgba([value, value, value, 255]));
        }
    }

    RasterSource::new(pixels)
}

fn point_in_polygon(x: f32, y: f32, polygon: &[(f32, f32)]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
