use egui::{Context, TextureHandle, TextureId, TextureOptions};

use crate::raster::RasterBuffer;

/// GPU copy of the composited canvas.
///
/// The raster is re-uploaded only when the session's render generation
/// moves on, so idle frames cost nothing.
#[derive(Default)]
pub struct CanvasTexture {
    handle: Option<TextureHandle>,
    generation: Option<u64>,
}

impl std::fmt::Debug for CanvasTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasTexture")
            .field("uploaded", &self.handle.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}

impl CanvasTexture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `generation` differs from what is on the GPU
    pub fn is_stale(&self, generation: u64) -> bool {
        self.generation != Some(generation)
    }

    /// Returns the texture for `raster`, uploading it first if it is stale.
    /// Empty rasters have no texture.
    pub fn texture_for(&mut self, ctx: &Context, raster: &RasterBuffer, generation: u64) -> Option<TextureId> {
        if raster.is_empty() {
            self.clear();
            return None;
        }

        if self.is_stale(generation) || self.handle.is_none() {
            let image = raster.to_color_image();
            match &mut self.handle {
                Some(handle) => handle.set(image, TextureOptions::LINEAR),
                None => self.handle = Some(ctx.load_texture("design_canvas", image, TextureOptions::LINEAR)),
            }
            self.generation = Some(generation);
            log::trace!("Uploaded canvas texture, generation {generation}");
        }

        self.handle.as_ref().map(TextureHandle::id)
    }

    pub fn clear(&mut self) {
        self.handle = None;
        self.generation = None;
    }
}
