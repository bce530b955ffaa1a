use egui::{Color32, Pos2};
use log::warn;

use super::color::opaque;
use crate::assets::RasterSource;
use crate::error::{DesignerError, Result};
use crate::export::EncodedImage;

pub const DEFAULT_DESIGN_NAME: &str = "My Custom T-Shirt";
pub const DEFAULT_TEXT_FONT: &str = "Arial";
pub const DEFAULT_TEXT_COLOR: Color32 = Color32::BLACK;
pub const DEFAULT_IMAGE_SCALE: f32 = 1.0;

/// The draggable layers. Garment is fixed and never selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Text,
    Image,
}

/// Identifies which part of the scene a change touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneField {
    Name,
    GarmentColor,
    Text,
    TextColor,
    TextFont,
    TextPosition,
    ImageSource,
    ImagePosition,
    ImageScale,
}

/// The uploaded image: the reference the persistence layer knows it by,
/// plus the decoded pixels once they are available.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    reference: String,
    decoded: Option<RasterSource>,
}

impl ImageSource {
    /// A reference whose pixels are still being decoded
    pub fn pending(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            decoded: None,
        }
    }

    pub fn decoded(reference: impl Into<String>, raster: RasterSource) -> Self {
        Self {
            reference: reference.into(),
            decoded: Some(raster),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// `None` until decoding finishes; the layer is absent from renders meanwhile
    pub fn raster(&self) -> Option<&RasterSource> {
        self.decoded.as_ref()
    }
}

/// Last snapshot known for this design
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Produced by the exporter during this session
    Encoded(EncodedImage),
    /// Reference loaded from a saved design
    Stored(String),
}

impl Preview {
    /// The string the persistence layer stores
    pub fn to_reference(&self) -> String {
        match self {
            Preview::Encoded(image) => image.to_data_url(),
            Preview::Stored(reference) => reference.clone(),
        }
    }
}

/// Everything that is being designed.
///
/// Positions are scene-space pixels. `None` means "not placed yet": the
/// layout engine centers the layer in the printable area on every render,
/// so it follows canvas resizes. Once a drag writes a position it stays
/// explicit and is never recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    name: String,
    garment_color: Color32,
    text: String,
    text_color: Color32,
    text_font: String,
    text_position: Option<Pos2>,
    image_source: Option<ImageSource>,
    image_position: Option<Pos2>,
    image_scale: f32,
    last_exported_preview: Option<Preview>,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            name: DEFAULT_DESIGN_NAME.to_owned(),
            garment_color: Color32::WHITE,
            text: String::new(),
            text_color: DEFAULT_TEXT_COLOR,
            text_font: DEFAULT_TEXT_FONT.to_owned(),
            text_position: None,
            image_source: None,
            image_position: None,
            image_scale: DEFAULT_IMAGE_SCALE,
            last_exported_preview: None,
        }
    }
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn garment_color(&self) -> Color32 {
        self.garment_color
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Empty text means there is no text layer
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn text_color(&self) -> Color32 {
        self.text_color
    }

    pub fn text_font(&self) -> &str {
        &self.text_font
    }

    pub fn text_position(&self) -> Option<Pos2> {
        self.text_position
    }

    pub fn image_source(&self) -> Option<&ImageSource> {
        self.image_source.as_ref()
    }

    /// Explicit image position. Always `None` without an image source.
    pub fn image_position(&self) -> Option<Pos2> {
        self.image_source.as_ref().and(self.image_position)
    }

    pub fn image_scale(&self) -> f32 {
        self.image_scale
    }

    pub fn last_exported_preview(&self) -> Option<&Preview> {
        self.last_exported_preview.as_ref()
    }

    // Setters report whether anything changed so callers can skip redundant renders.

    pub fn set_name(&mut self, name: &str) -> bool {
        replace_if_changed(&mut self.name, name.to_owned())
    }

    /// Colors are stored opaque; any alpha is dropped
    pub fn set_garment_color(&mut self, color: Color32) -> bool {
        replace_if_changed(&mut self.garment_color, opaque(color))
    }

    pub fn set_text(&mut self, text: &str) -> bool {
        replace_if_changed(&mut self.text, text.to_owned())
    }

    pub fn set_text_color(&mut self, color: Color32) -> bool {
        replace_if_changed(&mut self.text_color, opaque(color))
    }

    pub fn set_text_font(&mut self, font: &str) -> bool {
        replace_if_changed(&mut self.text_font, font.to_owned())
    }

    /// Pins the text layer at `position`
    pub fn set_text_position(&mut self, position: Pos2) -> bool {
        replace_if_changed(&mut self.text_position, Some(position))
    }

    /// Pins the image layer at `position`. Ignored when there is no image.
    pub fn set_image_position(&mut self, position: Pos2) -> bool {
        if self.image_source.is_none() {
            warn!("Ignoring image position {position:?}: no image layer");
            return false;
        }
        replace_if_changed(&mut self.image_position, Some(position))
    }

    /// Rejects non-positive (and non-finite) scales, leaving the current value untouched
    pub fn set_image_scale(&mut self, scale: f32) -> Result<bool> {
        if !(scale.is_finite() && scale > 0.0) {
            warn!("Rejected image scale {scale}");
            return Err(DesignerError::InvalidImageScale(scale));
        }
        Ok(replace_if_changed(&mut self.image_scale, scale))
    }

    /// Replaces the uploaded image and re-centers the layer, even when the
    /// reference is unchanged (the same path may hold new pixels).
    pub fn set_image_source(&mut self, source: ImageSource) {
        self.image_position = None;
        self.image_source = Some(source);
    }

    /// Attaches decoded pixels to the current image. Stale decodes for a
    /// reference that has since been replaced are refused.
    pub fn attach_decoded_image(&mut self, reference: &str, raster: RasterSource) -> bool {
        match &mut self.image_source {
            Some(source) if source.reference == reference => {
                source.decoded = Some(raster);
                true
            }
            _ => false,
        }
    }

    pub fn remove_image(&mut self) -> bool {
        self.image_position = None;
        self.image_source.take().is_some()
    }

    /// Written only by the preview exporter; not a scene change
    pub(crate) fn record_preview(&mut self, preview: Preview) {
        self.last_exported_preview = Some(preview);
    }

    pub(crate) fn restore_text_position(&mut self, position: Option<Pos2>) {
        self.text_position = position;
    }

    pub(crate) fn restore_image_position(&mut self, position: Option<Pos2>) {
        self.image_position = position;
    }

    pub(crate) fn restore_preview(&mut self, preview: Option<Preview>) {
        self.last_exported_preview = preview;
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
