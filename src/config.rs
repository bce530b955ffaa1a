use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::raster::RasterSize;
use crate::state::DEFAULT_DESIGN_NAME;

/// Designer settings, loaded from a JSON file.
///
/// Missing fields take their defaults so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// Widest the canvas gets, in logical pixels
    pub max_canvas_width: f32,
    /// Height divided by width
    pub canvas_aspect: f32,
    pub preview_debounce_ms: u64,
    /// Scale slider bounds. The core accepts any positive scale.
    pub min_image_scale: f32,
    pub max_image_scale: f32,
    /// Template image for the garment; a drawn silhouette is used when unset
    pub garment_template: Option<PathBuf>,
    /// Extra font files by family name. Families without one use egui's bundled font.
    pub fonts: BTreeMap<String, PathBuf>,
    pub default_design_name: String,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            max_canvas_width: 400.0,
            canvas_aspect: 1.25,
            preview_debounce_ms: 500,
            min_image_scale: 0.5,
            max_image_scale: 2.0,
            garment_template: None,
            fonts: BTreeMap::new(),
            default_design_name: DEFAULT_DESIGN_NAME.to_owned(),
        }
    }
}

impl DesignerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Like [`Self::load`], but any failure falls back to the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("Using default config, could not load {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn preview_debounce(&self) -> Duration {
        Duration::from_millis(self.preview_debounce_ms)
    }

    /// Canvas size for a container `container_width` logical pixels wide
    pub fn canvas_size_for(&self, container_width: f32) -> RasterSize {
        let width = container_width.min(self.max_canvas_width).max(0.0);
        RasterSize::from_logical(width, width * self.canvas_aspect)
    }

    /// Clamps a slider value into the configured scale range
    pub fn clamp_image_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_image_scale, self.max_image_scale)
    }
}
