use std::collections::HashMap;

use ab_glyph::{Font, FontArc, FontVec, PxScale, ScaleFont, point};
use egui::{Color32, Pos2};
use log::{info, warn};

use crate::error::{DesignerError, Result};
use crate::raster::RasterBuffer;

/// Font families offered by the designer controls
pub const FONT_OPTIONS: [&str; 12] = [
    "Arial",
    "Verdana",
    "Helvetica",
    "Times New Roman",
    "Courier New",
    "Georgia",
    "Palatino",
    "Garamond",
    "Comic Sans MS",
    "Impact",
    "Arial Black",
    "Trebuchet MS",
];

#[derive(Clone)]
struct LoadedFont {
    font: FontArc,
    scale_tweak: f32,
}

/// Fonts available to the text layer, keyed by family name.
///
/// Lookups are case-insensitive and fall back to egui's bundled
/// proportional font, so every family in [`FONT_OPTIONS`] renders
/// even when the real face is not installed.
#[derive(Clone, Default)]
pub struct FontBook {
    families: HashMap<String, LoadedFont>,
    fallback: Option<LoadedFont>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("families", &self.families.keys().collect::<Vec<_>>())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

impl FontBook {
    /// Font book seeded with egui's default proportional font
    pub fn with_default_fonts() -> Self {
        let fallback = egui_default_font();
        if fallback.is_none() {
            warn!("egui default font unavailable; text layer will not render");
        }
        Self {
            families: HashMap::new(),
            fallback,
        }
    }

    /// Registers a TrueType/OpenType face under `family`
    pub fn register(&mut self, family: &str, bytes: Vec<u8>) -> Result<()> {
        let font = FontVec::try_from_vec(bytes).map_err(|err| DesignerError::Font(err.to_string()))?;
        info!("Registered font family {family:?}");
        self.families.insert(
            family.to_lowercase(),
            LoadedFont {
                font: FontArc::from(font),
                scale_tweak: 1.0,
            },
        );
        Ok(())
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.families.contains_key(&family.to_lowercase())
    }

    fn resolve(&self, family: &str) -> Option<&LoadedFont> {
        self.families
            .get(&family.to_lowercase())
            .or(self.fallback.as_ref())
    }

    /// Advance width of `text` at `size` (CSS em size in pixels)
    pub fn measure(&self, family: &str, size: f32, text: &str) -> f32 {
        let Some(loaded) = self.resolve(family) else {
            return 0.0;
        };
        let scaled = loaded.font.as_scaled(px_scale(&loaded.font, size * loaded.scale_tweak));
        let mut width = 0.0;
        let mut previous = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }

    /// Rasterizes `text` with its left edge at `origin.x` and its alphabetic baseline at `origin.y`
    pub fn draw(&self, target: &mut RasterBuffer, family: &str, size: f32, text: &str, origin: Pos2, color: Color32) {
        let Some(loaded) = self.resolve(family) else {
            return;
        };
        let scaled = loaded.font.as_scaled(px_scale(&loaded.font, size * loaded.scale_tweak));
        let mut caret = point(origin.x, origin.y);
        let mut previous = None;
        for ch in text.chars() {
            let mut glyph = scaled.scaled_glyph(ch);
            if let Some(prev) = previous {
                caret.x += scaled.kern(prev, glyph.id);
            }
            glyph.position = caret;
            caret.x += scaled.h_advance(glyph.id);
            previous = Some(glyph.id);

            if let Some(outlined) = scaled.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|x, y, coverage| {
                    let px = x as i32 + bounds.min.x as i32;
                    let py = y as i32 + bounds.min.y as i32;
                    target.blend_coverage(px, py, color, coverage);
                });
            }
        }
    }
}

/// ab_glyph scales by line height; CSS font sizes are em sizes
fn px_scale(font: &FontArc, em_size: f32) -> PxScale {
    match font.units_per_em() {
        Some(units) if units > 0.0 => PxScale::from(em_size * font.height_unscaled() / units),
        _ => PxScale::from(em_size),
    }
}

fn egui_default_font() -> Option<LoadedFont> {
    let definitions = egui::FontDefinitions::default();
    let family = definitions.families.get(&egui::FontFamily::Proportional)?;
    let font_name = family.first()?;
    let data = definitions.font_data.get(font_name)?;
    let bytes = data.font.to_vec();
    let font = FontVec::try_from_vec_and_index(bytes, data.index).ok()?;
    Some(LoadedFont {
        font: FontArc::from(font),
        scale_tweak: data.tweak.scale,
    })
}
