use std::fs;
use std::path::Path;

use egui::Pos2;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::color::{format_hex_color, parse_hex_color};
use super::scene::{DEFAULT_TEXT_FONT, ImageSource, Preview, SceneState};
use crate::error::Result;

/// Flat design record exchanged with the persistence layer.
///
/// Field names match the stored design rows; everything but the garment
/// color is nullable on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRecord {
    #[serde(default)]
    pub name: Option<String>,
    pub tshirt_color: String,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub text_font: Option<String>,
    #[serde(default)]
    pub text_position_x: Option<f64>,
    #[serde(default)]
    pub text_position_y: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_position_x: Option<f64>,
    #[serde(default)]
    pub image_position_y: Option<f64>,
    #[serde(default)]
    pub image_scale: Option<f64>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl DesignRecord {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        debug!("Saved design record to {}", path.display());
        Ok(())
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

fn pair(x: Option<f64>, y: Option<f64>) -> Option<Pos2> {
    match (x, y) {
        (Some(x), Some(y)) => Some(Pos2::new(x as f32, y as f32)),
        (None, None) => None,
        _ => {
            warn!("Dropping half-specified position ({x:?}, {y:?})");
            None
        }
    }
}

/// Widens through the shortest decimal form, so a stored `0.1` comes back
/// as `0.1` rather than `0.10000000149011612`.
fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(f64::from(value))
}

impl SceneState {
    /// Populates a scene from a saved design.
    ///
    /// The image layer starts undecoded; the caller decodes `image_url` and
    /// attaches the pixels when they arrive.
    pub fn from_record(record: &DesignRecord) -> Result<Self> {
        let mut scene = match &record.name {
            Some(name) => SceneState::named(name.clone()),
            None => SceneState::new(),
        };

        scene.set_garment_color(parse_hex_color(&record.tshirt_color)?);
        scene.set_text(record.text_content.as_deref().unwrap_or_default());
        if let Some(color) = &record.text_color {
            scene.set_text_color(parse_hex_color(color)?);
        }
        scene.set_text_font(record.text_font.as_deref().unwrap_or(DEFAULT_TEXT_FONT));
        scene.restore_text_position(pair(record.text_position_x, record.text_position_y));

        if let Some(url) = &record.image_url {
            scene.set_image_source(ImageSource::pending(url.clone()));
            scene.restore_image_position(pair(record.image_position_x, record.image_position_y));
        }

        if let Some(scale) = record.image_scale {
            if scene.set_image_scale(scale as f32).is_err() {
                warn!("Stored image scale {scale} is invalid, using the default");
            }
        }

        scene.restore_preview(record.preview_url.clone().map(Preview::Stored));
        Ok(scene)
    }

    /// Flattens the scene into the wire record
    pub fn to_record(&self) -> DesignRecord {
        let text_position = self.text_position();
        let image_position = self.image_position();
        DesignRecord {
            name: Some(self.name().to_owned()),
            tshirt_color: format_hex_color(self.garment_color()),
            text_content: self.has_text().then(|| self.text().to_owned()),
            text_color: Some(format_hex_color(self.text_color())),
            text_font: Some(self.text_font().to_owned()),
            text_position_x: text_position.map(|p| widen(p.x)),
            text_position_y: text_position.map(|p| widen(p.y)),
            image_url: self.image_source().map(|source| source.reference().to_owned()),
            image_position_x: image_position.map(|p| widen(p.x)),
            image_position_y: image_position.map(|p| widen(p.y)),
            image_scale: Some(widen(self.image_scale())),
            preview_url: self.last_exported_preview().map(Preview::to_reference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> DesignRecord {
        DesignRecord {
            name: Some("Launch tee".to_owned()),
            tshirt_color: "#4682b4".to_owned(),
            text_content: Some("HI".to_owned()),
            text_color: Some("#ff0000".to_owned()),
            text_font: Some("Georgia".to_owned()),
            text_position_x: Some(0.0),
            text_position_y: Some(140.5),
            image_url: Some("https://cdn.example.com/logo.png".to_owned()),
            image_position_x: Some(210.0),
            image_position_y: Some(0.0),
            image_scale: Some(1.7),
            preview_url: Some("data:image/png;base64,AAAA".to_owned()),
        }
    }

    #[test]
    fn record_survives_a_scene_round_trip() {
        let record = full_record();
        let scene = SceneState::from_record(&record).unwrap();
        assert_eq!(scene.to_record(), record);
    }

    #[test]
    fn decimal_coordinates_come_back_unchanged() {
        let mut record = full_record();
        record.text_position_x = Some(0.1);
        record.text_position_y = Some(187.35);
        record.image_position_x = Some(123.456);
        record.image_scale = Some(0.3);
        let scene = SceneState::from_record(&record).unwrap();
        assert_eq!(scene.to_record(), record);
    }

    #[test]
    fn zero_coordinates_are_real_positions() {
        let scene = SceneState::from_record(&full_record()).unwrap();
        assert_eq!(scene.text_position(), Some(Pos2::new(0.0, 140.5)));
        assert_eq!(scene.image_position(), Some(Pos2::new(210.0, 0.0)));
    }

    #[test]
    fn sparse_record_gets_defaults() {
        let record = DesignRecord::from_json(r##"{ "tshirt_color": "#000" }"##).unwrap();
        let scene = SceneState::from_record(&record).unwrap();
        assert_eq!(scene.text(), "");
        assert_eq!(scene.text_font(), "Arial");
        assert_eq!(scene.text_color(), egui::Color32::BLACK);
        assert_eq!(scene.image_scale(), 1.0);
        assert!(scene.image_source().is_none());

        let flat = scene.to_record();
        assert_eq!(flat.text_content, None);
        assert_eq!(flat.tshirt_color, "#000000");
    }

    #[test]
    fn invalid_pieces_are_contained() {
        let mut record = full_record();
        record.image_scale = Some(-2.0);
        record.text_position_y = None;
        record.image_url = None;
        let scene = SceneState::from_record(&record).unwrap();
        assert_eq!(scene.image_scale(), 1.0);
        assert_eq!(scene.text_position(), None);
        // A position without an image is no position.
        assert_eq!(scene.image_position(), None);

        record.tshirt_color = "blue-ish".to_owned();
        assert!(SceneState::from_record(&record).is_err());
    }

    #[test]
    fn saves_and_loads_json_files() {
        let dir = std::env::temp_dir().join(format!("tee_designer_{}", uuid::Uuid::new_v4()));
        let path = dir.join("design.json");
        full_record().save_to(&path).unwrap();
        assert_eq!(DesignRecord::load_from(&path).unwrap(), full_record());
        let _ = fs::remove_dir_all(dir);
    }
}
