use eframe::egui;

use crate::assets;

/// An image file the user dropped onto the window
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedImage {
    /// File name or path, for logs
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DroppedImage {
    /// The design's image reference. The pixels travel inside the saved
    /// design, so a restored design does not depend on the file still existing.
    pub fn data_url(&self) -> String {
        assets::to_data_url(&self.mime, &self.bytes)
    }
}

/// Collects dropped files and keeps only the ones that look like images
#[derive(Debug, Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up files dropped this frame. Returns true if there were any.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if i.raw.dropped_files.is_empty() {
                false
            } else {
                self.dropped_files = i.raw.dropped_files.clone();
                true
            }
        })
    }

    /// Drains the dropped files into loadable images. Only the last valid
    /// image matters to a single-image design, but all are returned in order.
    pub fn take_images(&mut self) -> Vec<DroppedImage> {
        std::mem::take(&mut self.dropped_files)
            .iter()
            .filter_map(|file| {
                let name = file_name(file);
                if !is_image_file(file) {
                    log::warn!("Dropped file is not a supported type: {name}");
                    return None;
                }
                let bytes = read_bytes(file, &name)?;
                let mime = if file.mime.is_empty() {
                    assets::sniff_mime(&bytes).unwrap_or("application/octet-stream").to_owned()
                } else {
                    file.mime.clone()
                };
                log::info!("Accepted dropped image {name} ({mime}, {} bytes)", bytes.len());
                Some(DroppedImage { name, mime, bytes })
            })
            .collect()
    }

    /// Dims the window while files hover over it
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, FontId, Id, LayerId, Order};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            "Drop an image to put it on the shirt",
            FontId::proportional(20.0),
            Color32::WHITE,
        );
    }
}

fn file_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Checks the MIME type, falling back to the extension
pub fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = match &file.path {
        Some(path) => path.to_string_lossy().into_owned(),
        None => file.name.clone(),
    };
    std::path::Path::new(&name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp"))
}

fn read_bytes(file: &egui::DroppedFile, name: &str) -> Option<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        return Some(bytes.to_vec());
    }

    #[cfg(not(target_arch = "wasm32"))]
    if let Some(path) = &file.path {
        return match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::error!("Failed to read image file {name}: {err}");
                None
            }
        };
    }

    log::warn!("Dropped file has no accessible data: {name}");
    None
}
