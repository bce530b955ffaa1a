//! Debounced preview snapshots.
//!
//! Every scene change restarts a quiescence window. Only when the window
//! elapses without another change is the latest render encoded, so a
//! continuous drag produces a single export once the pointer settles.

use std::sync::Arc;
use std::time::Duration;

use image::ImageEncoder;
use log::{debug, info, warn};

use crate::assets::{self, RasterSource};
use crate::error::{DesignerError, Result};
use crate::raster::RasterBuffer;

/// Quiescence window used when nothing else is configured
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(500);

// Absorbs float error when a poll lands exactly on the deadline.
const DEADLINE_SLACK_SECS: f64 = 1e-6;

/// A PNG snapshot of a rendered raster
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("len", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl EncodedImage {
    pub const MIME: &'static str = "image/png";

    pub fn encode_png(raster: &RasterBuffer) -> Result<Self> {
        if raster.is_empty() {
            return Err(DesignerError::EmptyRaster);
        }
        let image = raster.as_image();
        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(image.as_raw(), image.width(), image.height(), image::ExtendedColorType::Rgba8)
            .map_err(DesignerError::Encode)?;
        Ok(Self {
            bytes: bytes.into(),
            width: image.width(),
            height: image.height(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `data:image/png;base64,...`, the portable form stored by the persistence layer
    pub fn to_data_url(&self) -> String {
        assets::to_data_url(Self::MIME, &self.bytes)
    }

    /// Decodes the snapshot back into pixels, e.g. for a thumbnail
    pub fn decode(&self) -> Result<RasterSource> {
        assets::decode_raster(&self.bytes)
    }
}

/// Debounce timer in front of the PNG encoder
#[derive(Debug, Clone)]
pub struct PreviewExporter {
    window: Duration,
    due_at: Option<f64>,
    exports: u64,
}

impl Default for PreviewExporter {
    fn default() -> Self {
        Self::new(DEFAULT_QUIESCENCE)
    }
}

impl PreviewExporter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            due_at: None,
            exports: 0,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Cancels any pending export and restarts the window from `now_secs`
    pub fn notify_change(&mut self, now_secs: f64) {
        self.due_at = Some(now_secs + self.window.as_secs_f64());
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    /// How long until the pending export fires, for scheduling a wake-up
    pub fn time_until_due(&self, now_secs: f64) -> Option<Duration> {
        self.due_at
            .map(|due| Duration::from_secs_f64((due - now_secs).max(0.0)))
    }

    /// Drops the pending export without firing it. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.due_at.take().is_some();
        if was_pending {
            debug!("Pending preview export canceled");
        }
        was_pending
    }

    /// Number of snapshots successfully produced
    pub fn export_count(&self) -> u64 {
        self.exports
    }

    /// Fires the export if the window has elapsed.
    ///
    /// An encode failure consumes the pending export and yields `None`;
    /// the next change schedules a fresh attempt.
    pub fn poll(&mut self, now_secs: f64, raster: &RasterBuffer) -> Option<EncodedImage> {
        let due = self.due_at?;
        if now_secs + DEADLINE_SLACK_SECS < due {
            return None;
        }
        self.due_at = None;

        match EncodedImage::encode_png(raster) {
            Ok(encoded) => {
                self.exports += 1;
                info!(
                    "Exported preview {}x{} ({} bytes)",
                    encoded.width(),
                    encoded.height(),
                    encoded.bytes().len()
                );
                Some(encoded)
            }
            Err(err) => {
                warn!("No preview this cycle: {err}");
                None
            }
        }
    }
}
