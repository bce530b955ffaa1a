use thiserror::Error;

/// Errors surfaced by the designer core
#[derive(Debug, Error)]
pub enum DesignerError {
    #[error("Image scale must be positive, got {0}")]
    InvalidImageScale(f32),

    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode preview: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Cannot encode an empty raster")]
    EmptyRaster,

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to load font: {0}")]
    Font(String),

    #[error("Background decode was dropped before completing")]
    DecodeCanceled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for designer operations
pub type Result<T> = std::result::Result<T, DesignerError>;
