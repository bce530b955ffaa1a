use crate::export::EncodedImage;
use crate::state::{Layer, SceneField};

/// Which asset an [`SessionEvent::AssetReady`] or failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Garment,
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A setter or drag actually changed this field
    SceneChanged(SceneField),
    DragStarted(Layer),
    DragEnded(Layer),
    AssetReady(AssetKind),
    AssetFailed(AssetKind),
    /// The debounced snapshot of the current design
    PreviewExported(EncodedImage),
}

impl SessionEvent {
    pub fn is_preview(&self) -> bool {
        matches!(self, SessionEvent::PreviewExported(_))
    }
}
