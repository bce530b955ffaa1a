//! A live design: scene, canvas and everything that reacts to it.
//!
//! Every effective change re-renders synchronously and restarts the preview
//! debounce. Background work (asset decodes, the pending export) only
//! advances in [`DesignSession::tick`], which the host calls once per frame.

use std::time::Duration;

use egui::{Color32, Pos2, Rect};
use log::{debug, info, warn};

use crate::assets::{self, PendingDecode, RasterSource};
use crate::config::DesignerConfig;
use crate::error::{DesignerError, Result};
use crate::event::{AssetKind, EventBus, EventHandler, SessionEvent};
use crate::export::{EncodedImage, PreviewExporter};
use crate::geometry::CoordinateMapper;
use crate::input::PointerEvent;
use crate::raster::{RasterBuffer, RasterSize};
use crate::renderer::RenderPipeline;
use crate::state::{DesignRecord, ImageSource, Layer, Preview, SceneField, SceneState, parse_hex_color};
use crate::tools::{DragController, DragResponse, DragState};
use crate::util::time::{Clock, SystemClock};

#[derive(Debug)]
struct PendingImage {
    reference: String,
    decode: PendingDecode,
}

pub struct DesignSession {
    config: DesignerConfig,
    scene: SceneState,
    pipeline: RenderPipeline,
    drag: DragController,
    exporter: PreviewExporter,
    events: EventBus,
    raster: RasterBuffer,
    garment: Option<RasterSource>,
    pending_garment: Option<PendingDecode>,
    pending_image: Option<PendingImage>,
    clock: Box<dyn Clock>,
    generation: u64,
    ended: bool,
}

impl std::fmt::Debug for DesignSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignSession")
            .field("scene", &self.scene)
            .field("canvas", &self.raster.size())
            .field("drag", &self.drag.state())
            .field("preview_pending", &self.exporter.is_pending())
            .field("generation", &self.generation)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

impl DesignSession {
    pub fn new(config: DesignerConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// A session whose debounce runs on `clock`
    pub fn with_clock(config: DesignerConfig, clock: Box<dyn Clock>) -> Self {
        let canvas = config.canvas_size_for(config.max_canvas_width);
        let pending_garment = config.garment_template.as_ref().and_then(|path| match std::fs::read(path) {
            Ok(bytes) => {
                info!("Loading garment template {}", path.display());
                Some(assets::decode_in_background(bytes))
            }
            Err(err) => {
                warn!("Could not read garment template {}: {err}", path.display());
                None
            }
        });

        let mut session = Self {
            scene: SceneState::named(config.default_design_name.clone()),
            pipeline: RenderPipeline::default(),
            drag: DragController::new(),
            exporter: PreviewExporter::new(config.preview_debounce()),
            events: EventBus::new(),
            raster: RasterBuffer::new(canvas),
            garment: Some(assets::procedural_garment(canvas)),
            pending_garment,
            pending_image: None,
            clock,
            generation: 0,
            ended: false,
            config,
        };
        for (family, path) in session.config.fonts.clone() {
            let loaded = std::fs::read(&path)
                .map_err(DesignerError::from)
                .and_then(|bytes| session.register_font(&family, bytes));
            if let Err(err) = loaded {
                warn!("Font {family:?} from {} unavailable: {err}", path.display());
            }
        }
        session.rerender();
        session
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Registers an extra font family for the text layer
    pub fn register_font(&mut self, family: &str, bytes: Vec<u8>) -> Result<()> {
        self.pipeline.fonts_mut().register(family, bytes)?;
        if self.scene.text_font().eq_ignore_ascii_case(family) {
            self.rerender();
        }
        Ok(())
    }

    /// The most recent render
    pub fn raster(&self) -> &RasterBuffer {
        &self.raster
    }

    pub fn canvas_size(&self) -> RasterSize {
        self.raster.size()
    }

    /// Bumped on every re-render, so hosts can tell when to re-upload the raster
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub fn garment(&self) -> Option<&RasterSource> {
        self.garment.as_ref()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Whether an image or template decode is still running
    pub fn is_decoding(&self) -> bool {
        self.pending_garment.is_some() || self.pending_image.is_some()
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    pub fn set_name(&mut self, name: &str) {
        if self.scene.set_name(name) {
            self.scene_changed(SceneField::Name);
        }
    }

    pub fn set_garment_color(&mut self, color: Color32) {
        if self.scene.set_garment_color(color) {
            self.scene_changed(SceneField::GarmentColor);
        }
    }

    pub fn set_garment_color_hex(&mut self, hex: &str) -> Result<()> {
        let color = parse_hex_color(hex)?;
        self.set_garment_color(color);
        Ok(())
    }

    pub fn set_text(&mut self, text: &str) {
        if self.scene.set_text(text) {
            self.scene_changed(SceneField::Text);
        }
    }

    pub fn set_text_color(&mut self, color: Color32) {
        if self.scene.set_text_color(color) {
            self.scene_changed(SceneField::TextColor);
        }
    }

    pub fn set_text_font(&mut self, font: &str) {
        if self.scene.set_text_font(font) {
            self.scene_changed(SceneField::TextFont);
        }
    }

    pub fn set_text_position(&mut self, position: Pos2) {
        if self.scene.set_text_position(position) {
            self.scene_changed(SceneField::TextPosition);
        }
    }

    pub fn set_image_position(&mut self, position: Pos2) {
        if self.scene.set_image_position(position) {
            self.scene_changed(SceneField::ImagePosition);
        }
    }

    /// Non-positive scales are rejected and the scene is left untouched
    pub fn set_image_scale(&mut self, scale: f32) -> Result<()> {
        if self.scene.set_image_scale(scale)? {
            self.scene_changed(SceneField::ImageScale);
        }
        Ok(())
    }

    /// Replaces the image layer with `bytes`, known to persistence as `reference`.
    ///
    /// The layer stays absent from renders until the decode lands in [`Self::tick`].
    pub fn upload_image(&mut self, reference: impl Into<String>, bytes: Vec<u8>) {
        let reference = reference.into();
        info!("Uploading image {} ({} bytes)", short_reference(&reference), bytes.len());
        self.scene.set_image_source(ImageSource::pending(reference.clone()));
        self.scene_changed(SceneField::ImageSource);
        self.pending_image = Some(PendingImage {
            reference,
            decode: assets::decode_in_background(bytes),
        });
    }

    /// Supplies the bytes behind the current image reference, e.g. after the
    /// host fetched a remote URL from a loaded design. Other references are ignored.
    pub fn attach_image_bytes(&mut self, reference: &str, bytes: Vec<u8>) -> bool {
        let current = self.scene.image_source().map(ImageSource::reference);
        if current != Some(reference) {
            debug!("Ignoring bytes for stale image {}", short_reference(reference));
            return false;
        }
        self.pending_image = Some(PendingImage {
            reference: reference.to_owned(),
            decode: assets::decode_in_background(bytes),
        });
        true
    }

    /// Sets an already decoded image
    pub fn set_image(&mut self, reference: impl Into<String>, raster: RasterSource) {
        self.pending_image = None;
        self.scene.set_image_source(ImageSource::decoded(reference, raster));
        self.scene_changed(SceneField::ImageSource);
    }

    pub fn remove_image(&mut self) {
        self.pending_image = None;
        if self.scene.remove_image() {
            self.scene_changed(SceneField::ImageSource);
        }
    }

    /// Replaces the garment template. `None` renders without a template, and
    /// therefore without tint.
    pub fn set_garment(&mut self, garment: Option<RasterSource>) {
        self.pending_garment = None;
        if self.garment != garment {
            self.garment = garment;
            self.content_changed();
        }
    }

    /// Replaces the whole design with a saved one.
    ///
    /// A `data:` image reference is decoded right away; any other reference
    /// waits for [`Self::attach_image_bytes`].
    pub fn load_record(&mut self, record: &DesignRecord) -> Result<()> {
        let scene = SceneState::from_record(record)?;
        self.drag.pointer_release();
        self.pending_image = None;
        self.scene = scene;

        if let Some(reference) = self.scene.image_source().map(|source| source.reference().to_owned()) {
            if assets::is_data_url(&reference) {
                match assets::data_url_bytes(&reference) {
                    Ok(bytes) => {
                        self.pending_image = Some(PendingImage {
                            decode: assets::decode_in_background(bytes),
                            reference,
                        });
                    }
                    Err(err) => {
                        warn!("Stored image could not be read: {err}");
                        self.events.emit(SessionEvent::AssetFailed(AssetKind::Image));
                    }
                }
            } else {
                info!("Image {} must be supplied by the host", short_reference(&reference));
            }
        }

        info!("Loaded design {:?}", self.scene.name());
        self.content_changed();
        Ok(())
    }

    pub fn to_record(&self) -> DesignRecord {
        self.scene.to_record()
    }

    /// Resizes the canvas. Explicit positions are kept as they are; default
    /// positions follow the new printable area. The preview is re-exported at
    /// the new size once resizing settles.
    pub fn resize(&mut self, canvas: RasterSize) {
        if self.raster.size() == canvas {
            return;
        }
        debug!("Canvas resized to {}x{}", canvas.width, canvas.height);
        self.raster = RasterBuffer::new(canvas);
        self.content_changed();
    }

    /// Resizes the canvas to fit a container `width` logical pixels wide
    pub fn fit_to_container(&mut self, width: f32) {
        self.resize(self.config.canvas_size_for(width));
    }

    /// Feeds one pointer event. `element` is where the canvas is displayed on screen.
    pub fn handle_pointer(&mut self, event: PointerEvent, element: Rect) -> DragResponse {
        let mapper = CoordinateMapper::new(element, self.raster.size());
        let response = match event {
            PointerEvent::Down { position } => {
                let Some(point) = mapper.to_scene_space(position) else {
                    return DragResponse::Ignored;
                };
                let layout = self.pipeline.layout(&self.scene, self.raster.size());
                self.drag.pointer_down(point, &mut self.scene, layout.as_ref())
            }
            PointerEvent::Move { position } => {
                let Some(point) = mapper.to_scene_space(position) else {
                    return DragResponse::Ignored;
                };
                self.drag.pointer_move(point, &mut self.scene)
            }
            PointerEvent::Up { .. } | PointerEvent::Leave => self.drag.pointer_release(),
        };

        match response {
            DragResponse::Ignored => {}
            DragResponse::Started(layer) => self.events.emit(SessionEvent::DragStarted(layer)),
            DragResponse::Moved { layer, .. } => self.scene_changed(position_field(layer)),
            DragResponse::Ended(layer) => self.events.emit(SessionEvent::DragEnded(layer)),
        }
        response
    }

    /// While another widget owns the pointer no drag may start
    pub fn set_pointer_captured_elsewhere(&mut self, captured: bool) {
        self.drag.set_pointer_captured_elsewhere(captured);
    }

    /// Advances background work: finished decodes and the debounced export.
    ///
    /// Returns the preview if one was exported during this call.
    pub fn tick(&mut self) -> Option<EncodedImage> {
        if self.ended {
            return None;
        }

        let mut dirty = false;

        if let Some(result) = self.pending_garment.as_mut().and_then(PendingDecode::try_take) {
            self.pending_garment = None;
            match result {
                Ok(garment) => {
                    info!("Garment template ready ({}x{})", garment.width(), garment.height());
                    self.garment = Some(garment);
                    dirty = true;
                    self.events.emit(SessionEvent::AssetReady(AssetKind::Garment));
                }
                Err(err) => {
                    warn!("Garment template failed to decode, keeping the current one: {err}");
                    self.events.emit(SessionEvent::AssetFailed(AssetKind::Garment));
                }
            }
        }

        if let Some(result) = self.pending_image.as_mut().and_then(|pending| pending.decode.try_take()) {
            if let Some(pending) = self.pending_image.take() {
                match result {
                    Ok(raster) => {
                        if self.scene.attach_decoded_image(&pending.reference, raster) {
                            info!("Image {} ready", short_reference(&pending.reference));
                            dirty = true;
                            self.events.emit(SessionEvent::AssetReady(AssetKind::Image));
                        } else {
                            debug!("Discarding decode for replaced image {}", short_reference(&pending.reference));
                        }
                    }
                    Err(err) => {
                        warn!("Image {} failed to decode: {err}", short_reference(&pending.reference));
                        self.events.emit(SessionEvent::AssetFailed(AssetKind::Image));
                    }
                }
            }
        }

        if dirty {
            self.content_changed();
        }

        let preview = self.exporter.poll(self.clock.now_secs(), &self.raster)?;
        self.scene.record_preview(Preview::Encoded(preview.clone()));
        self.events.emit(SessionEvent::PreviewExported(preview.clone()));
        Some(preview)
    }

    /// How long until the pending preview export is due
    pub fn time_until_preview(&self) -> Option<Duration> {
        self.exporter.time_until_due(self.clock.now_secs())
    }

    /// Tears the session down. A pending export is dropped without firing
    /// and no further exports are scheduled.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.exporter.cancel();
        self.drag.pointer_release();
        self.pending_garment = None;
        self.pending_image = None;
        self.ended = true;
        info!("Design session ended");
    }

    fn rerender(&mut self) {
        self.pipeline.render_into(&mut self.raster, &self.scene, self.garment.as_ref());
        self.generation += 1;
    }

    /// Something visible changed outside the scene fields
    fn content_changed(&mut self) {
        self.rerender();
        if !self.ended {
            self.exporter.notify_change(self.clock.now_secs());
        }
    }

    fn scene_changed(&mut self, field: SceneField) {
        self.content_changed();
        self.events.emit(SessionEvent::SceneChanged(field));
    }
}

fn position_field(layer: Layer) -> SceneField {
    match layer {
        Layer::Text => SceneField::TextPosition,
        Layer::Image => SceneField::ImagePosition,
    }
}

/// Data URLs are huge; keep log lines readable
fn short_reference(reference: &str) -> &str {
    match reference.char_indices().nth(48) {
        Some((end, _)) => &reference[..end],
        None => reference,
    }
}
