//! Drag-to-reposition for the text and image layers.
//!
//! ```text
//!            down on text            move (delta applied)
//!   ┌──────┐ ───────────► ┌──────────────┐ ◄─┐
//!   │      │              │ DraggingText │ ──┘
//!   │ Idle │ ◄─────────── └──────────────┘
//!   │      │  up | leave
//!   │      │ ───────────► ┌───────────────┐ ◄─┐
//!   └──────┘ down on image│ DraggingImage │ ──┘
//!       ▲                 └───────┬───────┘
//!       └─────────────────────────┘ up | leave
//! ```
//!
//! A press that misses both layers stays `Idle`. Only one drag runs at a
//! time. Positions are pinned at drag start, so a layer that was still on
//! its default centered position becomes explicit before the first delta.

use egui::{Pos2, Vec2};
use log::{debug, info};

use crate::geometry::{SceneLayout, hit_test_layout};
use crate::state::{Layer, SceneState};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingText {
        last: Pos2,
    },
    DraggingImage {
        last: Pos2,
    },
}

impl DragState {
    pub fn layer(&self) -> Option<Layer> {
        match self {
            DragState::Idle => None,
            DragState::DraggingText { .. } => Some(Layer::Text),
            DragState::DraggingImage { .. } => Some(Layer::Image),
        }
    }

    fn dragging(layer: Layer, last: Pos2) -> Self {
        match layer {
            Layer::Text => DragState::DraggingText { last },
            Layer::Image => DragState::DraggingImage { last },
        }
    }
}

/// What a pointer event did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragResponse {
    Ignored,
    Started(Layer),
    /// The layer's position was shifted by `delta`; re-render now
    Moved { layer: Layer, delta: Vec2 },
    Ended(Layer),
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
    captured_elsewhere: bool,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn active_layer(&self) -> Option<Layer> {
        self.state.layer()
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// While another widget owns the pointer no drag may start
    pub fn set_pointer_captured_elsewhere(&mut self, captured: bool) {
        self.captured_elsewhere = captured;
    }

    /// Starts a drag if `point` (scene space) lands on a layer
    pub fn pointer_down(&mut self, point: Pos2, scene: &mut SceneState, layout: Option<&SceneLayout>) -> DragResponse {
        if self.is_dragging() || self.captured_elsewhere {
            return DragResponse::Ignored;
        }
        let Some(layout) = layout else {
            return DragResponse::Ignored;
        };
        let Some(layer) = hit_test_layout(point, layout) else {
            return DragResponse::Ignored;
        };

        if let Some(resolved) = layout.position_of(layer) {
            pin_position(scene, layer, resolved);
        }
        self.state = DragState::dragging(layer, point);
        info!("Started dragging {layer:?} at {point:?}");
        DragResponse::Started(layer)
    }

    /// Shifts the dragged layer by the distance moved since the last event
    pub fn pointer_move(&mut self, point: Pos2, scene: &mut SceneState) -> DragResponse {
        let (layer, last) = match self.state {
            DragState::Idle => return DragResponse::Ignored,
            DragState::DraggingText { last } => (Layer::Text, last),
            DragState::DraggingImage { last } => (Layer::Image, last),
        };

        let delta = point - last;
        if delta == Vec2::ZERO {
            return DragResponse::Ignored;
        }

        let current = match layer {
            Layer::Text => scene.text_position(),
            Layer::Image => scene.image_position(),
        };
        let Some(current) = current else {
            // The layer disappeared under the pointer (e.g. image removed mid-drag).
            debug!("{layer:?} lost its position during drag");
            self.state = DragState::Idle;
            return DragResponse::Ended(layer);
        };

        match layer {
            Layer::Text => scene.set_text_position(current + delta),
            Layer::Image => scene.set_image_position(current + delta),
        };
        self.state = DragState::dragging(layer, point);
        DragResponse::Moved { layer, delta }
    }

    /// Pointer up or leave
    pub fn pointer_release(&mut self) -> DragResponse {
        match std::mem::take(&mut self.state).layer() {
            Some(layer) => {
                info!("Finished dragging {layer:?}");
                DragResponse::Ended(layer)
            }
            None => DragResponse::Ignored,
        }
    }
}

fn pin_position(scene: &mut SceneState, layer: Layer, resolved: Pos2) {
    match layer {
        Layer::Text if scene.text_position().is_none() => {
            scene.set_text_position(resolved);
        }
        Layer::Image if scene.image_position().is_none() => {
            scene.set_image_position(resolved);
        }
        _ => {}
    }
}
