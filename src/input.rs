use egui::{Context, PointerButton, Pos2, Rect};

/// Pointer input in screen coordinates, as delivered by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Primary button was pressed
    Down { position: Pos2 },
    /// Pointer moved, with or without the button held
    Move { position: Pos2 },
    /// Primary button was released
    Up { position: Pos2 },
    /// Pointer left the canvas element
    Leave,
}

impl PointerEvent {
    pub fn position(&self) -> Option<Pos2> {
        match self {
            PointerEvent::Down { position } | PointerEvent::Move { position } | PointerEvent::Up { position } => {
                Some(*position)
            }
            PointerEvent::Leave => None,
        }
    }

    /// Up and leave both end a drag
    pub fn is_release(&self) -> bool {
        matches!(self, PointerEvent::Up { .. } | PointerEvent::Leave)
    }
}

/// Turns egui's per-frame pointer state into discrete canvas events
#[derive(Debug, Default)]
pub struct PointerTracker {
    last_pointer_pos: Option<Pos2>,
    inside: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events for this frame relative to the on-screen canvas `canvas_rect`
    pub fn process_input(&mut self, ctx: &Context, canvas_rect: Rect) -> Vec<PointerEvent> {
        let (hover, pressed, released) = ctx.input(|input| {
            (
                input.pointer.hover_pos(),
                input.pointer.button_pressed(PointerButton::Primary),
                input.pointer.button_released(PointerButton::Primary),
            )
        });
        self.events_for(hover, pressed, released, canvas_rect)
    }

    fn events_for(&mut self, hover: Option<Pos2>, pressed: bool, released: bool, canvas_rect: Rect) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        let now_inside = hover.is_some_and(|pos| canvas_rect.contains(pos));

        if let Some(pos) = hover {
            if pressed && now_inside {
                events.push(PointerEvent::Down { position: pos });
            }
            if self.last_pointer_pos != Some(pos) && (now_inside || self.inside) {
                events.push(PointerEvent::Move { position: pos });
            }
            if released {
                events.push(PointerEvent::Up { position: pos });
            }
        }

        if self.inside && !now_inside {
            events.push(PointerEvent::Leave);
        }

        self.last_pointer_pos = hover;
        self.inside = now_inside;
        events
    }
}
