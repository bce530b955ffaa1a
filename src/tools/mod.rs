mod drag_tool;

pub use drag_tool::{DragController, DragResponse, DragState};
