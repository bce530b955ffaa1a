#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod file_handler;
pub mod geometry;
pub mod input;
pub mod panels;
pub mod raster;
pub mod renderer;
pub mod session;
pub mod state;
pub mod text;
pub mod texture_manager;
pub mod tools;
pub mod util;

pub use app::DesignerApp;
pub use assets::RasterSource;
pub use config::DesignerConfig;
pub use error::{DesignerError, Result};
pub use event::{AssetKind, EventBus, EventHandler, EventLog, SessionEvent};
pub use export::{EncodedImage, PreviewExporter};
pub use geometry::{CoordinateMapper, HitTester, SceneLayout};
pub use input::PointerEvent;
pub use raster::{RasterBuffer, RasterSize};
pub use renderer::RenderPipeline;
pub use session::DesignSession;
pub use state::{DesignRecord, ImageSource, Layer, SceneField, SceneState};
pub use text::FontBook;
pub use tools::{DragController, DragResponse, DragState};
