use crate::config::DesignerConfig;
use crate::file_handler::FileHandler;
use crate::input::PointerTracker;
use crate::panels::{canvas_panel, controls_panel};
use crate::session::DesignSession;
use crate::state::DesignRecord;
use crate::texture_manager::CanvasTexture;

/// The interactive designer window.
///
/// Only the design itself is persisted across restarts, as a [`DesignRecord`].
pub struct DesignerApp {
    session: DesignSession,
    pointer: PointerTracker,
    texture: CanvasTexture,
    files: FileHandler,
}

impl DesignerApp {
    /// Called once before the first frame.
    ///
    /// `design` takes precedence over whatever was stored by a previous run.
    pub fn new(cc: &eframe::CreationContext<'_>, config: DesignerConfig, design: Option<DesignRecord>) -> Self {
        let stored = cc
            .storage
            .and_then(|storage| eframe::get_value::<DesignRecord>(storage, eframe::APP_KEY));
        Self::with_design(config, design.or(stored))
    }

    pub fn with_design(config: DesignerConfig, design: Option<DesignRecord>) -> Self {
        let mut session = DesignSession::new(config);
        if let Some(record) = design {
            if let Err(err) = session.load_record(&record) {
                log::error!("Could not restore design, starting fresh: {err}");
            }
        }
        Self {
            session,
            pointer: PointerTracker::new(),
            texture: CanvasTexture::new(),
            files: FileHandler::new(),
        }
    }

    pub fn session(&self) -> &DesignSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DesignSession {
        &mut self.session
    }

    pub(crate) fn pointer_mut(&mut self) -> &mut PointerTracker {
        &mut self.pointer
    }

    pub(crate) fn session_and_texture(&mut self) -> (&DesignSession, &mut CanvasTexture) {
        (&self.session, &mut self.texture)
    }

    fn load_dropped_images(&mut self, ctx: &egui::Context) {
        self.files.preview_files_being_dropped(ctx);
        if !self.files.check_for_dropped_files(ctx) {
            return;
        }
        // One image layer: the last valid drop wins.
        if let Some(image) = self.files.take_images().pop() {
            let reference = image.data_url();
            self.session.upload_image(reference, image.bytes);
        }
    }
}

impl eframe::App for DesignerApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.session.to_record());
    }

    /// Drops a pending preview export instead of firing it during shutdown
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.end();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.load_dropped_images(ctx);
        self.session.tick();

        controls_panel(self, ctx);
        canvas_panel(self, ctx);

        if self.session.is_decoding() {
            ctx.request_repaint();
        } else if let Some(wait) = self.session.time_until_preview() {
            ctx.request_repaint_after(wait);
        }
    }
}
