use egui::{Color32, CursorIcon, Rect, Sense, Stroke, pos2};

use crate::DesignerApp;
use crate::geometry::CoordinateMapper;

pub fn canvas_panel(app: &mut DesignerApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let available = ui.available_size();
        app.session_mut().fit_to_container(available.x);

        let canvas = app.session().canvas_size();
        let (rect, response) = ui.allocate_exact_size(canvas.to_vec2(), Sense::drag());

        // Another widget dragging (a slider, the panel edge) must not start a canvas drag.
        let captured = ctx.dragged_id().is_some_and(|id| id != response.id);
        app.session_mut().set_pointer_captured_elsewhere(captured);

        for event in app.pointer_mut().process_input(ctx, rect) {
            app.session_mut().handle_pointer(event, rect);
        }

        let (session, texture) = app.session_and_texture();
        let generation = session.generation();
        if let Some(texture_id) = texture.texture_for(ctx, session.raster(), generation) {
            let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
            ui.painter().image(texture_id, rect, uv, Color32::WHITE);
        }
        ui.painter().rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::from_gray(200)));

        if session.drag_state().layer().is_some() {
            ctx.set_cursor_icon(CursorIcon::Grabbing);
        } else if let Some(hover) = response.hover_pos() {
            let mapper = CoordinateMapper::new(rect, session.canvas_size());
            let over_layer = mapper
                .to_scene_space(hover)
                .and_then(|point| session.pipeline().hit_test(point, session.scene(), session.canvas_size()));
            if over_layer.is_some() {
                ctx.set_cursor_icon(CursorIcon::Grab);
            }
        }
    });
}
