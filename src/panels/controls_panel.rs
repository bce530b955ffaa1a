use egui::{Color32, vec2};

use crate::DesignerApp;
use crate::text::FONT_OPTIONS;

/// Swatches offered next to the garment color picker
pub const PRESET_COLORS: [Color32; 20] = [
    Color32::from_rgb(0xff, 0xff, 0xff),
    Color32::from_rgb(0x00, 0x00, 0x00),
    Color32::from_rgb(0xff, 0x00, 0x00),
    Color32::from_rgb(0x00, 0xff, 0x00),
    Color32::from_rgb(0x00, 0x00, 0xff),
    Color32::from_rgb(0xff, 0xff, 0x00),
    Color32::from_rgb(0xff, 0x00, 0xff),
    Color32::from_rgb(0x00, 0xff, 0xff),
    Color32::from_rgb(0xff, 0xa5, 0x00),
    Color32::from_rgb(0x80, 0x00, 0x80),
    Color32::from_rgb(0x00, 0x80, 0x00),
    Color32::from_rgb(0x80, 0x00, 0x00),
    Color32::from_rgb(0x80, 0x80, 0x00),
    Color32::from_rgb(0x00, 0x80, 0x80),
    Color32::from_rgb(0x00, 0x00, 0x80),
    Color32::from_rgb(0xff, 0x63, 0x47),
    Color32::from_rgb(0x46, 0x82, 0xb4),
    Color32::from_rgb(0xf0, 0x80, 0x80),
    Color32::from_rgb(0xff, 0xc0, 0xcb),
    Color32::from_rgb(0xdd, 0xa0, 0xdd),
];

const SWATCHES_PER_ROW: usize = 5;

pub fn controls_panel(app: &mut DesignerApp, ctx: &egui::Context) {
    egui::SidePanel::right("controls_panel")
        .resizable(true)
        .default_width(240.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let session = app.session_mut();

                ui.heading("Design");
                let mut name = session.scene().name().to_owned();
                if ui.text_edit_singleline(&mut name).changed() {
                    session.set_name(&name);
                }

                ui.separator();
                ui.strong("T-shirt color");
                let current = session.scene().garment_color();
                egui::Grid::new("garment_swatches").spacing([4.0, 4.0]).show(ui, |ui| {
                    for (i, &color) in PRESET_COLORS.iter().enumerate() {
                        let stroke_width = if color == current { 2.0 } else { 0.5 };
                        let swatch = egui::Button::new("")
                            .fill(color)
                            .stroke(egui::Stroke::new(stroke_width, Color32::DARK_GRAY))
                            .min_size(vec2(28.0, 28.0));
                        if ui.add(swatch).clicked() {
                            log::info!("Garment color preset {i} selected");
                            session.set_garment_color(color);
                        }
                        if (i + 1) % SWATCHES_PER_ROW == 0 {
                            ui.end_row();
                        }
                    }
                });
                ui.horizontal(|ui| {
                    let color = session.scene().garment_color();
                    let mut rgb = [color.r(), color.g(), color.b()];
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        session.set_garment_color(Color32::from_rgb(rgb[0], rgb[1], rgb[2]));
                    }
                    ui.monospace(crate::state::format_hex_color(session.scene().garment_color()));
                });

                ui.separator();
                ui.strong("Text");
                let mut text = session.scene().text().to_owned();
                if ui
                    .add(egui::TextEdit::singleline(&mut text).hint_text("Enter text for your design"))
                    .changed()
                {
                    session.set_text(&text);
                }
                ui.horizontal(|ui| {
                    ui.label("Color");
                    let color = session.scene().text_color();
                    let mut rgb = [color.r(), color.g(), color.b()];
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        session.set_text_color(Color32::from_rgb(rgb[0], rgb[1], rgb[2]));
                    }
                });
                let mut font = session.scene().text_font().to_owned();
                egui::ComboBox::from_label("Font")
                    .selected_text(font.clone())
                    .show_ui(ui, |ui| {
                        for family in FONT_OPTIONS {
                            ui.selectable_value(&mut font, family.to_owned(), family);
                        }
                    });
                session.set_text_font(&font);

                ui.separator();
                ui.strong("Image");
                let has_image = session.scene().image_source().is_some();
                if has_image {
                    let (min, max) = (session.config().min_image_scale, session.config().max_image_scale);
                    let mut scale = session.config().clamp_image_scale(session.scene().image_scale());
                    if ui
                        .add(egui::Slider::new(&mut scale, min..=max).step_by(0.1).text("Scale"))
                        .changed()
                    {
                        if let Err(err) = session.set_image_scale(scale) {
                            log::warn!("{err}");
                        }
                    }
                    if ui.button("Remove image").clicked() {
                        session.remove_image();
                    }
                } else {
                    ui.label("Drop an image file onto the window to add it.");
                }

                ui.separator();
                match session.scene().last_exported_preview() {
                    Some(crate::state::Preview::Encoded(preview)) => {
                        ui.small(format!("Preview: {}x{} PNG", preview.width(), preview.height()));
                    }
                    Some(crate::state::Preview::Stored(_)) => {
                        ui.small("Preview: from saved design");
                    }
                    None => {
                        ui.small("Preview: not exported yet");
                    }
                }
            });
        });
}
