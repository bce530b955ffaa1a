use std::time::{Duration, Instant};

use base64::Engine as _;
use eframe::App as _;
use egui::{Color32, Rect, pos2, vec2};
use image::{ImageEncoder, Rgba, RgbaImage};
use tee_designer::file_handler::DroppedImage;
use tee_designer::util::time::ManualClock;
use tee_designer::{
    AssetKind, DesignRecord, DesignSession, DesignerApp, DesignerConfig, EventLog, PointerEvent, SessionEvent,
};

fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let pixels = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut bytes)
        .write_image(pixels.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    bytes
}

fn data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", base64::engine::general_purpose::STANDARD.encode(bytes))
}

fn session() -> (DesignSession, EventLog) {
    let session = DesignSession::with_clock(DesignerConfig::default(), Box::new(ManualClock::new(0.0)));
    let log = EventLog::new();
    session.subscribe(Box::new(log.clone()));
    (session, log)
}

/// Ticks until background decodes finish
fn settle(session: &mut DesignSession) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while session.is_decoding() {
        assert!(Instant::now() < deadline, "decode never finished");
        session.tick();
        std::thread::sleep(Duration::from_millis(5));
    }
}

const SAVED: &str = r##"{
    "name": "Team shirt",
    "tshirt_color": "#ff6347",
    "text_content": "GO TEAM",
    "text_color": "#000080",
    "text_font": "Impact",
    "text_position_x": 0,
    "text_position_y": 180.5,
    "image_url": "https://cdn.example.com/crest.png",
    "image_position_x": null,
    "image_position_y": null,
    "image_scale": 0.8,
    "preview_url": null
}"##;

#[test]
fn test_saved_json_loads_without_semantic_change() {
    let record = DesignRecord::from_json(SAVED).unwrap();
    let (mut session, _) = session();
    session.load_record(&record).unwrap();

    let scene = session.scene();
    assert_eq!(scene.name(), "Team shirt");
    assert_eq!(scene.garment_color(), Color32::from_rgb(0xff, 0x63, 0x47));
    assert_eq!(scene.text_font(), "Impact");
    // Zero is a real coordinate, not "unset".
    assert_eq!(scene.text_position(), Some(pos2(0.0, 180.5)));
    assert_eq!(scene.image_position(), None);
    assert_eq!(scene.image_scale(), 0.8);

    assert_eq!(session.to_record(), record);
    let reparsed = DesignRecord::from_json(&record.to_json().unwrap()).unwrap();
    assert_eq!(reparsed, record);
}

#[test]
fn test_remote_image_waits_for_the_host() {
    let record = DesignRecord::from_json(SAVED).unwrap();
    let (mut session, log) = session();
    session.load_record(&record).unwrap();
    assert!(!session.is_decoding());

    // Bytes for some other URL are ignored.
    assert!(!session.attach_image_bytes("https://elsewhere/x.png", png_bytes(4, 4, [0, 0, 0, 255])));

    assert!(session.attach_image_bytes("https://cdn.example.com/crest.png", png_bytes(30, 30, [0, 255, 0, 255])));
    settle(&mut session);
    assert!(log.events().contains(&SessionEvent::AssetReady(AssetKind::Image)));
    // 30px at scale 0.8 is 16px around the printable center.
    assert_eq!(session.raster().pixel(200, 225), Some([0, 255, 0, 255]));
}

#[test]
fn test_data_url_image_is_decoded_on_load() {
    let mut record = DesignRecord::from_json(SAVED).unwrap();
    record.image_url = Some(data_url(&png_bytes(60, 60, [0, 0, 255, 255])));
    record.image_position_x = Some(100.0);
    record.image_position_y = Some(300.0);
    record.text_content = None;

    let (mut session, log) = session();
    session.load_record(&record).unwrap();
    assert!(session.is_decoding());
    settle(&mut session);

    assert_eq!(log.events(), vec![SessionEvent::AssetReady(AssetKind::Image)]);
    assert_eq!(session.scene().image_position(), Some(pos2(100.0, 300.0)));
    assert_eq!(session.raster().pixel(100, 300), Some([0, 0, 255, 255]));
    assert_eq!(session.to_record(), record);
}

#[test]
fn test_undecodable_upload_leaves_the_layer_absent() {
    let (mut session, log) = session();
    session.upload_image("broken.png", b"definitely not a png".to_vec());
    settle(&mut session);

    assert!(log.events().contains(&SessionEvent::AssetFailed(AssetKind::Image)));
    let source = session.scene().image_source().unwrap();
    assert_eq!(source.reference(), "broken.png");
    assert!(source.raster().is_none());
}

#[test]
fn test_replaced_upload_discards_the_stale_decode() {
    let (mut session, log) = session();
    session.upload_image("first.png", png_bytes(30, 30, [255, 0, 0, 255]));
    session.upload_image("second.png", png_bytes(30, 30, [0, 255, 0, 255]));
    let generation = session.generation();
    settle(&mut session);

    // One completed decode, one re-render.
    assert_eq!(session.generation(), generation + 1);

    let ready = log
        .events()
        .iter()
        .filter(|event| **event == SessionEvent::AssetReady(AssetKind::Image))
        .count();
    assert_eq!(ready, 1);
    assert_eq!(session.scene().image_source().unwrap().reference(), "second.png");
    assert_eq!(session.raster().pixel(200, 225), Some([0, 255, 0, 255]));
}

#[test]
fn test_invalid_stored_color_is_rejected() {
    let mut record = DesignRecord::from_json(SAVED).unwrap();
    record.tshirt_color = "tomato".to_owned();
    let (mut session, _) = session();
    let before = session.to_record();
    assert!(session.load_record(&record).is_err());
    assert_eq!(session.to_record(), before);
}

#[test]
fn test_same_path_upload_recenters_the_image() {
    let element = Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 500.0));
    let (mut session, _) = session();
    session.upload_image("/home/u/logo.png", png_bytes(60, 60, [255, 0, 0, 255]));
    settle(&mut session);

    session.handle_pointer(PointerEvent::Down { position: pos2(200.0, 225.0) }, element);
    session.handle_pointer(PointerEvent::Move { position: pos2(260.0, 300.0) }, element);
    session.handle_pointer(PointerEvent::Up { position: pos2(260.0, 300.0) }, element);
    assert_eq!(session.scene().image_position(), Some(pos2(260.0, 300.0)));

    // The file was edited and dropped again from the same place.
    session.upload_image("/home/u/logo.png", png_bytes(60, 60, [0, 0, 255, 255]));
    settle(&mut session);

    assert_eq!(session.scene().image_position(), None);
    assert_eq!(session.raster().pixel(200, 225), Some([0, 0, 255, 255]));
}

#[test]
fn test_translucent_stored_color_is_rejected() {
    let mut record = DesignRecord::from_json(SAVED).unwrap();
    record.text_color = Some("#12345680".to_owned());
    let (mut session, _) = session();
    let before = session.to_record();
    assert!(session.load_record(&record).is_err());
    assert_eq!(session.to_record(), before);
}

#[test]
fn test_picked_colors_survive_a_save_and_reload() {
    let (mut original, _) = session();
    original.set_text_color(Color32::from_rgba_unmultiplied(0xab, 0xcd, 0xef, 0x10));
    original.set_garment_color(Color32::from_rgb(0x12, 0x34, 0x56));
    let saved = original.to_record();
    assert_eq!(saved.tshirt_color, "#123456");

    let (mut restored, _) = session();
    restored.load_record(&saved).unwrap();
    assert_eq!(restored.to_record(), saved);
}

#[test]
fn test_dropped_image_is_restored_after_restart() {
    let dropped = DroppedImage {
        name: "/home/u/crest.png".to_owned(),
        mime: "image/png".to_owned(),
        bytes: png_bytes(60, 60, [0, 128, 0, 255]),
    };
    let mut app = DesignerApp::with_design(DesignerConfig::default(), None);
    app.session_mut().upload_image(dropped.data_url(), dropped.bytes.clone());
    settle(app.session_mut());
    app.session_mut().set_image_position(pos2(150.0, 260.0));
    let saved = app.session().to_record();
    assert!(saved.image_url.as_deref().is_some_and(|url| url.starts_with("data:image/png;base64,")));

    let mut restarted = DesignerApp::with_design(DesignerConfig::default(), Some(saved.clone()));
    settle(restarted.session_mut());
    let session = restarted.session();
    assert!(session.scene().image_source().unwrap().raster().is_some());
    assert_eq!(session.raster().pixel(150, 260), Some([0, 128, 0, 255]));
    let restored = session.to_record();
    assert_eq!(restored.image_url, saved.image_url);
    assert_eq!((restored.image_position_x, restored.image_position_y), (Some(150.0), Some(260.0)));
}

#[test]
fn test_closing_the_window_drops_the_pending_preview() {
    let mut app = DesignerApp::with_design(DesignerConfig::default(), None);
    app.session_mut().set_text("BYE");
    assert!(app.session().time_until_preview().is_some());

    app.on_exit(None);

    assert!(app.session().is_ended());
    assert!(app.session().time_until_preview().is_none());
    assert_eq!(app.session_mut().tick(), None);
}
