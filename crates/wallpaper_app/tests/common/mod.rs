#![allow(dead_code)]

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use wallpaper_app::config::{AppConfig, Services};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";
pub const VERSION: &str = "model-version-1";

pub fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        api_token: TOKEN.to_string(),
        api_base: server.uri(),
        model_version: VERSION.to_string(),
        poll_interval_ms: 5,
        ..AppConfig::default()
    }
}

pub fn services_for(server: &MockServer) -> Services {
    config_for(server).build_services().unwrap()
}

pub fn prediction_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "status": status,
        "version": VERSION,
        "input": { "prompt": "ukiyo-e clouds", "width": 512, "height": 512 },
        "output": null,
        "logs": null,
        "error": null,
    })
}

pub fn succeeded_json(id: &str, output_url: &str) -> Value {
    let mut value = prediction_json(id, "succeeded");
    value["output"] = json!([output_url]);
    value["logs"] = json!("100%|##########| 50/50");
    value
}

pub fn tile_png(edge: u32) -> Vec<u8> {
    let mut img = RgbaImage::from_pixel(edge, edge, Rgba([0, 0, 255, 255]));
    img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn decode_png(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().into_rgba8()
}
