#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use wallpaper_engine::{
    ClientSettings, EngineEvent, Prediction, PredictionStatus, Progress, ProgressSink,
    ReplicateClient,
};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";
pub const VERSION: &str = "model-version-1";

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

#[derive(Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }

    pub fn updates(&self) -> Vec<(PredictionStatus, Progress)> {
        self.take()
            .into_iter()
            .filter_map(|event| match event {
                EngineEvent::Updated {
                    prediction,
                    progress,
                } => Some((prediction.status, progress)),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn client_for(server: &MockServer) -> Arc<ReplicateClient> {
    let settings = ClientSettings {
        api_base: server.uri(),
        api_token: TOKEN.to_string(),
        model_version: VERSION.to_string(),
        ..ClientSettings::default()
    };
    Arc::new(ReplicateClient::new(settings).unwrap())
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

pub fn prediction(id: &str, status: PredictionStatus) -> Prediction {
    serde_json::from_value(prediction_json(id, &status.to_string())).unwrap()
}

/// Square PNG filled with `fill`, with the top-left pixel set to `corner`.
pub fn tile_png(edge: u32, fill: Rgba<u8>, corner: Rgba<u8>) -> Vec<u8> {
    let mut img = RgbaImage::from_pixel(edge, edge, fill);
    img.put_pixel(0, 0, corner);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn decode_png(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().into_rgba8()
}
