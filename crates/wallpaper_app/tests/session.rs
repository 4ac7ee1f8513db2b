//! End-to-end generate sessions: state machine, effect runner and engine together.

mod common;

use std::time::Duration;

use common::{config_for, prediction_json, succeeded_json, tile_png};
use pretty_assertions::assert_eq;
use serde_json::json;
use wallpaper_app::effects::EffectRunner;
use wallpaper_app::session::{run_generate, GenerateRequest, Reporter, SessionError};
use wallpaper_core::{AppViewModel, SessionState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingReporter {
    views: Vec<AppViewModel>,
    finished: Option<SessionState>,
}

impl Reporter for RecordingReporter {
    fn render(&mut self, view: &AppViewModel) {
        self.views.push(view.clone());
    }

    fn finish(&mut self, view: &AppViewModel) {
        self.finished = Some(view.session);
    }
}

fn runner_for(server: &MockServer, output_dir: &std::path::Path) -> EffectRunner {
    let services = config_for(server).build_services().unwrap();
    EffectRunner::new(services.poller, services.stitcher, output_dir.to_path_buf()).unwrap()
}

fn request(prompt: &str, export: Option<(u32, u32)>) -> GenerateRequest {
    GenerateRequest {
        prompt: prompt.to_string(),
        width: 512,
        height: 512,
        export,
        timeout: Some(Duration::from_secs(10)),
    }
}

async fn mount_prediction(server: &MockServer, id: &str, final_body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(prediction_json(id, "starting")))
        .mount(server)
        .await;
    let mut running = prediction_json(id, "processing");
    running["logs"] = json!("Using seed: 7\n 40%|####      | 20/50");
    Mock::given(method("GET"))
        .and(path(format!("/v1/predictions/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(running))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/predictions/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(final_body))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn generate_then_export_writes_wallpaper() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/out-0.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(tile_png(512), "image/png"))
        .mount(&server)
        .await;
    let output_url = format!("{}/out-0.png", server.uri());
    mount_prediction(&server, "abc", succeeded_json("abc", &output_url)).await;

    let temp = tempfile::TempDir::new().unwrap();
    let runner = runner_for(&server, temp.path());
    let mut reporter = RecordingReporter::default();

    let outcome = tokio::task::block_in_place(|| {
        run_generate(&runner, &request("ukiyo-e clouds", Some((1024, 600))), &mut reporter)
    })
    .unwrap();

    assert_eq!(outcome.job_id, "abc");
    assert_eq!(outcome.output_url, output_url);
    let exported = outcome.exported.unwrap();
    assert_eq!(exported, temp.path().join("ukiyo-e-clouds--abc.png"));
    let png = image::open(&exported).unwrap().into_rgba8();
    assert_eq!(png.dimensions(), (1024, 600));

    assert_eq!(reporter.finished, Some(SessionState::Succeeded));
    assert!(reporter
        .views
        .iter()
        .any(|v| v.progress_label.as_deref() == Some("40%")));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_prediction_surfaces_remote_error() {
    let server = MockServer::start().await;
    let mut failed = prediction_json("bad", "failed");
    failed["error"] = json!("CUDA out of memory");
    mount_prediction(&server, "bad", failed).await;

    let temp = tempfile::TempDir::new().unwrap();
    let runner = runner_for(&server, temp.path());
    let mut reporter = RecordingReporter::default();

    let err = tokio::task::block_in_place(|| {
        run_generate(&runner, &request("tree bark", Some((512, 512))), &mut reporter)
    })
    .unwrap_err();

    assert_eq!(err, SessionError::Failed("CUDA out of memory".into()));
    assert_eq!(reporter.finished, Some(SessionState::Failed));
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn blank_prompt_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let temp = tempfile::TempDir::new().unwrap();
    let runner = runner_for(&server, temp.path());

    let err = tokio::task::block_in_place(|| {
        run_generate(&runner, &request("   ", None), &mut RecordingReporter::default())
    })
    .unwrap_err();

    assert_eq!(err, SessionError::Rejected("Please enter a prompt".into()));
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_width_is_rejected_instead_of_falling_back_to_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let temp = tempfile::TempDir::new().unwrap();
    let runner = runner_for(&server, temp.path());
    let mut req = request("brick wall", None);
    req.width = 0;

    let err = tokio::task::block_in_place(|| {
        run_generate(&runner, &req, &mut RecordingReporter::default())
    })
    .unwrap_err();

    assert_eq!(err, SessionError::Rejected("Invalid size 0x512".into()));
}

#[tokio::test(flavor = "multi_thread")]
async fn timeout_cancels_a_stuck_prediction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/predictions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(prediction_json("slow", "starting")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/predictions/slow"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(prediction_json("slow", "processing")),
        )
        .mount(&server)
        .await;

    let temp = tempfile::TempDir::new().unwrap();
    let runner = runner_for(&server, temp.path());
    let mut req = request("glacier", None);
    req.timeout = Some(Duration::from_millis(200));

    let err = tokio::task::block_in_place(|| {
        run_generate(&runner, &req, &mut RecordingReporter::default())
    })
    .unwrap_err();

    assert_eq!(err, SessionError::Failed("cancelled".into()));
}
