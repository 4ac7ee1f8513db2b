mod common;

use std::sync::Arc;

use common::{client_for, prediction_json, tile_png, BLUE, RED};
use pretty_assertions::assert_eq;
use serde_json::json;
use wallpaper_engine::{
    download_filename, preview_source_url, render_preview, render_preview_with_fallback,
    FetchSettings, ReqwestFetcher, TileStitcher, FALLBACK_IMAGE_URL, MAX_STEM_LEN,
    PREVIEW_HEIGHT, PREVIEW_WIDTH,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn filename_keeps_only_alphanumerics_and_separators() {
    assert_eq!(download_filename("A cat/dog!", None), "A-cat-dog.png");
    assert_eq!(
        download_filename("  Muddy ground, autumn leaves -- 4k  ", None),
        "Muddy-ground-autumn-leaves-4k.png"
    );
}

#[test]
fn filename_is_truncated_to_max_stem() {
    let prompt = "Tree bark seamless photoscan texture, trending on artstation, base color, albedo, 4k";
    let name = download_filename(prompt, None);
    let stem = name.strip_suffix(".png").unwrap();

    assert!(stem.len() <= MAX_STEM_LEN);
    assert!(!stem.ends_with('-'));
    assert!(stem
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-'));
}

#[test]
fn filename_appends_job_id_suffix() {
    assert_eq!(
        download_filename("ukiyo-e clouds", Some("xyz/9")),
        "ukiyo-e-clouds--xyz-9.png"
    );
    assert_eq!(download_filename("clouds", Some("  ")), "clouds.png");
}

#[test]
fn filename_falls_back_and_patches_reserved_names() {
    assert_eq!(download_filename("!!!", None), "wallpaper.png");
    assert_eq!(download_filename("con", None), "con_.png");
}

#[tokio::test]
async fn preview_uses_last_output_of_known_prediction() {
    let server = MockServer::start().await;
    let mut succeeded = prediction_json("p1", "succeeded");
    succeeded["output"] = json!(["https://example.com/a.png", "https://example.com/b.png"]);
    Mock::given(method("GET"))
        .and(path("/v1/predictions/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(succeeded))
        .mount(&server)
        .await;

    let api = client_for(&server);
    assert_eq!(
        preview_source_url(api.as_ref(), Some("p1")).await,
        "https://example.com/b.png"
    );
}

#[tokio::test]
async fn preview_falls_back_without_usable_prediction() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/predictions/pending"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(prediction_json("pending", "processing")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/predictions/unknown"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .mount(&server)
        .await;

    let api = client_for(&server);
    assert_eq!(preview_source_url(api.as_ref(), None).await, FALLBACK_IMAGE_URL);
    assert_eq!(
        preview_source_url(api.as_ref(), Some("pending")).await,
        FALLBACK_IMAGE_URL
    );
    assert_eq!(
        preview_source_url(api.as_ref(), Some("unknown")).await,
        FALLBACK_IMAGE_URL
    );
}

#[tokio::test]
async fn preview_card_has_open_graph_dimensions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tile.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(tile_png(256, BLUE, RED), "image/png"),
        )
        .mount(&server)
        .await;
    let mut succeeded = prediction_json("p2", "succeeded");
    succeeded["output"] = json!([format!("{}/tile.png", server.uri())]);
    Mock::given(method("GET"))
        .and(path("/v1/predictions/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(succeeded))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let stitcher = TileStitcher::new(Arc::new(ReqwestFetcher::new(FetchSettings::default())));
    let png = render_preview(api.as_ref(), &stitcher, Some("p2")).await.unwrap();
    let card = common::decode_png(&png);

    assert_eq!(card.dimensions(), (PREVIEW_WIDTH, PREVIEW_HEIGHT));
    assert_eq!(*card.get_pixel(256, 256), RED);
}

#[tokio::test]
async fn preview_uses_fallback_when_output_cannot_be_loaded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/expired.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fallback.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(tile_png(256, RED, BLUE), "image/png"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let mut succeeded = prediction_json("p3", "succeeded");
    succeeded["output"] = json!([format!("{}/expired.png", server.uri())]);
    Mock::given(method("GET"))
        .and(path("/v1/predictions/p3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(succeeded))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let stitcher = TileStitcher::new(Arc::new(ReqwestFetcher::new(FetchSettings::default())));
    let fallback = format!("{}/fallback.png", server.uri());
    let png = render_preview_with_fallback(api.as_ref(), &stitcher, Some("p3"), &fallback)
        .await
        .unwrap();
    let card = common::decode_png(&png);

    assert_eq!(card.dimensions(), (PREVIEW_WIDTH, PREVIEW_HEIGHT));
    assert_eq!(*card.get_pixel(256, 256), BLUE);
}
