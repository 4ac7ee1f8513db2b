use engine_logging::engine_warn;

use crate::stitch::TileStitcher;
use crate::{EngineError, PredictionApi};

pub const PREVIEW_WIDTH: u32 = 1200;
pub const PREVIEW_HEIGHT: u32 = 630;
/// Texture shown when a prediction has no usable output.
pub const FALLBACK_IMAGE_URL: &str =
    "https://user-images.githubusercontent.com/14149230/220761866-8f11bb7c-030d-4e14-bfb6-2e114cad2663.png";

/// Resolve which texture backs the share preview for `prediction_id`.
pub async fn preview_source_url(api: &dyn PredictionApi, prediction_id: Option<&str>) -> String {
    let Some(id) = prediction_id.map(str::trim).filter(|id| !id.is_empty()) else {
        return FALLBACK_IMAGE_URL.to_string();
    };
    match api.get(id).await {
        Ok(prediction) => prediction
            .output_url()
            .map_or_else(|| FALLBACK_IMAGE_URL.to_string(), ToOwned::to_owned),
        Err(err) => {
            engine_warn!("Preview lookup for id={} failed: {}", id, err);
            FALLBACK_IMAGE_URL.to_string()
        }
    }
}

/// Render the Open Graph card: the texture repeated at native size over 1200x630.
pub async fn render_preview(
    api: &dyn PredictionApi,
    stitcher: &TileStitcher,
    prediction_id: Option<&str>,
) -> Result<Vec<u8>, EngineError> {
    render_preview_with_fallback(api, stitcher, prediction_id, FALLBACK_IMAGE_URL).await
}

/// As [`render_preview`], with `fallback_url` used both when the prediction has no
/// output and when that output cannot be loaded.
pub async fn render_preview_with_fallback(
    api: &dyn PredictionApi,
    stitcher: &TileStitcher,
    prediction_id: Option<&str>,
    fallback_url: &str,
) -> Result<Vec<u8>, EngineError> {
    let mut url = preview_source_url(api, prediction_id).await;
    if url == FALLBACK_IMAGE_URL {
        url = fallback_url.to_string();
    }
    match stitcher.stitch_native(&url, PREVIEW_WIDTH, PREVIEW_HEIGHT).await {
        Err(EngineError::AssetLoad(err)) if url != fallback_url => {
            engine_warn!("Preview source {} unusable ({}); using fallback", url, err);
            stitcher
                .stitch_native(fallback_url, PREVIEW_WIDTH, PREVIEW_HEIGHT)
                .await
        }
        result => result,
    }
}
