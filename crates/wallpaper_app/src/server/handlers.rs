use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use engine_logging::engine_info;
use serde::{Deserialize, Serialize};
use wallpaper_engine::{download_filename, render_preview, validate_input, Prediction};

use super::error::ApiResult;
use super::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct CreatePredictionBody {
    #[serde(default)]
    pub prompt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub url: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub prompt: String,
    pub id: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn create_prediction(
    State(state): State<ServerState>,
    body: Result<Json<CreatePredictionBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Prediction>)> {
    let Json(body) = body?;
    let (default_width, default_height) = state.default_size;
    let input = validate_input(
        &body.prompt,
        body.width.unwrap_or(default_width),
        body.height.unwrap_or(default_height),
    )?;
    let prediction = state.api.create(&input).await?;
    engine_info!("Created prediction id={} status={}", prediction.id, prediction.status);
    Ok((StatusCode::CREATED, Json(prediction)))
}

pub async fn get_prediction(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Prediction>> {
    let prediction = state.api.get(&id).await?;
    Ok(Json(prediction))
}

pub async fn list_predictions(
    State(state): State<ServerState>,
) -> ApiResult<Json<Vec<Prediction>>> {
    let predictions = state.api.list().await?;
    Ok(Json(predictions))
}

pub async fn og_preview(
    State(state): State<ServerState>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    let png = render_preview(state.api.as_ref(), &state.stitcher, query.id.as_deref()).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

pub async fn export_wallpaper(
    State(state): State<ServerState>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    let png = state
        .stitcher
        .stitch(&query.url, query.width, query.height)
        .await?;
    let filename = download_filename(&query.prompt, query.id.as_deref());
    engine_info!(
        "Serving export {} ({}x{}, {} bytes)",
        filename,
        query.width,
        query.height,
        png.len()
    );
    let disposition = format!("attachment; filename=\"{filename}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        png,
    )
        .into_response())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
