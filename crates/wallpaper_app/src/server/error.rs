use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use engine_logging::{engine_error, engine_warn};
use serde_json::json;
use wallpaper_engine::EngineError;

/// Handler error rendered as `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub EngineError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::AssetLoad(_) => StatusCode::BAD_GATEWAY,
            EngineError::Remote { .. } | EngineError::Cancelled | EngineError::Persist(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(EngineError::Validation(rejection.body_text()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(EngineError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            engine_error!("Request failed with {}: {}", status, self.0);
        } else {
            engine_warn!("Request rejected with {}: {}", status, self.0);
        }
        let body = json!({ "detail": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
