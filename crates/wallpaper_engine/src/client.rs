use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use crate::{EngineError, Prediction, PredictionInput};

/// Model version of the tileable texture diffusion model.
pub const DEFAULT_MODEL_VERSION: &str =
    "3b5c0242f8925a4ab6c79b4c51e9b4ce6374e9b07b5e8461d89e692fd0faa449";
pub const DEFAULT_API_BASE: &str = "https://api.replicate.com";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_base: String,
    pub api_token: String,
    pub model_version: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_token: String::new(),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Remote prediction service.
#[async_trait::async_trait]
pub trait PredictionApi: Send + Sync {
    async fn create(&self, input: &PredictionInput) -> Result<Prediction, EngineError>;

    async fn get(&self, id: &str) -> Result<Prediction, EngineError>;

    /// Recent predictions made with the configured model version.
    async fn list(&self) -> Result<Vec<Prediction>, EngineError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListBody {
    #[serde(default)]
    results: Vec<Prediction>,
}

#[derive(Debug, Clone)]
pub struct ReplicateClient {
    settings: ClientSettings,
    http: reqwest::Client,
}

impl ReplicateClient {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| EngineError::remote(None, err.to_string()))?;
        Ok(Self { settings, http })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!(
            "{}/v1/predictions{suffix}",
            self.settings.api_base.trim_end_matches('/')
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header(AUTHORIZATION, format!("Token {}", self.settings.api_token))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, EngineError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| EngineError::remote(None, err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| EngineError::remote(Some(status.as_u16()), err.to_string()))?;
        if !status.is_success() {
            let detail = remote_detail(status, &body);
            engine_warn!("Remote call failed status={} detail={}", status, detail);
            return Err(EngineError::remote(Some(status.as_u16()), detail));
        }
        Ok(body.to_vec())
    }
}

#[async_trait::async_trait]
impl PredictionApi for ReplicateClient {
    async fn create(&self, input: &PredictionInput) -> Result<Prediction, EngineError> {
        let body = json!({
            "version": self.settings.model_version,
            "input": input,
        });
        let request = self
            .http
            .post(self.endpoint(""))
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
        let bytes = self.send(request).await?;
        let prediction = parse_prediction(&bytes)?;
        engine_debug!("Created prediction id={} status={}", prediction.id, prediction.status);
        Ok(prediction)
    }

    async fn get(&self, id: &str) -> Result<Prediction, EngineError> {
        let request = self.http.get(self.endpoint(&format!("/{id}")));
        let bytes = self.send(request).await?;
        parse_prediction(&bytes)
    }

    async fn list(&self) -> Result<Vec<Prediction>, EngineError> {
        let bytes = self.send(self.http.get(self.endpoint(""))).await?;
        let listing: ListBody = serde_json::from_slice(&bytes)
            .map_err(|err| EngineError::remote(None, format!("malformed listing: {err}")))?;
        Ok(listing
            .results
            .into_iter()
            .filter(|p| p.version.as_deref() == Some(self.settings.model_version.as_str()))
            .collect())
    }
}

fn parse_prediction(bytes: &[u8]) -> Result<Prediction, EngineError> {
    serde_json::from_slice(bytes)
        .map_err(|err| EngineError::remote(None, format!("malformed prediction: {err}")))
}

fn remote_detail(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| status.to_string())
}
