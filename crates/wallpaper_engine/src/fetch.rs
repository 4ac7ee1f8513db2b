//! Downloads source textures for the stitcher.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use engine_logging::engine_debug;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;

use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    /// Upper bound on a downloaded texture, checked against the header and the stream.
    pub max_bytes: u64,
    /// Media types accepted from the asset host. A missing header is accepted.
    pub image_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 20 * 1024 * 1024,
            image_types: ["image/png", "image/jpeg", "image/webp", "application/octet-stream"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Source of raw image bytes for the stitcher.
#[async_trait::async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError>;
}

/// [`AssetSource`] over plain HTTP(S) GETs.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    // One client per fetch so the redirect policy can report how many hops it took.
    fn client_counting_redirects(
        &self,
        hops: Arc<AtomicUsize>,
    ) -> Result<reqwest::Client, FetchError> {
        let limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let seen = attempt.previous().len();
            hops.store(seen, Ordering::Relaxed);
            if seen >= limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(policy)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn accepts(&self, content_type: &str) -> bool {
        let media = media_type(content_type);
        self.settings
            .image_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(media))
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "texture exceeds size cap",
        )
    }

    async fn read_capped(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let hint = response.content_length().unwrap_or(0).min(self.settings.max_bytes);
        let mut body = Vec::with_capacity(hint as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(classify)?;
            let total = (body.len() + chunk.len()) as u64;
            if total > self.settings.max_bytes {
                return Err(self.too_large(total));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl AssetSource for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let target = parse_http_url(url)?;
        let hops = Arc::new(AtomicUsize::new(0));
        let client = self.client_counting_redirects(hops.clone())?;

        let response = client.get(target).send().await.map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        if let Some(declared) = response.content_length() {
            if declared > self.settings.max_bytes {
                return Err(self.too_large(declared));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Some(found) = content_type.as_deref().filter(|ct| !self.accepts(ct)) {
            return Err(FetchError::new(
                FailureKind::UnsupportedContentType {
                    content_type: found.to_string(),
                },
                "not an image",
            ));
        }

        let final_url = response.url().to_string();
        let bytes = self.read_capped(response).await?;
        engine_debug!("Fetched {} bytes from {}", bytes.len(), final_url);

        Ok(FetchOutput {
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url,
                redirect_count: hops.load(Ordering::Relaxed),
                content_type,
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

fn parse_http_url(raw: &str) -> Result<url::Url, FetchError> {
    let parsed = url::Url::parse(raw)
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::new(
            FailureKind::InvalidUrl,
            format!("unsupported scheme {other}"),
        )),
    }
}

fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}

fn classify(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_redirect() {
        FailureKind::RedirectLimitExceeded
    } else {
        FailureKind::Network
    };
    FetchError::new(kind, err.to_string())
}
