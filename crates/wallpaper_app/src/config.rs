//! Layered application configuration.
//!
//! Sources, later ones winning: built-in defaults, an optional RON file,
//! environment variables (including a `.env` file loaded by `main`), CLI flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wallpaper_engine::{
    ClientSettings, FetchSettings, Poller, PredictionApi, ReplicateClient, ReqwestFetcher,
    TileStitcher, DEFAULT_API_BASE, DEFAULT_MODEL_VERSION, TILE_EDGE,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("environment variable {key} has invalid value {value:?}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("REPLICATE_API_TOKEN is not set")]
    MissingToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_token: String,
    pub api_base: String,
    pub model_version: String,
    pub poll_interval_ms: u64,
    pub tile_edge: u32,
    pub output_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            poll_interval_ms: 1000,
            tile_edge: TILE_EDGE,
            output_dir: PathBuf::from("wallpapers"),
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Services shared by the CLI and the HTTP server.
#[derive(Clone)]
pub struct Services {
    pub api: Arc<dyn PredictionApi>,
    pub poller: Poller,
    pub stitcher: TileStitcher,
}

impl AppConfig {
    /// Defaults, then `file` if given, then the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_ron_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_ron_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Override fields from environment-style lookups.
    ///
    /// | Env Var                   | Field             |
    /// |---------------------------|-------------------|
    /// | `REPLICATE_API_TOKEN`     | `api_token`       |
    /// | `REPLICATE_API_BASE`      | `api_base`        |
    /// | `REPLICATE_MODEL_VERSION` | `model_version`   |
    /// | `POLL_INTERVAL_MS`        | `poll_interval_ms`|
    /// | `WALLPAPER_OUTPUT_DIR`    | `output_dir`      |
    /// | `HOST`                    | `host`            |
    /// | `PORT`                    | `port`            |
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("REPLICATE_API_TOKEN") {
            self.api_token = token;
        }
        if let Some(base) = get("REPLICATE_API_BASE") {
            self.api_base = base;
        }
        if let Some(version) = get("REPLICATE_MODEL_VERSION") {
            self.model_version = version;
        }
        if let Some(raw) = get("POLL_INTERVAL_MS") {
            self.poll_interval_ms = parse_env("POLL_INTERVAL_MS", &raw)?;
        }
        if let Some(dir) = get("WALLPAPER_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(host) = get("HOST") {
            self.host = host;
        }
        if let Some(raw) = get("PORT") {
            self.port = parse_env("PORT", &raw)?;
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            api_base: self.api_base.clone(),
            api_token: self.api_token.clone(),
            model_version: self.model_version.clone(),
            ..ClientSettings::default()
        }
    }

    pub fn build_services(&self) -> anyhow::Result<Services> {
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::MissingToken.into());
        }
        let client = ReplicateClient::new(self.client_settings())?;
        let api: Arc<dyn PredictionApi> = Arc::new(client);
        let poller = Poller::new(api.clone()).with_interval(self.poll_interval());
        let stitcher = TileStitcher::new(Arc::new(ReqwestFetcher::new(FetchSettings::default())))
            .with_tile_edge(self.tile_edge);
        Ok(Services {
            api,
            poller,
            stitcher,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: raw.to_string(),
    })
}
