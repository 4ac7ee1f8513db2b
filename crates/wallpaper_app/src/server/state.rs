use std::sync::Arc;

use wallpaper_engine::{PredictionApi, TileStitcher};

use crate::config::Services;

/// Shared state handed to every handler via `State<ServerState>`.
///
/// Cloning is cheap: the API client sits behind an `Arc` and the stitcher
/// only holds one.
#[derive(Clone)]
pub struct ServerState {
    pub api: Arc<dyn PredictionApi>,
    pub stitcher: TileStitcher,
    /// Generation size used when a create request omits it.
    pub default_size: (u32, u32),
}

impl ServerState {
    pub fn new(services: &Services, default_size: (u32, u32)) -> Self {
        Self {
            api: services.api.clone(),
            stitcher: services.stitcher.clone(),
            default_size,
        }
    }
}
