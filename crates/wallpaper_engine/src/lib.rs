//! Wallpaper engine: remote prediction client, poll loop, tile stitching and export.
mod client;
mod engine;
mod export;
mod fetch;
mod filename;
mod persist;
mod poller;
mod preview;
mod progress;
mod stitch;
mod types;

pub use client::{
    ClientSettings, PredictionApi, ReplicateClient, DEFAULT_API_BASE, DEFAULT_MODEL_VERSION,
};
pub use engine::EngineHandle;
pub use export::export_wallpaper;
pub use fetch::{AssetSource, FetchSettings, ReqwestFetcher};
pub use filename::{download_filename, MAX_STEM_LEN};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poller::{
    validate_input, ChannelProgressSink, NullSink, Poller, ProgressSink, DEFAULT_POLL_INTERVAL,
};
pub use preview::{
    preview_source_url, render_preview, render_preview_with_fallback, FALLBACK_IMAGE_URL,
    PREVIEW_HEIGHT, PREVIEW_WIDTH,
};
pub use progress::{parse_progress, Progress, PERCENT_SCALE};
pub use stitch::{
    stitch_tiles, stitch_tiles_native, tile_origins, TileStitcher, MAX_CANVAS_EDGE, TILE_EDGE,
};
pub use types::{
    EngineError, EngineEvent, ExportRequest, ExportSummary, FailureKind, FetchError,
    FetchMetadata, FetchOutput, Prediction, PredictionId, PredictionInput, PredictionStatus,
};
