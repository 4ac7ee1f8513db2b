use std::path::Path;

use engine_logging::engine_info;

use crate::filename::download_filename;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::stitch::TileStitcher;
use crate::{EngineError, ExportRequest, ExportSummary};

impl From<PersistError> for EngineError {
    fn from(err: PersistError) -> Self {
        EngineError::Persist(err.to_string())
    }
}

/// Stitch the requested wallpaper and write it under `output_dir`.
pub async fn export_wallpaper(
    stitcher: &TileStitcher,
    request: &ExportRequest,
    output_dir: &Path,
) -> Result<ExportSummary, EngineError> {
    let png = stitcher
        .stitch(&request.source_url, request.width, request.height)
        .await?;
    let filename = download_filename(&request.prompt, request.job_id.as_deref());
    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    let path = writer.write(&filename, &png)?;
    engine_info!("Exported wallpaper to {:?} ({} bytes)", path, png.len());
    Ok(ExportSummary {
        path,
        width: request.width,
        height: request.height,
        bytes_written: png.len() as u64,
    })
}
