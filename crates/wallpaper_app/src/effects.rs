use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use wallpaper_core::{export_record, Effect, JobSnapshot, JobStatus, Msg, Progress};
use wallpaper_engine::{
    parse_progress, EngineEvent, EngineHandle, ExportRequest, Poller, Prediction,
    PredictionStatus, TileStitcher,
};

/// Applies session effects to the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    output_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(
        poller: Poller,
        stitcher: TileStitcher,
        output_dir: PathBuf,
    ) -> std::io::Result<Self> {
        let engine = EngineHandle::new(poller, stitcher, output_dir.clone())?;
        Ok(Self { engine, output_dir })
    }

    /// Directory exports are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitPrediction {
                    prompt,
                    width,
                    height,
                } => {
                    engine_info!(
                        "SubmitPrediction prompt_len={} size={}x{}",
                        prompt.len(),
                        width,
                        height
                    );
                    self.engine.run_prediction(prompt, width, height);
                }
                Effect::ExportWallpaper {
                    source_url,
                    width,
                    height,
                    prompt,
                    job_id,
                } => {
                    engine_info!("ExportWallpaper size={}x{} url={}", width, height, source_url);
                    self.engine.export(ExportRequest {
                        source_url,
                        width,
                        height,
                        prompt,
                        job_id,
                    });
                }
                Effect::CancelJob => self.engine.cancel(),
            }
        }
    }

    /// Wait up to `timeout` for the next engine event, already mapped to a message.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Updated {
            prediction,
            progress,
        } => Msg::JobUpdated {
            job: snapshot_of(&prediction),
            progress: map_progress(progress),
        },
        EngineEvent::JobCompleted { result } => match result {
            // Usually a repeat of the last update; the session ignores it once terminal.
            Ok(prediction) => Msg::JobUpdated {
                progress: map_progress(parse_progress(prediction.logs.as_deref())),
                job: snapshot_of(&prediction),
            },
            Err(err) => {
                engine_warn!("Prediction failed: {}", err);
                Msg::RequestFailed {
                    detail: err.to_string(),
                }
            }
        },
        EngineEvent::ExportCompleted { result } => Msg::ExportFinished {
            result: result
                .map(|summary| {
                    let filename = summary
                        .path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    export_record(filename, summary.width, summary.height, summary.bytes_written)
                })
                .map_err(|err| err.to_string()),
        },
    }
}

pub fn snapshot_of(prediction: &Prediction) -> JobSnapshot {
    JobSnapshot {
        id: prediction.id.clone(),
        status: map_status(prediction.status),
        output_url: prediction.output_url().map(str::to_string),
        error: prediction.error_detail(),
    }
}

pub fn map_status(status: PredictionStatus) -> JobStatus {
    match status {
        PredictionStatus::Starting => JobStatus::Starting,
        PredictionStatus::Processing => JobStatus::Processing,
        PredictionStatus::Succeeded => JobStatus::Succeeded,
        PredictionStatus::Failed => JobStatus::Failed,
        PredictionStatus::Canceled => JobStatus::Canceled,
        PredictionStatus::Unknown => JobStatus::Unknown,
    }
}

pub fn map_progress(progress: wallpaper_engine::Progress) -> Progress {
    match progress {
        wallpaper_engine::Progress::Booting => Progress::Booting,
        wallpaper_engine::Progress::Running => Progress::Running,
        wallpaper_engine::Progress::Percent(value) => Progress::Percent(value),
        wallpaper_engine::Progress::Flagged => Progress::Flagged,
    }
}
