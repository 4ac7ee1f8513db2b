use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::progress::{parse_progress, Progress};
use crate::{EngineError, EngineEvent, Prediction, PredictionApi, PredictionInput};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Sink that drops everything, for callers that only want the final result.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: EngineEvent) {}
}

enum PollState {
    Pending,
    Polling(Prediction),
    Finished(Prediction),
}

/// Drives one prediction from submission to a terminal status.
#[derive(Clone)]
pub struct Poller {
    api: Arc<dyn PredictionApi>,
    interval: Duration,
}

impl Poller {
    pub fn new(api: Arc<dyn PredictionApi>) -> Self {
        Self {
            api,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn submit(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
    ) -> Result<Prediction, EngineError> {
        let input = validate_input(prompt, width, height)?;
        self.api.create(&input).await
    }

    pub async fn poll(&self, id: &str) -> Result<Prediction, EngineError> {
        self.api.get(id).await
    }

    /// Submit, then poll every `interval` until the prediction is terminal.
    ///
    /// `failed` and `canceled` predictions are returned as `Ok`; only transport
    /// and validation problems are errors. A failed poll is not retried.
    pub async fn run(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<Prediction, EngineError> {
        let mut state = PollState::Pending;
        let mut polls: u32 = 0;
        loop {
            state = match state {
                PollState::Pending => {
                    let prediction = self.submit(prompt, width, height).await?;
                    engine_info!(
                        "Submitted prediction id={} status={}",
                        prediction.id,
                        prediction.status
                    );
                    emit_update(sink, &prediction);
                    next_state(prediction)
                }
                PollState::Polling(current) => {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            engine_warn!(
                                "Polling cancelled id={} after {} polls",
                                current.id,
                                polls
                            );
                            return Err(EngineError::Cancelled);
                        }
                        _ = tokio::time::sleep(self.interval) => {}
                    }
                    polls += 1;
                    let prediction = self.poll(&current.id).await.inspect_err(|err| {
                        engine_warn!("Poll {} for id={} failed: {}", polls, current.id, err);
                    })?;
                    emit_update(sink, &prediction);
                    next_state(prediction)
                }
                PollState::Finished(prediction) => {
                    engine_info!(
                        "Prediction id={} finished status={} polls={}",
                        prediction.id,
                        prediction.status,
                        polls
                    );
                    return Ok(prediction);
                }
            };
        }
    }
}

fn next_state(prediction: Prediction) -> PollState {
    if prediction.is_terminal() {
        PollState::Finished(prediction)
    } else {
        PollState::Polling(prediction)
    }
}

fn emit_update(sink: &dyn ProgressSink, prediction: &Prediction) {
    let progress = parse_progress(prediction.logs.as_deref());
    if progress == Progress::Flagged {
        engine_warn!("Prediction id={} flagged by content moderation", prediction.id);
    }
    sink.emit(EngineEvent::Updated {
        prediction: prediction.clone(),
        progress,
    });
}

pub fn validate_input(
    prompt: &str,
    width: u32,
    height: u32,
) -> Result<PredictionInput, EngineError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(EngineError::Validation("prompt must not be empty".into()));
    }
    if width == 0 || height == 0 {
        return Err(EngineError::Validation(format!(
            "dimensions must be positive (got {width}x{height})"
        )));
    }
    Ok(PredictionInput {
        prompt: prompt.to_string(),
        width: Some(width),
        height: Some(height),
    })
}
