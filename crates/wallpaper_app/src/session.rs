//! Drives one generate-then-export session through the pure state machine.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use engine_logging::{engine_debug, engine_info};
use wallpaper_core::{update, AppState, AppViewModel, Effect, Msg, SessionState};

use crate::effects::EffectRunner;

const EVENT_WAIT: Duration = Duration::from_millis(100);

/// Receives view snapshots whenever the session state changes.
pub trait Reporter {
    fn render(&mut self, view: &AppViewModel);

    fn finish(&mut self, _view: &AppViewModel) {}
}

/// Reporter that discards everything.
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn render(&mut self, _view: &AppViewModel) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    /// Export canvas; `None` skips the export step.
    pub export: Option<(u32, u32)>,
    /// Cancel the prediction if it has not finished by then.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub job_id: String,
    pub output_url: String,
    pub exported: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("{0}")]
    Rejected(String),
    #[error("prediction failed: {0}")]
    Failed(String),
    #[error("export failed: {0}")]
    Export(String),
}

/// Run a prediction to completion, then export it if requested.
pub fn run_generate(
    runner: &EffectRunner,
    request: &GenerateRequest,
    reporter: &mut dyn Reporter,
) -> Result<GenerateOutcome, SessionError> {
    let mut driver = Driver {
        runner,
        reporter,
        state: AppState::new(),
    };

    driver.dispatch(Msg::PromptChanged(request.prompt.clone()));
    driver.dispatch(Msg::CanvasSizeChanged {
        width: request.width,
        height: request.height,
    });
    if driver.dispatch(Msg::SubmitClicked).is_empty() {
        let view = driver.state.view();
        return Err(SessionError::Rejected(
            view.error.unwrap_or_else(|| "submission refused".into()),
        ));
    }

    let deadline = request.timeout.map(|t| Instant::now() + t);
    let mut cancel_sent = false;
    while driver.state.session().is_active() {
        if !cancel_sent && deadline.is_some_and(|d| Instant::now() >= d) {
            engine_info!("Prediction timed out; cancelling");
            driver.dispatch(Msg::CancelClicked);
            cancel_sent = true;
        }
        driver.pump();
    }

    let view = driver.state.view();
    driver.reporter.finish(&view);
    if view.session != SessionState::Succeeded {
        return Err(SessionError::Failed(
            view.error.unwrap_or_else(|| "unknown error".into()),
        ));
    }
    let (Some(job_id), Some(output_url)) = (view.job_id, view.output_url) else {
        return Err(SessionError::Failed("prediction returned no output".into()));
    };

    let exported = match request.export {
        Some((width, height)) => Some(driver.export(width, height)?),
        None => None,
    };

    Ok(GenerateOutcome {
        job_id,
        output_url,
        exported,
    })
}

struct Driver<'a> {
    runner: &'a EffectRunner,
    reporter: &'a mut dyn Reporter,
    state: AppState,
}

impl Driver<'_> {
    fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        engine_debug!("dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        if self.state.consume_dirty() {
            self.reporter.render(&self.state.view());
        }
        self.runner.enqueue(effects.clone());
        effects
    }

    fn pump(&mut self) {
        let msg = self.runner.next_msg(EVENT_WAIT).unwrap_or(Msg::Tick);
        self.dispatch(msg);
    }

    fn export(&mut self, width: u32, height: u32) -> Result<PathBuf, SessionError> {
        let before = self.state.view().exports.len();
        if self.dispatch(Msg::ExportClicked { width, height }).is_empty() {
            let view = self.state.view();
            return Err(SessionError::Export(
                view.error.unwrap_or_else(|| "export refused".into()),
            ));
        }
        while self.state.is_export_in_flight() {
            self.pump();
        }

        let view = self.state.view();
        match view.exports.get(before) {
            Some(record) => Ok(self.runner.output_dir().join(&record.filename)),
            None => Err(SessionError::Export(
                view.error.unwrap_or_else(|| "unknown error".into()),
            )),
        }
    }
}
