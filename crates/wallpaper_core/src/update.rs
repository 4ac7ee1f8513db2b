use crate::{AppState, Effect, ExportRecord, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PromptChanged(prompt) => {
            state.set_prompt(prompt);
            Vec::new()
        }
        Msg::CanvasSizeChanged { width, height } => {
            if width == 0 || height == 0 {
                state.reject_size(width, height);
            } else {
                state.set_size(width, height);
            }
            Vec::new()
        }
        Msg::SubmitClicked => {
            // Single active job per session.
            if state.session().is_active() {
                return (state, Vec::new());
            }
            if let Some((width, height)) = state.rejected_size() {
                state.reject_size(width, height);
                return (state, Vec::new());
            }
            let prompt = state.prompt().trim().to_string();
            if prompt.is_empty() {
                state.set_error(Some("Please enter a prompt".into()));
                return (state, Vec::new());
            }
            let (width, height) = state.size();
            state.begin_submit(prompt.clone());
            vec![Effect::SubmitPrediction {
                prompt,
                width,
                height,
            }]
        }
        Msg::JobUpdated { job, progress } => {
            state.apply_job(job, progress);
            Vec::new()
        }
        Msg::RequestFailed { detail } => {
            state.fail_request(detail);
            Vec::new()
        }
        Msg::ExportClicked { width, height } => export_effects(&mut state, width, height),
        Msg::ExportFinished { result } => {
            state.finish_export(result);
            Vec::new()
        }
        Msg::CancelClicked => {
            if state.session().is_active() {
                vec![Effect::CancelJob]
            } else {
                Vec::new()
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn export_effects(state: &mut AppState, width: u32, height: u32) -> Vec<Effect> {
    if state.is_export_in_flight() {
        return Vec::new();
    }
    if width == 0 || height == 0 {
        state.set_error(Some(format!("Invalid export size {width}x{height}")));
        return Vec::new();
    }
    let Some((job_id, source_url)) = ready_output(state) else {
        state.set_error(Some("Nothing to export yet".into()));
        return Vec::new();
    };
    if !is_fetchable(&source_url) {
        state.set_error(Some(format!("Output is not a downloadable URL: {source_url}")));
        return Vec::new();
    }
    let prompt = state
        .submitted_prompt()
        .unwrap_or_else(|| state.prompt())
        .to_string();
    state.begin_export();
    vec![Effect::ExportWallpaper {
        source_url,
        width,
        height,
        prompt,
        job_id: Some(job_id),
    }]
}

fn ready_output(state: &AppState) -> Option<(String, String)> {
    if state.session() != crate::SessionState::Succeeded {
        return None;
    }
    let job = state.job()?;
    Some((job.id.clone(), job.output_url.clone()?))
}

fn is_fetchable(raw: &str) -> bool {
    url::Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Record describing a finished export, for [`Msg::ExportFinished`].
pub fn export_record(
    filename: impl Into<String>,
    width: u32,
    height: u32,
    bytes: u64,
) -> ExportRecord {
    ExportRecord {
        filename: filename.into(),
        width,
        height,
        bytes,
    }
}
