use crate::{AppState, JobId, Progress, SessionState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub job_id: Option<JobId>,
    /// `status: <remote status>` once a job exists, empty otherwise.
    pub status_line: String,
    pub progress_label: Option<String>,
    pub output_url: Option<String>,
    pub error: Option<String>,
    pub warning: Option<String>,
    pub can_submit: bool,
    pub can_export: bool,
    pub exports: Vec<ExportRecord>,
    pub dirty: bool,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState) -> Self {
        let job = state.job.as_ref();
        let status_line = match (state.session, job) {
            (_, Some(job)) => format!("status: {}", job.status.label()),
            (SessionState::Submitting, None) => "status: submitting".to_string(),
            _ => String::new(),
        };
        let progress_label = if state.session.is_active() {
            progress_label(state.progress)
        } else {
            None
        };
        let output_url = job.and_then(|j| j.output_url.clone());

        Self {
            session: state.session,
            prompt: state.prompt.clone(),
            width: state.width,
            height: state.height,
            job_id: job.map(|j| j.id.clone()),
            status_line,
            progress_label,
            can_submit: !state.session.is_active()
                && !state.prompt.trim().is_empty()
                && state.rejected_size.is_none(),
            can_export: state.session == SessionState::Succeeded
                && output_url.is_some()
                && !state.export_in_flight,
            output_url,
            error: state.error.clone(),
            warning: state.warning.clone(),
            exports: state.exports.clone(),
            dirty: state.dirty,
        }
    }
}

fn progress_label(progress: Progress) -> Option<String> {
    match progress {
        Progress::Booting => Some("booting".to_string()),
        Progress::Running => Some("running".to_string()),
        Progress::Percent(p) => Some(format!("{p}%")),
        Progress::Flagged => None,
    }
}
