use crate::view_model::{AppViewModel, ExportRecord};

pub type JobId = String;

/// Default generation size requested from the model.
pub const DEFAULT_GENERATION_EDGE: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Submitting,
    Polling,
    Succeeded,
    Failed,
}

impl SessionState {
    /// A job is in flight; new submissions are refused.
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Submitting | SessionState::Polling)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Canceled
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Starting => "starting",
            JobStatus::Processing => "processing",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
            JobStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Progress {
    #[default]
    Booting,
    Running,
    Percent(u8),
    Flagged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub id: JobId,
    pub status: JobStatus,
    pub output_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) prompt: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rejected_size: Option<(u32, u32)>,
    pub(crate) session: SessionState,
    pub(crate) submitted_prompt: Option<String>,
    pub(crate) job: Option<JobSnapshot>,
    pub(crate) progress: Progress,
    pub(crate) error: Option<String>,
    pub(crate) warning: Option<String>,
    pub(crate) export_in_flight: bool,
    pub(crate) exports: Vec<ExportRecord>,
    pub(crate) dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            width: DEFAULT_GENERATION_EDGE,
            height: DEFAULT_GENERATION_EDGE,
            rejected_size: None,
            session: SessionState::Idle,
            submitted_prompt: None,
            job: None,
            progress: Progress::Booting,
            error: None,
            warning: None,
            export_in_flight: false,
            exports: Vec::new(),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Last size request that was refused; submission stays blocked until a valid size arrives.
    pub fn rejected_size(&self) -> Option<(u32, u32)> {
        self.rejected_size
    }

    pub fn job(&self) -> Option<&JobSnapshot> {
        self.job.as_ref()
    }

    pub fn submitted_prompt(&self) -> Option<&str> {
        self.submitted_prompt.as_deref()
    }

    pub fn is_export_in_flight(&self) -> bool {
        self.export_in_flight
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self)
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_prompt(&mut self, prompt: String) {
        self.prompt = prompt;
        self.mark_dirty();
    }

    pub(crate) fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.rejected_size = None;
        self.mark_dirty();
    }

    pub(crate) fn reject_size(&mut self, width: u32, height: u32) {
        self.rejected_size = Some((width, height));
        self.error = Some(invalid_size_message(width, height));
        self.mark_dirty();
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        self.error = error;
        self.mark_dirty();
    }

    pub(crate) fn begin_submit(&mut self, prompt: String) {
        self.session = SessionState::Submitting;
        self.submitted_prompt = Some(prompt);
        self.job = None;
        self.progress = Progress::Booting;
        self.error = None;
        self.warning = None;
        self.mark_dirty();
    }

    /// Applies a job snapshot. Returns false when the snapshot was stale and dropped.
    pub(crate) fn apply_job(&mut self, job: JobSnapshot, progress: Progress) -> bool {
        if !self.session.is_active() {
            return false;
        }
        if let Some(current) = &self.job {
            if current.id != job.id {
                return false;
            }
        }

        self.progress = progress;
        if progress == Progress::Flagged {
            self.warning = Some(
                "The prompt was flagged by content moderation. Try a different prompt.".into(),
            );
        }
        self.session = match job.status {
            JobStatus::Succeeded if job.output_url.is_some() => SessionState::Succeeded,
            JobStatus::Succeeded => {
                self.error = Some("The model finished without producing an image.".into());
                SessionState::Failed
            }
            JobStatus::Failed | JobStatus::Canceled => {
                self.error = Some(
                    job.error
                        .clone()
                        .unwrap_or_else(|| format!("Prediction {}", job.status.label())),
                );
                SessionState::Failed
            }
            JobStatus::Starting | JobStatus::Processing | JobStatus::Unknown => {
                SessionState::Polling
            }
        };
        self.job = Some(job);
        self.mark_dirty();
        true
    }

    pub(crate) fn fail_request(&mut self, detail: String) -> bool {
        if !self.session.is_active() {
            return false;
        }
        self.session = SessionState::Failed;
        self.error = Some(detail);
        self.mark_dirty();
        true
    }

    pub(crate) fn begin_export(&mut self) {
        self.export_in_flight = true;
        self.error = None;
        self.mark_dirty();
    }

    pub(crate) fn finish_export(&mut self, result: Result<ExportRecord, String>) {
        self.export_in_flight = false;
        match result {
            Ok(record) => self.exports.push(record),
            Err(detail) => self.error = Some(detail),
        }
        self.mark_dirty();
    }
}

pub(crate) fn invalid_size_message(width: u32, height: u32) -> String {
    format!("Invalid size {width}x{height}")
}
