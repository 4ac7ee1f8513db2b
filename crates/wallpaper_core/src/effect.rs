use crate::JobId;

/// IO requested by [`crate::update`]; executed outside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitPrediction {
        prompt: String,
        width: u32,
        height: u32,
    },
    ExportWallpaper {
        source_url: String,
        width: u32,
        height: u32,
        prompt: String,
        job_id: Option<JobId>,
    },
    CancelJob,
}
