#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the prompt text.
    PromptChanged(String),
    /// User picked the generation size.
    CanvasSizeChanged { width: u32, height: u32 },
    /// User submitted the current prompt.
    SubmitClicked,
    /// Engine reported a fresh job snapshot (after submit or a poll).
    JobUpdated {
        job: crate::JobSnapshot,
        progress: crate::Progress,
    },
    /// Submit or poll failed at the transport level, or the loop was cancelled.
    RequestFailed { detail: String },
    /// User asked for a tiled download of the current result.
    ExportClicked { width: u32, height: u32 },
    /// Engine finished writing an export.
    ExportFinished {
        result: Result<crate::ExportRecord, String>,
    },
    /// User asked to stop polling.
    CancelClicked,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
