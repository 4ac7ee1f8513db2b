//! Wallpaper core: pure session state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    AppState, JobId, JobSnapshot, JobStatus, Progress, SessionState, DEFAULT_GENERATION_EDGE,
};
pub use update::{export_record, update};
pub use view_model::{AppViewModel, ExportRecord};
