use std::sync::Once;

use pretty_assertions::assert_eq;
use wallpaper_core::{update, AppState, Effect, JobSnapshot, JobStatus, Msg, Progress, SessionState};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn submit_prompt(state: AppState, prompt: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::PromptChanged(prompt.to_string()));
    update(state, Msg::SubmitClicked)
}

fn job(id: &str, status: JobStatus) -> JobSnapshot {
    JobSnapshot {
        id: id.to_string(),
        status,
        output_url: None,
        error: None,
    }
}

#[test]
fn submit_trims_prompt_and_emits_effect() {
    init_logging();
    let (state, effects) = submit_prompt(AppState::new(), "  ukiyo-e clouds \n");

    assert_eq!(
        effects,
        vec![Effect::SubmitPrediction {
            prompt: "ukiyo-e clouds".to_string(),
            width: 512,
            height: 512,
        }]
    );
    let view = state.view();
    assert_eq!(view.session, SessionState::Submitting);
    assert_eq!(view.status_line, "status: submitting");
    assert_eq!(view.progress_label.as_deref(), Some("booting"));
    assert!(!view.can_submit);
    assert!(view.dirty);
}

#[test]
fn empty_prompt_sets_validation_error() {
    init_logging();
    let (mut state, effects) = submit_prompt(AppState::new(), "   ");

    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Idle);
    assert_eq!(state.view().error.as_deref(), Some("Please enter a prompt"));
    assert!(state.consume_dirty());
}

#[test]
fn canvas_size_is_used_for_submission() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::CanvasSizeChanged {
            width: 768,
            height: 256,
        },
    );
    let (_state, effects) = submit_prompt(state, "lunar surface");

    assert_eq!(
        effects,
        vec![Effect::SubmitPrediction {
            prompt: "lunar surface".to_string(),
            width: 768,
            height: 256,
        }]
    );
}

#[test]
fn zero_canvas_size_is_rejected() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::CanvasSizeChanged {
            width: 0,
            height: 256,
        },
    );

    assert_eq!(state.size(), (512, 512));
    assert!(state.view().error.is_some());
}

#[test]
fn submit_is_refused_while_requested_size_is_invalid() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::CanvasSizeChanged {
            width: 0,
            height: 256,
        },
    );

    let (state, effects) = submit_prompt(state, "cobblestones");

    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Idle);
    assert_eq!(state.view().error.as_deref(), Some("Invalid size 0x256"));
    assert!(!state.view().can_submit);

    let (state, _) = update(
        state,
        Msg::CanvasSizeChanged {
            width: 768,
            height: 256,
        },
    );
    let (_, effects) = update(state, Msg::SubmitClicked);
    assert_eq!(
        effects,
        vec![Effect::SubmitPrediction {
            prompt: "cobblestones".into(),
            width: 768,
            height: 256,
        }]
    );
}

#[test]
fn second_submit_while_polling_is_ignored() {
    init_logging();
    let (state, _) = submit_prompt(AppState::new(), "tree bark");
    let (state, _) = update(
        state,
        Msg::JobUpdated {
            job: job("abc", JobStatus::Starting),
            progress: Progress::Booting,
        },
    );
    let (state, effects) = update(state, Msg::SubmitClicked);

    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Polling);
}

#[test]
fn cancel_only_emits_while_active() {
    init_logging();
    let (_, effects) = update(AppState::new(), Msg::CancelClicked);
    assert!(effects.is_empty());

    let (state, _) = submit_prompt(AppState::new(), "tree bark");
    let (state, effects) = update(state, Msg::CancelClicked);
    assert_eq!(effects, vec![Effect::CancelJob]);

    let (state, _) = update(
        state,
        Msg::RequestFailed {
            detail: "cancelled".to_string(),
        },
    );
    assert_eq!(state.session(), SessionState::Failed);
    assert!(state.view().can_submit);
}

#[test]
fn request_failure_surfaces_detail() {
    init_logging();
    let (state, _) = submit_prompt(AppState::new(), "tree bark");
    let (state, _) = update(
        state,
        Msg::RequestFailed {
            detail: "Billing required".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.session, SessionState::Failed);
    assert_eq!(view.error.as_deref(), Some("Billing required"));
    assert_eq!(view.progress_label, None);
}

#[test]
fn request_failure_when_idle_is_ignored() {
    init_logging();
    let (mut state, _) = update(
        AppState::new(),
        Msg::RequestFailed {
            detail: "late".to_string(),
        },
    );

    assert_eq!(state.session(), SessionState::Idle);
    assert!(!state.consume_dirty());
}
