//! Terminal progress for the `generate` command

use std::sync::LazyLock;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use wallpaper_core::{AppViewModel, SessionState};

use crate::session::Reporter;

static SPINNER_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

static PERCENT_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Spinner while the model boots, switching to a bar once percentages appear.
pub struct TerminalReporter {
    bar: ProgressBar,
    showing_percent: bool,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(SPINNER_STYLE.clone());
        bar.enable_steady_tick(Duration::from_millis(120));
        Self {
            bar,
            showing_percent: false,
        }
    }
}

impl Reporter for TerminalReporter {
    fn render(&mut self, view: &AppViewModel) {
        let percent = view
            .progress_label
            .as_deref()
            .and_then(|label| label.strip_suffix('%'))
            .and_then(|digits| digits.parse::<u64>().ok());

        let mut message = view.status_line.clone();
        match percent {
            Some(value) => {
                if !self.showing_percent {
                    self.bar.set_length(100);
                    self.bar.set_style(PERCENT_STYLE.clone());
                    self.showing_percent = true;
                }
                self.bar.set_position(value);
            }
            None => {
                if let Some(label) = &view.progress_label {
                    message.push_str(" (");
                    message.push_str(label);
                    message.push(')');
                }
            }
        }
        if let Some(warning) = &view.warning {
            message.push_str(" | ");
            message.push_str(warning);
        }
        self.bar.set_message(message);
    }

    fn finish(&mut self, view: &AppViewModel) {
        let message = match view.session {
            SessionState::Succeeded => "done".to_string(),
            _ => view.error.clone().unwrap_or_else(|| view.status_line.clone()),
        };
        self.bar.finish_with_message(message);
    }
}
