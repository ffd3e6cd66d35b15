use std::io::IsTerminal;
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{ProgressBar, ProgressStyle};
use otadrop_core::{StatusEvent, StatusSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    if std::env::var_os("NO_COLOR").is_some() {
        return OutputStyle::Plain;
    }
    if std::io::stdout().is_terminal() {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("[{}] {}", status.to_ascii_uppercase(), message),
    }
}

pub(crate) fn render_section_header(style: OutputStyle, title: &str) -> Option<String> {
    match style {
        OutputStyle::Plain => None,
        OutputStyle::Rich => Some(colorize(section_style(), &format!("== {title} =="))),
    }
}

pub(crate) fn event_status(event: &StatusEvent) -> &'static str {
    match event {
        StatusEvent::ScanStarted { .. }
        | StatusEvent::StagingStarted { .. }
        | StatusEvent::StaleStagedRemoved { .. }
        | StatusEvent::VerificationStarted { .. }
        | StatusEvent::InstallHandoff { .. } => "step",
        StatusEvent::CandidateSkipped { .. } => "skip",
        StatusEvent::NoCandidate { .. } => "..",
        StatusEvent::MissingVersionMarker => "warn",
        StatusEvent::CandidateSelected { .. }
        | StatusEvent::AlreadyUpgraded { .. }
        | StatusEvent::StagingFinished { .. }
        | StatusEvent::VerificationPassed { .. }
        | StatusEvent::InstallInvoked { .. } => "ok",
        StatusEvent::SourceUnavailable { .. }
        | StatusEvent::StagingFailed { .. }
        | StatusEvent::VerificationRejected { .. }
        | StatusEvent::InstallFailed { .. } => "err",
    }
}

// Prints one line per pipeline event and keeps a spinner alive while the
// blocking staging copy runs.
pub(crate) struct TerminalSink {
    style: OutputStyle,
    spinner: Option<ProgressBar>,
}

impl TerminalSink {
    pub(crate) fn new(style: OutputStyle) -> Self {
        Self {
            style,
            spinner: None,
        }
    }

    fn start_spinner(&mut self, label: &str) {
        if self.style != OutputStyle::Rich {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}") {
            spinner.set_style(template.tick_chars(".oO@* "));
        }
        spinner.set_message(label.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    fn finish_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl StatusSink for TerminalSink {
    fn record(&mut self, event: StatusEvent) {
        self.finish_spinner();
        println!(
            "{}",
            render_status_line(self.style, event_status(&event), &event.message())
        );
        if matches!(event, StatusEvent::StagingStarted { .. }) {
            self.start_spinner("staging");
        }
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        self.finish_spinner();
    }
}

fn section_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn outcome_style(failure: bool) -> Style {
    let color = if failure {
        AnsiColor::BrightRed
    } else {
        AnsiColor::BrightGreen
    };
    Style::new().fg_color(Some(color.into())).effects(Effects::BOLD)
}

pub(crate) fn render_outcome_line(style: OutputStyle, outcome_str: &str, failure: bool) -> String {
    let message = format!("outcome: {outcome_str}");
    match style {
        OutputStyle::Plain => message,
        OutputStyle::Rich => colorize(outcome_style(failure), &message),
    }
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
