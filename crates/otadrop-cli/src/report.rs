use anyhow::{Context, Result};
use otadrop_core::{PipelineOutcome, StatusEvent};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct RunReport<'a> {
    pub(crate) outcome: PipelineOutcome,
    pub(crate) events: &'a [StatusEvent],
}

pub(crate) fn render_json_report(report: &RunReport<'_>) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize run report")
}
