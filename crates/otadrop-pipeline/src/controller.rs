use otadrop_core::{
    AgentConfig, CandidateNaming, DeviceIdentity, PipelineOutcome, StatusEvent, StatusSink,
};
use otadrop_installer::{stage_candidate, StagingLayout};
use otadrop_platform::{InstallSurface, Verification};

use crate::locate::locate_candidate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineContext {
    pub config: AgentConfig,
    pub identity: DeviceIdentity,
}

impl PipelineContext {
    pub fn new(config: AgentConfig, identity: DeviceIdentity) -> Self {
        Self { config, identity }
    }

    pub fn naming(&self) -> CandidateNaming {
        CandidateNaming::new(&self.config.package_prefix, &self.identity.model)
    }
}

// Single forward path, run to completion: every stage failure is converted
// to a terminal outcome here instead of propagating an error to the caller.
pub fn run_pipeline(
    ctx: &PipelineContext,
    surface: &dyn InstallSurface,
    sink: &mut dyn StatusSink,
) -> PipelineOutcome {
    let Some(candidate) = locate_candidate(&ctx.config.source_dir, &ctx.naming(), sink) else {
        return PipelineOutcome::NoCandidateFound;
    };

    if ctx.identity.wrapped_version_marker().is_none() {
        sink.record(StatusEvent::MissingVersionMarker);
    }
    if ctx.identity.is_already_applied(&candidate.name) {
        sink.record(StatusEvent::AlreadyUpgraded {
            name: candidate.name.clone(),
        });
        return PipelineOutcome::AlreadyUpgraded;
    }

    let layout = StagingLayout::new(&ctx.config.staging_dir);
    sink.record(StatusEvent::StagingStarted {
        from: candidate.path.display().to_string(),
        to: layout.staged_path(&candidate.name).display().to_string(),
    });
    let staged = match stage_candidate(&layout, &candidate) {
        Ok(report) => {
            if report.replaced_stale {
                sink.record(StatusEvent::StaleStagedRemoved {
                    path: report.package.path.display().to_string(),
                });
            }
            sink.record(StatusEvent::StagingFinished {
                path: report.package.path.display().to_string(),
                size_bytes: report.package.source.size_bytes,
            });
            report.package
        }
        Err(err) => {
            sink.record(StatusEvent::StagingFailed {
                detail: format!("{err:#}"),
            });
            return PipelineOutcome::StagingFailed;
        }
    };

    sink.record(StatusEvent::VerificationStarted {
        path: staged.path.display().to_string(),
    });
    match surface.verify(&staged.path) {
        Ok(Verification::Trusted) => {
            sink.record(StatusEvent::VerificationPassed {
                path: staged.path.display().to_string(),
            });
        }
        Ok(Verification::Rejected { reason }) => {
            sink.record(StatusEvent::VerificationRejected { reason });
            return PipelineOutcome::VerificationFailed;
        }
        Err(err) => {
            sink.record(StatusEvent::InstallFailed {
                detail: format!("{err:#}"),
            });
            return PipelineOutcome::InstallFailed;
        }
    }

    sink.record(StatusEvent::InstallHandoff {
        path: staged.path.display().to_string(),
    });
    match surface.install(&staged.path) {
        Ok(()) => {
            sink.record(StatusEvent::InstallInvoked {
                path: staged.path.display().to_string(),
            });
            PipelineOutcome::InstallInvoked
        }
        Err(err) => {
            sink.record(StatusEvent::InstallFailed {
                detail: format!("{err:#}"),
            });
            PipelineOutcome::InstallFailed
        }
    }
}
