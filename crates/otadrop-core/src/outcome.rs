use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineOutcome {
    NoCandidateFound,
    AlreadyUpgraded,
    StagingFailed,
    VerificationFailed,
    InstallFailed,
    InstallInvoked,
}

impl PipelineOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoCandidateFound => "no-candidate-found",
            Self::AlreadyUpgraded => "already-upgraded",
            Self::StagingFailed => "staging-failed",
            Self::VerificationFailed => "verification-failed",
            Self::InstallFailed => "install-failed",
            Self::InstallInvoked => "install-invoked",
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::StagingFailed | Self::VerificationFailed | Self::InstallFailed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum StatusEvent {
    ScanStarted { source_dir: String },
    SourceUnavailable { detail: String },
    CandidateSkipped { name: String },
    CandidateSelected { name: String, size_bytes: u64 },
    NoCandidate { detail: String },
    MissingVersionMarker,
    AlreadyUpgraded { name: String },
    StagingStarted { from: String, to: String },
    StaleStagedRemoved { path: String },
    StagingFinished { path: String, size_bytes: u64 },
    StagingFailed { detail: String },
    VerificationStarted { path: String },
    VerificationPassed { path: String },
    VerificationRejected { reason: String },
    InstallHandoff { path: String },
    InstallInvoked { path: String },
    InstallFailed { detail: String },
}

impl StatusEvent {
    pub fn message(&self) -> String {
        match self {
            Self::ScanStarted { source_dir } => {
                format!("scanning {source_dir} for update packages")
            }
            Self::SourceUnavailable { detail } => {
                format!("update source unavailable: {detail}")
            }
            Self::CandidateSkipped { name } => {
                format!("skipping {name}: built for a different device model")
            }
            Self::CandidateSelected { name, size_bytes } => {
                format!("selected update package {name} ({size_bytes} bytes)")
            }
            Self::NoCandidate { detail } => format!("no update package found: {detail}"),
            Self::MissingVersionMarker => {
                "running build version is unknown; assuming the update is not applied".to_string()
            }
            Self::AlreadyUpgraded { name } => {
                format!("device already carries the update in {name}")
            }
            Self::StagingStarted { from, to } => format!("copying {from} to {to}"),
            Self::StaleStagedRemoved { path } => {
                format!("removed stale staged package {path}")
            }
            Self::StagingFinished { path, size_bytes } => {
                format!("staged {path} ({size_bytes} bytes)")
            }
            Self::StagingFailed { detail } => format!("staging failed: {detail}"),
            Self::VerificationStarted { path } => format!("verifying {path}"),
            Self::VerificationPassed { path } => format!("package verification passed: {path}"),
            Self::VerificationRejected { reason } => {
                format!("package verification rejected: {reason}")
            }
            Self::InstallHandoff { path } => format!("handing {path} to the platform installer"),
            Self::InstallInvoked { path } => {
                format!("install invoked for {path}; the platform applies it asynchronously")
            }
            Self::InstallFailed { detail } => format!("install failed: {detail}"),
        }
    }
}

pub trait StatusSink {
    fn record(&mut self, event: StatusEvent);
}

#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<StatusEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[StatusEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<StatusEvent> {
        self.events
    }
}

impl StatusSink for EventLog {
    fn record(&mut self, event: StatusEvent) {
        self.events.push(event);
    }
}
