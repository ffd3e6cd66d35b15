mod candidate;
mod config;
mod identity;
mod outcome;

pub use candidate::{CandidateNaming, NameMatch, UpdateCandidate, DEFAULT_PACKAGE_PREFIX};
pub use config::{AgentConfig, DeviceOverrides, PlatformConfig};
pub use identity::{DeviceIdentity, BUILD_VERSION_ENV, DEVICE_MODEL_ENV, VERSION_MARKER_DELIMITER};
pub use outcome::{EventLog, PipelineOutcome, StatusEvent, StatusSink};

#[cfg(test)]
mod tests;
