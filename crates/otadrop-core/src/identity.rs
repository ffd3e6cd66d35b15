pub const VERSION_MARKER_DELIMITER: char = '.';

pub const BUILD_VERSION_ENV: &str = "OTADROP_BUILD_VERSION";
pub const DEVICE_MODEL_ENV: &str = "OTADROP_DEVICE_MODEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub build_version: String,
    pub model: String,
}

impl DeviceIdentity {
    pub fn new(build_version: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            build_version: build_version.into(),
            model: model.into(),
        }
    }

    pub fn from_env() -> Self {
        Self {
            build_version: std::env::var(BUILD_VERSION_ENV).unwrap_or_default(),
            model: std::env::var(DEVICE_MODEL_ENV).unwrap_or_default(),
        }
    }

    // The marker is wrapped with the delimiter on both sides so that a
    // version that is a prefix of another version ("1" vs "12") cannot
    // match the wrong package name. None when the running version is
    // unknown; the gate then fails open.
    pub fn wrapped_version_marker(&self) -> Option<String> {
        if self.build_version.is_empty() {
            return None;
        }
        Some(format!(
            "{}{}{}",
            VERSION_MARKER_DELIMITER, self.build_version, VERSION_MARKER_DELIMITER
        ))
    }

    pub fn is_already_applied(&self, candidate_name: &str) -> bool {
        match self.wrapped_version_marker() {
            Some(marker) => candidate_name.contains(&marker),
            None => false,
        }
    }
}
