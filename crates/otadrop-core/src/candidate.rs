use std::path::PathBuf;

pub const DEFAULT_PACKAGE_PREFIX: &str = "delta-sdcard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCandidate {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    Qualifying,
    SkippedModel,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateNaming {
    prefix: String,
    model_token: String,
}

impl CandidateNaming {
    pub fn new(prefix: impl Into<String>, model_token: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            model_token: model_token.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn model_token(&self) -> &str {
        &self.model_token
    }

    // Prefix must lead the name; the model token may appear anywhere after
    // it. An empty model token disables the model filter entirely.
    pub fn classify(&self, file_name: &str) -> NameMatch {
        if !file_name.starts_with(&self.prefix) {
            return NameMatch::Ignored;
        }
        if self.model_token.is_empty() || file_name.contains(&self.model_token) {
            return NameMatch::Qualifying;
        }
        NameMatch::SkippedModel
    }
}
