mod copier;
mod layout;

pub use copier::{stage_candidate, StagedPackage, StagingReport};
pub use layout::StagingLayout;
