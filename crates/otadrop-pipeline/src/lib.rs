mod controller;
mod locate;

pub use controller::{run_pipeline, PipelineContext};
pub use locate::locate_candidate;
