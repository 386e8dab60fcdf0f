//! Reporting and artifact export pipeline.

pub mod artifacts;
pub mod export;
pub mod report;

pub use artifacts::{read_manifest, ArtifactManager, ArtifactPaths, SummaryRecord};
pub use export::export_run_with_report;
pub use report::render_summary;
