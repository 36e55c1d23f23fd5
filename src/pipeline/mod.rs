//! # Filter Pipeline Orchestrator
//!
//! Runs the selected filter on every frame and feeds the preview, recording and
//! still paths from the same entry point.

pub mod engine;
pub mod lanes;
pub mod selector;

// Re-exports for convenience
pub use engine::FilterPipeline;
pub use lanes::{LaneReport, LaneStats, LiveLane, RecordingSummary, StillLane};
pub use selector::FilterSelector;
