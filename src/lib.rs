//! # VHS-Camera
//!
//! Real-time VHS-style filters for a camera's live preview, recordings and stills.
//!
//! Every frame goes through one [`FilterPipeline`]: either the five-stage VHS
//! chain (interlace, grain, chromatic aberration, scratches, color grade) or one
//! of the single-stage presets. The live lane and the still lane share the same
//! pipeline, so the preview always shows exactly what gets recorded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vhs_camera::{Config, FilterPipeline, Frame};
//!
//! # fn main() -> vhs_camera::Result<()> {
//! let pipeline = FilterPipeline::new(&Config::default())?;
//!
//! let raw = Frame::new_filled(1280, 720, [90, 120, 160]);
//! let vhs = pipeline.process_frame(&raw, "VHS");
//! let sepia = pipeline.process_still(&raw, "Vintage");
//!
//! vhs.save_png("vhs.png")?;
//! sepia.save_png("vintage.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`filters`] - Filter stages, presets and the render context
//! - [`pipeline`] - Pipeline orchestrator, filter selector and capture lanes
//! - [`video`] - Frame buffers and source/sink interfaces
//! - [`config`] - Configuration management
//!
//! ## Live Capture
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vhs_camera::{Config, FilterPipeline, FilterSelector, LiveLane, TimedFrame};
//!
//! # #[tokio::main]
//! # async fn main() -> vhs_camera::Result<()> {
//! let pipeline = Arc::new(FilterPipeline::new(&Config::default())?);
//! let selector = Arc::new(FilterSelector::default());
//!
//! let preview = |frame: &TimedFrame| -> vhs_camera::Result<()> {
//!     // Hand the frame to the display
//!     Ok(())
//! };
//! let lane = LiveLane::spawn(pipeline, selector, Box::new(preview), 1);
//!
//! // From the camera callback; never blocks
//! # let frame = TimedFrame::new(vhs_camera::Frame::new_filled(4, 4, [0, 0, 0]), Default::default());
//! lane.offer(frame);
//!
//! let report = lane.shutdown().await?;
//! println!("dropped {} frames", report.stats.dropped);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod filters;
pub mod pipeline;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{Result, VhsError},
    filters::{FilterMode, FilterRegistry, Preset, Stage},
    pipeline::{FilterPipeline, FilterSelector, LiveLane, StillLane},
    video::{Frame, FrameSink, FrameSource, StillSink, TimedFrame},
};
