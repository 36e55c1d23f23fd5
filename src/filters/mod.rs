//! # Filter Stage Library
//!
//! Independent, composable image transforms and the shared context they render with.
//!
//! ## Built-in Filters
//!
//! - **VHS**: interlace stripes, grain, chromatic aberration, tape scratches, color grade
//! - **Retro**, **1980s**, **Vintage**, **Noise**: single-stage presets
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vhs_camera::filters::{InterlaceStage, RenderContext, Stage};
//! use vhs_camera::video::Frame;
//!
//! # fn main() -> vhs_camera::Result<()> {
//! let ctx = RenderContext::new(4)?;
//! let frame = Frame::new_filled(640, 480, [128, 128, 128]);
//! let striped = InterlaceStage::new().apply(&frame, &ctx)?;
//! assert_eq!(striped.extent(), frame.extent());
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod context;
pub mod entropy;
pub mod presets;
pub mod registry;
pub mod traits;
pub mod vhs;

// Re-exports for convenience
pub use context::RenderContext;
pub use entropy::{EntropySource, SeededEntropy, ThreadEntropy};
pub use presets::Preset;
pub use registry::{FilterMode, FilterRegistry};
pub use traits::{apply_or_passthrough, Stage, StageKind, StageMetadata};
pub use vhs::{
    AberrationStage, ChainOutcome, GradeStage, InterlaceStage, NoiseStage, ScratchStage, VhsChain,
};
