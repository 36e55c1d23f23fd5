//! # VHS Chain
//!
//! Recreates the look of a worn VHS tape with interlace stripes, grain, chromatic
//! aberration, tape scratches and a punchy color grade. Each effect is its own
//! stage so it can be tested and reused on its own; [`VhsChain`] runs them in order.

mod aberration;
mod chain;
mod grade;
mod interlace;
mod noise;
mod scratches;

pub use aberration::AberrationStage;
pub use chain::{ChainOutcome, VhsChain};
pub use grade::GradeStage;
pub use interlace::InterlaceStage;
pub use noise::NoiseStage;
pub use scratches::ScratchStage;

// VHS-specific parameter names, matching the configuration keys
pub const INTERLACE_LINE_HEIGHT: &str = "interlace.line_height";
pub const INTERLACE_SPACING: &str = "interlace.spacing";
pub const INTERLACE_OPACITY: &str = "interlace.opacity";
pub const NOISE_INTENSITY: &str = "noise.intensity";
pub const NOISE_BRIGHTNESS: &str = "noise.brightness";
pub const ABERRATION_DISPLACEMENT: &str = "aberration.displacement";
pub const SCRATCH_SPACING: &str = "scratches.pixels_per_scratch";
pub const SCRATCH_OPACITY: &str = "scratches.opacity";
pub const GRADE_SATURATION: &str = "grade.saturation";
pub const GRADE_BRIGHTNESS: &str = "grade.brightness";
pub const GRADE_CONTRAST: &str = "grade.contrast";
