use tracing::warn;

use crate::{
    error::{FrameError, Result},
    filters::context::RenderContext,
    video::types::Frame,
};

/// Core trait that every filter stage implements
pub trait Stage: Send + Sync {
    /// Returns the unique name of this stage
    fn name(&self) -> &str;

    /// Returns a human-readable description of this stage
    fn description(&self) -> &str;

    /// Transform one frame into a new frame of the same extent
    ///
    /// # Arguments
    ///
    /// * `frame` - The input frame, left untouched
    /// * `ctx` - Shared rendering context for compositing and rasterization
    ///
    /// # Returns
    ///
    /// The transformed frame, or an error if the stage could not run. Callers in
    /// the pipeline never propagate that error; they keep the input instead.
    fn apply(&self, frame: &Frame, ctx: &RenderContext) -> Result<Frame>;

    /// Get stage capabilities and tunables
    fn metadata(&self) -> StageMetadata {
        StageMetadata::default()
    }
}

/// What a stage does to pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageKind {
    /// Rasterized layer composited over the frame
    CompositeOver,
    /// Pixel-wise color mapping
    #[default]
    ColorRemap,
    /// Pixels move; the result is re-cropped to the input extent
    GeometricShift,
    /// Randomly generated layer combined with the frame
    ProceduralOverlay,
}

/// Metadata about a stage's capabilities and characteristics
#[derive(Debug, Clone)]
pub struct StageMetadata {
    pub kind: StageKind,

    /// Same input always gives the same output
    pub deterministic: bool,

    /// Tunable parameters with descriptions
    pub parameters: Vec<(String, String)>,
}

impl Default for StageMetadata {
    fn default() -> Self {
        Self {
            kind: StageKind::default(),
            deterministic: true,
            parameters: Vec::new(),
        }
    }
}

/// Run a stage and verify it kept the input extent
pub fn try_apply(stage: &dyn Stage, frame: &Frame, ctx: &RenderContext) -> Result<Frame> {
    let out = stage.apply(frame, ctx)?;
    if out.extent() != frame.extent() {
        return Err(FrameError::ExtentMismatch {
            expected: frame.extent(),
            actual: out.extent(),
        }
        .into());
    }
    Ok(out)
}

/// Run a stage, keeping the input when the stage fails
pub fn apply_or_passthrough(stage: &dyn Stage, frame: &Frame, ctx: &RenderContext) -> Frame {
    match try_apply(stage, frame, ctx) {
        Ok(out) => out,
        Err(e) => {
            warn!("Stage '{}' failed, passing frame through: {}", stage.name(), e);
            frame.clone()
        }
    }
}
