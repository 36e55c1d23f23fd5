use std::sync::Arc;

use crate::{
    config::ScratchConfig,
    error::Result,
    filters::{
        context::RenderContext,
        entropy::{EntropySource, ThreadEntropy},
        traits::{Stage, StageKind, StageMetadata},
    },
    video::types::Frame,
};

use super::{SCRATCH_OPACITY, SCRATCH_SPACING};

/// Faint full-height vertical lines at random columns
pub struct ScratchStage {
    pixels_per_scratch: u32,
    opacity: f32,
    source: Arc<dyn EntropySource>,
}

impl ScratchStage {
    pub fn new() -> Self {
        Self::from_config(&ScratchConfig::default(), Arc::new(ThreadEntropy))
    }

    pub fn from_config(config: &ScratchConfig, source: Arc<dyn EntropySource>) -> Self {
        Self {
            pixels_per_scratch: config.pixels_per_scratch.max(1),
            opacity: config.opacity,
            source,
        }
    }

    /// Number of scratches drawn on a frame of this width
    pub fn scratch_count(&self, width: u32) -> usize {
        (width / self.pixels_per_scratch) as usize
    }

    /// Pick random columns for this frame
    pub fn scratch_columns(&self, width: u32) -> Result<Vec<u32>> {
        let count = self.scratch_count(width);
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut bytes = vec![0u8; count * 4];
        self.source.fill_bytes(&mut bytes)?;

        Ok(bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) % width)
            .collect())
    }
}

impl Default for ScratchStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for ScratchStage {
    fn name(&self) -> &str {
        "tape_scratches"
    }

    fn description(&self) -> &str {
        "Random faint white vertical scratches across the full frame height"
    }

    fn apply(&self, frame: &Frame, ctx: &RenderContext) -> Result<Frame> {
        let (width, height) = frame.extent();
        let columns = self.scratch_columns(width)?;
        if columns.is_empty() {
            return Ok(frame.clone());
        }

        let overlay = ctx.rasterize(width, height, |pen| {
            pen.set_stroke_color([255, 255, 255], self.opacity);
            pen.set_line_width(1);
            for &x in &columns {
                pen.stroke_vertical_line(x);
            }
        })?;

        ctx.composite_over(&overlay, frame)
    }

    fn metadata(&self) -> StageMetadata {
        StageMetadata {
            kind: StageKind::ProceduralOverlay,
            deterministic: false,
            parameters: vec![
                (SCRATCH_SPACING.to_string(), "One scratch per this many pixels of width".to_string()),
                (SCRATCH_OPACITY.to_string(), "Scratch opacity (0.0-1.0)".to_string()),
            ],
        }
    }
}
