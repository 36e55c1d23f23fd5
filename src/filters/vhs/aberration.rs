use crate::{
    config::AberrationConfig,
    error::Result,
    filters::{
        context::RenderContext,
        traits::{Stage, StageKind, StageMetadata},
    },
    video::types::Frame,
};

use super::ABERRATION_DISPLACEMENT;

/// Splits the frame into R, G and B layers and pulls red and blue apart
pub struct AberrationStage {
    displacement: u32,
}

impl AberrationStage {
    pub fn new() -> Self {
        Self::from_config(&AberrationConfig::default())
    }

    pub fn from_config(config: &AberrationConfig) -> Self {
        Self {
            displacement: config.displacement,
        }
    }

    pub fn displacement(&self) -> u32 {
        self.displacement
    }
}

impl Default for AberrationStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep one channel, zero the other two, force opaque alpha
fn isolate(ctx: &RenderContext, frame: &Frame, channel: usize) -> Frame {
    ctx.map_pixels(frame, move |px| {
        let mut out = [0, 0, 0, 255];
        out[channel] = px[channel];
        out
    })
}

impl Stage for AberrationStage {
    fn name(&self) -> &str {
        "chromatic_aberration"
    }

    fn description(&self) -> &str {
        "Red shifted left and blue shifted right, recombined additively"
    }

    fn apply(&self, frame: &Frame, ctx: &RenderContext) -> Result<Frame> {
        let d = self.displacement as i64;

        let red = ctx.shift_horizontal(&isolate(ctx, frame, 0), -d)?;
        let green = isolate(ctx, frame, 1);
        let blue = ctx.shift_horizontal(&isolate(ctx, frame, 2), d)?;

        let combined = ctx.add(&red, &green)?;
        ctx.add(&combined, &blue)
    }

    fn metadata(&self) -> StageMetadata {
        StageMetadata {
            kind: StageKind::GeometricShift,
            deterministic: true,
            parameters: vec![(
                ABERRATION_DISPLACEMENT.to_string(),
                "Horizontal red/blue offset in pixels".to_string(),
            )],
        }
    }
}
