use crate::{
    error::Result,
    filters::{
        color::{to_byte, to_unit},
        context::RenderContext,
        traits::{Stage, StageKind, StageMetadata},
    },
    video::types::Frame,
};

const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Sepia tone blended with the original by `intensity`
pub struct SepiaStage {
    intensity: f32,
}

impl SepiaStage {
    pub fn new(intensity: f32) -> Self {
        Self {
            intensity: intensity.clamp(0.0, 1.0),
        }
    }

    fn tone(&self, px: [u8; 4]) -> [u8; 4] {
        let rgb = [to_unit(px[0]), to_unit(px[1]), to_unit(px[2])];
        let mut out = [0u8; 4];
        for (c, row) in SEPIA.iter().enumerate() {
            let sepia = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2];
            out[c] = to_byte(rgb[c] + (sepia - rgb[c]) * self.intensity);
        }
        out[3] = px[3];
        out
    }
}

impl Stage for SepiaStage {
    fn name(&self) -> &str {
        "vintage"
    }

    fn description(&self) -> &str {
        "Warm brown sepia toning"
    }

    fn apply(&self, frame: &Frame, ctx: &RenderContext) -> Result<Frame> {
        Ok(ctx.map_pixels(frame, |px| self.tone(px)))
    }

    fn metadata(&self) -> StageMetadata {
        StageMetadata {
            kind: StageKind::ColorRemap,
            deterministic: true,
            parameters: vec![(
                "presets.sepia_intensity".to_string(),
                "Sepia strength (0.0-1.0)".to_string(),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_sepia_is_warm() {
        let out = SepiaStage::new(1.0).tone([100, 100, 100, 255]);
        assert!(out[0] > out[1] && out[1] > out[2], "{:?}", out);
    }

    #[test]
    fn test_zero_intensity_is_identity() {
        let px = [12, 200, 77, 255];
        assert_eq!(SepiaStage::new(0.0).tone(px), px);
    }
}
