use crate::{
    config::GradeConfig,
    error::Result,
    filters::{
        color::{luma, to_byte, to_unit},
        context::RenderContext,
        traits::{Stage, StageKind, StageMetadata},
    },
    video::types::Frame,
};

use super::{GRADE_BRIGHTNESS, GRADE_CONTRAST, GRADE_SATURATION};

/// Fixed saturation, brightness and contrast adjustment
#[derive(Debug, Clone, Copy)]
pub struct GradeStage {
    saturation: f32,
    brightness: f32,
    contrast: f32,
}

impl GradeStage {
    pub fn new() -> Self {
        Self::from_config(&GradeConfig::default())
    }

    pub fn from_config(config: &GradeConfig) -> Self {
        Self {
            saturation: config.saturation,
            brightness: config.brightness,
            contrast: config.contrast,
        }
    }

    /// Grade a single pixel; alpha is kept
    pub fn grade(&self, px: [u8; 4]) -> [u8; 4] {
        let (r, g, b) = (to_unit(px[0]), to_unit(px[1]), to_unit(px[2]));
        let l = luma(r, g, b);

        let adjust = |c: f32| {
            let saturated = l + (c - l) * self.saturation;
            let brightened = saturated + self.brightness;
            to_byte((brightened - 0.5) * self.contrast + 0.5)
        };

        [adjust(r), adjust(g), adjust(b), px[3]]
    }
}

impl Default for GradeStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for GradeStage {
    fn name(&self) -> &str {
        "color_grade"
    }

    fn description(&self) -> &str {
        "Punchier saturation, slightly darker, slightly more contrast"
    }

    fn apply(&self, frame: &Frame, ctx: &RenderContext) -> Result<Frame> {
        let grade = *self;
        Ok(ctx.map_pixels(frame, move |px| grade.grade(px)))
    }

    fn metadata(&self) -> StageMetadata {
        StageMetadata {
            kind: StageKind::ColorRemap,
            deterministic: true,
            parameters: vec![
                (GRADE_SATURATION.to_string(), "Saturation multiplier".to_string()),
                (GRADE_BRIGHTNESS.to_string(), "Brightness offset (-1.0-1.0)".to_string()),
                (GRADE_CONTRAST.to_string(), "Contrast multiplier around mid-gray".to_string()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_only_gets_darker_and_contrastier() {
        let stage = GradeStage::new();
        // Mid-gray: no saturation change, (0.5 - 0.05 - 0.5) * 1.1 + 0.5 = 0.445
        let out = stage.grade([128, 128, 128, 255]);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
        assert!((112..=115).contains(&out[0]), "{:?}", out);
    }

    #[test]
    fn test_saturation_boost_spreads_channels() {
        let stage = GradeStage::new();
        let out = stage.grade([200, 100, 50, 255]);
        assert!(out[0] as i32 - out[2] as i32 > 150);
    }

    #[test]
    fn test_content_independent() {
        let ctx = RenderContext::new(2).unwrap();
        let stage = GradeStage::new();
        let mut frame = Frame::new_filled(6, 6, [30, 60, 90]);
        frame.set_pixel(5, 5, [250, 10, 10, 255]);

        let out = stage.apply(&frame, &ctx).unwrap();
        // The same input pixel maps to the same output regardless of neighbors
        assert_eq!(out.get_pixel(0, 0), stage.grade([30, 60, 90, 255]));
        assert_eq!(out.get_pixel(5, 5), stage.grade([250, 10, 10, 255]));
    }
}
