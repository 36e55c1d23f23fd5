use crate::{
    config::InterlaceConfig,
    error::Result,
    filters::{
        context::RenderContext,
        traits::{Stage, StageKind, StageMetadata},
    },
    video::types::Frame,
};

use super::{INTERLACE_LINE_HEIGHT, INTERLACE_OPACITY, INTERLACE_SPACING};

/// Dark horizontal stripes imitating interlaced scan fields
pub struct InterlaceStage {
    line_height: u32,
    spacing: u32,
    opacity: f32,
}

impl InterlaceStage {
    pub fn new() -> Self {
        Self::from_config(&InterlaceConfig::default())
    }

    pub fn from_config(config: &InterlaceConfig) -> Self {
        Self {
            line_height: config.line_height.max(1),
            spacing: config.spacing,
            opacity: config.opacity,
        }
    }

    /// Distance between the tops of two consecutive stripes
    fn period(&self) -> u32 {
        self.line_height.saturating_add(self.spacing)
    }

    /// Rows covered by a stripe
    pub fn is_stripe_row(&self, y: u32) -> bool {
        y % self.period() < self.line_height
    }
}

impl Default for InterlaceStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for InterlaceStage {
    fn name(&self) -> &str {
        "interlace"
    }

    fn description(&self) -> &str {
        "Translucent black scan-line stripes over the whole frame"
    }

    fn apply(&self, frame: &Frame, ctx: &RenderContext) -> Result<Frame> {
        let (width, height) = frame.extent();
        let period = self.period();

        let stripes = ctx.rasterize(width, height, |pen| {
            pen.set_fill_color([0, 0, 0], self.opacity);
            let mut y = 0;
            while y < height {
                pen.fill_rect(0, y, width, self.line_height);
                y = y.saturating_add(period);
            }
        })?;

        ctx.composite_over(&stripes, frame)
    }

    fn metadata(&self) -> StageMetadata {
        StageMetadata {
            kind: StageKind::CompositeOver,
            deterministic: true,
            parameters: vec![
                (INTERLACE_LINE_HEIGHT.to_string(), "Stripe height in pixels".to_string()),
                (INTERLACE_SPACING.to_string(), "Gap between stripes in pixels".to_string()),
                (INTERLACE_OPACITY.to_string(), "Stripe opacity (0.0-1.0)".to_string()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_stripe_rows_darken() {
        let ctx = RenderContext::new(2).unwrap();
        let stage = InterlaceStage::new();
        let frame = Frame::new_filled(8, 12, [200, 200, 200]);

        let out = stage.apply(&frame, &ctx).unwrap();
        assert_eq!(out.extent(), (8, 12));

        for y in 0..12 {
            let px = out.get_pixel(3, y);
            assert_eq!(stage.is_stripe_row(y), y % 6 < 2);
            if stage.is_stripe_row(y) {
                assert!(px[0] < 200 && px[0] >= 175, "row {} should be striped: {:?}", y, px);
            } else {
                assert_eq!(px, [200, 200, 200, 255], "row {} should be untouched", y);
            }
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn test_deterministic() {
        let ctx = RenderContext::new(2).unwrap();
        let stage = InterlaceStage::new();
        let frame = Frame::new_filled(31, 17, [10, 120, 240]);
        assert_eq!(stage.apply(&frame, &ctx).unwrap(), stage.apply(&frame, &ctx).unwrap());
    }

    #[test]
    fn test_huge_spacing_draws_single_stripe() {
        let ctx = RenderContext::new(1).unwrap();
        let stage = InterlaceStage::from_config(&InterlaceConfig {
            spacing: u32::MAX,
            ..InterlaceConfig::default()
        });
        assert!(stage.is_stripe_row(0));
        assert!(!stage.is_stripe_row(5));

        let frame = Frame::new_filled(4, 8, [200, 200, 200]);
        let out = stage.apply(&frame, &ctx).unwrap();
        assert_ne!(out.get_pixel(0, 1), frame.get_pixel(0, 1));
        assert_eq!(out.get_pixel(0, 2), frame.get_pixel(0, 2));
        assert_eq!(out.get_pixel(0, 7), frame.get_pixel(0, 7));
    }

    #[test]
    fn test_empty_frame() {
        let ctx = RenderContext::new(1).unwrap();
        let out = InterlaceStage::new().apply(&Frame::empty(), &ctx).unwrap();
        assert!(out.is_empty());
    }
}
