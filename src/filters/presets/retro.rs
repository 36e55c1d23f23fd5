use crate::{
    error::Result,
    filters::{
        color::{luma, to_byte, to_unit, ChannelLut},
        context::RenderContext,
        traits::{Stage, StageKind, StageMetadata},
    },
    video::types::Frame,
};

/// Lift, gamma and gain for one channel's tone curve
struct Curve {
    lift: f32,
    gamma: f32,
    gain: f32,
}

impl Curve {
    fn eval(&self, v: f32) -> f32 {
        self.lift + (self.gain - self.lift) * v.powf(self.gamma)
    }
}

// Cool lifted shadows, warm slightly crushed highlights
const RED: Curve = Curve { lift: 0.04, gamma: 1.12, gain: 0.98 };
const GREEN: Curve = Curve { lift: 0.03, gamma: 1.02, gain: 0.95 };
const BLUE: Curve = Curve { lift: 0.14, gamma: 0.92, gain: 0.84 };

/// Remaining saturation after the curves
const SATURATION: f32 = 0.85;

/// Processed-film photo effect built from per-channel tone curves
pub struct RetroStage {
    curves: [ChannelLut; 3],
}

impl RetroStage {
    pub fn new() -> Self {
        Self {
            curves: [
                ChannelLut::from_fn(|v| RED.eval(v)),
                ChannelLut::from_fn(|v| GREEN.eval(v)),
                ChannelLut::from_fn(|v| BLUE.eval(v)),
            ],
        }
    }

    fn tone(&self, px: [u8; 4]) -> [u8; 4] {
        let r = to_unit(self.curves[0].get(px[0]));
        let g = to_unit(self.curves[1].get(px[1]));
        let b = to_unit(self.curves[2].get(px[2]));
        let l = luma(r, g, b);
        let mix = |c: f32| to_byte(l + (c - l) * SATURATION);
        [mix(r), mix(g), mix(b), px[3]]
    }
}

impl Default for RetroStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for RetroStage {
    fn name(&self) -> &str {
        "retro"
    }

    fn description(&self) -> &str {
        "Faded photo-lab look with blue shadows and warm highlights"
    }

    fn apply(&self, frame: &Frame, ctx: &RenderContext) -> Result<Frame> {
        Ok(ctx.map_pixels(frame, |px| self.tone(px)))
    }

    fn metadata(&self) -> StageMetadata {
        StageMetadata {
            kind: StageKind::ColorRemap,
            deterministic: true,
            parameters: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadows_turn_blue_highlights_warm() {
        let stage = RetroStage::new();

        let black = stage.tone([0, 0, 0, 255]);
        assert!(black[2] > black[0], "{:?}", black);
        assert!(black[2] > 20);

        let white = stage.tone([255, 255, 255, 255]);
        assert!(white[0] > white[2], "{:?}", white);
        assert!(white[0] < 255);
    }

    #[test]
    fn test_mid_gray_keeps_extent() {
        let ctx = RenderContext::new(2).unwrap();
        let frame = Frame::new_filled(108, 192, [128, 128, 128]);
        let out = RetroStage::new().apply(&frame, &ctx).unwrap();
        assert_eq!(out.extent(), (108, 192));
        assert_ne!(out, frame);
    }
}
