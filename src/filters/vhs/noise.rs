use std::sync::Arc;

use crate::{
    config::NoiseConfig,
    error::Result,
    filters::{
        color::{luma, to_byte, to_unit},
        context::{check_geometry, RenderContext},
        entropy::{EntropySource, ThreadEntropy},
        traits::{Stage, StageKind, StageMetadata},
    },
    video::types::{Frame, CHANNELS},
};

use super::{NOISE_BRIGHTNESS, NOISE_INTENSITY};

/// Additive monochrome grain
///
/// A random RGB field is desaturated, darkened, scaled down to `intensity` and
/// added onto the frame with per-channel clamping.
pub struct NoiseStage {
    intensity: f32,
    brightness: f32,
    source: Arc<dyn EntropySource>,
}

impl NoiseStage {
    pub fn new() -> Self {
        Self::from_config(&NoiseConfig::default(), Arc::new(ThreadEntropy))
    }

    pub fn from_config(config: &NoiseConfig, source: Arc<dyn EntropySource>) -> Self {
        Self {
            intensity: config.intensity,
            brightness: config.brightness,
            source,
        }
    }

    /// Largest value the grain can add to a channel
    pub fn max_increment(&self) -> u8 {
        to_byte(self.intensity.clamp(0.0, 1.0))
    }

    fn grain_value(&self, rgb: &[u8]) -> u8 {
        let gray = luma(to_unit(rgb[0]), to_unit(rgb[1]), to_unit(rgb[2]));
        let darkened = (gray + self.brightness).clamp(0.0, 1.0);
        to_byte(darkened * self.intensity)
    }
}

impl Default for NoiseStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for NoiseStage {
    fn name(&self) -> &str {
        "noise"
    }

    fn description(&self) -> &str {
        "Faint random luminance grain added on top of the frame"
    }

    fn apply(&self, frame: &Frame, ctx: &RenderContext) -> Result<Frame> {
        let (width, height) = frame.extent();
        let pixels = check_geometry(width, height)? / CHANNELS;

        let mut field = vec![0u8; pixels * 3];
        ctx.install(|| self.source.fill_bytes(&mut field))?;

        let row_len = width as usize * 3;
        let grain = ctx.render_rows(width, height, |y, row| {
            let src = &field[y as usize * row_len..(y as usize + 1) * row_len];
            for (dst, rgb) in row.chunks_exact_mut(CHANNELS).zip(src.chunks_exact(3)) {
                let v = self.grain_value(rgb);
                dst.copy_from_slice(&[v, v, v, 255]);
            }
        })?;

        ctx.add(frame, &grain)
    }

    fn metadata(&self) -> StageMetadata {
        StageMetadata {
            kind: StageKind::ProceduralOverlay,
            deterministic: false,
            parameters: vec![
                (NOISE_INTENSITY.to_string(), "Per-channel scale of the grain (0.0-1.0)".to_string()),
                (NOISE_BRIGHTNESS.to_string(), "Offset applied before scaling (-1.0-1.0)".to_string()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::entropy::{FailingEntropy, SeededEntropy};

    #[test]
    fn test_grain_stays_within_bounds() {
        let ctx = RenderContext::new(2).unwrap();
        let stage = NoiseStage::new();
        let frame = Frame::new_filled(64, 48, [100, 150, 250]);

        let out = stage.apply(&frame, &ctx).unwrap();
        assert_eq!(out.extent(), (64, 48));

        let max = stage.max_increment() as i32;
        assert_eq!(max, 5);
        for (a, b) in frame.as_raw().chunks(4).zip(out.as_raw().chunks(4)) {
            for c in 0..3 {
                let delta = b[c] as i32 - a[c] as i32;
                assert!((0..=max).contains(&delta) || b[c] == 255);
            }
            assert_eq!(b[3], 255);
        }
    }

    #[test]
    fn test_grain_is_gray() {
        let ctx = RenderContext::new(2).unwrap();
        let stage = NoiseStage::new();
        let out = stage.apply(&Frame::new_filled(16, 16, [0, 0, 0]), &ctx).unwrap();
        for px in out.as_raw().chunks(4) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn test_seeded_grain_is_reproducible() {
        let ctx = RenderContext::new(2).unwrap();
        let frame = Frame::new_filled(20, 10, [50, 50, 50]);
        let a = NoiseStage::from_config(&NoiseConfig::default(), Arc::new(SeededEntropy::new(3)));
        let b = NoiseStage::from_config(&NoiseConfig::default(), Arc::new(SeededEntropy::new(3)));
        assert_eq!(a.apply(&frame, &ctx).unwrap(), b.apply(&frame, &ctx).unwrap());
    }

    #[test]
    fn test_failing_source_fails_stage() {
        let ctx = RenderContext::new(1).unwrap();
        let stage = NoiseStage::from_config(&NoiseConfig::default(), Arc::new(FailingEntropy));
        assert!(stage.apply(&Frame::new_filled(4, 4, [1, 2, 3]), &ctx).is_err());
    }
}
