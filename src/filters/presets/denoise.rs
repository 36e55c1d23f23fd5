use crate::{
    error::Result,
    filters::{
        color::{luma, to_unit},
        context::RenderContext,
        traits::{Stage, StageKind, StageMetadata},
    },
    video::types::{Frame, CHANNELS},
};

/// Edge-preserving 3x3 smoothing
///
/// Neighbors whose luma is within `level` of the center pixel are averaged;
/// the result is then pulled back toward the center by `sharpness`.
pub struct DenoiseStage {
    level: f32,
    sharpness: f32,
}

impl DenoiseStage {
    pub fn new(level: f32, sharpness: f32) -> Self {
        Self {
            level: level.clamp(0.0, 1.0),
            sharpness: sharpness.clamp(0.0, 1.0),
        }
    }
}

fn pixel_luma(px: &[u8]) -> f32 {
    luma(to_unit(px[0]), to_unit(px[1]), to_unit(px[2]))
}

impl Stage for DenoiseStage {
    fn name(&self) -> &str {
        "noise_reduction"
    }

    fn description(&self) -> &str {
        "Light denoise that leaves edges alone"
    }

    fn apply(&self, frame: &Frame, ctx: &RenderContext) -> Result<Frame> {
        let (width, height) = frame.extent();
        let stride = frame.row_stride();
        let src = frame.as_raw();

        ctx.render_rows(width, height, |y, row| {
            for x in 0..width {
                let ci = y as usize * stride + x as usize * CHANNELS;
                let center = &src[ci..ci + CHANNELS];
                let center_luma = pixel_luma(center);

                let mut sum = [0f32; 3];
                let mut count = 0f32;
                for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                        let ni = ny as usize * stride + nx as usize * CHANNELS;
                        let n = &src[ni..ni + CHANNELS];
                        if (pixel_luma(n) - center_luma).abs() <= self.level {
                            for c in 0..3 {
                                sum[c] += n[c] as f32;
                            }
                            count += 1.0;
                        }
                    }
                }

                let out = &mut row[x as usize * CHANNELS..(x as usize + 1) * CHANNELS];
                for c in 0..3 {
                    // The center always matches itself, so count >= 1
                    let smooth = sum[c] / count;
                    let v = smooth + (center[c] as f32 - smooth) * self.sharpness;
                    out[c] = v.round().clamp(0.0, 255.0) as u8;
                }
                out[3] = center[3];
            }
        })
    }

    fn metadata(&self) -> StageMetadata {
        StageMetadata {
            kind: StageKind::ColorRemap,
            deterministic: true,
            parameters: vec![
                ("presets.denoise_level".to_string(), "Luma difference treated as noise (0.0-1.0)".to_string()),
                ("presets.denoise_sharpness".to_string(), "Detail mixed back after smoothing (0.0-1.0)".to_string()),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_frame_unchanged() {
        let ctx = RenderContext::new(2).unwrap();
        let frame = Frame::new_filled(9, 7, [80, 90, 100]);
        assert_eq!(DenoiseStage::new(0.02, 0.4).apply(&frame, &ctx).unwrap(), frame);
    }

    #[test]
    fn test_small_speck_is_softened_edge_is_kept() {
        let ctx = RenderContext::new(2).unwrap();
        let mut frame = Frame::new_filled(5, 5, [100, 100, 100]);
        frame.set_pixel(2, 2, [103, 103, 103, 255]);
        frame.set_pixel(0, 4, [250, 250, 250, 255]);

        let out = DenoiseStage::new(0.02, 0.4).apply(&frame, &ctx).unwrap();
        let speck = out.get_pixel(2, 2)[0];
        assert!(speck < 103 && speck >= 100, "speck {}", speck);
        // Far outside the threshold: no neighbor qualifies, the pixel is kept
        assert_eq!(out.get_pixel(0, 4), [250, 250, 250, 255]);
    }

    #[test]
    fn test_single_pixel_frame() {
        let ctx = RenderContext::new(1).unwrap();
        let frame = Frame::new_filled(1, 1, [7, 8, 9]);
        assert_eq!(DenoiseStage::new(0.02, 0.4).apply(&frame, &ctx).unwrap(), frame);
    }
}
