use crate::{
    error::Result,
    filters::{
        color::ChannelLut,
        context::RenderContext,
        traits::{Stage, StageKind, StageMetadata},
    },
    video::types::Frame,
};

/// Posterize to a handful of levels per channel
pub struct PosterizeStage {
    levels: u32,
    lut: ChannelLut,
}

impl PosterizeStage {
    pub fn new(levels: u32) -> Self {
        let levels = levels.clamp(2, 256);
        let steps = (levels - 1) as f32;
        Self {
            levels,
            lut: ChannelLut::from_fn(|v| (v * steps).round() / steps),
        }
    }

    pub fn levels(&self) -> u32 {
        self.levels
    }
}

impl Stage for PosterizeStage {
    fn name(&self) -> &str {
        "1980s"
    }

    fn description(&self) -> &str {
        "Flat poster colors with a few levels per channel"
    }

    fn apply(&self, frame: &Frame, ctx: &RenderContext) -> Result<Frame> {
        let lut = &self.lut;
        Ok(ctx.map_pixels(frame, |px| [lut.get(px[0]), lut.get(px[1]), lut.get(px[2]), px[3]]))
    }

    fn metadata(&self) -> StageMetadata {
        StageMetadata {
            kind: StageKind::ColorRemap,
            deterministic: true,
            parameters: vec![(
                "presets.posterize_levels".to_string(),
                "Levels per channel (2-256)".to_string(),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_six_levels() {
        let ctx = RenderContext::new(2).unwrap();
        let stage = PosterizeStage::new(6);

        let mut frame = Frame::new_filled(256, 1, [0, 0, 0]);
        for x in 0..256 {
            frame.set_pixel(x, 0, [x as u8, 255 - x as u8, x as u8 / 2, 255]);
        }

        let out = stage.apply(&frame, &ctx).unwrap();
        let reds: BTreeSet<u8> = out.as_raw().chunks(4).map(|p| p[0]).collect();
        assert_eq!(reds.len(), 6);
        assert!(reds.contains(&0) && reds.contains(&255));
        assert!(reds.contains(&51));
    }

    #[test]
    fn test_levels_clamped() {
        assert_eq!(PosterizeStage::new(0).levels(), 2);
        assert_eq!(PosterizeStage::new(1000).levels(), 256);
    }
}
