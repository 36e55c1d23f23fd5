//! # Single-Stage Presets
//!
//! Alternatives to the full VHS chain, picked live from the filter selector:
//!
//! - **Retro**: faded photo-lab tone curves
//! - **1980s**: posterize
//! - **Vintage**: sepia
//! - **Noise**: light noise reduction

mod denoise;
mod eighties;
mod retro;
mod vintage;

pub use denoise::DenoiseStage;
pub use eighties::PosterizeStage;
pub use retro::RetroStage;
pub use vintage::SepiaStage;

use crate::{config::PresetConfig, filters::traits::Stage};

/// A named single-stage transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Retro,
    Eighties,
    Vintage,
    NoiseReduction,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Retro,
        Preset::Eighties,
        Preset::Vintage,
        Preset::NoiseReduction,
    ];

    /// Display name, as shown in the filter picker
    pub fn name(self) -> &'static str {
        match self {
            Preset::Retro => "Retro",
            Preset::Eighties => "1980s",
            Preset::Vintage => "Vintage",
            Preset::NoiseReduction => "Noise",
        }
    }

    /// Instantiate the stage for this preset
    pub fn build(self, config: &PresetConfig) -> Box<dyn Stage> {
        match self {
            Preset::Retro => Box::new(RetroStage::new()),
            Preset::Eighties => Box::new(PosterizeStage::new(config.posterize_levels)),
            Preset::Vintage => Box::new(SepiaStage::new(config.sepia_intensity)),
            Preset::NoiseReduction => Box::new(DenoiseStage::new(
                config.denoise_level,
                config.denoise_sharpness,
            )),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
