use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    filters::context::MAX_DIMENSION,
};

/// Main configuration for the VHS filter pipeline
///
/// Every field has a default matching the stock VHS look, so an empty TOML file
/// (or any missing section) is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interlace stripe settings
    pub interlace: InterlaceConfig,

    /// Grain settings
    pub noise: NoiseConfig,

    /// Chromatic aberration settings
    pub aberration: AberrationConfig,

    /// Tape scratch settings
    pub scratches: ScratchConfig,

    /// Final color grade of the VHS chain
    pub grade: GradeConfig,

    /// Single-stage preset parameters
    pub presets: PresetConfig,

    /// Capture lane and worker settings
    pub capture: CaptureConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.interlace.validate()?;
        self.noise.validate()?;
        self.scratches.validate()?;
        self.grade.validate()?;
        self.presets.validate()?;
        self.capture.validate()?;
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn check_unit(key: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(key, value).into());
    }
    Ok(())
}

/// Horizontal stripe overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterlaceConfig {
    /// Stripe height in pixels
    pub line_height: u32,

    /// Gap between stripes in pixels
    pub spacing: u32,

    /// Stripe opacity (0.0-1.0), stripes are black
    pub opacity: f32,
}

impl Default for InterlaceConfig {
    fn default() -> Self {
        Self {
            line_height: 2,
            spacing: 4,
            opacity: 0.1,
        }
    }
}

impl InterlaceConfig {
    fn validate(&self) -> Result<()> {
        if self.line_height == 0 || self.line_height > MAX_DIMENSION {
            return Err(invalid("interlace.line_height", self.line_height).into());
        }
        if self.spacing > MAX_DIMENSION {
            return Err(invalid("interlace.spacing", self.spacing).into());
        }
        check_unit("interlace.opacity", self.opacity)
    }
}

/// Additive luminance grain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Per-channel scale applied to the desaturated noise field
    pub intensity: f32,

    /// Brightness offset applied to the noise field before scaling
    pub brightness: f32,

    /// Fixed seed for reproducible grain; thread-local randomness when absent
    pub seed: Option<u64>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            intensity: 0.02,
            brightness: -0.1,
            seed: None,
        }
    }
}

impl NoiseConfig {
    fn validate(&self) -> Result<()> {
        check_unit("noise.intensity", self.intensity)?;
        if !(-1.0..=1.0).contains(&self.brightness) {
            return Err(invalid("noise.brightness", self.brightness).into());
        }
        Ok(())
    }
}

/// Red/blue channel split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AberrationConfig {
    /// Horizontal displacement in pixels (red moves left, blue moves right)
    pub displacement: u32,
}

impl Default for AberrationConfig {
    fn default() -> Self {
        Self { displacement: 2 }
    }
}

/// Vertical tape scratches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    /// One scratch per this many pixels of frame width
    pub pixels_per_scratch: u32,

    /// Scratch opacity (0.0-1.0), scratches are white
    pub opacity: f32,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            pixels_per_scratch: 50,
            opacity: 0.05,
        }
    }
}

impl ScratchConfig {
    fn validate(&self) -> Result<()> {
        if self.pixels_per_scratch == 0 {
            return Err(invalid("scratches.pixels_per_scratch", self.pixels_per_scratch).into());
        }
        check_unit("scratches.opacity", self.opacity)
    }
}

/// Saturation, brightness and contrast adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeConfig {
    pub saturation: f32,
    pub brightness: f32,
    pub contrast: f32,
}

impl Default for GradeConfig {
    fn default() -> Self {
        Self {
            saturation: 1.2,
            brightness: -0.05,
            contrast: 1.1,
        }
    }
}

impl GradeConfig {
    fn validate(&self) -> Result<()> {
        if !(self.saturation >= 0.0 && self.saturation.is_finite()) {
            return Err(invalid("grade.saturation", self.saturation).into());
        }
        if !(-1.0..=1.0).contains(&self.brightness) {
            return Err(invalid("grade.brightness", self.brightness).into());
        }
        if !(self.contrast >= 0.0 && self.contrast.is_finite()) {
            return Err(invalid("grade.contrast", self.contrast).into());
        }
        Ok(())
    }
}

/// Parameters of the single-stage presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    /// Levels per channel for the 1980s posterize
    pub posterize_levels: u32,

    /// Sepia strength for Vintage (0.0-1.0)
    pub sepia_intensity: f32,

    /// Luma difference below which neighbors are averaged (0.0-1.0)
    pub denoise_level: f32,

    /// How much of the original pixel is mixed back after smoothing (0.0-1.0)
    pub denoise_sharpness: f32,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            posterize_levels: 6,
            sepia_intensity: 1.0,
            denoise_level: 0.02,
            denoise_sharpness: 0.4,
        }
    }
}

impl PresetConfig {
    fn validate(&self) -> Result<()> {
        if self.posterize_levels < 2 || self.posterize_levels > 256 {
            return Err(invalid("presets.posterize_levels", self.posterize_levels).into());
        }
        check_unit("presets.sepia_intensity", self.sepia_intensity)?;
        check_unit("presets.denoise_level", self.denoise_level)?;
        check_unit("presets.denoise_sharpness", self.denoise_sharpness)
    }
}

/// Capture lane configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Frames the live lane may hold while the worker is busy
    pub queue_capacity: usize,

    /// Threads in the rendering context's compute pool
    pub render_threads: usize,

    /// Filter selected at startup
    pub initial_filter: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1,
            render_threads: num_cpus::get(),
            initial_filter: "VHS".to_string(),
        }
    }
}

impl CaptureConfig {
    fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(invalid("capture.queue_capacity", self.queue_capacity).into());
        }

        if self.render_threads == 0 {
            return Err(invalid("capture.render_threads", self.render_threads).into());
        }

        Ok(())
    }
}
