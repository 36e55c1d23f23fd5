use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    config::Config,
    error::Result,
    filters::{
        apply_or_passthrough,
        entropy::{EntropySource, SeededEntropy, ThreadEntropy},
        presets::Preset,
        FilterMode, FilterRegistry, RenderContext, Stage, VhsChain,
    },
    pipeline::selector::FilterSelector,
    video::types::Frame,
};

/// Orchestrates the filter stages for every frame
///
/// One pipeline serves the live lane, the recording path and the still lane:
///
/// 1. Resolve the filter (name lookup or live selector)
/// 2. Run either one preset stage or the five-stage VHS chain
/// 3. Fall back to the last good frame on any stage failure
///
/// The pipeline is `Send + Sync` and keeps no per-call state, so lanes share it
/// through an `Arc`.
pub struct FilterPipeline {
    context: RenderContext,
    registry: FilterRegistry,
    chain: VhsChain,
    presets: HashMap<Preset, Box<dyn Stage>>,
}

impl FilterPipeline {
    /// Create a pipeline from configuration
    ///
    /// Grain and scratches use thread-local randomness unless `noise.seed` is set.
    pub fn new(config: &Config) -> Result<Self> {
        let source: Arc<dyn EntropySource> = match config.noise.seed {
            Some(seed) => Arc::new(SeededEntropy::new(seed)),
            None => Arc::new(ThreadEntropy),
        };
        Self::with_entropy(config, source)
    }

    /// Create a pipeline with an explicit random source for the procedural stages
    pub fn with_entropy(config: &Config, source: Arc<dyn EntropySource>) -> Result<Self> {
        config.validate()?;

        let context = RenderContext::new(config.capture.render_threads)?;
        let chain = VhsChain::from_config(config, source);
        let presets = Preset::ALL
            .iter()
            .map(|&preset| (preset, preset.build(&config.presets)))
            .collect();

        info!(
            "Filter pipeline ready: {} chain stages, {} presets, {} render threads",
            chain.stages().len(),
            Preset::ALL.len(),
            context.threads()
        );

        Ok(Self {
            context,
            registry: FilterRegistry::new(),
            chain,
            presets,
        })
    }

    /// The name lookup table used by this pipeline
    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn chain(&self) -> &VhsChain {
        &self.chain
    }

    /// Stage backing a preset
    pub fn preset_stage(&self, preset: Preset) -> Option<&dyn Stage> {
        self.presets.get(&preset).map(|stage| stage.as_ref())
    }

    /// Resolve a filter name; unknown names are identity
    pub fn resolve(&self, name: &str) -> FilterMode {
        self.registry.resolve(name)
    }

    /// Filter one frame with an already-resolved mode
    ///
    /// Never fails: an empty input gives an empty output, and a failing stage
    /// leaves the frame as it was before that stage.
    pub fn process(&self, frame: &Frame, mode: FilterMode) -> Frame {
        if frame.is_empty() {
            debug!("Empty frame, nothing to filter");
            return frame.clone();
        }

        match mode {
            FilterMode::Identity => frame.clone(),
            FilterMode::VhsChain => self.process_chain(frame),
            FilterMode::Preset(preset) => match self.presets.get(&preset) {
                Some(stage) => apply_or_passthrough(stage.as_ref(), frame, &self.context),
                None => frame.clone(),
            },
        }
    }

    /// Run the full VHS chain, stopping at the first failing stage
    pub fn process_chain(&self, frame: &Frame) -> Frame {
        if frame.is_empty() {
            return frame.clone();
        }
        self.chain.run(frame, &self.context).frame
    }

    /// Still-photo path
    pub fn process_still(&self, frame: &Frame, name: &str) -> Frame {
        self.process(frame, self.resolve(name))
    }

    /// Live preview and recording path
    ///
    /// Shares its transform with [`FilterPipeline::process_still`]; what the user
    /// previews is exactly what gets recorded.
    pub fn process_frame(&self, frame: &Frame, name: &str) -> Frame {
        self.process(frame, self.resolve(name))
    }

    /// Read the live selector once and filter with its current mode
    pub fn process_selected(&self, frame: &Frame, selector: &FilterSelector) -> Frame {
        self.process(frame, selector.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::entropy::FailingEntropy;

    fn config() -> Config {
        let mut config = Config::default();
        config.capture.render_threads = 2;
        config
    }

    fn pipeline() -> FilterPipeline {
        FilterPipeline::new(&config()).unwrap()
    }

    fn patterned(width: u32, height: u32) -> Frame {
        let mut frame = Frame::new_filled(width, height, [0, 0, 0]);
        for y in 0..height {
            for x in 0..width {
                frame.set_pixel(x, y, [(x * 13 % 256) as u8, (y * 7 % 256) as u8, ((x + y) % 256) as u8, 255]);
            }
        }
        frame
    }

    #[test]
    fn test_unknown_name_is_identity() {
        let pipeline = pipeline();
        let frame = patterned(40, 30);
        assert_eq!(pipeline.process_frame(&frame, "unknown-name"), frame);
        assert_eq!(pipeline.process_still(&frame, "unknown-name"), frame);
    }

    #[test]
    fn test_extent_invariance_for_every_mode() {
        let pipeline = pipeline();
        let mut modes = vec![FilterMode::Identity, FilterMode::VhsChain];
        modes.extend(Preset::ALL.iter().map(|&p| FilterMode::Preset(p)));

        for (w, h) in [(1, 1), (3, 7), (64, 48), (101, 13)] {
            let frame = patterned(w, h);
            for &mode in &modes {
                assert_eq!(pipeline.process(&frame, mode).extent(), (w, h), "{} at {}x{}", mode, w, h);
            }
        }
    }

    #[test]
    fn test_preview_record_parity_for_deterministic_filters() {
        let pipeline = pipeline();
        let frame = patterned(80, 60);
        for name in ["Retro", "1980s", "Vintage", "Noise"] {
            assert_eq!(
                pipeline.process_frame(&frame, name),
                pipeline.process_still(&frame, name),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_chain_parity_with_seeded_grain() {
        let mut config = config();
        config.noise.seed = Some(99);
        let a = FilterPipeline::new(&config).unwrap();
        let b = FilterPipeline::new(&config).unwrap();
        let frame = patterned(120, 40);
        assert_eq!(a.process_frame(&frame, "VHS"), b.process_frame(&frame, "VHS"));
    }

    #[test]
    fn test_failing_randomness_degrades_gracefully() {
        let pipeline = FilterPipeline::with_entropy(&config(), Arc::new(FailingEntropy)).unwrap();
        let frame = patterned(100, 20);

        let out = pipeline.process_frame(&frame, "VHS");
        assert_eq!(out.extent(), frame.extent());

        let interlaced = pipeline.chain().stages()[0].apply(&frame, &pipeline.context).unwrap();
        assert_eq!(out, interlaced);
    }

    #[test]
    fn test_empty_frame_is_noop() {
        let pipeline = pipeline();
        for name in ["VHS", "Retro", "Noise", "unknown"] {
            assert!(pipeline.process_frame(&Frame::empty(), name).is_empty());
        }
    }

    #[test]
    fn test_retro_on_portrait_gray_frame() {
        let pipeline = pipeline();
        let frame = Frame::new_filled(1080, 1920, [128, 128, 128]);

        let out = pipeline.process_still(&frame, "Retro");
        assert_eq!(out.extent(), (1080, 1920));

        let expected = pipeline
            .preset_stage(Preset::Retro)
            .unwrap()
            .apply(&frame, &pipeline.context)
            .unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_full_chain_on_white_frame() {
        let pipeline = pipeline();
        let frame = Frame::new_filled(640, 480, [255, 255, 255]);

        let out = pipeline.process_frame(&frame, "VHS");
        assert_eq!(out.extent(), (640, 480));
        assert_ne!(out, frame);

        let mean: f64 = out.as_raw().iter().map(|&v| v as f64).sum::<f64>() / out.as_raw().len() as f64;
        assert!(mean > 128.0, "mean {}", mean);
    }

    #[test]
    fn test_selector_is_read_per_frame() {
        let pipeline = pipeline();
        let selector = FilterSelector::new(FilterMode::Identity);
        let frame = patterned(30, 30);

        assert_eq!(pipeline.process_selected(&frame, &selector), frame);

        selector.select(FilterMode::Preset(Preset::Vintage));
        assert_eq!(
            pipeline.process_selected(&frame, &selector),
            pipeline.process_frame(&frame, "Vintage")
        );
    }

    #[test]
    fn test_oversized_spacing_never_reaches_the_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vhs.toml");
        std::fs::write(&path, "[interlace]\nspacing = 4294967295\n").unwrap();
        assert!(Config::from_file(&path).is_err());

        let mut config = config();
        config.interlace.spacing = u32::MAX;
        assert!(FilterPipeline::new(&config).is_err());

        let pipeline = pipeline();
        let frame = patterned(64, 48);
        assert_eq!(pipeline.process_frame(&frame, "VHS").extent(), (64, 48));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = config();
        config.capture.render_threads = 0;
        assert!(FilterPipeline::new(&config).is_err());
    }
}
