use std::sync::Arc;

use tracing::warn;

use crate::{
    config::Config,
    filters::{
        context::RenderContext,
        entropy::EntropySource,
        traits::{try_apply, Stage},
    },
    video::types::Frame,
};

use super::{AberrationStage, GradeStage, InterlaceStage, NoiseStage, ScratchStage};

/// Result of running the chain on one frame
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub frame: Frame,

    /// Stages that ran successfully before the chain stopped
    pub completed: usize,

    /// Name of the stage that failed, if any
    pub failed_stage: Option<String>,
}

/// The fixed five-stage VHS sequence
///
/// Order: interlace → noise → chromatic aberration → tape scratches → color grade.
pub struct VhsChain {
    stages: Vec<Box<dyn Stage>>,
}

impl VhsChain {
    pub fn from_config(config: &Config, source: Arc<dyn EntropySource>) -> Self {
        Self::from_stages(vec![
            Box::new(InterlaceStage::from_config(&config.interlace)),
            Box::new(NoiseStage::from_config(&config.noise, Arc::clone(&source))),
            Box::new(AberrationStage::from_config(&config.aberration)),
            Box::new(ScratchStage::from_config(&config.scratches, source)),
            Box::new(GradeStage::from_config(&config.grade)),
        ])
    }

    /// Build a chain from arbitrary stages, run in the given order
    pub fn from_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[Box<dyn Stage>] {
        &self.stages
    }

    /// Run every stage in order, stopping at the first failure
    ///
    /// The returned frame is the output of the last stage that succeeded, or a
    /// copy of the input when the very first stage fails.
    pub fn run(&self, frame: &Frame, ctx: &RenderContext) -> ChainOutcome {
        let mut current: Option<Frame> = None;

        for (i, stage) in self.stages.iter().enumerate() {
            let input = current.as_ref().unwrap_or(frame);
            match try_apply(stage.as_ref(), input, ctx) {
                Ok(out) => current = Some(out),
                Err(e) => {
                    warn!(
                        "VHS chain stopped at stage {} '{}': {}",
                        i + 1,
                        stage.name(),
                        e
                    );
                    return ChainOutcome {
                        frame: current.unwrap_or_else(|| frame.clone()),
                        completed: i,
                        failed_stage: Some(stage.name().to_string()),
                    };
                }
            }
        }

        ChainOutcome {
            frame: current.unwrap_or_else(|| frame.clone()),
            completed: self.stages.len(),
            failed_stage: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoiseConfig;
    use crate::filters::entropy::{FailingEntropy, FlakyEntropy, ThreadEntropy};

    #[test]
    fn test_stage_order() {
        let chain = VhsChain::from_config(&Config::default(), Arc::new(ThreadEntropy));
        let names: Vec<&str> = chain.stages().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            ["interlace", "noise", "chromatic_aberration", "tape_scratches", "color_grade"]
        );
    }

    #[test]
    fn test_failure_returns_prior_stage_output() {
        let ctx = RenderContext::new(2).unwrap();
        let chain = VhsChain::from_config(&Config::default(), Arc::new(FailingEntropy));
        let frame = Frame::new_filled(120, 40, [180, 90, 60]);

        let outcome = chain.run(&frame, &ctx);
        assert_eq!(outcome.completed, 1);
        assert_eq!(outcome.failed_stage.as_deref(), Some("noise"));

        let interlaced = InterlaceStage::new().apply(&frame, &ctx).unwrap();
        assert_eq!(outcome.frame, interlaced);
    }

    #[test]
    fn test_scratch_failure_returns_aberration_output() {
        let ctx = RenderContext::new(2).unwrap();
        let frame = Frame::new_filled(120, 40, [180, 90, 60]);

        // Grain draws once, then the scratch stage finds the source exhausted
        let chain = VhsChain::from_config(&Config::default(), Arc::new(FlakyEntropy::new(1)));
        let outcome = chain.run(&frame, &ctx);
        assert_eq!(outcome.completed, 3);
        assert_eq!(outcome.failed_stage.as_deref(), Some("tape_scratches"));

        let reference = VhsChain::from_config(&Config::default(), Arc::new(FlakyEntropy::new(1)));
        let mut expected = frame.clone();
        for stage in &reference.stages()[..3] {
            expected = stage.apply(&expected, &ctx).unwrap();
        }
        assert_eq!(outcome.frame, expected);
    }

    #[test]
    fn test_unvalidated_interlace_spacing_does_not_panic() {
        let ctx = RenderContext::new(2).unwrap();
        let mut config = Config::default();
        config.interlace.spacing = u32::MAX;

        let chain = VhsChain::from_config(&config, Arc::new(ThreadEntropy));
        let frame = Frame::new_filled(64, 48, [120, 120, 120]);
        let outcome = chain.run(&frame, &ctx);
        assert_eq!(outcome.completed, 5);
        assert_eq!(outcome.frame.extent(), (64, 48));
    }

    #[test]
    fn test_first_stage_failure_returns_input() {
        let ctx = RenderContext::new(1).unwrap();
        let chain = VhsChain::from_stages(vec![Box::new(NoiseStage::from_config(
            &NoiseConfig::default(),
            Arc::new(FailingEntropy),
        ))]);
        let frame = Frame::new_filled(8, 8, [1, 2, 3]);

        let outcome = chain.run(&frame, &ctx);
        assert_eq!(outcome.completed, 0);
        assert_eq!(outcome.frame, frame);
    }

    #[test]
    fn test_full_chain_alters_white_frame() {
        let ctx = RenderContext::new(4).unwrap();
        let chain = VhsChain::from_config(&Config::default(), Arc::new(ThreadEntropy));
        let frame = Frame::new_filled(640, 480, [255, 255, 255]);

        let outcome = chain.run(&frame, &ctx);
        assert_eq!(outcome.completed, 5);
        assert_eq!(outcome.frame.extent(), (640, 480));
        assert_ne!(outcome.frame, frame);
        assert!(outcome.frame.as_raw().iter().any(|&v| v > 128));
    }
}
