use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use vhs_camera::{
    config::Config,
    filters::{FilterMode, Preset, Stage},
    pipeline::{FilterPipeline, FilterSelector, LiveLane, StillLane},
    video::{Frame, FrameSink, StillSink, TimedFrame},
};

#[derive(Parser)]
#[command(
    name = "vhs-camera",
    version,
    about = "Apply real-time VHS-style filters to camera frames",
    long_about = "VHS-Camera runs stills and frame sequences through the same filter pipeline a live camera preview uses: interlace stripes, grain, chromatic aberration, tape scratches and a color grade, or one of the single-stage presets."
)]
struct Cli {
    /// Configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Filter a single photo through the still lane
    Still {
        /// Input image (PNG or JPEG)
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG (defaults to a timestamped name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Filter to apply (VHS, Retro, 1980s, Vintage, Noise, Original)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Play a directory of frames through the live lane and record the result
    Record {
        /// Directory of numbered input frames
        #[arg(short = 'i', long)]
        frames: PathBuf,

        /// Directory for the recorded frames
        #[arg(short, long)]
        output: PathBuf,

        /// Filter to apply
        #[arg(short, long)]
        filter: Option<String>,

        /// Capture rate the frames are offered at
        #[arg(long, default_value_t = 30)]
        fps: u32,
    },

    /// List available filters and their stages
    Filters,
}

/// Writes each recorded frame as a numbered PNG
struct PngSequenceSink {
    dir: PathBuf,
    written: usize,
}

impl FrameSink for PngSequenceSink {
    fn push(&mut self, frame: &TimedFrame) -> vhs_camera::Result<()> {
        let path = self
            .dir
            .join(format!("frame_{:05}_{:06}ms.png", self.written, frame.pts.as_millis()));
        frame.frame.save_png(&path)?;
        self.written += 1;
        Ok(())
    }
}

/// Counts preview frames; stands in for a display
struct PreviewCounter {
    shown: usize,
}

impl FrameSink for PreviewCounter {
    fn push(&mut self, frame: &TimedFrame) -> vhs_camera::Result<()> {
        self.shown += 1;
        debug!("Preview frame {} at {:?}", self.shown, frame.pts);
        Ok(())
    }
}

struct PngStillSink {
    path: PathBuf,
}

impl StillSink for PngStillSink {
    fn deliver(&mut self, frame: Frame) -> vhs_camera::Result<()> {
        frame.save_png(&self.path)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting VHS-Camera v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            debug!("Using default configuration");
            Config::default()
        }
    };

    match cli.command {
        Command::Still {
            input,
            output,
            filter,
        } => run_still(&config, &input, output, filter).await,
        Command::Record {
            frames,
            output,
            filter,
            fps,
        } => run_record(&config, &frames, &output, filter, fps).await,
        Command::Filters => list_filters(&config),
    }
}

fn build_pipeline(config: &Config, filter: Option<String>) -> Result<(Arc<FilterPipeline>, Arc<FilterSelector>)> {
    let pipeline = FilterPipeline::new(config).context("Failed to create filter pipeline")?;

    let name = filter.unwrap_or_else(|| config.capture.initial_filter.clone());
    if !pipeline.registry().has_filter(&name) {
        warn!("Unknown filter '{}', frames will pass through unchanged", name);
    }
    let selector = FilterSelector::from_name(pipeline.registry(), &name);
    info!("Using {} filter", selector.current());

    Ok((Arc::new(pipeline), Arc::new(selector)))
}

fn load_frame(path: &Path) -> Result<Frame> {
    let image = image::open(path).with_context(|| format!("Failed to read image {:?}", path))?;
    Ok(Frame::from(image.to_rgba8()))
}

fn default_still_name() -> PathBuf {
    PathBuf::from(format!("VHS_{}.png", chrono::Local::now().format("%Y%m%d_%H%M%S")))
}

async fn run_still(config: &Config, input: &Path, output: Option<PathBuf>, filter: Option<String>) -> Result<()> {
    let (pipeline, selector) = build_pipeline(config, filter)?;
    let output = output.unwrap_or_else(default_still_name);

    let raw = load_frame(input)?;
    info!("Input: {:?} ({}x{})", input, raw.width(), raw.height());

    let mut lane = StillLane::new(pipeline, selector, Box::new(PngStillSink { path: output.clone() }));
    lane.capture(raw).await?;

    info!("Still saved to: {:?}", output);
    Ok(())
}

fn collect_frame_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read frame directory {:?}", dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

async fn run_record(
    config: &Config,
    frames_dir: &Path,
    output: &Path,
    filter: Option<String>,
    fps: u32,
) -> Result<()> {
    let paths = collect_frame_paths(frames_dir)?;
    if paths.is_empty() {
        anyhow::bail!("No PNG or JPEG frames found in {:?}", frames_dir);
    }
    fs::create_dir_all(output).with_context(|| format!("Failed to create {:?}", output))?;
    info!("Recording {} frames at {} fps", paths.len(), fps);

    let (pipeline, selector) = build_pipeline(config, filter)?;
    let lane = LiveLane::spawn(
        pipeline,
        selector,
        Box::new(PreviewCounter { shown: 0 }),
        config.capture.queue_capacity,
    );
    lane.start_recording(Box::new(PngSequenceSink {
        dir: output.to_path_buf(),
        written: 0,
    }));

    let frame_interval = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
    let mut ticker = tokio::time::interval(frame_interval);
    for (index, path) in paths.iter().enumerate() {
        ticker.tick().await;
        let frame = load_frame(path)?;
        lane.offer(TimedFrame::new(frame, frame_interval * index as u32));
    }

    let report = lane.shutdown().await?;
    let recorded = report.recording.map(|r| r.frames).unwrap_or(0);

    info!(
        "Recording complete: {} frames written, {} dropped of {} offered",
        recorded, report.stats.dropped, report.stats.offered
    );
    if report.stats.sink_errors > 0 {
        warn!("{} frames failed to reach a sink", report.stats.sink_errors);
    }
    info!("Output saved to: {:?}", output);
    Ok(())
}

fn print_stage(stage: &dyn Stage) {
    let metadata = stage.metadata();
    println!(
        "    {:<10} {:?}{}",
        stage.name(),
        metadata.kind,
        if metadata.deterministic { "" } else { " (random)" }
    );
    for (key, value) in &metadata.parameters {
        println!("      {} = {}", key, value);
    }
}

fn list_filters(config: &Config) -> Result<()> {
    let pipeline = FilterPipeline::new(config)?;

    println!("Available filters:");
    for name in pipeline.registry().available_filters() {
        let mode = pipeline.resolve(name);
        println!("  {}", name);
        match mode {
            FilterMode::Identity => println!("    passes frames through unchanged"),
            FilterMode::VhsChain => {
                for stage in pipeline.chain().stages() {
                    print_stage(stage.as_ref());
                }
            }
            FilterMode::Preset(preset) => {
                if let Some(stage) = pipeline.preset_stage(preset) {
                    print_stage(stage);
                }
            }
        }
    }

    println!();
    println!(
        "Aliases: 80s -> {}, Noise-reduction -> {}, None -> {}",
        Preset::Eighties,
        Preset::NoiseReduction,
        FilterMode::Identity
    );
    Ok(())
}
