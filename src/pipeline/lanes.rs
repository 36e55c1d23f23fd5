//! # Capture Lanes
//!
//! Two independent producers feed the same [`FilterPipeline`]:
//!
//! - the **live lane**: one frame per camera callback, processed on a dedicated
//!   blocking worker and pushed to the preview sink (and the recording sink while
//!   recording)
//! - the **still lane**: one-shot captures on demand
//!
//! The live lane never blocks the capture callback. Frames arriving while the
//! worker is busy and the queue is full are dropped and counted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    error::{LaneError, Result},
    pipeline::{engine::FilterPipeline, selector::FilterSelector},
    video::{
        io::{FrameSink, FrameSource, StillSink},
        types::{Frame, TimedFrame},
    },
};

#[derive(Debug, Default)]
struct LaneCounters {
    offered: AtomicU64,
    dropped: AtomicU64,
    processed: AtomicU64,
    sink_errors: AtomicU64,
}

impl LaneCounters {
    fn snapshot(&self) -> LaneStats {
        LaneStats {
            offered: self.offered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
        }
    }
}

/// Frame counters for the live lane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneStats {
    pub offered: u64,
    pub dropped: u64,
    pub processed: u64,
    pub sink_errors: u64,
}

/// What a finished recording contained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingSummary {
    pub frames: u64,

    /// Timestamp of the last frame relative to the first
    pub duration: Duration,
}

/// Final state of a live lane after shutdown
#[derive(Debug, Clone, Copy)]
pub struct LaneReport {
    pub stats: LaneStats,

    /// Recording that was still running at shutdown
    pub recording: Option<RecordingSummary>,
}

/// Rebases timestamps onto the first recorded frame
struct Recorder {
    sink: Box<dyn FrameSink>,
    origin: Option<Duration>,
    last_pts: Option<Duration>,
    frames: u64,
}

impl Recorder {
    fn new(sink: Box<dyn FrameSink>) -> Self {
        Self {
            sink,
            origin: None,
            last_pts: None,
            frames: 0,
        }
    }

    /// Forward one frame; only frames the sink accepted count toward the summary
    fn push(&mut self, frame: &TimedFrame) -> Result<()> {
        let origin = self.origin.unwrap_or(frame.pts);

        if let Some(last) = self.last_pts {
            if frame.pts <= last {
                warn!("Recording got frame at {:?} after {:?}; forwarding as is", frame.pts, last);
            }
        }

        let relative = TimedFrame::new(frame.frame.clone(), frame.pts.saturating_sub(origin));
        self.sink.push(&relative)?;

        self.origin = Some(origin);
        self.last_pts = Some(frame.pts);
        self.frames += 1;
        Ok(())
    }

    fn summary(&self) -> RecordingSummary {
        let duration = match (self.origin, self.last_pts) {
            (Some(origin), Some(last)) => last.saturating_sub(origin),
            _ => Duration::ZERO,
        };
        RecordingSummary {
            frames: self.frames,
            duration,
        }
    }
}

type SharedRecorder = Arc<Mutex<Option<Recorder>>>;

// A panic inside a sink leaves the recorder itself consistent
fn lock_recorder(recorder: &SharedRecorder) -> MutexGuard<'_, Option<Recorder>> {
    recorder.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Continuous capture lane with drop-if-busy backpressure
pub struct LiveLane {
    sender: mpsc::Sender<TimedFrame>,
    counters: Arc<LaneCounters>,
    recorder: SharedRecorder,
    worker: JoinHandle<()>,
}

impl LiveLane {
    /// Start the lane's worker
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        pipeline: Arc<FilterPipeline>,
        selector: Arc<FilterSelector>,
        preview: Box<dyn FrameSink>,
        capacity: usize,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let counters = Arc::new(LaneCounters::default());
        let recorder: SharedRecorder = Arc::new(Mutex::new(None));

        let worker = {
            let counters = Arc::clone(&counters);
            let recorder = Arc::clone(&recorder);
            tokio::task::spawn_blocking(move || {
                run_worker(receiver, pipeline, selector, preview, counters, recorder)
            })
        };

        info!("Live lane started (queue capacity {})", capacity.max(1));

        Self {
            sender,
            counters,
            recorder,
            worker,
        }
    }

    /// Hand a raw frame to the lane without blocking
    ///
    /// Returns `false` when the frame was dropped because the worker is busy
    /// or the lane has shut down.
    pub fn offer(&self, frame: TimedFrame) -> bool {
        match self.try_offer(frame) {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Frame discarded: {}", e);
                false
            }
        }
    }

    /// Like [`LiveLane::offer`], but a dead worker is an error
    ///
    /// `Ok(false)` means the queue was full and the frame was dropped;
    /// `LaneError::Closed` means the worker has stopped and no frame will be
    /// processed again.
    pub fn try_offer(&self, frame: TimedFrame) -> Result<bool> {
        self.counters.offered.fetch_add(1, Ordering::Relaxed);

        match self.sender.try_send(frame) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(frame)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Live lane busy, dropped frame at {:?}", frame.pts);
                Ok(false)
            }
            Err(TrySendError::Closed(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                Err(LaneError::Closed { lane: "live".to_string() }.into())
            }
        }
    }

    /// Offer every frame a source yields; returns how many were accepted
    pub fn pump(&self, source: &mut dyn FrameSource) -> usize {
        let mut accepted = 0;
        while let Some(frame) = source.next_frame() {
            if self.offer(frame) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Send processed frames to `sink` from the next frame on
    ///
    /// Replaces a running recording and returns its summary.
    pub fn start_recording(&self, sink: Box<dyn FrameSink>) -> Option<RecordingSummary> {
        let previous = lock_recorder(&self.recorder).replace(Recorder::new(sink));
        info!("Recording started");
        previous.map(|r| r.summary())
    }

    /// Stop recording; `None` if nothing was recording
    pub fn stop_recording(&self) -> Option<RecordingSummary> {
        let summary = lock_recorder(&self.recorder).take().map(|r| r.summary());
        if let Some(summary) = &summary {
            info!("Recording stopped: {} frames, {:?}", summary.frames, summary.duration);
        }
        summary
    }

    pub fn is_recording(&self) -> bool {
        lock_recorder(&self.recorder).is_some()
    }

    pub fn stats(&self) -> LaneStats {
        self.counters.snapshot()
    }

    /// Close the lane, let the worker drain queued frames, and report
    pub async fn shutdown(self) -> Result<LaneReport> {
        let LiveLane {
            sender,
            counters,
            recorder,
            worker,
        } = self;

        drop(sender);
        worker.await.map_err(|e| LaneError::WorkerFailed { reason: e.to_string() })?;

        let recording = lock_recorder(&recorder).take().map(|r| r.summary());
        let stats = counters.snapshot();
        info!(
            "Live lane stopped: {} processed, {} dropped of {} offered",
            stats.processed, stats.dropped, stats.offered
        );

        Ok(LaneReport { stats, recording })
    }
}

fn run_worker(
    mut receiver: mpsc::Receiver<TimedFrame>,
    pipeline: Arc<FilterPipeline>,
    selector: Arc<FilterSelector>,
    mut preview: Box<dyn FrameSink>,
    counters: Arc<LaneCounters>,
    recorder: SharedRecorder,
) {
    while let Some(raw) = receiver.blocking_recv() {
        let processed = raw.with_frame(pipeline.process_selected(&raw.frame, &selector));
        counters.processed.fetch_add(1, Ordering::Relaxed);

        if let Err(e) = preview.push(&processed) {
            counters.sink_errors.fetch_add(1, Ordering::Relaxed);
            warn!("Preview sink failed: {}", e);
        }

        if let Some(recording) = lock_recorder(&recorder).as_mut() {
            if let Err(e) = recording.push(&processed) {
                counters.sink_errors.fetch_add(1, Ordering::Relaxed);
                warn!("Recording sink failed: {}", e);
            }
        }
    }
}

/// One-shot still capture lane
pub struct StillLane {
    pipeline: Arc<FilterPipeline>,
    selector: Arc<FilterSelector>,
    sink: Box<dyn StillSink>,
}

impl StillLane {
    pub fn new(
        pipeline: Arc<FilterPipeline>,
        selector: Arc<FilterSelector>,
        sink: Box<dyn StillSink>,
    ) -> Self {
        Self {
            pipeline,
            selector,
            sink,
        }
    }

    /// Filter a raw still with the current selection and deliver it
    pub async fn capture(&mut self, raw: Frame) -> Result<Frame> {
        let mode = self.selector.current();
        let pipeline = Arc::clone(&self.pipeline);

        let processed = tokio::task::spawn_blocking(move || pipeline.process_still(&raw, mode.name()))
            .await
            .map_err(|e| LaneError::WorkerFailed { reason: e.to_string() })?;

        info!(
            "Still captured with {} filter ({}x{})",
            mode,
            processed.width(),
            processed.height()
        );

        self.sink.deliver(processed.clone())?;
        Ok(processed)
    }
}
