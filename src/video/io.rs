//! Collaborator-facing frame interfaces
//!
//! The core never talks to a camera, display or encoder directly. Whatever the
//! host platform provides is wrapped in one of these traits.

use crate::{error::Result, video::types::{Frame, TimedFrame}};

/// Pull-style adapter for a capture device
pub trait FrameSource: Send {
    /// Next raw frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Option<TimedFrame>;
}

/// Consumer of processed frames (preview surface or encoder input)
pub trait FrameSink: Send {
    fn push(&mut self, frame: &TimedFrame) -> Result<()>;
}

/// Consumer of a single processed still image
pub trait StillSink: Send {
    fn deliver(&mut self, frame: Frame) -> Result<()>;
}

impl<F> FrameSink for F
where
    F: FnMut(&TimedFrame) -> Result<()> + Send,
{
    fn push(&mut self, frame: &TimedFrame) -> Result<()> {
        self(frame)
    }
}

impl<F> StillSink for F
where
    F: FnMut(Frame) -> Result<()> + Send,
{
    fn deliver(&mut self, frame: Frame) -> Result<()> {
        self(frame)
    }
}

/// Source backed by an in-memory list of frames
pub struct VecSource {
    frames: std::vec::IntoIter<TimedFrame>,
}

impl VecSource {
    pub fn new(frames: Vec<TimedFrame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> Option<TimedFrame> {
        self.frames.next()
    }
}
