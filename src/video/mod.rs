//! # Frame Model
//!
//! Frame buffers and the source/sink interfaces the capture collaborator implements.

pub mod io;
pub mod types;

pub use io::{FrameSink, FrameSource, StillSink, VecSource};
pub use types::{Frame, TimedFrame};
