use std::time::Duration;

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::error::{FrameError, Result};

/// Number of bytes per pixel in every frame buffer
pub const CHANNELS: usize = 4;

/// Represents a single camera frame
///
/// A thin wrapper around an RGBA8 image buffer. Stages take `&Frame` and hand
/// back a new `Frame`; nothing downstream ever sees its input change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    buffer: RgbaImage,
}

impl Frame {
    /// Create a new frame from an RGBA image buffer
    pub fn new(buffer: RgbaImage) -> Self {
        Self { buffer }
    }

    /// Create a fully transparent frame with the given dimensions
    pub fn new_transparent(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::new(width, height),
        }
    }

    /// Create an opaque frame with the given dimensions filled with an RGB color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgba([color[0], color[1], color[2], 255]));
        Self { buffer }
    }

    /// A frame with no pixels
    pub fn empty() -> Self {
        Self::new_transparent(0, 0)
    }

    /// Get the width of the frame
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Get the height of the frame
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Width and height as a pair
    pub fn extent(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// True when the frame has no pixels to process
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Get a pixel at the given coordinates (returns RGBA array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    /// Set a pixel at the given coordinates
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        self.buffer.put_pixel(x, y, Rgba(color));
    }

    /// Raw interleaved RGBA bytes, row-major
    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Mutable access to the raw interleaved RGBA bytes
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Bytes in one row of pixels
    pub fn row_stride(&self) -> usize {
        self.width() as usize * CHANNELS
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Consume the frame and return the image buffer
    pub fn into_image(self) -> RgbaImage {
        self.buffer
    }

    /// Create a frame from raw RGBA bytes
    pub fn from_rgba_bytes(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let len = data.len();
        ImageBuffer::from_raw(width, height, data)
            .map(|buffer| Self { buffer })
            .ok_or_else(|| FrameError::InvalidBuffer { width, height, len }.into())
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        self.buffer.save(path)?;
        Ok(())
    }
}

impl From<RgbaImage> for Frame {
    fn from(buffer: RgbaImage) -> Self {
        Self::new(buffer)
    }
}

/// A frame tagged with its presentation timestamp
#[derive(Clone, Debug)]
pub struct TimedFrame {
    pub frame: Frame,

    /// Time since the capture clock origin
    pub pts: Duration,
}

impl TimedFrame {
    pub fn new(frame: Frame, pts: Duration) -> Self {
        Self { frame, pts }
    }

    /// Same timestamp, different pixels
    pub fn with_frame(&self, frame: Frame) -> Self {
        Self { frame, pts: self.pts }
    }
}
