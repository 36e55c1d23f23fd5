//! # Rendering Context
//!
//! Shared compositing and rasterization resource used by every stage.
//!
//! Pixel math (compositing, color remaps, shifts) runs row-parallel on the
//! context's own rayon pool and never takes a lock. Rasterization goes through a
//! stateful pen (fill color, stroke color, line width) that must not be shared by
//! two drawing sessions at once: the shared pen is locked for the duration of the
//! drawing calls only, and a caller that finds it busy draws with a private pen
//! instead of waiting.

use std::sync::{Mutex, TryLockError};

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use tracing::debug;

use crate::{
    error::{FrameError, Result, StageError},
    video::types::{Frame, CHANNELS},
};

/// Largest width or height any stage will allocate for
pub const MAX_DIMENSION: u32 = 16_384;

/// Reject extents that cannot be backed by a single RGBA allocation
pub fn check_geometry(width: u32, height: u32) -> Result<usize> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(StageError::UnsupportedGeometry { width, height }.into());
    }

    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
        .ok_or_else(|| StageError::UnsupportedGeometry { width, height }.into())
}

/// Drawing state for rasterized overlays
#[derive(Debug, Clone)]
pub struct Pen {
    fill: Rgba<u8>,
    stroke: Rgba<u8>,
    line_width: u32,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            fill: Rgba([0, 0, 0, 255]),
            stroke: Rgba([0, 0, 0, 255]),
            line_width: 1,
        }
    }
}

/// One rasterization pass onto a transparent canvas
pub struct DrawSession<'a> {
    pen: &'a mut Pen,
    canvas: RgbaImage,
}

impl DrawSession<'_> {
    pub fn set_fill_color(&mut self, rgb: [u8; 3], opacity: f32) {
        self.pen.fill = Rgba([rgb[0], rgb[1], rgb[2], opacity_to_alpha(opacity)]);
    }

    pub fn set_stroke_color(&mut self, rgb: [u8; 3], opacity: f32) {
        self.pen.stroke = Rgba([rgb[0], rgb[1], rgb[2], opacity_to_alpha(opacity)]);
    }

    pub fn set_line_width(&mut self, width: u32) {
        self.pen.line_width = width.max(1);
    }

    /// Fill a rectangle with the current fill color, clipped to the canvas
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let color = self.pen.fill;
        self.blend_rect(x, y, width, height, color);
    }

    /// Stroke a full-height vertical line centered on column `x`
    pub fn stroke_vertical_line(&mut self, x: u32) {
        let width = self.pen.line_width;
        let left = x.saturating_sub((width - 1) / 2);
        let height = self.canvas.height();
        let color = self.pen.stroke;
        self.blend_rect(left, 0, width, height, color);
    }

    fn blend_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
        let x_end = x.saturating_add(width).min(self.canvas.width());
        let y_end = y.saturating_add(height).min(self.canvas.height());

        for py in y..y_end {
            for px in x..x_end {
                let dst = self.canvas.get_pixel_mut(px, py);
                dst.0 = blend_over(color.0, dst.0);
            }
        }
    }

    fn finish(self) -> Frame {
        Frame::new(self.canvas)
    }
}

/// Process-wide compositor shared by all stages
pub struct RenderContext {
    pool: rayon::ThreadPool,
    pen: Mutex<Pen>,
}

impl RenderContext {
    /// Create a context with its own compute pool of `threads` workers
    pub fn new(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("vhs-render-{}", i))
            .build()
            .map_err(|e| StageError::ContextUnavailable { reason: e.to_string() })?;

        debug!("Rendering context created with {} threads", pool.current_num_threads());

        Ok(Self {
            pool,
            pen: Mutex::new(Pen::default()),
        })
    }

    /// Number of worker threads in the compute pool
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` inside the context's compute pool
    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Rasterize onto a transparent canvas of the given extent
    pub fn rasterize<F>(&self, width: u32, height: u32, draw: F) -> Result<Frame>
    where
        F: FnOnce(&mut DrawSession<'_>),
    {
        check_geometry(width, height)?;
        let canvas = RgbaImage::new(width, height);

        match self.pen.try_lock() {
            Ok(mut pen) => {
                let mut session = DrawSession { pen: &mut *pen, canvas };
                draw(&mut session);
                Ok(session.finish())
            }
            Err(TryLockError::WouldBlock) => {
                debug!("Shared pen busy, drawing with a private pen");
                let mut pen = Pen::default();
                let mut session = DrawSession { pen: &mut pen, canvas };
                draw(&mut session);
                Ok(session.finish())
            }
            Err(TryLockError::Poisoned(_)) => Err(StageError::ContextUnavailable {
                reason: "drawing pen poisoned by a panicked stage".to_string(),
            }
            .into()),
        }
    }

    /// Alpha-over composite `top` onto `bottom`; both must share an extent
    pub fn composite_over(&self, top: &Frame, bottom: &Frame) -> Result<Frame> {
        self.zip_pixels(top, bottom, blend_over)
    }

    /// Per-channel clamped addition, alpha included
    pub fn add(&self, a: &Frame, b: &Frame) -> Result<Frame> {
        self.zip_pixels(a, b, |p, q| {
            [
                p[0].saturating_add(q[0]),
                p[1].saturating_add(q[1]),
                p[2].saturating_add(q[2]),
                p[3].saturating_add(q[3]),
            ]
        })
    }

    /// Apply a pixel-wise color remap
    pub fn map_pixels<F>(&self, frame: &Frame, f: F) -> Frame
    where
        F: Fn([u8; 4]) -> [u8; 4] + Sync + Send,
    {
        let mut out = frame.clone();
        self.install(|| {
            out.as_raw_mut().par_chunks_mut(CHANNELS).for_each(|px| {
                let mapped = f([px[0], px[1], px[2], px[3]]);
                px.copy_from_slice(&mapped);
            });
        });
        out
    }

    /// Build a frame row by row; `f` receives the row index and a zeroed row
    pub fn render_rows<F>(&self, width: u32, height: u32, f: F) -> Result<Frame>
    where
        F: Fn(u32, &mut [u8]) + Sync + Send,
    {
        let len = check_geometry(width, height)?;
        let stride = width as usize * CHANNELS;
        let mut data = vec![0u8; len];

        if stride > 0 {
            self.install(|| {
                data.par_chunks_mut(stride)
                    .enumerate()
                    .for_each(|(y, row)| f(y as u32, row));
            });
        }

        Frame::from_rgba_bytes(width, height, data)
    }

    /// Translate horizontally by `dx` pixels, re-cropped to the original extent.
    /// Exposed pixels are transparent black.
    pub fn shift_horizontal(&self, frame: &Frame, dx: i64) -> Result<Frame> {
        let (width, height) = frame.extent();
        let stride = frame.row_stride();
        let src = frame.as_raw();

        self.render_rows(width, height, |y, row| {
            let src_row = &src[y as usize * stride..(y as usize + 1) * stride];
            for x in 0..width as i64 {
                let sx = x - dx;
                if sx < 0 || sx >= width as i64 {
                    continue;
                }
                let d = x as usize * CHANNELS;
                let s = sx as usize * CHANNELS;
                row[d..d + CHANNELS].copy_from_slice(&src_row[s..s + CHANNELS]);
            }
        })
    }

    fn zip_pixels<F>(&self, a: &Frame, b: &Frame, f: F) -> Result<Frame>
    where
        F: Fn([u8; 4], [u8; 4]) -> [u8; 4] + Sync + Send,
    {
        if a.extent() != b.extent() {
            return Err(FrameError::ExtentMismatch {
                expected: b.extent(),
                actual: a.extent(),
            }
            .into());
        }

        let mut out = b.clone();
        let src = a.as_raw();
        self.install(|| {
            out.as_raw_mut()
                .par_chunks_mut(CHANNELS)
                .zip(src.par_chunks(CHANNELS))
                .for_each(|(dst, top)| {
                    let mixed = f([top[0], top[1], top[2], top[3]], [dst[0], dst[1], dst[2], dst[3]]);
                    dst.copy_from_slice(&mixed);
                });
        });
        Ok(out)
    }
}

fn opacity_to_alpha(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Porter-Duff source-over for straight-alpha RGBA8
fn blend_over(top: [u8; 4], bottom: [u8; 4]) -> [u8; 4] {
    let ta = top[3] as f32 / 255.0;
    if ta <= 0.0 {
        return bottom;
    }
    let ba = bottom[3] as f32 / 255.0;
    let out_a = ta + ba * (1.0 - ta);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (top[c] as f32 * ta + bottom[c] as f32 * ba * (1.0 - ta)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    out
}
