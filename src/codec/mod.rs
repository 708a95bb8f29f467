//! Pixel buffers and the image codec seam used by the engine.

pub(crate) mod png_codec;

use std::sync::Arc;

use crate::foundation::error::{PimgError, PimgResult};

/// Straight (non-premultiplied) RGBA8 pixel.
pub type Rgba8 = [u8; 4];

#[derive(Clone, Debug, PartialEq, Eq)]
/// Owned row-major straight-alpha RGBA8 pixel buffer.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    rgba8: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA8 bytes; `rgba8.len()` must be `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, rgba8: Vec<u8>) -> PimgResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if rgba8.len() != expected {
            return Err(PimgError::validation(format!(
                "pixel buffer {width}x{height} expects {expected} bytes, got {}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8,
        })
    }

    /// Buffer with every pixel set to `px`.
    pub fn filled(width: u32, height: u32, px: Rgba8) -> Self {
        let n = (width as usize) * (height as usize);
        Self {
            width,
            height,
            rgba8: px.repeat(n),
        }
    }

    /// Buffer whose pixels are produced by `f(x, y)`.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba8) -> Self {
        let mut rgba8 = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for y in 0..height {
            for x in 0..width {
                rgba8.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            rgba8,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw row-major RGBA8 bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.rgba8
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        let i = self.index(x, y)?;
        let px = &self.rgba8[i..i + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Mutable row slice `[x0, x1)` of row `y`. Bounds are checked by the caller.
    pub(crate) fn row_mut(&mut self, y: u32, x0: u32, x1: u32) -> &mut [u8] {
        let start = ((y as usize) * (self.width as usize) + x0 as usize) * 4;
        let end = start + (x1 - x0) as usize * 4;
        &mut self.rgba8[start..end]
    }

    /// Row slice `[x0, x1)` of row `y`. Bounds are checked by the caller.
    pub(crate) fn row(&self, y: u32, x0: u32, x1: u32) -> &[u8] {
        let start = ((y as usize) * (self.width as usize) + x0 as usize) * 4;
        let end = start + (x1 - x0) as usize * 4;
        &self.rgba8[start..end]
    }

    /// Iterate alpha values in row-major order.
    pub fn alphas(&self) -> impl Iterator<Item = u8> + '_ {
        self.rgba8.chunks_exact(4).map(|px| px[3])
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(((y as usize) * (self.width as usize) + x as usize) * 4)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// How the encoded source image expressed transparency before expansion to RGBA8.
pub enum AlphaSource {
    /// Per-pixel alpha channel (RGBA or gray+alpha).
    Channel,
    /// Indexed color with a declared transparency key (`tRNS`).
    PaletteKey,
    /// No transparency information.
    None,
}

#[derive(Clone, Debug)]
/// Decoded tile: shared straight-alpha pixels plus the source's transparency model.
pub struct DecodedImage {
    /// Decoded pixels, shared so a cached base is never copied until it is blended.
    pub pixels: Arc<PixelBuffer>,
    /// Transparency model of the encoded source.
    pub alpha: AlphaSource,
}

impl DecodedImage {
    /// Wrap a synthetic buffer with an explicit transparency model.
    pub fn new(pixels: PixelBuffer, alpha: AlphaSource) -> Self {
        Self {
            pixels: Arc::new(pixels),
            alpha,
        }
    }
}

/// Decode/encode capability consumed by the classification and composition engine.
///
/// Implementations must be lossless and deterministic: encoding the same buffer twice yields
/// identical bytes.
pub trait ImageCodec: Send + Sync {
    /// Decode encoded tile bytes to straight-alpha RGBA8.
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<DecodedImage>;

    /// Encode a pixel buffer.
    fn encode(&self, pixels: &PixelBuffer) -> anyhow::Result<Vec<u8>>;
}

#[cfg(test)]
#[path = "../../tests/unit/codec/pixels.rs"]
mod tests;
