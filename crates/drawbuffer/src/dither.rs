//! Floyd–Steinberg error diffusion.
//!
//! Each pixel is quantized by AND-ing its channels with a mask, and the
//! bits that were dropped are pushed onto the unvisited neighbours:
//!
//! ```text
//!          *    7/16
//!  3/16  5/16   1/16
//! ```
//!
//! Error falling outside the buffer is dropped. Dither a full-color buffer
//! with the masks of the format you'll [`compose`](crate::compose) it into
//! (e.g. [`DitherMasks::RGB565`] before blitting to a 16-bit panel).

use crate::drawbuffer::Drawbuffer;
use crate::error::{DrawbufferError, FormatRef, Result};
use crate::pixel::Pixel;
use crate::pixel_format::PixelFormat;

/// Per-channel quantization masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DitherMasks {
    /// Bits of red to keep
    pub r: u8,
    /// Bits of green to keep
    pub g: u8,
    /// Bits of blue to keep
    pub b: u8,
}

impl DitherMasks {
    /// One bit per channel.
    pub const MONO1: Self = Self::new(0x80, 0x80, 0x80);
    /// 3-3-2 bits.
    pub const RGB332: Self = Self::new(0xE0, 0xE0, 0xC0);
    /// 5-6-5 bits.
    pub const RGB565: Self = Self::new(0xF8, 0xFC, 0xF8);

    /// Custom masks.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Preset for a target bit depth: 1, 8 or 16.
    ///
    /// # Errors
    ///
    /// [`DrawbufferError::UnsupportedFormat`] for any other depth.
    pub fn for_bpp(bpp: u32) -> Result<Self> {
        match bpp {
            1 => Ok(Self::MONO1),
            8 => Ok(Self::RGB332),
            16 => Ok(Self::RGB565),
            other => Err(DrawbufferError::UnsupportedFormat(FormatRef::Bpp(other))),
        }
    }

    /// Preset matching a lossy format's channel depths.
    ///
    /// # Errors
    ///
    /// [`DrawbufferError::UnsupportedFormat`] for formats with no preset
    /// (grayscale and the 8-bit-per-channel formats).
    pub fn for_format(format: PixelFormat) -> Result<Self> {
        match format {
            PixelFormat::Mono1 => Ok(Self::MONO1),
            PixelFormat::Rgb332 => Ok(Self::RGB332),
            PixelFormat::Rgb565 | PixelFormat::Bgr565 => Ok(Self::RGB565),
            other => Err(DrawbufferError::UnsupportedFormat(FormatRef::Name(
                other.name().into(),
            ))),
        }
    }

    fn quantize(self, p: Pixel) -> (Pixel, [u8; 3]) {
        let kept = Pixel::rgba(p.r & self.r, p.g & self.g, p.b & self.b, p.a);
        let err = [p.r & !self.r, p.g & !self.g, p.b & !self.b];
        (kept, err)
    }
}

/// Neighbour offsets and weights (in sixteenths).
const KERNEL: [(i32, i32, u16); 4] = [(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)];

impl Drawbuffer {
    /// Dither the whole buffer in place, in raster order.
    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_wrap)]
    pub fn floyd_steinberg(&mut self, masks: DitherMasks) {
        tracing::trace!(?masks, buffer = %self, "floyd-steinberg pass");
        // Dimensions are at most u16::MAX, so they fit in i32.
        let (width, height) = (self.width() as i32, self.height() as i32);
        for y in 0..height {
            for x in 0..width {
                let (kept, err) = masks.quantize(self.get_pixel(x, y));
                self.set_pixel(x, y, kept);
                for (dx, dy, weight) in KERNEL {
                    self.diffuse(x + dx, y + dy, weight, err);
                }
            }
        }
    }

    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    fn diffuse(&mut self, x: i32, y: i32, weight: u16, err: [u8; 3]) {
        if !self.in_bounds(x, y) {
            return;
        }
        let t = self.get_pixel(x, y);
        // u16 sum, clamped back into u8
        let add = |c: u8, e: u8| (u16::from(c) + ((u16::from(e) * weight) >> 4)).min(255) as u8;
        let [er, eg, eb] = err;
        self.set_pixel(x, y, Pixel::rgba(add(t.r, er), add(t.g, eg), add(t.b, eb), t.a));
    }
}
