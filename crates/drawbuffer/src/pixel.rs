//! Canonical pixel value shared by the codec and the rasterizer.
//!
//! Every [`PixelFormat`](crate::PixelFormat) decodes to and encodes from this
//! 4-channel form. The packed `u32` layout is `0xRRGGBBAA`.

use crate::error::{DrawbufferError, Result};

/// Canonical RGBA pixel, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pixel {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha (255 = opaque)
    pub a: u8,
}

impl Pixel {
    /// Fully transparent black, returned for out-of-bounds reads.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Opaque white
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Create a pixel from all four channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque pixel.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Unpack from `0xRRGGBBAA`.
    pub const fn from_u32(packed: u32) -> Self {
        let [r, g, b, a] = packed.to_be_bytes();
        Self { r, g, b, a }
    }

    /// Pack into `0xRRGGBBAA`.
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Build a pixel from caller-supplied integers, rejecting anything
    /// outside `0..=255`.
    #[allow(clippy::cast_precision_loss)]
    pub fn try_from_channels(r: i64, g: i64, b: i64, a: i64) -> Result<Self> {
        let channel = |value: i64| {
            u8::try_from(value).map_err(|_| DrawbufferError::InvalidChannelValue {
                value: value as f64,
            })
        };
        Ok(Self::rgba(channel(r)?, channel(g)?, channel(b)?, channel(a)?))
    }

    /// Convert the color channels to HSV. Alpha is ignored.
    pub fn to_hsv(self) -> Hsv {
        Hsv::from_rgb(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

impl From<u32> for Pixel {
    fn from(packed: u32) -> Self {
        Self::from_u32(packed)
    }
}

impl From<Pixel> for u32 {
    fn from(p: Pixel) -> Self {
        p.to_u32()
    }
}

impl From<[u8; 4]> for Pixel {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r, g, b, a)
    }
}

/// Hue/saturation/value triple, every component in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hsv {
    /// Hue as a fraction of a full turn
    pub h: f32,
    /// Saturation
    pub s: f32,
    /// Value
    pub v: f32,
}

// Channel math on normalized floats; the only casts are the final
// `(c * 255) as u8` truncations, which saturate.
#[allow(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::arithmetic_side_effects
)]
impl Hsv {
    /// Convert normalized RGB (`0.0..=1.0` per channel) to HSV.
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        let max_v = r.max(g).max(b);
        let min_v = r.min(g).min(b);
        let delta = max_v - min_v;

        if delta <= 0.0 {
            return Self {
                h: 0.0,
                s: 0.0,
                v: max_v,
            };
        }

        let mut h = if max_v == r {
            libm::fmodf((g - b) / delta, 6.0) / 6.0
        } else if max_v == g {
            ((b - r) / delta + 2.0) / 6.0
        } else {
            ((r - g) / delta + 4.0) / 6.0
        };
        if h < 0.0 {
            h += 1.0;
        }
        let s = if max_v > 0.0 { delta / max_v } else { 0.0 };

        Self { h, s, v: max_v }
    }

    /// Convert to normalized RGB (`0.0..=1.0` per channel).
    pub fn to_rgb(self) -> (f32, f32, f32) {
        let c = self.v * self.s;
        let h_6 = libm::fmodf(self.h * 6.0, 6.0);
        let x = c * (1.0 - libm::fabsf(libm::fmodf(h_6, 2.0) - 1.0));
        let m = self.v - c;

        let (r, g, b) = if (0.0..1.0).contains(&h_6) {
            (c, x, 0.0)
        } else if (1.0..2.0).contains(&h_6) {
            (x, c, 0.0)
        } else if (2.0..3.0).contains(&h_6) {
            (0.0, c, x)
        } else if (3.0..4.0).contains(&h_6) {
            (0.0, x, c)
        } else if (4.0..5.0).contains(&h_6) {
            (x, 0.0, c)
        } else if (5.0..6.0).contains(&h_6) {
            (c, 0.0, x)
        } else {
            (0.0, 0.0, 0.0)
        };

        (r + m, g + m, b + m)
    }

    /// Convert to a [`Pixel`] with the given alpha.
    ///
    /// Fails with [`DrawbufferError::InvalidChannelValue`] when a component
    /// lies outside `0.0..=1.0` (or is NaN).
    pub fn to_pixel(self, alpha: u8) -> Result<Pixel> {
        for component in [self.h, self.s, self.v] {
            if !(0.0..=1.0).contains(&component) {
                return Err(DrawbufferError::InvalidChannelValue {
                    value: f64::from(component),
                });
            }
        }
        let (r, g, b) = self.to_rgb();
        Ok(Pixel::rgba(
            (r * 255.0) as u8,
            (g * 255.0) as u8,
            (b * 255.0) as u8,
            alpha,
        ))
    }
}
