//! Alpha compositing.
//!
//! [`blend`] paints one pixel over another using the paint's alpha as the
//! mix factor. The destination alpha is kept, so blending never makes an
//! opaque target translucent (or the other way round).

use crate::drawbuffer::Drawbuffer;
use crate::pixel::Pixel;

/// How a drawing primitive writes its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrawMode {
    /// Overwrite the target pixel, alpha included.
    #[default]
    Opaque,
    /// Composite onto the target pixel with [`blend`].
    AlphaBlend,
}

/// Composite `paint` over `base`.
///
/// - `paint.a == 0` returns `base` unchanged
/// - `paint.a == 255` returns the paint color with `base.a`
/// - otherwise every color channel is
///   `trunc(base * (1 - a/255) + paint * a/255)` and alpha is `base.a`
#[allow(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn blend(base: Pixel, paint: Pixel) -> Pixel {
    match paint.a {
        0 => base,
        255 => Pixel::rgba(paint.r, paint.g, paint.b, base.a),
        a => {
            let alpha = f64::from(a) / 255.0;
            let inv = 1.0 - alpha;
            // The weighted sum of two u8 values never leaves 0..=255.
            let mix = |b: u8, p: u8| (f64::from(b) * inv + f64::from(p) * alpha) as u8;
            Pixel::rgba(
                mix(base.r, paint.r),
                mix(base.g, paint.g),
                mix(base.b, paint.b),
                base.a,
            )
        }
    }
}

impl Drawbuffer {
    /// Blend `paint` onto the pixel at `(x, y)`. Out-of-range coordinates are ignored.
    pub fn blend_pixel(&mut self, x: i32, y: i32, paint: Pixel) {
        if !self.in_bounds(x, y) {
            return;
        }
        let base = self.get_pixel(x, y);
        self.set_pixel(x, y, blend(base, paint));
    }

    /// Write one pixel according to `mode`.
    pub(crate) fn plot(&mut self, x: i32, y: i32, color: Pixel, mode: DrawMode) {
        match mode {
            DrawMode::Opaque => self.set_pixel(x, y, color),
            DrawMode::AlphaBlend => self.blend_pixel(x, y, color),
        }
    }
}
