//! Software rasterizer.
//!
//! All primitives are methods on [`Drawbuffer`](crate::Drawbuffer) and take
//! signed coordinates; anything that falls outside the buffer is clipped.
//! Fills, exact lines and anti-aliased shapes clamp their scan loops to
//! the buffer up front, so a huge shape costs no more than its visible
//! part. The midpoint circle outline is the exception: it is culled when
//! the ring misses the buffer, otherwise it walks the full octant.
//!
//! | Primitive | Module | Modes |
//! |-----------|--------|-------|
//! | `line` | [`line`] | exact (opaque / blended), anti-aliased capsule |
//! | `rectangle` | [`rect`] | fill / outline × opaque / blended |
//! | `triangle` | [`triangle`] | scanline fill, opaque / blended |
//! | `circle` | [`circle`] | midpoint or SDF, fill / outline |

pub mod circle;
pub mod line;
pub mod rect;
pub mod triangle;

use core::ops::Range;

/// How a line is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineMode {
    /// Bresenham, overwriting pixels.
    #[default]
    Opaque,
    /// Bresenham, blending each pixel.
    AlphaBlend,
    /// Capsule-shaped line with smooth edges, always blended.
    ///
    /// A non-positive or NaN radius is treated as 1.
    AntiAliased {
        /// Half-thickness in pixels
        radius: f32,
    },
}

/// Whether a closed shape is filled or only outlined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shape {
    /// Paint the interior.
    #[default]
    Fill,
    /// Paint the boundary only.
    Outline,
}

/// Intersect `[lo, hi)` with `[0, limit)`.
pub(crate) fn clip(lo: i64, hi: i64, limit: u32) -> Range<i32> {
    let limit = i64::from(limit);
    let start = lo.clamp(0, limit);
    let end = hi.clamp(start, limit);
    // Both ends lie in 0..=limit, and limit fits in i32.
    let start = i32::try_from(start).unwrap_or(i32::MAX);
    let end = i32::try_from(end).unwrap_or(i32::MAX);
    start..end
}
