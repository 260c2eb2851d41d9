//! Block compositor: copy a rectangle of one drawbuffer into another.
//!
//! Source pixels are decoded, optionally scaled up by pixel replication,
//! and encoded in the target's format, so this is also the format
//! conversion path (e.g. an RGBA8888 scene onto an RGB565 panel buffer).

use crate::blend::blend;
use crate::drawbuffer::Drawbuffer;
use crate::error::{DrawbufferError, Result};
use crate::pixel::Pixel;
use crate::raster::clip;

/// What happens to target pixels under the copied block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlphaPolicy {
    /// Overwrite, alpha included.
    #[default]
    Opaque,
    /// Leave the target alone where the source alpha is 0.
    SkipTransparent,
    /// [`blend`] the source over the target. Not available when scaling.
    AlphaBlend,
}

/// Placement of a [`compose`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComposeParams {
    /// Target column of the block's top-left corner
    pub target_x: i32,
    /// Target row of the block's top-left corner
    pub target_y: i32,
    /// Source column to start copying from
    pub source_x: i32,
    /// Source row to start copying from
    pub source_y: i32,
    /// Block width in source pixels; 0 copies the whole source
    pub width: u32,
    /// Block height in source pixels; 0 copies the whole source
    pub height: u32,
    /// Horizontal magnification; 0 is treated as 1
    pub scale_x: u32,
    /// Vertical magnification; 0 follows `scale_x`
    pub scale_y: u32,
    /// How source pixels land on the target
    pub alpha_policy: AlphaPolicy,
}

impl Default for ComposeParams {
    fn default() -> Self {
        Self {
            target_x: 0,
            target_y: 0,
            source_x: 0,
            source_y: 0,
            width: 0,
            height: 0,
            scale_x: 1,
            scale_y: 1,
            alpha_policy: AlphaPolicy::Opaque,
        }
    }
}

impl ComposeParams {
    /// Whole source at `(x, y)` on the target, unscaled.
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            target_x: x,
            target_y: y,
            ..Self::default()
        }
    }

    /// Same placement with a different alpha policy.
    pub fn with_policy(self, alpha_policy: AlphaPolicy) -> Self {
        Self {
            alpha_policy,
            ..self
        }
    }

    /// Same placement with a different magnification.
    pub fn with_scale(self, scale_x: u32, scale_y: u32) -> Self {
        Self {
            scale_x,
            scale_y,
            ..self
        }
    }
}

/// Copy a block of `source` into `target`.
///
/// Every source pixel `(cx, cy)` of the block fills the `scale_x × scale_y`
/// target cell whose top-left corner is
/// `(target_x + cx * scale_x, target_y + cy * scale_y)`. Reads outside the
/// source yield [`Pixel::TRANSPARENT`]; writes outside the target are dropped.
///
/// # Errors
///
/// - [`DrawbufferError::Closed`] if either buffer is closed
/// - [`DrawbufferError::IncompatibleOperation`] for [`AlphaPolicy::AlphaBlend`]
///   with a scale above 1; the target is left untouched
#[allow(clippy::arithmetic_side_effects)]
pub fn compose(source: &Drawbuffer, target: &mut Drawbuffer, params: &ComposeParams) -> Result<()> {
    if source.is_closed() || target.is_closed() {
        return Err(DrawbufferError::Closed);
    }

    let (width, height) = if params.width == 0 || params.height == 0 {
        (source.width(), source.height())
    } else {
        (params.width, params.height)
    };
    let scale_x = params.scale_x.max(1);
    let scale_y = if params.scale_y == 0 { scale_x } else { params.scale_y };

    if params.alpha_policy == AlphaPolicy::AlphaBlend && (scale_x > 1 || scale_y > 1) {
        tracing::debug!(scale_x, scale_y, "compose rejected: alpha blending with scale");
        return Err(DrawbufferError::IncompatibleOperation(
            "alpha blending can't be combined with scaling",
        ));
    }

    if is_full_copy(source, target, params, width, height, scale_x, scale_y) {
        tracing::trace!(bytes = source.byte_length(), "compose fast path");
        return target.load(source.dump());
    }

    tracing::trace!(
        ?params,
        width,
        height,
        scale_x,
        scale_y,
        "compose {} onto {}",
        source,
        target
    );

    // Walk the target pixels covered by the scaled block, already clipped.
    let (tx, ty) = (i64::from(params.target_x), i64::from(params.target_y));
    let (sx, sy) = (i64::from(scale_x), i64::from(scale_y));
    // u32::MAX squared overflows i64, so the far edges saturate.
    let bottom = ty.saturating_add(i64::from(height).saturating_mul(sy));
    let right = tx.saturating_add(i64::from(width).saturating_mul(sx));
    let rows = clip(ty, bottom, target.height());
    let cols = clip(tx, right, target.width());

    for py in rows {
        let cy = (i64::from(py) - ty) / sy;
        let src_y = i64::from(params.source_y) + cy;
        for px in cols.clone() {
            let cx = (i64::from(px) - tx) / sx;
            let src_x = i64::from(params.source_x) + cx;
            let paint = read(source, src_x, src_y);
            match params.alpha_policy {
                AlphaPolicy::Opaque => target.set_pixel(px, py, paint),
                AlphaPolicy::SkipTransparent => {
                    if paint.a != 0 {
                        target.set_pixel(px, py, paint);
                    }
                }
                AlphaPolicy::AlphaBlend => {
                    let base = target.get_pixel(px, py);
                    target.set_pixel(px, py, blend(base, paint));
                }
            }
        }
    }
    Ok(())
}

fn read(source: &Drawbuffer, x: i64, y: i64) -> Pixel {
    match (i32::try_from(x), i32::try_from(y)) {
        (Ok(x), Ok(y)) => source.get_pixel(x, y),
        _ => Pixel::TRANSPARENT,
    }
}

fn is_full_copy(
    source: &Drawbuffer,
    target: &Drawbuffer,
    params: &ComposeParams,
    width: u32,
    height: u32,
    scale_x: u32,
    scale_y: u32,
) -> bool {
    source.pixel_format() == target.pixel_format()
        && source.width() == target.width()
        && source.height() == target.height()
        && width == source.width()
        && height == source.height()
        && params.target_x == 0
        && params.target_y == 0
        && params.source_x == 0
        && params.source_y == 0
        && scale_x == 1
        && scale_y == 1
        && params.alpha_policy == AlphaPolicy::Opaque
}
