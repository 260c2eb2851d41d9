//! Lines: integer Bresenham and an anti-aliased capsule.

use super::{clip, LineMode};
use crate::blend::DrawMode;
use crate::drawbuffer::Drawbuffer;
use crate::pixel::Pixel;

impl Drawbuffer {
    /// Draw a line from `(x0, y0)` to `(x1, y1)`, both endpoints included.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Pixel, mode: LineMode) {
        tracing::trace!(x0, y0, x1, y1, ?mode, "line");
        match mode {
            LineMode::Opaque => self.bresenham(x0, y0, x1, y1, color, DrawMode::Opaque),
            LineMode::AlphaBlend => self.bresenham(x0, y0, x1, y1, color, DrawMode::AlphaBlend),
            LineMode::AntiAliased { radius } => self.capsule(x0, y0, x1, y1, color, radius),
        }
    }

    /// Bresenham, evaluated per step along the major axis.
    ///
    /// After `j` major steps the minor offset is
    /// `floor((j * minor + ceil(major / 2) - 1) / major)`, which is exactly
    /// where the incremental error walk lands. Only the steps whose major
    /// coordinate falls inside the buffer are visited.
    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    fn bresenham(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Pixel, mode: DrawMode) {
        let dx = i64::from(x1) - i64::from(x0);
        let dy = i64::from(y1) - i64::from(y0);
        // 45° lines walk along y
        let x_major = dx.abs() > dy.abs();
        let (m0, n0, dm, dn, limit) = if x_major {
            (i64::from(x0), i64::from(y0), dx, dy, self.width())
        } else {
            (i64::from(y0), i64::from(x0), dy, dx, self.height())
        };

        let major = dm.abs();
        if major == 0 {
            self.plot(x0, y0, color, mode);
            return;
        }
        let (sm, sn) = (dm.signum(), dn.signum());
        let minor = i128::from(dn.abs());
        let bias = i128::from((major + 1) / 2 - 1);

        let last = i64::from(limit) - 1;
        let (lo, hi) = if sm > 0 { (-m0, last - m0) } else { (m0 - last, m0) };
        for j in lo.max(0)..=hi.min(major) {
            // offset <= |dn|, so the minor coordinate stays between n0 and n1
            let offset = ((i128::from(j) * minor + bias) / i128::from(major)) as i64;
            let m = m0 + sm * j;
            let n = n0 + sn * offset;
            let (x, y) = if x_major { (m, n) } else { (n, m) };
            if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
                self.plot(x, y, color, mode);
            }
        }
    }

    #[allow(
        clippy::arithmetic_side_effects,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn capsule(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Pixel, radius: f32) {
        let radius = if radius > 0.0 { radius } else { 1.0 };
        let (ax, ay, bx, by) = (x0 as f32, y0 as f32, x1 as f32, y1 as f32);

        let rows = clip(
            libm::floorf(ay.min(by) - radius) as i64,
            (libm::ceilf(ay.max(by) + radius) as i64).saturating_add(1),
            self.height(),
        );
        let cols = clip(
            libm::floorf(ax.min(bx) - radius) as i64,
            (libm::ceilf(ax.max(bx) + radius) as i64).saturating_add(1),
            self.width(),
        );

        for cy in rows {
            for cx in cols.clone() {
                let sdf = capsule_sdf(cx as f32, cy as f32, ax, ay, bx, by, radius);
                let alpha = (0.5 - sdf).clamp(0.0, 1.0) * f32::from(color.a);
                if alpha > 0.0 {
                    self.blend_pixel(cx, cy, color.with_alpha(alpha as u8));
                }
            }
        }
    }
}

/// Signed distance from `(px, py)` to the capsule of radius `r` around `a`–`b`.
#[allow(clippy::arithmetic_side_effects)]
fn capsule_sdf(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32, r: f32) -> f32 {
    let (pax, pay) = (px - ax, py - ay);
    let (bax, bay) = (bx - ax, by - ay);
    let len2 = bax * bax + bay * bay;
    let h = if len2 > 0.0 {
        ((pax * bax + pay * bay) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (dx, dy) = (pax - bax * h, pay - bay * h);
    libm::sqrtf(dx * dx + dy * dy) - r
}
