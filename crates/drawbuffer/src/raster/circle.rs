//! Circles.
//!
//! Opaque circles are integer-exact: the outline is the midpoint circle,
//! the fill is every pixel within `radius` of the center. The midpoint walk
//! covers a whole octant, so it is skipped when the ring can't touch the
//! buffer but otherwise costs time proportional to the radius. Blended circles
//! are anti-aliased through a signed distance field, with the outline
//! being the one-pixel band around `|sdf| = 0`.

use super::{clip, Shape};
use crate::blend::DrawMode;
use crate::drawbuffer::Drawbuffer;
use crate::pixel::Pixel;

impl Drawbuffer {
    /// Draw a circle centered on `(cx, cy)`. A negative radius draws nothing.
    pub fn circle(
        &mut self,
        cx: i32,
        cy: i32,
        radius: i32,
        color: Pixel,
        shape: Shape,
        mode: DrawMode,
    ) {
        if radius < 0 {
            return;
        }
        tracing::trace!(cx, cy, radius, ?shape, ?mode, "circle");
        match (shape, mode) {
            (Shape::Outline, DrawMode::Opaque) => self.midpoint_circle(cx, cy, radius, color),
            (Shape::Fill, DrawMode::Opaque) => self.disc(cx, cy, radius, color),
            (shape, DrawMode::AlphaBlend) => self.sdf_circle(cx, cy, radius, color, shape),
        }
    }

    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    fn midpoint_circle(&mut self, x: i32, y: i32, radius: i32, color: Pixel) {
        if radius == 0 {
            self.set_pixel(x, y, color);
            return;
        }
        let (x, y) = (i64::from(x), i64::from(y));
        if !self.ring_may_touch(x, y, i64::from(radius)) {
            return;
        }
        let set8 = |db: &mut Self, cx: i64, cy: i64| {
            for (dx, dy) in [
                (cx, cy),
                (-cx, cy),
                (cx, -cy),
                (-cx, -cy),
                (cy, cx),
                (-cy, cx),
                (cy, -cx),
                (-cy, -cx),
            ] {
                let (px, py) = (x + dx, y + dy);
                if let (Ok(px), Ok(py)) = (i32::try_from(px), i32::try_from(py)) {
                    db.set_pixel(px, py, color);
                }
            }
        };

        let (mut cx, mut cy) = (0i64, i64::from(radius));
        let mut d = 3 - 2 * cy;
        set8(self, cx, cy);
        while cy >= cx {
            cx += 1;
            if d > 0 {
                cy -= 1;
                d += 4 * (cx - cy) + 10;
            } else {
                d += 4 * cx + 6;
            }
            set8(self, cx, cy);
        }
    }

    /// False when a ring of `radius` around `(x, y)` can't reach a buffer
    /// pixel: the buffer is outside its bounding box or inside its hole.
    #[allow(clippy::arithmetic_side_effects)]
    fn ring_may_touch(&self, x: i64, y: i64, r: i64) -> bool {
        let (w, h) = (i64::from(self.width()), i64::from(self.height()));
        if x + r < 0 || y + r < 0 || x - r >= w || y - r >= h {
            return false;
        }
        let far = [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)]
            .into_iter()
            .map(|(px, py)| {
                let (dx, dy) = (i128::from(px - x), i128::from(py - y));
                dx * dx + dy * dy
            })
            .max()
            .unwrap_or(0);
        // midpoint pixels sit within one pixel of the true radius
        let inner = i128::from(r - 1);
        r <= 1 || far >= inner * inner
    }

    #[allow(clippy::arithmetic_side_effects)]
    fn disc(&mut self, x: i32, y: i32, radius: i32, color: Pixel) {
        let (x, y, r) = (i64::from(x), i64::from(y), i64::from(radius));
        let r2 = r * r;
        for py in clip(y - r, y + r + 1, self.height()) {
            let ty = i64::from(py) - y;
            for px in clip(x - r, x + r + 1, self.width()) {
                let tx = i64::from(px) - x;
                if tx * tx + ty * ty <= r2 {
                    self.set_pixel(px, py, color);
                }
            }
        }
    }

    #[allow(
        clippy::arithmetic_side_effects,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn sdf_circle(&mut self, x: i32, y: i32, radius: i32, color: Pixel, shape: Shape) {
        let (fx, fy, fr) = (x as f32, y as f32, radius as f32);
        let (x, y, r) = (i64::from(x), i64::from(y), i64::from(radius));

        for py in clip(y - r, y + r + 1, self.height()) {
            for px in clip(x - r, x + r + 1, self.width()) {
                let dx = px as f32 - fx;
                let dy = py as f32 - fy;
                let mut d = libm::sqrtf(dx * dx + dy * dy) - fr;
                if shape == Shape::Outline && d < 0.0 {
                    d = -d;
                }
                let alpha = (0.5 - d).clamp(0.0, 1.0) * f32::from(color.a);
                if alpha > 0.0 {
                    self.blend_pixel(px, py, color.with_alpha(alpha as u8));
                }
            }
        }
    }
}
