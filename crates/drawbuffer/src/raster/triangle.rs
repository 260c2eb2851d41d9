//! Filled triangles, scanline-converted as one or two flat-edged halves.

use super::clip;
use crate::blend::DrawMode;
use crate::drawbuffer::Drawbuffer;
use crate::pixel::Pixel;

// Edge walking runs on f32 and truncates into i32 spans.
#[allow(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]
impl Drawbuffer {
    /// Fill the triangle with the given vertices.
    pub fn triangle(
        &mut self,
        v0: (i32, i32),
        v1: (i32, i32),
        v2: (i32, i32),
        color: Pixel,
        mode: DrawMode,
    ) {
        let (mut v0, mut v1, mut v2) = (v0, v1, v2);
        if v0.1 > v2.1 {
            core::mem::swap(&mut v0, &mut v2);
        }
        if v0.1 > v1.1 {
            core::mem::swap(&mut v0, &mut v1);
        }
        if v1.1 > v2.1 {
            core::mem::swap(&mut v1, &mut v2);
        }

        let height = i64::from(self.height());
        let (top, bottom) = (i64::from(v0.1), i64::from(v2.1));
        if (top < 0 && bottom < 0) || (top >= height && bottom >= height) {
            return;
        }
        tracing::trace!(?v0, ?v1, ?v2, ?mode, "triangle");

        let v0 = (v0.0 as f32, v0.1 as f32);
        let v1 = (v1.0 as f32, v1.1 as f32);
        let v2 = (v2.0 as f32, v2.1 as f32);

        if v1.1 == v2.1 {
            self.flat_bottom(v0, v1, v2, color, mode);
        } else if v0.1 == v1.1 {
            self.flat_top(v0, v1, v2, color, mode);
        } else {
            let t = (v1.1 - v0.1) / (v2.1 - v0.1);
            let split = ((v0.0 + t * (v2.0 - v0.0)) as i32) as f32;
            self.flat_bottom(v0, v1, (split, v1.1), color, mode);
            self.flat_top(v1, (split, v1.1), v2, color, mode);
        }
    }

    /// `v1` and `v2` share the bottom row; edges run downward from `v0`.
    fn flat_bottom(
        &mut self,
        v0: (f32, f32),
        v1: (f32, f32),
        v2: (f32, f32),
        color: Pixel,
        mode: DrawMode,
    ) {
        let slope1 = (v1.0 - v0.0) / (v1.1 - v0.1);
        let slope2 = (v2.0 - v0.0) / (v2.1 - v0.1);
        let top = v0.1 as i64;

        for cy in clip(top, v1.1 as i64 + 1, self.height()) {
            let steps = i64::from(cy) - top;
            let cx1 = edge(v0.0, slope1, steps);
            let cx2 = edge(v0.0, slope2, steps);
            self.span(cy, cx1, cx2, color, mode);
        }
    }

    /// `v0` and `v1` share the top row; edges run upward from `v2`.
    fn flat_top(
        &mut self,
        v0: (f32, f32),
        v1: (f32, f32),
        v2: (f32, f32),
        color: Pixel,
        mode: DrawMode,
    ) {
        let slope1 = (v2.0 - v0.0) / (v2.1 - v0.1);
        let slope2 = (v2.0 - v1.0) / (v2.1 - v1.1);
        let bottom = v2.1 as i64;

        for cy in clip(v0.1 as i64, bottom + 1, self.height()).rev() {
            let steps = bottom - i64::from(cy);
            let cx1 = edge(v2.0, -slope1, steps);
            let cx2 = edge(v2.0, -slope2, steps);
            self.span(cy, cx1, cx2, color, mode);
        }
    }

    /// Pixels `trunc(min) ..= max` of row `y`, clipped to the buffer.
    fn span(&mut self, y: i32, a: f32, b: f32, color: Pixel, mode: DrawMode) {
        if y < 0 || i64::from(y) >= i64::from(self.height()) {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        if lo.is_nan() || hi.is_nan() {
            return;
        }
        let start = (lo as i32).max(0);
        let width = self.width() as i32;
        let mut cx = start;
        while cx < width && cx as f32 <= hi {
            self.plot(cx, y, color, mode);
            cx += 1;
        }
    }
}

/// Edge x after `steps` rows. A zero-height edge has a NaN slope, so its
/// only row uses the origin directly.
#[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
fn edge(origin: f32, slope: f32, steps: i64) -> f32 {
    if steps == 0 {
        origin
    } else {
        origin + slope * steps as f32
    }
}
