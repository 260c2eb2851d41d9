//! Axis-aligned rectangles.

use super::{clip, Shape};
use crate::blend::DrawMode;
use crate::drawbuffer::Drawbuffer;
use crate::pixel::Pixel;

impl Drawbuffer {
    /// Draw a `w × h` rectangle with its top-left corner at `(x, y)`.
    ///
    /// The outline touches every perimeter pixel exactly once, so a blended
    /// outline has uniform coverage even when `w` or `h` is 1. A non-positive
    /// `w` or `h` draws nothing.
    #[allow(clippy::too_many_arguments, clippy::arithmetic_side_effects)]
    pub fn rectangle(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Pixel,
        shape: Shape,
        mode: DrawMode,
    ) {
        if w <= 0 || h <= 0 {
            return;
        }
        tracing::trace!(x, y, w, h, ?shape, ?mode, "rectangle");

        // i64 edges: x + w can't overflow
        let (left, top) = (i64::from(x), i64::from(y));
        let (right, bottom) = (left + i64::from(w), top + i64::from(h));
        let cols = clip(left, right, self.width());

        match shape {
            Shape::Fill => {
                for cy in clip(top, bottom, self.height()) {
                    for cx in cols.clone() {
                        self.plot(cx, cy, color, mode);
                    }
                }
            }
            Shape::Outline => {
                let mut rows = alloc::vec![top];
                if h > 1 {
                    rows.push(bottom - 1);
                }
                for row in rows {
                    for cy in clip(row, row + 1, self.height()) {
                        for cx in cols.clone() {
                            self.plot(cx, cy, color, mode);
                        }
                    }
                }

                let mut edges = alloc::vec![left];
                if w > 1 {
                    edges.push(right - 1);
                }
                for cy in clip(top + 1, bottom - 1, self.height()) {
                    for &edge in &edges {
                        for cx in clip(edge, edge + 1, self.width()) {
                            self.plot(cx, cy, color, mode);
                        }
                    }
                }
            }
        }
    }
}
