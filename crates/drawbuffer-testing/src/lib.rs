//! Drawbuffer testing utilities
//!
//! Headless assertions for code that renders into a [`Drawbuffer`]: pixel and
//! region checks, ASCII masks for exact pixel sets, and golden PNG comparison.
//!
//! # Quick start
//!
//! ```no_run
//! use drawbuffer::{DrawMode, Pixel, PixelFormat, Shape};
//! use drawbuffer_testing::TestBuffer;
//!
//! let mut t = TestBuffer::new(4, 3, PixelFormat::Rgba8888).unwrap();
//! t.rectangle(0, 0, 3, 2, Pixel::WHITE, Shape::Outline, DrawMode::Opaque);
//!
//! t.assert_pixel(2, 1, Pixel::WHITE).unwrap();
//! t.assert_mask(Pixel::WHITE, "
//!     ###.
//!     ###.
//!     ....
//! ").unwrap();
//! ```
//!
//! # Golden screenshot testing
//!
//! ```no_run
//! # use drawbuffer::PixelFormat;
//! # use drawbuffer_testing::TestBuffer;
//! # let t = TestBuffer::new(100, 100, PixelFormat::Rgb565).unwrap();
//! // First run: set UPDATE_GOLDEN=1 to create/update the reference file.
//! t.assert_matches_golden("tests/golden/my_scene.png", 0).unwrap();
//! ```

#![warn(clippy::all)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeSet;
use std::path::Path;

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::{PointsIter, Rectangle};
use image::{Rgba, RgbaImage};

pub use drawbuffer::{Drawbuffer, Pixel, PixelFormat};

/// Environment variable that turns [`TestBuffer::assert_matches_golden`]
/// into a golden update.
pub const UPDATE_GOLDEN_ENV: &str = "UPDATE_GOLDEN";

// ─────────────────────────────────────────────────────────────────────────────
// TestBuffer
// ─────────────────────────────────────────────────────────────────────────────

/// A [`Drawbuffer`] with test assertions attached.
///
/// Derefs to [`Drawbuffer`], so the rasterizer and the embedded-graphics
/// [`DrawTarget`](embedded_graphics::draw_target::DrawTarget) impl are
/// available directly:
///
/// ```no_run
/// use drawbuffer::PixelFormat;
/// use drawbuffer_testing::TestBuffer;
/// use embedded_graphics::{pixelcolor::Rgb888, prelude::*, primitives::{PrimitiveStyle, Rectangle}};
///
/// let mut t = TestBuffer::new(100, 100, PixelFormat::Rgb565).unwrap();
/// Rectangle::new(Point::zero(), Size::new(50, 50))
///     .into_styled(PrimitiveStyle::with_fill(Rgb888::WHITE))
///     .draw(&mut *t)
///     .unwrap();
/// ```
pub struct TestBuffer {
    inner: Drawbuffer,
}

impl TestBuffer {
    /// Allocate a zero-filled buffer.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> drawbuffer::Result<Self> {
        Drawbuffer::new(width, height, format).map(Self::from)
    }

    /// The whole buffer as an embedded-graphics rectangle.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::zero(), Size::new(self.inner.width(), self.inner.height()))
    }

    /// Unwrap the buffer.
    pub fn into_inner(self) -> Drawbuffer {
        self.inner
    }

    // ── Pixel access ─────────────────────────────────────────────────────────

    /// Decoded pixel at `(x, y)`, or `None` if out of bounds.
    pub fn pixel_at(&self, x: i32, y: i32) -> Option<Pixel> {
        self.inner
            .in_bounds(x, y)
            .then(|| self.inner.get_pixel(x, y))
    }

    /// Every in-bounds coordinate whose pixel equals `color`, in raster order.
    pub fn pixels_matching(&self, color: Pixel) -> BTreeSet<(i32, i32)> {
        self.bounds()
            .points()
            .filter(|p| self.inner.get_pixel(p.x, p.y) == color)
            .map(|p| (p.x, p.y))
            .collect()
    }

    /// Every in-bounds coordinate whose pixel differs from `background`.
    pub fn painted(&self, background: Pixel) -> BTreeSet<(i32, i32)> {
        self.bounds()
            .points()
            .filter(|p| self.inner.get_pixel(p.x, p.y) != background)
            .map(|p| (p.x, p.y))
            .collect()
    }

    // ── Pixel assertions ─────────────────────────────────────────────────────

    /// Assert that pixel `(x, y)` decodes to `expected`.
    ///
    /// Returns `Err` with a descriptive message on mismatch.
    pub fn assert_pixel(&self, x: i32, y: i32, expected: Pixel) -> Result<(), String> {
        let actual = self
            .pixel_at(x, y)
            .ok_or_else(|| format!("Pixel ({x}, {y}) is out of bounds"))?;
        if actual == expected {
            Ok(())
        } else {
            Err(format!(
                "assert_pixel({x}, {y}): expected {:#010x}, got {:#010x}",
                expected.to_u32(),
                actual.to_u32()
            ))
        }
    }

    /// Assert that every pixel inside `rect` has the given color.
    pub fn assert_region_uniform(&self, rect: Rectangle, color: Pixel) -> Result<(), String> {
        for p in rect.points() {
            self.assert_pixel(p.x, p.y, color)
                .map_err(|e| format!("assert_region_uniform failed in {rect:?}: {e}"))?;
        }
        Ok(())
    }

    /// Assert that `rect` contains **at least one** pixel with the given color.
    pub fn assert_region_contains(&self, rect: Rectangle, color: Pixel) -> Result<(), String> {
        if self.pixel_count_of_color(rect, color) > 0 {
            Ok(())
        } else {
            Err(format!(
                "assert_region_contains: no pixel {:#010x} found in {rect:?}",
                color.to_u32()
            ))
        }
    }

    /// Count the in-bounds pixels in `rect` equal to `color`.
    pub fn pixel_count_of_color(&self, rect: Rectangle, color: Pixel) -> usize {
        rect.points()
            .filter(|p| self.pixel_at(p.x, p.y) == Some(color))
            .count()
    }

    // ── Masks ────────────────────────────────────────────────────────────────

    /// ASCII picture of the buffer: `#` where the pixel equals `color`,
    /// `.` elsewhere, one line per row.
    pub fn mask(&self, color: Pixel) -> String {
        let mut out = String::new();
        for p in self.bounds().points() {
            if p.x == 0 && p.y > 0 {
                out.push('\n');
            }
            out.push(if self.inner.get_pixel(p.x, p.y) == color { '#' } else { '.' });
        }
        out
    }

    /// Assert the buffer's [`mask`](Self::mask) for `color` equals `expected`.
    ///
    /// Leading whitespace on each line and blank lines are ignored, so the
    /// expected picture can be indented inside a raw string.
    pub fn assert_mask(&self, color: Pixel, expected: &str) -> Result<(), String> {
        let expected: Vec<&str> = expected
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let expected = expected.join("\n");
        let actual = self.mask(color);
        if actual == expected {
            Ok(())
        } else {
            Err(format!(
                "assert_mask mismatch for {:#010x}\n--- expected\n{expected}\n--- actual\n{actual}",
                color.to_u32()
            ))
        }
    }

    // ── Screenshot utilities ─────────────────────────────────────────────────

    /// Decode the whole buffer into an RGBA image.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.inner.width(), self.inner.height(), |x, y| {
            match (i32::try_from(x), i32::try_from(y)) {
                (Ok(x), Ok(y)) => {
                    let p = self.inner.get_pixel(x, y);
                    Rgba([p.r, p.g, p.b, p.a])
                }
                _ => Rgba([0, 0, 0, 0]),
            }
        })
    }

    /// Save the decoded buffer as a PNG.
    pub fn screenshot(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        self.to_image().save(path)?;
        Ok(())
    }

    /// Save the decoded buffer as the golden reference PNG.
    ///
    /// Parent directories are created automatically.
    pub fn save_golden(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let p = path.as_ref();
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.screenshot(p)
    }

    /// Assert the decoded buffer matches a golden reference PNG.
    ///
    /// `threshold` is the maximum per-channel absolute difference that is still
    /// considered equal (0 = exact match).
    ///
    /// Set the `UPDATE_GOLDEN=1` environment variable to **update** the golden
    /// file instead of asserting:
    ///
    /// ```bash
    /// UPDATE_GOLDEN=1 cargo test
    /// ```
    pub fn assert_matches_golden(
        &self,
        golden_path: impl AsRef<Path>,
        threshold: u8,
    ) -> Result<(), String> {
        let golden_path = golden_path.as_ref();

        if std::env::var(UPDATE_GOLDEN_ENV).is_ok() {
            return self.save_golden(golden_path).map_err(|e| {
                format!(
                    "Failed to save golden '{p}': {e}",
                    p = golden_path.display()
                )
            });
        }
        self.compare_golden(golden_path, threshold)
    }

    /// Compare against a golden PNG without consulting `UPDATE_GOLDEN`.
    pub fn compare_golden(&self, golden_path: impl AsRef<Path>, threshold: u8) -> Result<(), String> {
        let golden_path = golden_path.as_ref();
        let golden = image::open(golden_path)
            .map_err(|e| {
                format!(
                    "Failed to open golden '{}': {e}\nRun with UPDATE_GOLDEN=1 to create it.",
                    golden_path.display()
                )
            })?
            .to_rgba8();
        let current = self.to_image();

        if current.dimensions() != golden.dimensions() {
            let (cw, ch) = current.dimensions();
            let (gw, gh) = golden.dimensions();
            return Err(format!(
                "Dimension mismatch: buffer is {cw}×{ch}, golden is {gw}×{gh}"
            ));
        }

        let diff_pixels = current
            .pixels()
            .zip(golden.pixels())
            .filter(|(cp, gp)| {
                cp.0.iter()
                    .zip(gp.0.iter())
                    .any(|(&a, &b)| a.abs_diff(b) > threshold)
            })
            .count();

        if diff_pixels > 0 {
            Err(format!(
                "{diff_pixels} pixels differ from golden '{}' (threshold={threshold})",
                golden_path.display()
            ))
        } else {
            Ok(())
        }
    }
}

impl From<Drawbuffer> for TestBuffer {
    fn from(inner: Drawbuffer) -> Self {
        Self { inner }
    }
}

impl std::ops::Deref for TestBuffer {
    type Target = Drawbuffer;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl std::ops::DerefMut for TestBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
