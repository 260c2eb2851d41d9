//! Drawbuffer: in-memory pixel buffers with a bit-exact codec and a software rasterizer
//!
//! A [`Drawbuffer`] is a `width × height` grid of pixels stored in one of
//! eleven raw encodings ([`PixelFormat`]). Every pixel read or write goes
//! through the format's codec, which converts to and from the canonical
//! 32-bit RGBA [`Pixel`]. Drawing primitives are built on top of that codec:
//!
//! - [`blend`]: the alpha compositing primitive (destination alpha is kept)
//! - [`raster`]: lines (exact and anti-aliased), rectangles, triangles, circles
//! - [`dither`]: Floyd–Steinberg error diffusion
//! - [`compose`]: rectangular block copy with scaling and an alpha policy
//!
//! Buffers either own their memory or borrow a region supplied by a display
//! back-end (see [`Drawbuffer::wrap`]), so the same API covers offscreen
//! buffers and zero-copy views over mapped device memory.
//!
//! # Example
//!
//! ```
//! use drawbuffer::{Drawbuffer, DrawMode, LineMode, Pixel, PixelFormat, Shape};
//!
//! let mut db = Drawbuffer::new(32, 16, PixelFormat::Rgb565).unwrap();
//! db.clear(Pixel::rgb(0, 0, 64));
//! db.rectangle(2, 2, 10, 6, Pixel::rgb(255, 255, 255), Shape::Outline, DrawMode::Opaque);
//! db.line(0, 15, 31, 0, Pixel::rgba(255, 0, 0, 128), LineMode::AlphaBlend);
//!
//! assert_eq!(db.get_pixel(2, 2), Pixel::rgb(248, 252, 248));
//! assert_eq!(db.dump().len(), 32 * 16 * 2);
//! ```
//!
//! # Feature flags
//!
//! | Feature | What it unlocks |
//! |---------|-----------------|
//! | `std` (default) | `std::error::Error` via thiserror; without it the crate is `no_std + alloc` |
//! | `serde` | `Serialize`/`Deserialize` for [`Pixel`], [`PixelFormat`] and the mode enums |
//! | `defmt` | `defmt::Format` derives for firmware logging |

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code

extern crate alloc;

pub mod blend;
pub mod compose;
pub mod dither;
mod draw_target;
pub mod drawbuffer;
pub mod error;
pub mod pixel;
pub mod pixel_format;
pub mod raster;

pub use blend::{blend, DrawMode};
pub use compose::{compose, AlphaPolicy, ComposeParams};
pub use dither::DitherMasks;
pub use drawbuffer::{Drawbuffer, MAX_DIMENSION};
pub use error::{DrawbufferError, FormatRef, Result};
pub use pixel::{Hsv, Pixel};
pub use pixel_format::{decode, encode, PixelCodec, PixelFormat};
pub use raster::{LineMode, Shape};
