//! The drawbuffer entity: dimensions, a pixel format and backing memory.
//!
//! Backing memory is either owned (a heap `Vec<u8>`) or borrowed from a
//! display back-end (a raw region plus a teardown closure that returns it).
//! Exactly one release path runs: the `Vec` is dropped, or the teardown is
//! called, the first time the buffer is closed. Closing again is a no-op,
//! and dropping a buffer closes it.
//!
//! All pixel I/O goes through the format's [`PixelCodec`]. Coordinates are
//! `i32` so shapes can extend past any edge; out-of-range reads return
//! [`Pixel::TRANSPARENT`] and out-of-range writes are ignored.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ptr::NonNull;

use crate::error::{DrawbufferError, Result};
use crate::pixel::Pixel;
use crate::pixel_format::{PixelCodec, PixelFormat};

/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Memory region supplied by a collaborator.
struct Borrowed {
    ptr: NonNull<u8>,
    teardown: Option<Box<dyn FnOnce()>>,
}

enum Storage {
    Owned(Vec<u8>),
    Borrowed(Borrowed),
    Closed,
}

/// In-memory pixel buffer in one of the [`PixelFormat`] encodings.
pub struct Drawbuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    codec: &'static dyn PixelCodec,
    byte_length: usize,
    storage: Storage,
}

impl Drawbuffer {
    /// Allocate a zero-filled buffer.
    ///
    /// # Errors
    ///
    /// - [`DrawbufferError::InvalidDimension`] if a dimension is 0 or above
    ///   [`MAX_DIMENSION`]
    /// - [`DrawbufferError::AllocationFailure`] if the memory can't be reserved
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let byte_length = checked_byte_length(width, height, format)?;

        let mut data = Vec::new();
        data.try_reserve_exact(byte_length)
            .map_err(|_| DrawbufferError::AllocationFailure { bytes: byte_length })?;
        data.resize(byte_length, 0);

        tracing::debug!(width, height, format = %format, bytes = byte_length, "drawbuffer created");
        Ok(Self::with_storage(width, height, format, byte_length, Storage::Owned(data)))
    }

    /// Adopt existing pixel data as an owned buffer.
    ///
    /// # Errors
    ///
    /// [`DrawbufferError::InvalidDimension`], or
    /// [`DrawbufferError::LengthMismatch`] if `data` is not exactly
    /// `ceil(width * height * bpp / 8)` bytes.
    pub fn from_vec(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let byte_length = checked_byte_length(width, height, format)?;
        if data.len() != byte_length {
            return Err(DrawbufferError::LengthMismatch {
                expected: byte_length,
                actual: data.len(),
            });
        }
        Ok(Self::with_storage(width, height, format, byte_length, Storage::Owned(data)))
    }

    /// Wrap memory owned by a collaborator (e.g. a mapped dumb buffer).
    ///
    /// `teardown` runs once, when the drawbuffer is closed or dropped, instead
    /// of freeing the memory. Only the first `byte_length()` bytes of the
    /// region are used. If this returns an error, `teardown` is dropped
    /// without being called and the region stays with the caller.
    ///
    /// # Errors
    ///
    /// [`DrawbufferError::InvalidDimension`], or
    /// [`DrawbufferError::LengthMismatch`] if `len` is smaller than the
    /// buffer size.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `len` bytes, must not be
    /// accessed through any other path, and must stay mapped until
    /// `teardown` has been called.
    pub unsafe fn wrap<F>(
        width: u32,
        height: u32,
        format: PixelFormat,
        ptr: NonNull<u8>,
        len: usize,
        teardown: F,
    ) -> Result<Self>
    where
        F: FnOnce() + 'static,
    {
        let byte_length = checked_byte_length(width, height, format)?;
        if len < byte_length {
            return Err(DrawbufferError::LengthMismatch {
                expected: byte_length,
                actual: len,
            });
        }

        tracing::debug!(width, height, format = %format, bytes = byte_length, "drawbuffer wrapped");
        let storage = Storage::Borrowed(Borrowed {
            ptr,
            teardown: Some(Box::new(teardown)),
        });
        Ok(Self::with_storage(width, height, format, byte_length, storage))
    }

    fn with_storage(
        width: u32,
        height: u32,
        format: PixelFormat,
        byte_length: usize,
        storage: Storage,
    ) -> Self {
        Self {
            width,
            height,
            format,
            codec: format.codec(),
            byte_length,
            storage,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel encoding.
    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    /// Size of the pixel data in bytes.
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// Whether [`close`](Self::close) has already run.
    pub fn is_closed(&self) -> bool {
        matches!(self.storage, Storage::Closed)
    }

    /// Whether the buffer wraps collaborator memory.
    pub fn is_borrowed(&self) -> bool {
        matches!(self.storage, Storage::Borrowed(_))
    }

    /// Whether `(x, y)` lies inside `[0, width) × [0, height)`.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index_of(x, y).is_some()
    }

    // Both coordinates are range-checked against u16-bounded dimensions
    // before the multiply, so the index fits in usize.
    #[allow(clippy::arithmetic_side_effects, clippy::cast_sign_loss)]
    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Read the pixel at `(x, y)`.
    ///
    /// Returns [`Pixel::TRANSPARENT`] outside the buffer or once closed.
    pub fn get_pixel(&self, x: i32, y: i32) -> Pixel {
        match self.index_of(x, y) {
            Some(index) => self.codec.decode(self.data(), index),
            None => Pixel::TRANSPARENT,
        }
    }

    /// Write the pixel at `(x, y)`. Does nothing outside the buffer or once closed.
    pub fn set_pixel(&mut self, x: i32, y: i32, pixel: Pixel) {
        if let Some(index) = self.index_of(x, y) {
            let codec = self.codec;
            codec.encode(self.data_mut(), index, pixel);
        }
    }

    /// The raw pixel data, exactly [`byte_length`](Self::byte_length) bytes.
    ///
    /// Empty once the buffer is closed.
    pub fn dump(&self) -> &[u8] {
        self.data()
    }

    /// Overwrite the raw pixel data.
    ///
    /// # Errors
    ///
    /// [`DrawbufferError::LengthMismatch`] if `bytes.len() != byte_length()`,
    /// [`DrawbufferError::Closed`] if the buffer is closed. The pixel data is
    /// left untouched on error.
    pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(DrawbufferError::Closed);
        }
        if bytes.len() != self.byte_length {
            tracing::debug!(
                expected = self.byte_length,
                actual = bytes.len(),
                "load rejected: length mismatch"
            );
            return Err(DrawbufferError::LengthMismatch {
                expected: self.byte_length,
                actual: bytes.len(),
            });
        }
        self.data_mut().copy_from_slice(bytes);
        Ok(())
    }

    /// Fill every pixel with `pixel`.
    pub fn clear(&mut self, pixel: Pixel) {
        let Pixel { r, g, b, a } = pixel;
        let uniform = r == g && g == b && b == a;
        // Byte-aligned formats whose encoding of (v,v,v,v) is all-`v` bytes.
        let fill_ok = matches!(
            self.format,
            PixelFormat::Gray8
                | PixelFormat::Rgb888
                | PixelFormat::Bgr888
                | PixelFormat::Rgba8888
                | PixelFormat::Argb8888
                | PixelFormat::Abgr8888
                | PixelFormat::Bgra8888
        );
        if uniform && fill_ok {
            self.data_mut().fill(r);
            return;
        }

        let codec = self.codec;
        let pixels = self.pixel_count();
        let data = self.data_mut();
        for index in 0..pixels {
            codec.encode(data, index, pixel);
        }
    }

    /// Replace every pixel with `f(x, y, current)`, in raster order.
    pub fn map_pixels<F>(&mut self, mut f: F)
    where
        F: FnMut(u32, u32, Pixel) -> Pixel,
    {
        let codec = self.codec;
        let width = self.width;
        let height = self.height;
        let data = self.data_mut();
        let mut index = 0usize;
        for y in 0..height {
            for x in 0..width {
                let current = codec.decode(data, index);
                codec.encode(data, index, f(x, y, current));
                index = index.saturating_add(1);
            }
        }
    }

    /// Release the backing memory.
    ///
    /// Owned memory is freed; borrowed memory is handed back through the
    /// teardown closure. Calling this on a closed buffer does nothing.
    pub fn close(&mut self) {
        match core::mem::replace(&mut self.storage, Storage::Closed) {
            Storage::Owned(data) => {
                tracing::debug!(bytes = data.len(), "drawbuffer closed (owned)");
                drop(data);
            }
            Storage::Borrowed(mut borrowed) => {
                tracing::debug!("drawbuffer closed (borrowed), running teardown");
                if let Some(teardown) = borrowed.teardown.take() {
                    teardown();
                }
            }
            Storage::Closed => {}
        }
    }

    // Dimensions are u16-bounded, so the product fits in usize.
    #[allow(clippy::arithmetic_side_effects)]
    fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn data(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(data) => data,
            // SAFETY: `wrap`'s contract guarantees `ptr` is valid for at least
            // `byte_length` bytes until teardown, which only runs in `close`
            // after the storage has been replaced by `Closed`.
            Storage::Borrowed(b) => unsafe {
                core::slice::from_raw_parts(b.ptr.as_ptr(), self.byte_length)
            },
            Storage::Closed => &[],
        }
    }

    fn data_mut(&mut self) -> &mut [u8] {
        match &mut self.storage {
            Storage::Owned(data) => data,
            // SAFETY: as in `data`; `&mut self` guarantees exclusive access.
            Storage::Borrowed(b) => unsafe {
                core::slice::from_raw_parts_mut(b.ptr.as_ptr(), self.byte_length)
            },
            Storage::Closed => &mut [],
        }
    }
}

fn checked_byte_length(width: u32, height: u32, format: PixelFormat) -> Result<usize> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        tracing::debug!(width, height, "rejected drawbuffer dimensions");
        return Err(DrawbufferError::InvalidDimension { width, height });
    }
    // u16 × u16 × 32 bits always fits in 64-bit usize; 32-bit targets may not.
    format
        .buffer_len(width, height)
        .ok_or(DrawbufferError::AllocationFailure { bytes: usize::MAX })
}

impl Drop for Drawbuffer {
    fn drop(&mut self) {
        self.close();
    }
}

impl core::fmt::Display for Drawbuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_closed() {
            return f.write_str("Closed Drawbuffer");
        }
        write!(
            f,
            "{} Drawbuffer: {}x{}",
            self.format.description(),
            self.width,
            self.height
        )
    }
}

impl core::fmt::Debug for Drawbuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let storage = match self.storage {
            Storage::Owned(_) => "owned",
            Storage::Borrowed(_) => "borrowed",
            Storage::Closed => "closed",
        };
        f.debug_struct("Drawbuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("byte_length", &self.byte_length)
            .field("storage", &storage)
            .finish()
    }
}
