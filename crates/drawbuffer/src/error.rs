//! Error type shared by every fallible drawbuffer operation.
//!
//! Out-of-range pixel coordinates are deliberately *not* represented here:
//! `get_pixel` returns a transparent pixel and `set_pixel` does nothing, so
//! shapes that straddle the buffer edge never need pre-clipping.

use alloc::string::String;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, DrawbufferError>;

/// How an unknown pixel format was referred to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatRef {
    /// A numeric registry id.
    Id(u32),
    /// A registry name string.
    Name(String),
    /// A bits-per-pixel selector (dithering presets).
    Bpp(u32),
}

impl core::fmt::Display for FormatRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Name(name) => write!(f, "name {name:?}"),
            Self::Bpp(bpp) => write!(f, "{bpp}bpp"),
        }
    }
}

/// Drawbuffer errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrawbufferError {
    /// Width or height is zero or exceeds [`crate::MAX_DIMENSION`].
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimension {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// The format is not in the registry.
    #[error("unsupported pixel format ({0})")]
    UnsupportedFormat(FormatRef),

    /// The backing memory could not be allocated.
    #[error("can't allocate {bytes} bytes of pixel data")]
    AllocationFailure {
        /// Requested allocation size
        bytes: usize,
    },

    /// Raw pixel data does not match the buffer's byte length.
    #[error("pixel data must be {expected} bytes long (is {actual})")]
    LengthMismatch {
        /// `byte_length()` of the buffer
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// A channel value outside `0..=255` (or an HSV component outside `0..=1`).
    #[error("invalid channel value {value}")]
    InvalidChannelValue {
        /// The rejected value
        value: f64,
    },

    /// The requested combination of options has no defined semantics.
    #[error("incompatible operation: {0}")]
    IncompatibleOperation(&'static str),

    /// The drawbuffer has already been closed.
    #[error("drawbuffer is closed")]
    Closed,
}
