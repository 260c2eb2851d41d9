//! Pixel format registry and the per-format codecs.
//!
//! Formats are grouped by bits per pixel:
//!
//! | id | format | name | bpp | byte layout |
//! |----|--------|------|-----|-------------|
//! | 0 | [`PixelFormat::Mono1`] | `bit` | 1 | 8 pixels per byte, first pixel in the MSB |
//! | 1 | [`PixelFormat::Gray8`] | `byte` | 8 | `v` (decodes to `v,v,v,v`) |
//! | 2 | [`PixelFormat::Rgb332`] | `rgb332` | 8 | `RRRGGGBB` |
//! | 3 | [`PixelFormat::Rgb565`] | `rgb565` | 16 | little-endian `RRRRRGGGGGGBBBBB` |
//! | 4 | [`PixelFormat::Bgr565`] | `bgr565` | 16 | little-endian `BBBBBGGGGGGRRRRR` |
//! | 5 | [`PixelFormat::Rgb888`] | `rgb888` | 24 | `r g b` |
//! | 6 | [`PixelFormat::Bgr888`] | `bgr888` | 24 | `b g r` |
//! | 7 | [`PixelFormat::Rgba8888`] | `rgba8888` | 32 | `r g b a` |
//! | 8 | [`PixelFormat::Argb8888`] | `argb8888` | 32 | `a r g b` |
//! | 9 | [`PixelFormat::Abgr8888`] | `abgr8888` | 32 | `a b g r` |
//! | 10 | [`PixelFormat::Bgra8888`] | `bgra8888` | 32 | `b g r a` |
//!
//! The id and name of a format never change and are never reused: they are
//! handed across process and host boundaries. New formats are appended.
//!
//! Narrow formats quantize by truncation (top bits kept, no rounding), so only
//! the 32-bit group round-trips every pixel exactly.

// Bit/byte offset math on indices already checked against the slice.
#![allow(clippy::arithmetic_side_effects)]

use core::str::FromStr;

use crate::error::{DrawbufferError, FormatRef, Result};
use crate::pixel::Pixel;

/// Raw pixel encoding of a drawbuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PixelFormat {
    /// 1 bit per pixel, black or white
    #[cfg_attr(feature = "serde", serde(rename = "bit"))]
    Mono1 = 0,
    /// 8-bit grayscale
    #[cfg_attr(feature = "serde", serde(rename = "byte"))]
    Gray8 = 1,
    /// 8-bit 3/3/2 RGB
    #[cfg_attr(feature = "serde", serde(rename = "rgb332"))]
    Rgb332 = 2,
    /// 16-bit 5/6/5 RGB
    #[cfg_attr(feature = "serde", serde(rename = "rgb565"))]
    Rgb565 = 3,
    /// 16-bit 5/6/5 BGR
    #[cfg_attr(feature = "serde", serde(rename = "bgr565"))]
    Bgr565 = 4,
    /// 24-bit RGB
    #[cfg_attr(feature = "serde", serde(rename = "rgb888"))]
    Rgb888 = 5,
    /// 24-bit BGR
    #[cfg_attr(feature = "serde", serde(rename = "bgr888"))]
    Bgr888 = 6,
    /// 32-bit RGBA
    #[cfg_attr(feature = "serde", serde(rename = "rgba8888"))]
    Rgba8888 = 7,
    /// 32-bit ARGB
    #[cfg_attr(feature = "serde", serde(rename = "argb8888"))]
    Argb8888 = 8,
    /// 32-bit ABGR
    #[cfg_attr(feature = "serde", serde(rename = "abgr8888"))]
    Abgr8888 = 9,
    /// 32-bit BGRA
    #[cfg_attr(feature = "serde", serde(rename = "bgra8888"))]
    Bgra8888 = 10,
}

impl PixelFormat {
    /// Every registered format, in id order.
    pub const ALL: [Self; 11] = [
        Self::Mono1,
        Self::Gray8,
        Self::Rgb332,
        Self::Rgb565,
        Self::Bgr565,
        Self::Rgb888,
        Self::Bgr888,
        Self::Rgba8888,
        Self::Argb8888,
        Self::Abgr8888,
        Self::Bgra8888,
    ];

    /// Stable numeric id.
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Look up a format by its stable id.
    pub fn from_id(id: u32) -> Result<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(DrawbufferError::UnsupportedFormat(FormatRef::Id(id)))
    }

    /// Canonical registry name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mono1 => "bit",
            Self::Gray8 => "byte",
            Self::Rgb332 => "rgb332",
            Self::Rgb565 => "rgb565",
            Self::Bgr565 => "bgr565",
            Self::Rgb888 => "rgb888",
            Self::Bgr888 => "bgr888",
            Self::Rgba8888 => "rgba8888",
            Self::Argb8888 => "argb8888",
            Self::Abgr8888 => "abgr8888",
            Self::Bgra8888 => "bgra8888",
        }
    }

    /// Look up a format by its canonical name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|fmt| fmt.name() == name)
            .ok_or_else(|| DrawbufferError::UnsupportedFormat(FormatRef::Name(name.into())))
    }

    /// Human-readable label, e.g. `"16bpp RGB565"`.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Mono1 => "1bpp",
            Self::Gray8 => "8bpp",
            Self::Rgb332 => "8bpp RGB332",
            Self::Rgb565 => "16bpp RGB565",
            Self::Bgr565 => "16bpp BGR565",
            Self::Rgb888 => "24bpp RGB",
            Self::Bgr888 => "24bpp BGR",
            Self::Rgba8888 => "32bpp RGBA",
            Self::Argb8888 => "32bpp ARGB",
            Self::Abgr8888 => "32bpp ABGR",
            Self::Bgra8888 => "32bpp BGRA",
        }
    }

    /// Bits per pixel.
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Mono1 => 1,
            Self::Gray8 | Self::Rgb332 => 8,
            Self::Rgb565 | Self::Bgr565 => 16,
            Self::Rgb888 | Self::Bgr888 => 24,
            Self::Rgba8888 | Self::Argb8888 | Self::Abgr8888 | Self::Bgra8888 => 32,
        }
    }

    /// Whether the format stores an independent alpha channel.
    pub const fn has_alpha(self) -> bool {
        self.bits_per_pixel() == 32
    }

    /// Bytes needed for a `width × height` buffer: `ceil(w*h*bpp/8)`.
    ///
    /// Returns `None` if the size does not fit in `usize`.
    pub fn buffer_len(self, width: u32, height: u32) -> Option<usize> {
        let bits = usize::try_from(width)
            .ok()?
            .checked_mul(usize::try_from(height).ok()?)?
            .checked_mul(usize::try_from(self.bits_per_pixel()).ok()?)?;
        Some(bits.div_ceil(8))
    }

    /// The codec implementing this format.
    pub fn codec(self) -> &'static dyn PixelCodec {
        match self {
            Self::Mono1 => &MONO1,
            Self::Gray8 => &GRAY8,
            Self::Rgb332 => &RGB332,
            Self::Rgb565 => &RGB565,
            Self::Bgr565 => &BGR565,
            Self::Rgb888 => &RGB888,
            Self::Bgr888 => &BGR888,
            Self::Rgba8888 => &RGBA8888,
            Self::Argb8888 => &ARGB8888,
            Self::Abgr8888 => &ABGR8888,
            Self::Bgra8888 => &BGRA8888,
        }
    }

    /// Reduce `pixel` to the precision this format can store.
    ///
    /// `decode(encode(p))` for a single pixel; the identity for 32-bit formats.
    pub fn quantize(self, pixel: Pixel) -> Pixel {
        let mut scratch = [0u8; 4];
        let codec = self.codec();
        codec.encode(&mut scratch, 0, pixel);
        codec.decode(&scratch, 0)
    }
}

impl core::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = DrawbufferError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl TryFrom<u32> for PixelFormat {
    type Error = DrawbufferError;

    fn try_from(id: u32) -> Result<Self> {
        Self::from_id(id)
    }
}

impl From<PixelFormat> for u32 {
    fn from(fmt: PixelFormat) -> Self {
        fmt.id()
    }
}

// ---------------------------------------------------------------------------
// Codec capability
// ---------------------------------------------------------------------------

/// Encode/decode capability of one pixel format.
///
/// `index` is the linear pixel index `y * width + x`. Implementations never
/// panic: an index whose bytes fall outside `data` decodes to
/// [`Pixel::TRANSPARENT`] and encodes to nothing. Coordinate bounds are the
/// drawbuffer's job, not the codec's.
pub trait PixelCodec: Sync {
    /// Bits per pixel of the encoding.
    fn bits_per_pixel(&self) -> u32;

    /// Read the pixel at `index`.
    fn decode(&self, data: &[u8], index: usize) -> Pixel;

    /// Write `pixel` at `index`.
    fn encode(&self, data: &mut [u8], index: usize, pixel: Pixel);
}

/// Decode the pixel at `(x, y)` of a `width`-wide buffer.
///
/// No coordinate bounds checking happens here.
pub fn decode(data: &[u8], width: u32, x: u32, y: u32, format: PixelFormat) -> Pixel {
    match linear_index(width, x, y) {
        Some(index) => format.codec().decode(data, index),
        None => Pixel::TRANSPARENT,
    }
}

/// Encode `pixel` at `(x, y)` of a `width`-wide buffer.
///
/// No coordinate bounds checking happens here.
pub fn encode(data: &mut [u8], width: u32, x: u32, y: u32, format: PixelFormat, pixel: Pixel) {
    if let Some(index) = linear_index(width, x, y) {
        format.codec().encode(data, index, pixel);
    }
}

fn linear_index(width: u32, x: u32, y: u32) -> Option<usize> {
    let index = u64::from(y)
        .checked_mul(u64::from(width))?
        .checked_add(u64::from(x))?;
    usize::try_from(index).ok()
}

/// Byte range `[index * N, index * N + N)`, or `None` on overflow.
fn chunk_range<const N: usize>(index: usize) -> Option<core::ops::Range<usize>> {
    let start = index.checked_mul(N)?;
    Some(start..start.checked_add(N)?)
}

fn chunk<const N: usize>(data: &[u8], index: usize) -> Option<[u8; N]> {
    data.get(chunk_range::<N>(index)?)?.try_into().ok()
}

fn chunk_mut<const N: usize>(data: &mut [u8], index: usize) -> Option<&mut [u8]> {
    data.get_mut(chunk_range::<N>(index)?)
}

// ---------------------------------------------------------------------------
// 1 / 8 bpp
// ---------------------------------------------------------------------------

struct Mono1;

static MONO1: Mono1 = Mono1;

impl PixelCodec for Mono1 {
    fn bits_per_pixel(&self) -> u32 {
        1
    }

    fn decode(&self, data: &[u8], index: usize) -> Pixel {
        let mask = 0x80u8 >> (index % 8);
        match data.get(index / 8) {
            Some(byte) if byte & mask != 0 => Pixel::WHITE,
            _ => Pixel::TRANSPARENT,
        }
    }

    fn encode(&self, data: &mut [u8], index: usize, pixel: Pixel) {
        let mask = 0x80u8 >> (index % 8);
        if let Some(byte) = data.get_mut(index / 8) {
            if pixel.r & 0x80 != 0 {
                *byte |= mask;
            } else {
                *byte &= !mask;
            }
        }
    }
}

struct Gray8;

static GRAY8: Gray8 = Gray8;

impl PixelCodec for Gray8 {
    fn bits_per_pixel(&self) -> u32 {
        8
    }

    fn decode(&self, data: &[u8], index: usize) -> Pixel {
        data.get(index)
            .map_or(Pixel::TRANSPARENT, |&v| Pixel::rgba(v, v, v, v))
    }

    fn encode(&self, data: &mut [u8], index: usize, pixel: Pixel) {
        if let Some(byte) = data.get_mut(index) {
            *byte = pixel.r;
        }
    }
}

struct Rgb332;

static RGB332: Rgb332 = Rgb332;

impl PixelCodec for Rgb332 {
    fn bits_per_pixel(&self) -> u32 {
        8
    }

    fn decode(&self, data: &[u8], index: usize) -> Pixel {
        data.get(index).map_or(Pixel::TRANSPARENT, |&v| {
            Pixel::rgb(v & 0xE0, (v << 3) & 0xE0, (v << 6) & 0xC0)
        })
    }

    fn encode(&self, data: &mut [u8], index: usize, pixel: Pixel) {
        if let Some(byte) = data.get_mut(index) {
            *byte = (pixel.r & 0xE0) | ((pixel.g & 0xE0) >> 3) | (pixel.b >> 6);
        }
    }
}

// ---------------------------------------------------------------------------
// 16 bpp
// ---------------------------------------------------------------------------

/// 5/6/5 packing in a little-endian `u16`; `swap_rb` puts blue in the top field.
struct Packed565 {
    swap_rb: bool,
}

static RGB565: Packed565 = Packed565 { swap_rb: false };
static BGR565: Packed565 = Packed565 { swap_rb: true };

impl PixelCodec for Packed565 {
    fn bits_per_pixel(&self) -> u32 {
        16
    }

    fn decode(&self, data: &[u8], index: usize) -> Pixel {
        let Some(bytes) = chunk::<2>(data, index) else {
            return Pixel::TRANSPARENT;
        };
        let v = u16::from_le_bytes(bytes);
        // Each field is at most 6 bits wide, so the shifted value fits in u8.
        #[allow(clippy::cast_possible_truncation)]
        let (hi, mid, lo) = (
            ((v >> 11) as u8) << 3,
            (((v >> 5) & 0x3F) as u8) << 2,
            ((v & 0x1F) as u8) << 3,
        );
        if self.swap_rb {
            Pixel::rgb(lo, mid, hi)
        } else {
            Pixel::rgb(hi, mid, lo)
        }
    }

    fn encode(&self, data: &mut [u8], index: usize, pixel: Pixel) {
        let (hi, lo) = if self.swap_rb {
            (pixel.b, pixel.r)
        } else {
            (pixel.r, pixel.b)
        };
        let v = (u16::from(hi >> 3) << 11) | (u16::from(pixel.g >> 2) << 5) | u16::from(lo >> 3);
        if let Some(out) = chunk_mut::<2>(data, index) {
            out.copy_from_slice(&v.to_le_bytes());
        }
    }
}

// ---------------------------------------------------------------------------
// 24 / 32 bpp
// ---------------------------------------------------------------------------

/// Byte position of each channel inside one packed pixel.
#[derive(Clone, Copy)]
struct ChannelOrder {
    r: usize,
    g: usize,
    b: usize,
    /// `None` for formats without a stored alpha.
    a: Option<usize>,
}

/// Byte-exact 3- or 4-byte encodings differing only in channel order.
struct PackedBytes<const N: usize> {
    order: ChannelOrder,
}

static RGB888: PackedBytes<3> = PackedBytes {
    order: ChannelOrder { r: 0, g: 1, b: 2, a: None },
};
static BGR888: PackedBytes<3> = PackedBytes {
    order: ChannelOrder { r: 2, g: 1, b: 0, a: None },
};
static RGBA8888: PackedBytes<4> = PackedBytes {
    order: ChannelOrder { r: 0, g: 1, b: 2, a: Some(3) },
};
static ARGB8888: PackedBytes<4> = PackedBytes {
    order: ChannelOrder { r: 1, g: 2, b: 3, a: Some(0) },
};
static ABGR8888: PackedBytes<4> = PackedBytes {
    order: ChannelOrder { r: 3, g: 2, b: 1, a: Some(0) },
};
static BGRA8888: PackedBytes<4> = PackedBytes {
    order: ChannelOrder { r: 2, g: 1, b: 0, a: Some(3) },
};

impl<const N: usize> PixelCodec for PackedBytes<N> {
    #[allow(clippy::cast_possible_truncation)]
    fn bits_per_pixel(&self) -> u32 {
        (N * 8) as u32
    }

    fn decode(&self, data: &[u8], index: usize) -> Pixel {
        let Some(bytes) = chunk::<N>(data, index) else {
            return Pixel::TRANSPARENT;
        };
        let at = |pos: usize| bytes.get(pos).copied().unwrap_or(0);
        let o = self.order;
        Pixel::rgba(at(o.r), at(o.g), at(o.b), o.a.map_or(255, at))
    }

    fn encode(&self, data: &mut [u8], index: usize, pixel: Pixel) {
        let Some(out) = chunk_mut::<N>(data, index) else {
            return;
        };
        let o = self.order;
        let mut put = |pos: usize, value: u8| {
            if let Some(byte) = out.get_mut(pos) {
                *byte = value;
            }
        };
        put(o.r, pixel.r);
        put(o.g, pixel.g);
        put(o.b, pixel.b);
        if let Some(a) = o.a {
            put(a, pixel.a);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::indexing_slicing)]
    use super::*;

    #[test]
    fn test_registry_ids_are_stable() {
        // These bindings are persisted by callers and must never change.
        let expected = [
            (0, "bit"),
            (1, "byte"),
            (2, "rgb332"),
            (3, "rgb565"),
            (4, "bgr565"),
            (5, "rgb888"),
            (6, "bgr888"),
            (7, "rgba8888"),
            (8, "argb8888"),
            (9, "abgr8888"),
            (10, "bgra8888"),
        ];
        for (fmt, (id, name)) in PixelFormat::ALL.into_iter().zip(expected) {
            assert_eq!(fmt.id(), id);
            assert_eq!(fmt.name(), name);
            assert_eq!(PixelFormat::from_id(id), Ok(fmt));
            assert_eq!(name.parse::<PixelFormat>(), Ok(fmt));
        }
    }

    #[test]
    fn test_unknown_format() {
        assert_eq!(
            PixelFormat::from_id(11),
            Err(DrawbufferError::UnsupportedFormat(FormatRef::Id(11)))
        );
        assert!(PixelFormat::from_name("yuyv").is_err());
        assert!(PixelFormat::try_from(u32::MAX).is_err());
    }

    #[test]
    fn test_codec_bpp_matches_format() {
        for fmt in PixelFormat::ALL {
            assert_eq!(fmt.codec().bits_per_pixel(), fmt.bits_per_pixel(), "{fmt}");
        }
    }

    #[test]
    fn test_buffer_len() {
        assert_eq!(PixelFormat::Mono1.buffer_len(8, 1), Some(1));
        assert_eq!(PixelFormat::Mono1.buffer_len(3, 3), Some(2));
        assert_eq!(PixelFormat::Gray8.buffer_len(3, 3), Some(9));
        assert_eq!(PixelFormat::Bgr565.buffer_len(4, 4), Some(32));
        assert_eq!(PixelFormat::Rgb888.buffer_len(2, 5), Some(30));
        assert_eq!(PixelFormat::Argb8888.buffer_len(4, 4), Some(64));
    }

    #[test]
    fn test_mono1_layout() {
        let mut data = [0u8; 2];
        encode(&mut data, 10, 0, 0, PixelFormat::Mono1, Pixel::WHITE);
        encode(&mut data, 10, 9, 0, PixelFormat::Mono1, Pixel::rgb(128, 0, 0));
        assert_eq!(data, [0x80, 0x40]);

        assert_eq!(decode(&data, 10, 0, 0, PixelFormat::Mono1), Pixel::WHITE);
        assert_eq!(decode(&data, 10, 1, 0, PixelFormat::Mono1), Pixel::TRANSPARENT);

        // Red MSB clear → bit cleared again
        encode(&mut data, 10, 0, 0, PixelFormat::Mono1, Pixel::rgb(127, 255, 255));
        assert_eq!(data[0], 0x00);
    }

    #[test]
    fn test_gray8_mirrors_alpha() {
        let mut data = [0u8; 1];
        encode(&mut data, 1, 0, 0, PixelFormat::Gray8, Pixel::rgba(77, 1, 2, 3));
        assert_eq!(data, [77]);
        assert_eq!(decode(&data, 1, 0, 0, PixelFormat::Gray8), Pixel::rgba(77, 77, 77, 77));
    }

    #[test]
    fn test_rgb332_truncates() {
        let mut data = [0u8; 1];
        encode(&mut data, 1, 0, 0, PixelFormat::Rgb332, Pixel::rgb(0xFF, 0x3F, 0x7F));
        // r=111 g=001 b=01
        assert_eq!(data, [0b1110_0101]);
        assert_eq!(
            decode(&data, 1, 0, 0, PixelFormat::Rgb332),
            Pixel::rgb(0xE0, 0x20, 0x40)
        );
    }

    #[test]
    fn test_565_byte_order() {
        let mut data = [0u8; 2];
        encode(&mut data, 1, 0, 0, PixelFormat::Rgb565, Pixel::rgba(0xFF, 0, 0, 0));
        assert_eq!(data, [0x00, 0xF8]);
        assert_eq!(decode(&data, 1, 0, 0, PixelFormat::Rgb565), Pixel::rgb(0xF8, 0, 0));

        encode(&mut data, 1, 0, 0, PixelFormat::Bgr565, Pixel::rgb(0xFF, 0, 0));
        assert_eq!(data, [0x1F, 0x00]);
        assert_eq!(decode(&data, 1, 0, 0, PixelFormat::Bgr565), Pixel::rgb(0xF8, 0, 0));

        encode(&mut data, 1, 0, 0, PixelFormat::Rgb565, Pixel::rgb(0, 0xFF, 0));
        assert_eq!(decode(&data, 1, 0, 0, PixelFormat::Rgb565), Pixel::rgb(0, 0xFC, 0));
    }

    #[test]
    fn test_24bpp_order_and_alpha() {
        let p = Pixel::rgba(1, 2, 3, 4);
        let mut data = [0u8; 3];
        encode(&mut data, 1, 0, 0, PixelFormat::Rgb888, p);
        assert_eq!(data, [1, 2, 3]);
        assert_eq!(decode(&data, 1, 0, 0, PixelFormat::Rgb888), Pixel::rgb(1, 2, 3));

        encode(&mut data, 1, 0, 0, PixelFormat::Bgr888, p);
        assert_eq!(data, [3, 2, 1]);
        assert_eq!(decode(&data, 1, 0, 0, PixelFormat::Bgr888), Pixel::rgb(1, 2, 3));
    }

    #[test]
    fn test_32bpp_orders() {
        let p = Pixel::rgba(1, 2, 3, 4);
        let cases = [
            (PixelFormat::Rgba8888, [1, 2, 3, 4]),
            (PixelFormat::Argb8888, [4, 1, 2, 3]),
            (PixelFormat::Abgr8888, [4, 3, 2, 1]),
            (PixelFormat::Bgra8888, [3, 2, 1, 4]),
        ];
        for (fmt, bytes) in cases {
            let mut data = [0u8; 4];
            encode(&mut data, 1, 0, 0, fmt, p);
            assert_eq!(data, bytes, "{fmt}");
            assert_eq!(decode(&data, 1, 0, 0, fmt), p, "{fmt}");
        }
    }

    #[test]
    fn test_short_slice_never_panics() {
        let mut data = [0u8; 3];
        for fmt in PixelFormat::ALL {
            encode(&mut data, 4, 3, 7, fmt, Pixel::WHITE);
            assert_eq!(decode(&data, 4, 3, 7, fmt), Pixel::TRANSPARENT, "{fmt}");
        }
        assert_eq!(data, [0, 0, 0]);
    }

    #[test]
    fn test_quantize() {
        let p = Pixel::rgba(0x9A, 0x9A, 0x9A, 0x10);
        assert_eq!(PixelFormat::Rgba8888.quantize(p), p);
        assert_eq!(PixelFormat::Rgb565.quantize(p), Pixel::rgb(0x98, 0x98, 0x98));
        assert_eq!(PixelFormat::Mono1.quantize(p), Pixel::WHITE);
    }
}
