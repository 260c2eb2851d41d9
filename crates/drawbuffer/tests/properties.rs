//! Property-based tests for the codec, the blend engine and bounds handling.
//! Verifies the laws hold for ALL inputs, not just fixed examples.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

use drawbuffer::{blend, decode, encode, Drawbuffer, Pixel, PixelFormat};
use proptest::prelude::*;

fn any_pixel() -> impl Strategy<Value = Pixel> {
    any::<[u8; 4]>().prop_map(Pixel::from)
}

fn any_format() -> impl Strategy<Value = PixelFormat> {
    proptest::sample::select(PixelFormat::ALL.to_vec())
}

const ALPHA_FORMATS: [PixelFormat; 4] = [
    PixelFormat::Rgba8888,
    PixelFormat::Argb8888,
    PixelFormat::Abgr8888,
    PixelFormat::Bgra8888,
];

proptest! {
    /// Every 32-bit format stores all four channels losslessly.
    #[test]
    fn alpha_formats_round_trip(p in any_pixel(), idx in 0usize..4) {
        let format = ALPHA_FORMATS[idx];
        let mut data = [0u8; 4];
        encode(&mut data, 1, 0, 0, format, p);
        prop_assert_eq!(decode(&data, 1, 0, 0, format), p);
    }

    /// Lossy formats round-trip once the pixel is pre-quantized.
    #[test]
    fn quantized_pixels_round_trip(p in any_pixel(), format in any_format(), x in 0u32..7, y in 0u32..3) {
        let mut db = Drawbuffer::new(7, 3, format).unwrap();
        let q = format.quantize(p);
        db.set_pixel(x as i32, y as i32, q);
        prop_assert_eq!(db.get_pixel(x as i32, y as i32), q);
    }

    /// Quantizing is idempotent.
    #[test]
    fn quantize_is_idempotent(p in any_pixel(), format in any_format()) {
        let q = format.quantize(p);
        prop_assert_eq!(format.quantize(q), q);
    }

    /// Writing one pixel never disturbs its neighbours, even in packed formats.
    #[test]
    fn set_pixel_is_local(p in any_pixel(), format in any_format(), x in 0i32..9, y in 0i32..2) {
        let mut db = Drawbuffer::new(9, 2, format).unwrap();
        let before: Vec<Pixel> = (0..18).map(|i| db.get_pixel(i % 9, i / 9)).collect();
        db.set_pixel(x, y, p);
        for i in 0..18 {
            let (cx, cy) = (i % 9, i / 9);
            if (cx, cy) != (x, y) {
                prop_assert_eq!(db.get_pixel(cx, cy), before[i as usize]);
            }
        }
    }

    /// Fully transparent paint leaves the base untouched.
    #[test]
    fn blend_with_zero_alpha_is_identity(base in any_pixel(), paint in any_pixel()) {
        prop_assert_eq!(blend(base, paint.with_alpha(0)), base);
    }

    /// Opaque paint replaces the color but keeps the base alpha.
    #[test]
    fn blend_with_full_alpha_replaces_color(base in any_pixel(), paint in any_pixel()) {
        let out = blend(base, paint.with_alpha(255));
        prop_assert_eq!(out, Pixel::rgba(paint.r, paint.g, paint.b, base.a));
    }

    /// Blended channels lie between base and paint (truncation may lose one step).
    #[test]
    fn blend_stays_between_inputs(base in any_pixel(), paint in any_pixel()) {
        let out = blend(base, paint);
        for (b, p, o) in [(base.r, paint.r, out.r), (base.g, paint.g, out.g), (base.b, paint.b, out.b)] {
            let o = u16::from(o);
            prop_assert!(
                o + 1 >= u16::from(b.min(p)) && o <= u16::from(b.max(p)),
                "{} not between {} and {}", o, b, p
            );
        }
        prop_assert_eq!(out.a, base.a);
    }

    /// Reads just outside the buffer are transparent for any size and format.
    #[test]
    fn out_of_bounds_reads_are_transparent(w in 1u32..40, h in 1u32..40, format in any_format(), fill in any_pixel()) {
        let mut db = Drawbuffer::new(w, h, format).unwrap();
        db.clear(fill);
        prop_assert_eq!(db.get_pixel(-1, 0), Pixel::TRANSPARENT);
        prop_assert_eq!(db.get_pixel(w as i32, 0), Pixel::TRANSPARENT);
        prop_assert_eq!(db.get_pixel(0, -1), Pixel::TRANSPARENT);
        prop_assert_eq!(db.get_pixel(0, h as i32), Pixel::TRANSPARENT);
    }

    /// Drawing anywhere, with any coordinates, never panics or grows the buffer.
    #[test]
    fn drawing_never_panics(
        coords in proptest::array::uniform6(-100_000i32..100_000),
        radius in -50i32..200,
        color in any_pixel(),
    ) {
        use drawbuffer::{DrawMode, LineMode, Shape};
        let [a, b, c, d, e, f] = coords;
        let mut db = Drawbuffer::new(17, 11, PixelFormat::Rgb565).unwrap();
        db.line(a, b, c, d, color, LineMode::AntiAliased { radius: 1.5 });
        db.rectangle(a, b, c, d, color, Shape::Outline, DrawMode::AlphaBlend);
        db.triangle((a % 64, b % 64), (c % 64, d % 64), (e % 64, f % 64), color, DrawMode::Opaque);
        db.circle(e % 64, f % 64, radius, color, Shape::Fill, DrawMode::AlphaBlend);
        prop_assert_eq!(db.dump().len(), 17 * 11 * 2);
    }

    /// Registry ids and names map back to the same format.
    #[test]
    fn registry_round_trips(format in any_format()) {
        prop_assert_eq!(PixelFormat::from_id(format.id()).unwrap(), format);
        prop_assert_eq!(PixelFormat::from_name(format.name()).unwrap(), format);
    }
}
