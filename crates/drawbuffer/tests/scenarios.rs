//! End-to-end drawbuffer scenarios: exact byte layouts and pixel sets.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

use std::cell::Cell;
use std::collections::BTreeSet;
use std::ptr::NonNull;
use std::rc::Rc;

use drawbuffer::{
    compose, AlphaPolicy, ComposeParams, DitherMasks, DrawMode, Drawbuffer, DrawbufferError,
    LineMode, Pixel, PixelFormat, Shape,
};
use tracing_subscriber::EnvFilter;

/// Route the crate's tracing output through the test harness.
/// `RUST_LOG=drawbuffer=trace cargo test` shows every primitive.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn painted(db: &Drawbuffer) -> BTreeSet<(i32, i32)> {
    let mut set = BTreeSet::new();
    for y in 0..db.height() as i32 {
        for x in 0..db.width() as i32 {
            if db.get_pixel(x, y) != Pixel::TRANSPARENT {
                set.insert((x, y));
            }
        }
    }
    set
}

// ── Storage ──────────────────────────────────────────────────────────────────

#[test]
fn test_rgba_dump_layout() {
    init_tracing();
    let mut db = Drawbuffer::new(4, 4, PixelFormat::Rgba8888).unwrap();
    db.set_pixel(1, 1, Pixel::rgba(255, 0, 0, 255));

    let dump = db.dump();
    assert_eq!(dump.len(), 64);
    let offset = (4 + 1) * 4;
    assert_eq!(&dump[offset..offset + 4], &[255, 0, 0, 255]);
    for (i, &b) in dump.iter().enumerate() {
        if !(offset..offset + 4).contains(&i) {
            assert_eq!(b, 0, "byte {i}");
        }
    }
}

#[test]
fn test_load_mismatch_leaves_data() {
    init_tracing();
    let mut db = Drawbuffer::new(3, 3, PixelFormat::Rgb565).unwrap();
    db.clear(Pixel::rgb(255, 0, 0));
    let before = db.dump().to_vec();

    let err = db.load(&[0u8; 17]).unwrap_err();
    assert_eq!(
        err,
        DrawbufferError::LengthMismatch {
            expected: 18,
            actual: 17
        }
    );
    assert_eq!(db.dump(), &before[..]);
}

#[test]
fn test_dump_load_round_trip_across_buffers() {
    init_tracing();
    let mut a = Drawbuffer::new(5, 5, PixelFormat::Bgr888).unwrap();
    a.circle(2, 2, 2, Pixel::rgb(1, 2, 3), Shape::Fill, DrawMode::Opaque);
    let mut b = Drawbuffer::new(5, 5, PixelFormat::Bgr888).unwrap();
    b.load(a.dump()).unwrap();
    assert_eq!(b.get_pixel(2, 2), Pixel::rgb(1, 2, 3));
    assert_eq!(a.dump(), b.dump());
}

#[test]
fn test_double_close_owned_and_borrowed() {
    init_tracing();
    let mut owned = Drawbuffer::new(8, 8, PixelFormat::Mono1).unwrap();
    owned.close();
    owned.close();
    assert_eq!(owned.to_string(), "Closed Drawbuffer");

    let mut region = vec![0u8; 8];
    let released = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&released);
    let ptr = NonNull::new(region.as_mut_ptr()).unwrap();
    // SAFETY: `region` outlives the drawbuffer and isn't accessed while it's open.
    let mut borrowed = unsafe {
        Drawbuffer::wrap(8, 8, PixelFormat::Mono1, ptr, region.len(), move || {
            counter.set(counter.get() + 1);
        })
        .unwrap()
    };
    borrowed.set_pixel(0, 0, Pixel::WHITE);
    borrowed.set_pixel(7, 7, Pixel::WHITE);
    borrowed.close();
    borrowed.close();
    drop(borrowed);

    assert_eq!(released.get(), 1);
    assert_eq!(region[0], 0x80);
    assert_eq!(region[7], 0x01);
}

// ── Rasterizer ───────────────────────────────────────────────────────────────

#[test]
fn test_exact_line_pixels() {
    init_tracing();
    let mut db = Drawbuffer::new(8, 8, PixelFormat::Rgba8888).unwrap();
    db.line(0, 0, 3, 0, Pixel::WHITE, LineMode::Opaque);
    let expected: BTreeSet<_> = [(0, 0), (1, 0), (2, 0), (3, 0)].into_iter().collect();
    assert_eq!(painted(&db), expected);
}

#[test]
fn test_right_triangle_staircase() {
    init_tracing();
    let mut db = Drawbuffer::new(8, 8, PixelFormat::Rgba8888).unwrap();
    db.triangle((0, 0), (4, 0), (0, 4), Pixel::WHITE, DrawMode::Opaque);

    let mut expected = BTreeSet::new();
    for y in 0..=4 {
        for x in 0..=(4 - y) {
            expected.insert((x, y));
        }
    }
    assert_eq!(expected.len(), 15);
    assert_eq!(painted(&db), expected);
}

#[test]
fn test_outline_rectangle_on_rgb565() {
    init_tracing();
    let mut db = Drawbuffer::new(32, 16, PixelFormat::Rgb565).unwrap();
    db.clear(Pixel::rgb(0, 0, 64));
    db.rectangle(2, 2, 10, 6, Pixel::WHITE, Shape::Outline, DrawMode::Opaque);
    assert_eq!(db.get_pixel(2, 2), Pixel::rgb(248, 252, 248));
    assert_eq!(db.get_pixel(11, 7), Pixel::rgb(248, 252, 248));
    assert_eq!(db.get_pixel(5, 5), Pixel::rgb(0, 0, 64));
}

#[test]
fn test_mono_buffer_packs_msb_first() {
    init_tracing();
    let mut db = Drawbuffer::new(16, 1, PixelFormat::Mono1).unwrap();
    db.line(0, 0, 2, 0, Pixel::WHITE, LineMode::Opaque);
    db.set_pixel(15, 0, Pixel::WHITE);
    assert_eq!(db.dump(), &[0b1110_0000, 0b0000_0001]);
}

#[test]
fn test_extreme_shapes_on_small_buffer() {
    init_tracing();
    let mut db = Drawbuffer::new(8, 8, PixelFormat::Gray8).unwrap();
    db.line(i32::MIN, 3, i32::MAX, 3, Pixel::WHITE, LineMode::Opaque);
    db.triangle((0, 0), (2, 0), (1, i32::MAX), Pixel::WHITE, DrawMode::Opaque);
    db.circle(4, 4, i32::MAX, Pixel::WHITE, Shape::Outline, DrawMode::Opaque);
    db.rectangle(i32::MIN, i32::MIN, i32::MAX, i32::MAX, Pixel::WHITE, Shape::Outline, DrawMode::Opaque);

    let set = painted(&db);
    for x in 0..8 {
        assert!(set.contains(&(x, 3)), "line pixel ({x}, 3)");
    }
    for y in 0..8 {
        assert!(set.contains(&(1, y)), "triangle pixel (1, {y})");
    }
}

// ── Dither + compose pipeline ────────────────────────────────────────────────

#[test]
fn test_dither_then_compose_to_panel() {
    init_tracing();
    let mut scene = Drawbuffer::new(16, 8, PixelFormat::Rgba8888).unwrap();
    scene.map_pixels(|x, _, _| {
        let v = (x * 16) as u8;
        Pixel::rgb(v, v, v)
    });
    scene.floyd_steinberg(DitherMasks::for_format(PixelFormat::Rgb332).unwrap());

    let mut panel = Drawbuffer::new(16, 8, PixelFormat::Rgb332).unwrap();
    compose(&scene, &mut panel, &ComposeParams::default()).unwrap();

    // Every dithered pixel is exactly representable in RGB332.
    for y in 0..8 {
        for x in 0..16 {
            let p = scene.get_pixel(x, y);
            assert_eq!(panel.get_pixel(x, y), PixelFormat::Rgb332.quantize(p));
            assert_eq!(PixelFormat::Rgb332.quantize(p), p.with_alpha(255));
        }
    }
}

#[test]
fn test_compose_alphablend_with_scale_is_rejected() {
    init_tracing();
    let src = Drawbuffer::new(2, 2, PixelFormat::Rgba8888).unwrap();
    let mut dst = Drawbuffer::new(4, 4, PixelFormat::Rgba8888).unwrap();
    let params = ComposeParams {
        scale_x: 2,
        alpha_policy: AlphaPolicy::AlphaBlend,
        ..ComposeParams::default()
    };
    assert!(matches!(
        compose(&src, &mut dst, &params),
        Err(DrawbufferError::IncompatibleOperation(_))
    ));
}

#[test]
fn test_sprite_over_background() {
    init_tracing();
    let mut sprite = Drawbuffer::new(3, 3, PixelFormat::Argb8888).unwrap();
    sprite.circle(1, 1, 1, Pixel::rgb(0, 255, 0), Shape::Outline, DrawMode::Opaque);

    let mut bg = Drawbuffer::new(6, 6, PixelFormat::Bgra8888).unwrap();
    bg.clear(Pixel::rgb(10, 10, 10));
    compose(
        &sprite,
        &mut bg,
        &ComposeParams::at(2, 2).with_policy(AlphaPolicy::SkipTransparent),
    )
    .unwrap();

    assert_eq!(bg.get_pixel(3, 2), Pixel::rgb(0, 255, 0));
    assert_eq!(bg.get_pixel(3, 3), Pixel::rgb(10, 10, 10));
    assert_eq!(bg.get_pixel(2, 2), Pixel::rgb(10, 10, 10));
}
