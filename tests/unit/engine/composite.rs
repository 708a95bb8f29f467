use super::*;
use crate::codec::png_codec::PngCodec;

const BASE_PX: Rgba8 = [10, 20, 30, 255];

fn base(w: u32, h: u32) -> PixelBuffer {
    PixelBuffer::filled(w, h, BASE_PX)
}

#[test]
fn blend_pixel_endpoints() {
    let dst = [10, 20, 30, 255];
    assert_eq!(blend_pixel(dst, [200, 200, 200, 0]), dst);
    assert_eq!(blend_pixel(dst, [200, 100, 50, 255]), [200, 100, 50, 255]);
}

#[test]
fn blend_pixel_mixes_every_channel_by_source_alpha() {
    // a = 51 (0.2): out = dst * 0.8 + src * 0.2 for colors and alpha alike.
    let out = blend_pixel([100, 0, 255, 255], [200, 255, 0, 51]);
    assert_eq!(out, [120, 51, 204, 214]);
}

#[test]
fn clip_paste_fully_inside() {
    let r = clip_paste(20, 20, 5, 4, 3, 2).unwrap();
    assert_eq!(
        r,
        PasteRect {
            src_left: 0,
            src_top: 0,
            src_right: 5,
            src_bottom: 4,
            dest_x: 3,
            dest_y: 2,
        }
    );
}

#[test]
fn clip_paste_negative_and_overhanging_offsets() {
    let r = clip_paste(20, 20, 10, 10, -5, 15).unwrap();
    assert_eq!((r.src_left, r.src_right), (5, 10));
    assert_eq!((r.src_top, r.src_bottom), (0, 5));
    assert_eq!((r.dest_x, r.dest_y), (0, 15));
}

#[test]
fn clip_paste_without_overlap() {
    assert_eq!(clip_paste(20, 20, 10, 10, 30, 0), None);
    assert_eq!(clip_paste(20, 20, 10, 10, 20, 0), None);
    assert_eq!(clip_paste(20, 20, 10, 10, -10, 0), None);
    assert_eq!(clip_paste(20, 20, 10, 10, 0, -10), None);
    assert_eq!(clip_paste(20, 20, 0, 10, 0, 0), None);
}

#[test]
fn clip_paste_extreme_offsets_do_not_overlap() {
    for (left, top) in [
        (i64::MIN, 0),
        (i64::MIN + 1, 0),
        (i64::MAX, 0),
        (0, i64::MIN),
        (0, i64::MAX),
        (i64::MIN, i64::MAX),
    ] {
        assert_eq!(clip_paste(20, 20, 10, 10, left, top), None, "({left}, {top})");
    }
}

#[test]
fn paste_with_extreme_offset_leaves_base_untouched() {
    let mut canvas = base(4, 4);
    let before = canvas.clone();
    let diff = PixelBuffer::filled(2, 2, [1, 2, 3, 255]);
    assert!(!paste_with_clip(&mut canvas, &diff, i64::MIN + 1, i64::MAX - 1));
    assert_eq!(canvas, before);
}

#[test]
fn full_canvas_diff_equals_direct_blend() {
    let b = PixelBuffer::from_fn(6, 4, |x, y| [x as u8 * 30, y as u8 * 50, 90, 255]);
    let d = PixelBuffer::from_fn(6, 4, |x, y| [200, 10, x as u8 * 5, (x * 40 + y * 3) as u8]);

    let mut pasted = b.clone();
    assert!(paste_with_clip(&mut pasted, &d, 0, 0));

    let direct = PixelBuffer::from_fn(6, 4, |x, y| {
        blend_pixel(b.pixel(x, y).unwrap(), d.pixel(x, y).unwrap())
    });
    assert_eq!(pasted, direct);
}

#[test]
fn out_of_canvas_paste_is_noop() {
    let b = base(20, 20);
    let d = PixelBuffer::filled(10, 10, [255, 0, 0, 255]);

    let mut pasted = b.clone();
    assert!(!paste_with_clip(&mut pasted, &d, 30, 0));
    assert_eq!(pasted, b);

    let bytes = compose(&PngCodec, &b, &d, 30, 0).unwrap();
    assert_eq!(bytes, PngCodec.encode(&b).unwrap());
}

#[test]
fn partial_overlap_only_touches_clipped_window() {
    let b = base(20, 20);
    // Column index is encoded in the red channel so the mapping is observable.
    let d = PixelBuffer::from_fn(10, 10, |x, _| [x as u8, 0, 0, 255]);

    let mut pasted = b.clone();
    assert!(paste_with_clip(&mut pasted, &d, -5, 0));

    for y in 0..20 {
        for x in 0..20 {
            let px = pasted.pixel(x, y).unwrap();
            if x < 5 && y < 10 {
                assert_eq!(px, [x as u8 + 5, 0, 0, 255], "canvas ({x}, {y})");
            } else {
                assert_eq!(px, BASE_PX, "canvas ({x}, {y})");
            }
        }
    }
}

#[test]
fn compose_leaves_caller_base_untouched_and_is_idempotent() {
    let b = base(8, 8);
    let d = PixelBuffer::filled(4, 4, [255, 255, 255, 128]);

    let first = compose(&PngCodec, &b, &d, 2, 2).unwrap();
    let second = compose(&PngCodec, &b, &d, 2, 2).unwrap();
    assert_eq!(first, second);
    assert_eq!(b, base(8, 8));

    let decoded = PngCodec.decode(&first).unwrap();
    assert_eq!(decoded.pixels.pixel(0, 0), Some(BASE_PX));
    assert_eq!(
        decoded.pixels.pixel(3, 3),
        Some(blend_pixel(BASE_PX, [255, 255, 255, 128]))
    );
}
