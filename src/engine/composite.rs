use crate::codec::{ImageCodec, PixelBuffer, Rgba8};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Clipped paste window: source rectangle inside the diff tile plus its destination origin.
pub struct PasteRect {
    /// First source column (inclusive).
    pub src_left: u32,
    /// First source row (inclusive).
    pub src_top: u32,
    /// Last source column (exclusive).
    pub src_right: u32,
    /// Last source row (exclusive).
    pub src_bottom: u32,
    /// Destination column of `src_left` on the base canvas.
    pub dest_x: u32,
    /// Destination row of `src_top` on the base canvas.
    pub dest_y: u32,
}

/// Intersect a `diff_w` x `diff_h` tile anchored at `(left, top)` with a `base_w` x `base_h`
/// canvas. Returns `None` when nothing overlaps.
pub fn clip_paste(
    base_w: u32,
    base_h: u32,
    diff_w: u32,
    diff_h: u32,
    left: i64,
    top: i64,
) -> Option<PasteRect> {
    // Saturating: offsets are arbitrary manifest values.
    let src_left = left.saturating_neg().max(0);
    let src_top = top.saturating_neg().max(0);
    let src_right = i64::from(diff_w).min(i64::from(base_w).saturating_sub(left));
    let src_bottom = i64::from(diff_h).min(i64::from(base_h).saturating_sub(top));
    if src_right <= src_left || src_bottom <= src_top {
        return None;
    }

    // All four bounds now lie in [0, diff_w] / [0, diff_h] and the origin in the canvas.
    Some(PasteRect {
        src_left: src_left as u32,
        src_top: src_top as u32,
        src_right: src_right as u32,
        src_bottom: src_bottom as u32,
        dest_x: left.max(0) as u32,
        dest_y: top.max(0) as u32,
    })
}

/// Blend `src` onto `dst` using `src`'s alpha as the factor for every channel, alpha included.
pub fn blend_pixel(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let a = u16::from(src[3]);
    if a == 0 {
        return dst;
    }
    if a == 255 {
        return src;
    }
    let inv = 255 - a;
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = lerp_div255(u16::from(dst[i]), u16::from(src[i]), inv, a);
    }
    out
}

fn lerp_div255(d: u16, s: u16, inv: u16, a: u16) -> u8 {
    ((u32::from(d) * u32::from(inv) + u32::from(s) * u32::from(a) + 127) / 255) as u8
}

/// Paste `diff` onto `base` in place at `(left, top)`, clipped to the canvas.
///
/// Returns `false` when the tile does not overlap the canvas and `base` is untouched.
pub fn paste_with_clip(base: &mut PixelBuffer, diff: &PixelBuffer, left: i64, top: i64) -> bool {
    let Some(rect) = clip_paste(
        base.width(),
        base.height(),
        diff.width(),
        diff.height(),
        left,
        top,
    ) else {
        return false;
    };

    let cols = rect.src_right - rect.src_left;
    for sy in rect.src_top..rect.src_bottom {
        let dy = rect.dest_y + (sy - rect.src_top);
        let src = diff.row(sy, rect.src_left, rect.src_right);
        let dst = base.row_mut(dy, rect.dest_x, rect.dest_x + cols);
        for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
            let out = blend_pixel([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
    true
}

/// Composite `diff` onto a private copy of `base` and encode the result.
///
/// Layer opacity and visibility are not applied.
pub fn compose(
    codec: &dyn ImageCodec,
    base: &PixelBuffer,
    diff: &PixelBuffer,
    left: i64,
    top: i64,
) -> anyhow::Result<Vec<u8>> {
    let mut canvas = base.clone();
    paste_with_clip(&mut canvas, diff, left, top);
    codec.encode(&canvas)
}

#[cfg(test)]
#[path = "../../tests/unit/engine/composite.rs"]
mod tests;
