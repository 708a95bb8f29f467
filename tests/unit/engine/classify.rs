use super::*;
use crate::codec::PixelBuffer;

#[test]
fn opaque_channel_image_is_not_transparent() {
    let img = DecodedImage::new(PixelBuffer::filled(4, 4, [1, 2, 3, 255]), AlphaSource::Channel);
    assert!(!has_transparency(&img));
}

#[test]
fn single_translucent_pixel_is_enough() {
    let px = PixelBuffer::from_fn(4, 4, |x, y| {
        if (x, y) == (3, 3) {
            [0, 0, 0, 254]
        } else {
            [0, 0, 0, 255]
        }
    });
    assert!(has_transparency(&DecodedImage::new(px, AlphaSource::Channel)));
}

#[test]
fn palette_key_reports_transparent_even_if_unused() {
    let img = DecodedImage::new(
        PixelBuffer::filled(2, 2, [9, 9, 9, 255]),
        AlphaSource::PaletteKey,
    );
    assert!(has_transparency(&img));
}

#[test]
fn sources_without_alpha_are_opaque() {
    // Even if expansion produced translucent pixels, the source model decides.
    let img = DecodedImage::new(PixelBuffer::filled(2, 2, [0, 0, 0, 0]), AlphaSource::None);
    assert!(!has_transparency(&img));
}
