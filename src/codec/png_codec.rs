use std::io::Cursor;

use anyhow::Context;

use crate::codec::{AlphaSource, DecodedImage, ImageCodec, PixelBuffer};

#[derive(Clone, Copy, Debug, Default)]
/// PNG codec backed by the `image` crate, with a `png` header probe for palette transparency.
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<DecodedImage> {
        let alpha = probe_alpha_source(bytes)?;
        let rgba = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .context("decode png from memory")?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = PixelBuffer::from_raw(width, height, rgba.into_raw())?;
        Ok(DecodedImage::new(pixels, alpha))
    }

    fn encode(&self, pixels: &PixelBuffer) -> anyhow::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            image::ExtendedColorType::Rgba8,
        )
        .context("encode png")?;
        Ok(buf)
    }
}

// `image` expands palettes to RGB(A) on decode, so the header decides the transparency model.
fn probe_alpha_source(bytes: &[u8]) -> anyhow::Result<AlphaSource> {
    let reader = png::Decoder::new(Cursor::new(bytes))
        .read_info()
        .context("read png header")?;
    let info = reader.info();
    Ok(match info.color_type {
        png::ColorType::Rgba | png::ColorType::GrayscaleAlpha => AlphaSource::Channel,
        png::ColorType::Indexed if info.trns.is_some() => AlphaSource::PaletteKey,
        _ => AlphaSource::None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/codec/png_codec.rs"]
mod tests;
