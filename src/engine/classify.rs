use crate::codec::{AlphaSource, DecodedImage};

/// Whether a decoded tile has at least one pixel that is not fully opaque.
///
/// - Alpha-channel sources are scanned pixel by pixel, stopping at the first alpha below 255.
/// - Palette sources with a transparency key report `true` without checking whether any pixel
///   actually uses a transparent entry.
/// - Everything else reports `false`.
pub fn has_transparency(image: &DecodedImage) -> bool {
    match image.alpha {
        AlphaSource::Channel => image.pixels.alphas().any(|a| a < u8::MAX),
        AlphaSource::PaletteKey => true,
        AlphaSource::None => false,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/classify.rs"]
mod tests;
