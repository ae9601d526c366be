use std::path::Path;

use super::AssetError;

/// RGBA8 texels packed one per `u32` (red in the low byte), rows bottom-up.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl DecodedTexture {
    /// Converts to RGBA8 and flips vertically so row 0 is the bottom of the
    /// image, matching `v = 0` in model UVs.
    pub fn from_image(img: image::DynamicImage) -> Self {
        let mut rgba = img.to_rgba8();
        image::imageops::flip_vertical_in_place(&mut rgba);
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| pack_rgba(p.0)).collect();
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// Byte order matches WGSL `unpack4x8unorm`.
#[inline]
pub fn pack_rgba(rgba: [u8; 4]) -> u32 {
    u32::from_le_bytes(rgba)
}

pub fn decode_texture(path: &Path) -> Result<DecodedTexture, AssetError> {
    let img = image::open(path).map_err(|source| AssetError::Texture {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(DecodedTexture::from_image(img))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    #[test]
    fn rows_are_flipped() {
        // Top row red, bottom row blue.
        let img = image::RgbaImage::from_fn(2, 2, |_, y| image::Rgba(if y == 0 { RED } else { BLUE }));
        let tex = DecodedTexture::from_image(image::DynamicImage::ImageRgba8(img));
        assert_eq!((tex.width, tex.height), (2, 2));
        assert_eq!(&tex.pixels[..2], &[pack_rgba(BLUE); 2]);
        assert_eq!(&tex.pixels[2..], &[pack_rgba(RED); 2]);
    }

    #[test]
    fn rgb_input_gains_opaque_alpha() {
        let img = image::RgbImage::from_pixel(1, 1, image::Rgb([10, 20, 30]));
        let tex = DecodedTexture::from_image(image::DynamicImage::ImageRgb8(img));
        assert_eq!(tex.pixels, vec![pack_rgba([10, 20, 30, 255])]);
    }

    #[test]
    fn red_lands_in_low_byte() {
        assert_eq!(pack_rgba([0x11, 0x22, 0x33, 0x44]), 0x4433_2211);
    }

    #[test]
    fn missing_file_is_a_texture_error() {
        let err = decode_texture(Path::new("/nonexistent/wall.png")).unwrap_err();
        assert!(matches!(err, AssetError::Texture { .. }));
    }
}
