use std::path::Path;

use bytemuck::{Pod, Zeroable};

use super::{decode_texture, AssetError, DecodedTexture};

/// Where one texture lives in the atlas (`struct Sprite` in WGSL).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Sprite {
    pub offset: u32,
    pub width: u32,
    pub height: u32,
    pub _pad: u32,
}

/// Wall textures followed by sprite textures, packed into one texel array.
///
/// Entry indices are what the map cells and sprite instances refer to, so a
/// texture that fails to load still occupies its index (as a 0x0 entry).
#[derive(Debug, Default)]
pub struct TextureAtlas {
    pixels: Vec<u32>,
    sprites: Vec<Sprite>,
}

impl TextureAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes every path in order. Failures are logged and keep their slot.
    pub fn load<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), AssetError> {
        for path in paths {
            let path = path.as_ref();
            match decode_texture(path) {
                Ok(tex) => {
                    self.push(&tex)?;
                }
                Err(e) => {
                    log::warn!("{e}");
                    self.push_missing();
                }
            }
        }
        Ok(())
    }

    pub fn push(&mut self, tex: &DecodedTexture) -> Result<u32, AssetError> {
        let index = u32::try_from(self.sprites.len()).map_err(|_| AssetError::TooLarge { what: "atlas entries" })?;
        let offset = u32::try_from(self.pixels.len()).map_err(|_| AssetError::TooLarge { what: "atlas texels" })?;
        u32::try_from(self.pixels.len() + tex.pixels.len())
            .map_err(|_| AssetError::TooLarge { what: "atlas texels" })?;

        self.pixels.extend_from_slice(&tex.pixels);
        self.sprites.push(Sprite {
            offset,
            width: tex.width,
            height: tex.height,
            _pad: 0,
        });
        Ok(index)
    }

    pub fn push_missing(&mut self) -> u32 {
        let index = self.sprites.len() as u32;
        self.sprites.push(Sprite {
            offset: self.pixels.len() as u32,
            ..Sprite::default()
        });
        index
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tex(w: u32, h: u32, fill: u32) -> DecodedTexture {
        DecodedTexture {
            width: w,
            height: h,
            pixels: vec![fill; (w * h) as usize],
        }
    }

    #[test]
    fn entries_index_into_shared_texels() {
        let mut atlas = TextureAtlas::new();
        assert_eq!(atlas.push(&tex(2, 2, 1)).unwrap(), 0);
        assert_eq!(atlas.push(&tex(3, 1, 2)).unwrap(), 1);

        let s = atlas.sprites()[1];
        assert_eq!((s.offset, s.width, s.height), (4, 3, 1));
        let start = s.offset as usize;
        assert_eq!(&atlas.pixels()[start..start + 3], &[2, 2, 2]);
    }

    #[test]
    fn failed_texture_keeps_its_index() {
        let mut atlas = TextureAtlas::new();
        atlas.push(&tex(1, 1, 9)).unwrap();
        atlas.load(&["/nonexistent/eagle.png"]).unwrap();
        atlas.push(&tex(1, 1, 7)).unwrap();

        assert_eq!(atlas.len(), 3);
        assert_eq!(atlas.sprites()[1].width, 0);
        assert_eq!(atlas.sprites()[2].offset, 1);
    }
}
