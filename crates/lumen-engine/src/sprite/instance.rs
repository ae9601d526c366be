use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// One placed sprite (`struct SpriteData` in WGSL, 40 bytes).
///
/// Flags are `0`/`1` words so the struct can be uploaded as-is.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteData {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub dir_x: f32,
    pub dir_y: f32,
    pub is_projectile: u32,
    pub is_ui: u32,
    pub is_destroyed: u32,
    /// Atlas entry index.
    pub texture: u32,
}

impl SpriteData {
    pub fn at(x: f32, y: f32, texture: u32) -> Self {
        Self {
            x,
            y,
            texture,
            ..Self::default()
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn is_ui(&self) -> bool {
        self.is_ui != 0
    }

    pub fn is_destroyed(&self) -> bool {
        self.is_destroyed != 0
    }

    /// Builds an instance from exactly ten numeric fields.
    fn from_fields(f: &[f32]) -> Option<Self> {
        let &[x, y, vx, vy, dir_x, dir_y, projectile, ui, destroyed, texture] = f else {
            return None;
        };
        if !(texture.is_finite() && texture >= 0.0) {
            return None;
        }
        let flag = |v: f32| u32::from(v != 0.0);
        Some(Self {
            x,
            y,
            vx,
            vy,
            dir_x,
            dir_y,
            is_projectile: flag(projectile),
            is_ui: flag(ui),
            is_destroyed: flag(destroyed),
            texture: texture as u32,
        })
    }
}

/// Parses `x, y, vx, vy, dirX, dirY, isProjectile, isUI, isDestroyed, texture`
/// records separated by newlines or `;`.
///
/// Blank records (`;` followed by a newline, empty lines) are skipped.
/// Parsing stops at the first record that is not exactly ten numbers; what
/// was read up to that point is returned.
pub fn parse_sprite_instances(text: &str) -> Vec<SpriteData> {
    let mut out = Vec::new();
    for record in text.split(['\n', ';']) {
        let record = record.trim();
        if record.is_empty() {
            continue;
        }
        let fields: Result<Vec<f32>, _> = record.split(',').map(|f| f.trim().parse::<f32>()).collect();
        match fields.ok().as_deref().and_then(SpriteData::from_fields) {
            Some(sprite) => out.push(sprite),
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_on_lines_and_semicolons() {
        let text = "3.5, 7.5, 0, 0, 0, 0, 0, 0, 0, 8\n3.5, 5.5, 0, 0, 0, 0, 0, 0, 0, 11; 1,2,0,0,0,0,1,1,0,17\n";
        let sprites = parse_sprite_instances(text);
        assert_eq!(sprites.len(), 3);
        assert_eq!(sprites[0], SpriteData::at(3.5, 7.5, 8));
        assert_eq!(sprites[1].texture, 11);
        assert!(sprites[2].is_ui());
        assert_eq!(sprites[2].is_projectile, 1);
    }

    #[test]
    fn semicolon_then_newline_keeps_reading() {
        let text = "1,1,0,0,0,0,0,0,0,8;\n2,2,0,0,0,0,0,0,0,8;\n3,3,0,0,0,0,0,0,0,8\n";
        let sprites = parse_sprite_instances(text);
        assert_eq!(sprites.len(), 3);
        assert_eq!(sprites[2], SpriteData::at(3.0, 3.0, 8));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "1,1,0,0,0,0,0,0,0,8\n\n   \n2,2,0,0,0,0,0,0,0,9\n";
        let sprites = parse_sprite_instances(text);
        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[1].texture, 9);
    }

    #[test]
    fn stops_at_short_record() {
        let text = "1,1,0,0,0,0,0,0,0,8\n2,2,0,0,0,0,0,0,8\n3,3,0,0,0,0,0,0,0,8";
        let sprites = parse_sprite_instances(text);
        assert_eq!(sprites.len(), 1);
    }

    #[test]
    fn stops_at_unparsable_field() {
        let text = "1,1,0,0,0,0,0,0,0,8;1,x,0,0,0,0,0,0,0,8;5,5,0,0,0,0,0,0,0,8";
        assert_eq!(parse_sprite_instances(text).len(), 1);
    }

    #[test]
    fn stops_at_negative_texture() {
        assert!(parse_sprite_instances("1,1,0,0,0,0,0,0,0,-1").is_empty());
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(parse_sprite_instances("").is_empty());
    }

    #[test]
    fn gpu_layout_size() {
        assert_eq!(std::mem::size_of::<SpriteData>(), 40);
    }
}
