//! Raycaster sprite instances and their back-to-front ordering.

mod instance;
mod sort;

pub use instance::{parse_sprite_instances, SpriteData};
pub use sort::{sort_sprites, SpriteError, SpriteOrder, SpriteSortEntry, DEFAULT_SPRITE_CAPACITY};
