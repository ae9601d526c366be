use glam::Vec2;

use super::SpriteData;

pub const DEFAULT_SPRITE_CAPACITY: usize = 120;

#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    #[error("{count} sprite instances exceed the capacity of {capacity}")]
    CapacityExceeded { count: usize, capacity: usize },
}

/// Squared distance of one instance to the viewer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpriteSortEntry {
    pub dist: f32,
    pub index: u32,
}

/// Writes instance indices ordered farthest first into `order`.
///
/// The sort is stable: equal distances keep ascending index order.
pub fn sort_sprites(viewer: Vec2, instances: &[SpriteData], scratch: &mut Vec<SpriteSortEntry>, order: &mut Vec<u32>) {
    scratch.clear();
    scratch.extend(instances.iter().enumerate().map(|(i, s)| SpriteSortEntry {
        dist: viewer.distance_squared(s.position()),
        index: i as u32,
    }));
    scratch.sort_by(|a, b| b.dist.total_cmp(&a.dist));

    order.clear();
    order.extend(scratch.iter().map(|e| e.index));
}

/// Bounded, reusable back-to-front sprite order.
#[derive(Debug)]
pub struct SpriteOrder {
    capacity: usize,
    scratch: Vec<SpriteSortEntry>,
    indices: Vec<u32>,
}

impl SpriteOrder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            scratch: Vec::with_capacity(capacity),
            indices: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn check(&self, count: usize) -> Result<(), SpriteError> {
        if count > self.capacity {
            return Err(SpriteError::CapacityExceeded {
                count,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Recomputes the order for this frame.
    pub fn sort(&mut self, viewer: Vec2, instances: &[SpriteData]) -> Result<&[u32], SpriteError> {
        self.check(instances.len())?;
        sort_sprites(viewer, instances, &mut self.scratch, &mut self.indices);
        Ok(&self.indices)
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

impl Default for SpriteOrder {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SPRITE_CAPACITY)
    }
}
