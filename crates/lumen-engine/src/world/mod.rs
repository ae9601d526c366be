//! The raycaster's grid level.

mod grid_map;

pub use grid_map::{GridMap, MapError};
