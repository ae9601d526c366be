//! Host-side asset aggregation.
//!
//! Scenes, textures and sprites are flattened into contiguous arrays with
//! running offsets so each can be uploaded as one storage buffer and indexed
//! from the kernels.

mod atlas;
mod error;
mod importer;
mod registry;
mod texture;

pub use atlas::{Sprite, TextureAtlas};
pub use error::AssetError;
pub use importer::{ImportedMesh, ObjImporter, SceneImporter};
pub use registry::{Model, ModelRegistry, Triangle};
pub use texture::{decode_texture, pack_rgba, DecodedTexture};
