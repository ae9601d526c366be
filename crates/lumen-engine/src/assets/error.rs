use std::path::PathBuf;

use crate::mode::RenderMode;

/// Recoverable asset failures: the asset is skipped and rendering continues.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to import `{path}`: {message}")]
    Import { path: PathBuf, message: String },

    #[error("`{path}` contains no meshes")]
    EmptyScene { path: PathBuf },

    #[error("failed to decode texture `{path}`: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{what} exceeds the 32-bit GPU index range")]
    TooLarge { what: &'static str },

    #[error("{mode} mode does not load {what}")]
    Unsupported { mode: RenderMode, what: &'static str },
}
