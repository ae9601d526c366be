use crate::assets::AssetError;
use crate::buffers::BufferError;
use crate::device::DeviceError;
use crate::program::ProgramError;
use crate::sprite::SpriteError;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Sprite(#[from] SpriteError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("failed to wait for the device: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("frame readback failed: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    #[error("frame readback was dropped before completing")]
    ReadbackLost,

    #[error("surface failed unrecoverably: {0}")]
    Surface(wgpu::SurfaceError),
}
