/// Errors raised while acquiring or tearing down the compute device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("no compatible adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("adapter `{name}` is not a GPU ({device_type:?}); software fallback is not supported")]
    NoGpu {
        name: String,
        device_type: wgpu::DeviceType,
    },

    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to wait for the device: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("failed to create window surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}
