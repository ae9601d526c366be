/// Parameters for acquiring the compute device.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Backends wgpu may pick from.
    pub backends: wgpu::Backends,

    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features. The kernels only use core WGSL, so empty by default.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    ///
    /// The heaviest kernel binds six storage buffers, which the default limits cover.
    pub required_limits: wgpu::Limits,

    /// Present mode for the window surface.
    pub present_mode: wgpu::PresentMode,

    /// Desired maximum frame latency for the surface (hint).
    pub desired_maximum_frame_latency: u32,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
        }
    }
}
