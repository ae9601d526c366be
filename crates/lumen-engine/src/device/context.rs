use super::{DeviceError, DeviceInit};

/// The single adapter/device/queue of the process.
///
/// Everything else that lives on the GPU (programs, buffers, the presenter)
/// borrows the device from here and must be dropped before `close`.
pub struct DeviceContext {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl DeviceContext {
    /// Creates the instance. Split from `init` so the window surface can be
    /// created first and passed as the compatibility constraint.
    pub fn create_instance(init: &DeviceInit) -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        })
    }

    /// Selects a GPU-class adapter and opens its device and queue.
    pub async fn init(
        instance: wgpu::Instance,
        init: &DeviceInit,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, DeviceError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        if !is_gpu_class(info.device_type) {
            return Err(DeviceError::NoGpu {
                name: info.name,
                device_type: info.device_type,
            });
        }
        log::info!(
            "using adapter `{}` ({:?}, {:?})",
            info.name,
            info.device_type,
            info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Blocks until all submitted work has finished.
    pub fn wait_idle(&self) -> Result<(), DeviceError> {
        self.device.poll(wgpu::PollType::wait_indefinitely())?;
        Ok(())
    }

    /// Drains the queue and releases queue, device and instance in that order.
    pub fn close(self) {
        if let Err(err) = self.wait_idle() {
            log::warn!("device did not drain before close: {err}");
        }
        let Self {
            instance,
            adapter,
            device,
            queue,
        } = self;
        drop(queue);
        device.destroy();
        drop(device);
        drop(adapter);
        drop(instance);
        log::info!("device closed");
    }
}

/// Discrete, integrated and virtual GPUs qualify; CPU rasterizers do not.
///
/// `Other` is accepted: some drivers report real GPUs that way.
pub fn is_gpu_class(device_type: wgpu::DeviceType) -> bool {
    !matches!(device_type, wgpu::DeviceType::Cpu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn software_adapters_are_rejected() {
        assert!(!is_gpu_class(wgpu::DeviceType::Cpu));
    }

    #[test]
    fn hardware_adapters_are_accepted() {
        for ty in [
            wgpu::DeviceType::DiscreteGpu,
            wgpu::DeviceType::IntegratedGpu,
            wgpu::DeviceType::VirtualGpu,
            wgpu::DeviceType::Other,
        ] {
            assert!(is_gpu_class(ty), "{ty:?}");
        }
    }
}
