use super::FrameError;

/// Host copy of the color buffer, refreshed by a blocking map each frame.
pub struct Readback {
    staging: wgpu::Buffer,
    size: u64,
    pixels: Vec<u32>,
}

impl Readback {
    pub fn new(device: &wgpu::Device, pixel_count: usize) -> Self {
        let size = (pixel_count.max(1) * std::mem::size_of::<u32>()) as u64;
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame readback"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            staging,
            size,
            pixels: vec![0; pixel_count.max(1)],
        }
    }

    /// Records the copy from the color buffer into the staging buffer.
    pub fn encode_copy(&self, encoder: &mut wgpu::CommandEncoder, frame: &wgpu::Buffer) {
        encoder.copy_buffer_to_buffer(frame, 0, &self.staging, 0, self.size);
    }

    /// Blocks until the submitted copy lands and returns the pixels.
    pub fn resolve(&mut self, device: &wgpu::Device) -> Result<&[u32], FrameError> {
        let slice = self.staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        device.poll(wgpu::PollType::wait_indefinitely())?;
        receiver.recv().map_err(|_| FrameError::ReadbackLost)??;

        {
            let data = slice.get_mapped_range();
            self.pixels.copy_from_slice(bytemuck::cast_slice::<u8, u32>(&data[..]));
        }
        self.staging.unmap();
        Ok(&self.pixels)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn destroy(&self) {
        self.staging.destroy();
    }
}
