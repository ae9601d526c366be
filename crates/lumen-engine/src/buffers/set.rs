use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::{BufferAccess, BufferError, BufferRole};

/// A GPU buffer tagged with its role, access mode and byte size.
#[derive(Debug)]
pub struct GpuBuffer {
    raw: wgpu::Buffer,
    role: BufferRole,
    access: BufferAccess,
    size: u64,
}

impl GpuBuffer {
    pub fn raw(&self) -> &wgpu::Buffer {
        &self.raw
    }

    pub fn role(&self) -> BufferRole {
        self.role
    }

    pub fn access(&self) -> BufferAccess {
        self.access
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Request for a zero-initialised buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BufferSpec {
    pub role: BufferRole,
    pub access: BufferAccess,
    pub size: u64,
}

impl BufferSpec {
    pub fn new(role: BufferRole, access: BufferAccess, size: u64) -> Self {
        Self { role, access, size }
    }

    /// Spec for a runtime-sized array of `len` elements of `T`.
    pub fn array<T>(role: BufferRole, access: BufferAccess, len: usize) -> Self {
        Self::new(role, access, array_size::<T>(len))
    }
}

/// Byte size of a storage array of `len` elements of `T`.
///
/// Runtime-sized WGSL arrays must hold at least one element, so `len == 0`
/// still yields one element. Rounded up to the 4-byte copy alignment.
pub fn array_size<T>(len: usize) -> u64 {
    let bytes = (len.max(1) * std::mem::size_of::<T>()) as u64;
    bytes.max(4).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT)
}

struct Slot {
    buffer: GpuBuffer,
    generation: u64,
}

/// Role-keyed buffer ownership for one render session.
#[derive(Default)]
pub struct BufferSet {
    slots: BTreeMap<BufferRole, Slot>,
    next_generation: u64,
}

impl BufferSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates (or replaces) a zeroed buffer.
    pub fn allocate(&mut self, device: &wgpu::Device, spec: BufferSpec) -> &GpuBuffer {
        let size = spec.size.max(4).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let raw = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(spec.role.label()),
            size,
            usage: spec.access.usages(),
            mapped_at_creation: false,
        });
        self.insert(GpuBuffer {
            raw,
            role: spec.role,
            access: spec.access,
            size,
        })
    }

    /// Allocates (or replaces) a buffer initialised from `data`.
    ///
    /// An empty slice uploads a single zeroed element so the binding stays valid.
    pub fn upload_slice<T: Pod + Zeroable>(
        &mut self,
        device: &wgpu::Device,
        role: BufferRole,
        access: BufferAccess,
        data: &[T],
    ) -> &GpuBuffer {
        let placeholder = [T::zeroed()];
        let data = if data.is_empty() { &placeholder[..] } else { data };
        let contents: &[u8] = bytemuck::cast_slice(data);

        let raw = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(role.label()),
            contents,
            usage: access.usages(),
        });
        let size = raw.size();
        self.insert(GpuBuffer {
            raw,
            role,
            access,
            size,
        })
    }

    /// Queues a write of `data` at the start of an existing buffer.
    pub fn write<T: Pod>(
        &self,
        queue: &wgpu::Queue,
        role: BufferRole,
        data: &[T],
    ) -> Result<(), BufferError> {
        let buffer = self.get(role)?;
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let size = bytes.len() as u64;
        if size > buffer.size {
            return Err(BufferError::Overflow {
                role,
                size,
                capacity: buffer.size,
            });
        }
        if size > 0 {
            queue.write_buffer(&buffer.raw, 0, bytes);
        }
        Ok(())
    }

    pub fn write_value<T: Pod>(
        &self,
        queue: &wgpu::Queue,
        role: BufferRole,
        value: &T,
    ) -> Result<(), BufferError> {
        self.write(queue, role, std::slice::from_ref(value))
    }

    pub fn get(&self, role: BufferRole) -> Result<&GpuBuffer, BufferError> {
        self.slots
            .get(&role)
            .map(|slot| &slot.buffer)
            .ok_or(BufferError::Missing(role))
    }

    pub fn contains(&self, role: BufferRole) -> bool {
        self.slots.contains_key(&role)
    }

    /// Generation of the buffer currently held for `role`.
    pub fn generation(&self, role: BufferRole) -> Option<u64> {
        self.slots.get(&role).map(|slot| slot.generation)
    }

    pub fn total_bytes(&self) -> u64 {
        self.slots.values().map(|slot| slot.buffer.size).sum()
    }

    pub fn release(&mut self, role: BufferRole) {
        if let Some(slot) = self.slots.remove(&role) {
            slot.buffer.raw.destroy();
        }
    }

    pub fn release_all(&mut self) {
        let count = self.slots.len();
        for (_, slot) in std::mem::take(&mut self.slots) {
            slot.buffer.raw.destroy();
        }
        log::debug!("released {count} buffers");
    }

    fn insert(&mut self, buffer: GpuBuffer) -> &GpuBuffer {
        self.next_generation += 1;
        let generation = self.next_generation;
        log::trace!(
            "buffer `{}` ({} bytes, {:?}) generation {generation}",
            buffer.role,
            buffer.size,
            buffer.access
        );

        let slot = Slot { buffer, generation };
        match self.slots.entry(slot.buffer.role) {
            Entry::Occupied(mut e) => {
                let old = e.insert(slot);
                old.buffer.raw.destroy();
                &e.into_mut().buffer
            }
            Entry::Vacant(e) => &e.insert(slot).buffer,
        }
    }
}
