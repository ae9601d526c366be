use std::fmt;

use crate::buffers::BufferRole;

/// How a kernel declares a bound buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BindingAccess {
    Uniform,
    ReadOnly,
    ReadWrite,
}

impl BindingAccess {
    pub fn binding_type(self) -> wgpu::BufferBindingType {
        match self {
            BindingAccess::Uniform => wgpu::BufferBindingType::Uniform,
            BindingAccess::ReadOnly => wgpu::BufferBindingType::Storage { read_only: true },
            BindingAccess::ReadWrite => wgpu::BufferBindingType::Storage { read_only: false },
        }
    }
}

/// One named global of a program: `@group(0) @binding(binding) var<...> name`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BindingSlot {
    pub name: &'static str,
    pub binding: u32,
    pub role: BufferRole,
    pub access: BindingAccess,
}

impl BindingSlot {
    pub const fn new(name: &'static str, binding: u32, role: BufferRole, access: BindingAccess) -> Self {
        Self {
            name,
            binding,
            role,
            access,
        }
    }
}

/// Compute entry points used by the render modes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum KernelId {
    ClearBuffers,
    Vertex,
    Fragment,
    Surface,
    Sprites,
}

impl KernelId {
    pub fn entry_point(self) -> &'static str {
        match self {
            KernelId::ClearBuffers => "clear_buffers",
            KernelId::Vertex => "vertex_kernel",
            KernelId::Fragment => "fragment_kernel",
            KernelId::Surface => "surface_kernel",
            KernelId::Sprites => "sprites_kernel",
        }
    }
}

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entry_point())
    }
}

/// One entry point and the slots it reads or writes.
#[derive(Debug, Copy, Clone)]
pub struct KernelLayout {
    pub id: KernelId,
    /// Must equal the entry point's `@workgroup_size`.
    pub workgroup_size: [u32; 3],
    pub slots: &'static [&'static str],
}

impl KernelLayout {
    /// Workgroup counts covering `extent` invocations per axis.
    pub fn workgroups_for(&self, extent: [u32; 3]) -> [u32; 3] {
        let mut out = [0; 3];
        for axis in 0..3 {
            out[axis] = extent[axis].div_ceil(self.workgroup_size[axis].max(1));
        }
        out
    }
}

/// The binding table of one mode's program.
#[derive(Debug)]
pub struct ProgramLayout {
    pub label: &'static str,
    pub slots: &'static [BindingSlot],
    pub kernels: &'static [KernelLayout],
}

impl ProgramLayout {
    pub fn slot(&self, name: &str) -> Option<&BindingSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn kernel(&self, id: KernelId) -> Option<&KernelLayout> {
        self.kernels.iter().find(|k| k.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workgroups_round_up() {
        let k = KernelLayout {
            id: KernelId::Fragment,
            workgroup_size: [8, 8, 1],
            slots: &[],
        };
        assert_eq!(k.workgroups_for([800, 600, 1]), [100, 75, 1]);
        assert_eq!(k.workgroups_for([801, 1, 1]), [101, 1, 1]);
        assert_eq!(k.workgroups_for([0, 0, 1]), [0, 0, 1]);
    }
}
