use std::path::Path;

use crate::buffers::{BufferRole, BufferSet};
use crate::device::DeviceContext;
use crate::mode::RenderMode;

use super::{validate_source, KernelId, KernelLayout, ProgramError, ProgramLayout};

/// Reads, validates and compiles the program of a render mode.
pub struct ProgramLoader;

impl ProgramLoader {
    pub fn read_source(path: &Path) -> Result<String, ProgramError> {
        std::fs::read_to_string(path).map_err(|source| ProgramError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(ctx: &DeviceContext, mode: RenderMode, path: &Path) -> Result<CompiledProgram, ProgramError> {
        let source = Self::read_source(path)?;
        let program = Self::build(ctx, mode, &source)?;
        log::info!("loaded {mode} program from {}", path.display());
        Ok(program)
    }

    /// Validates `source` against the mode's binding table and builds one
    /// compute pipeline per entry point.
    pub fn build(ctx: &DeviceContext, mode: RenderMode, source: &str) -> Result<CompiledProgram, ProgramError> {
        let layout = mode.layout();
        validate_source(source, layout)?;

        let device = ctx.device();
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(layout.label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let mut kernels = Vec::with_capacity(layout.kernels.len());
        for kernel in layout.kernels {
            kernels.push(build_kernel(device, &module, layout, kernel)?);
        }

        Ok(CompiledProgram {
            mode,
            layout,
            kernels,
            _module: module,
        })
    }
}

fn build_kernel(
    device: &wgpu::Device,
    module: &wgpu::ShaderModule,
    program: &'static ProgramLayout,
    kernel: &'static KernelLayout,
) -> Result<Kernel, ProgramError> {
    let mut entries = Vec::with_capacity(kernel.slots.len());
    for &name in kernel.slots {
        let slot = program.slot(name).ok_or(ProgramError::UnknownSlot {
            kernel: kernel.id,
            name,
        })?;
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: slot.binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: slot.access.binding_type(),
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
    }

    let entry = kernel.id.entry_point();
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(entry),
        entries: &entries,
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(entry),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(entry),
        layout: Some(&pipeline_layout),
        module,
        entry_point: Some(entry),
        compilation_options: Default::default(),
        cache: None,
    });

    Ok(Kernel {
        layout: kernel,
        program,
        pipeline,
        bind_group_layout,
        binding: None,
    })
}

struct Binding {
    group: wgpu::BindGroup,
    generations: Vec<(BufferRole, u64)>,
}

/// One compiled entry point plus its current argument binding.
pub struct Kernel {
    layout: &'static KernelLayout,
    program: &'static ProgramLayout,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    binding: Option<Binding>,
}

impl Kernel {
    pub fn id(&self) -> KernelId {
        self.layout.id
    }

    pub fn layout(&self) -> &'static KernelLayout {
        self.layout
    }

    pub fn pipeline(&self) -> &wgpu::ComputePipeline {
        &self.pipeline
    }

    /// Binds every slot of this kernel to the buffer currently held for its role.
    pub fn bind(&mut self, device: &wgpu::Device, buffers: &BufferSet) -> Result<(), ProgramError> {
        let mut entries = Vec::with_capacity(self.layout.slots.len());
        let mut generations = Vec::with_capacity(self.layout.slots.len());

        for &name in self.layout.slots {
            let slot = self.program.slot(name).ok_or(ProgramError::UnknownSlot {
                kernel: self.layout.id,
                name,
            })?;
            let buffer = buffers.get(slot.role)?;
            let generation = buffers
                .generation(slot.role)
                .ok_or(crate::buffers::BufferError::Missing(slot.role))?;
            entries.push(wgpu::BindGroupEntry {
                binding: slot.binding,
                resource: buffer.raw().as_entire_binding(),
            });
            generations.push((slot.role, generation));
        }

        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.layout.id.entry_point()),
            layout: &self.bind_group_layout,
            entries: &entries,
        });
        self.binding = Some(Binding { group, generations });
        log::trace!("bound {}", self.layout.id);
        Ok(())
    }

    pub fn is_current(&self, buffers: &BufferSet) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| first_stale(&b.generations, |role| buffers.generation(role)).is_none())
    }

    /// The bind group, provided no bound buffer has been replaced since `bind`.
    pub fn current_bind_group(&self, buffers: &BufferSet) -> Result<&wgpu::BindGroup, ProgramError> {
        let binding = self.binding.as_ref().ok_or(ProgramError::Unbound {
            kernel: self.layout.id,
        })?;
        if let Some(role) = first_stale(&binding.generations, |role| buffers.generation(role)) {
            return Err(ProgramError::Stale {
                kernel: self.layout.id,
                role,
            });
        }
        Ok(&binding.group)
    }
}

/// First role whose recorded generation differs from the current one (or was released).
pub fn first_stale(
    recorded: &[(BufferRole, u64)],
    current: impl Fn(BufferRole) -> Option<u64>,
) -> Option<BufferRole> {
    recorded
        .iter()
        .find(|(role, generation)| current(*role) != Some(*generation))
        .map(|(role, _)| *role)
}

/// The live program of the active mode and its kernels.
pub struct CompiledProgram {
    mode: RenderMode,
    layout: &'static ProgramLayout,
    kernels: Vec<Kernel>,
    _module: wgpu::ShaderModule,
}

impl CompiledProgram {
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn layout(&self) -> &'static ProgramLayout {
        self.layout
    }

    pub fn kernel(&self, id: KernelId) -> Result<&Kernel, ProgramError> {
        self.kernels
            .iter()
            .find(|k| k.id() == id)
            .ok_or(ProgramError::UnknownKernel {
                program: self.layout.label,
                kernel: id,
            })
    }

    pub fn bind(&mut self, device: &wgpu::Device, id: KernelId, buffers: &BufferSet) -> Result<(), ProgramError> {
        let program = self.layout.label;
        self.kernels
            .iter_mut()
            .find(|k| k.id() == id)
            .ok_or(ProgramError::UnknownKernel { program, kernel: id })?
            .bind(device, buffers)
    }

    /// Rebinds every kernel that is unbound or stale. Returns how many were rebound.
    pub fn rebind_stale(&mut self, device: &wgpu::Device, buffers: &BufferSet) -> Result<usize, ProgramError> {
        let mut rebound = 0;
        for kernel in &mut self.kernels {
            if !kernel.is_current(buffers) {
                kernel.bind(device, buffers)?;
                rebound += 1;
            }
        }
        Ok(rebound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_generations_are_current() {
        let recorded = [(BufferRole::Frame, 1), (BufferRole::Params, 2)];
        assert_eq!(first_stale(&recorded, |r| Some(if r == BufferRole::Frame { 1 } else { 2 })), None);
    }

    #[test]
    fn replaced_buffer_is_stale() {
        let recorded = [(BufferRole::Frame, 1), (BufferRole::Triangles, 3)];
        let current = |r| match r {
            BufferRole::Frame => Some(1),
            BufferRole::Triangles => Some(7),
            _ => None,
        };
        assert_eq!(first_stale(&recorded, current), Some(BufferRole::Triangles));
    }

    #[test]
    fn released_buffer_is_stale() {
        let recorded = [(BufferRole::SpriteOrder, 4)];
        assert_eq!(first_stale(&recorded, |_| None), Some(BufferRole::SpriteOrder));
    }

    #[test]
    fn missing_kernel_source_is_an_io_error() {
        let err = ProgramLoader::read_source(Path::new("/nonexistent/kernel.wgsl")).unwrap_err();
        assert!(matches!(err, ProgramError::Io { .. }));
    }
}
