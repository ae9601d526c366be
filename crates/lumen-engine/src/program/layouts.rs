use crate::buffers::BufferRole;

use super::{BindingAccess as A, BindingSlot as S, KernelId, KernelLayout, ProgramLayout};

// Binding numbers are unique per program; each kernel's bind group layout
// only lists the slots it names.

pub static RASTERIZER: ProgramLayout = ProgramLayout {
    label: "rasterizer",
    slots: &[
        S::new("frame", 0, BufferRole::Frame, A::ReadWrite),
        S::new("depth", 1, BufferRole::Depth, A::ReadWrite),
        S::new("params", 2, BufferRole::Params, A::Uniform),
        S::new("camera", 3, BufferRole::Camera, A::Uniform),
        S::new("triangles", 4, BufferRole::Triangles, A::ReadOnly),
        S::new("models", 5, BufferRole::Models, A::ReadOnly),
        S::new("pixels", 6, BufferRole::TexturePixels, A::ReadOnly),
        S::new("projected", 7, BufferRole::ProjectedVertices, A::ReadWrite),
    ],
    kernels: &[
        KernelLayout {
            id: KernelId::ClearBuffers,
            workgroup_size: [8, 8, 1],
            slots: &["frame", "depth", "params"],
        },
        KernelLayout {
            id: KernelId::Vertex,
            workgroup_size: [64, 1, 1],
            slots: &["params", "camera", "triangles", "models", "projected"],
        },
        KernelLayout {
            id: KernelId::Fragment,
            workgroup_size: [8, 8, 1],
            slots: &[
                "frame", "depth", "params", "camera", "triangles", "models", "pixels", "projected",
            ],
        },
    ],
};

pub static RAYCASTER: ProgramLayout = ProgramLayout {
    label: "raycaster",
    slots: &[
        S::new("frame", 0, BufferRole::Frame, A::ReadWrite),
        S::new("zbuffer", 1, BufferRole::ZBuffer, A::ReadWrite),
        S::new("params", 2, BufferRole::Params, A::Uniform),
        S::new("player", 3, BufferRole::Player, A::Uniform),
        S::new("grid", 4, BufferRole::Grid, A::ReadOnly),
        S::new("atlas", 5, BufferRole::Atlas, A::ReadOnly),
        S::new("sprites", 6, BufferRole::Sprites, A::ReadOnly),
        S::new("sprite_data", 7, BufferRole::SpriteInstances, A::ReadOnly),
        S::new("sprite_order", 8, BufferRole::SpriteOrder, A::ReadOnly),
    ],
    kernels: &[
        KernelLayout {
            id: KernelId::Surface,
            workgroup_size: [64, 1, 1],
            slots: &["frame", "zbuffer", "params", "player", "grid", "atlas", "sprites"],
        },
        KernelLayout {
            id: KernelId::Sprites,
            workgroup_size: [64, 1, 1],
            slots: &[
                "frame", "zbuffer", "params", "player", "atlas", "sprites", "sprite_data", "sprite_order",
            ],
        },
    ],
};

pub static RAYTRACER: ProgramLayout = ProgramLayout {
    label: "raytracer",
    slots: &[
        S::new("frame", 0, BufferRole::Frame, A::ReadWrite),
        S::new("accumulation", 1, BufferRole::Accumulation, A::ReadWrite),
        S::new("params", 2, BufferRole::Params, A::Uniform),
        S::new("camera", 3, BufferRole::Camera, A::Uniform),
        S::new("triangles", 4, BufferRole::Triangles, A::ReadOnly),
        S::new("models", 5, BufferRole::Models, A::ReadOnly),
        S::new("pixels", 6, BufferRole::TexturePixels, A::ReadOnly),
    ],
    kernels: &[KernelLayout {
        id: KernelId::Fragment,
        workgroup_size: [8, 8, 1],
        slots: &[
            "frame", "accumulation", "params", "camera", "triangles", "models", "pixels",
        ],
    }],
};

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn all() -> [&'static ProgramLayout; 3] {
        [&RASTERIZER, &RAYCASTER, &RAYTRACER]
    }

    #[test]
    fn kernel_slots_exist_in_program_table() {
        for layout in all() {
            for kernel in layout.kernels {
                for name in kernel.slots {
                    assert!(layout.slot(name).is_some(), "{}: {name}", layout.label);
                }
            }
        }
    }

    #[test]
    fn binding_numbers_are_unique() {
        for layout in all() {
            let mut seen = HashSet::new();
            for slot in layout.slots {
                assert!(seen.insert(slot.binding), "{}: {}", layout.label, slot.binding);
            }
        }
    }

    #[test]
    fn every_mode_writes_the_frame() {
        for layout in all() {
            let frame = layout.slot("frame").unwrap();
            assert_eq!(frame.access, A::ReadWrite);
            assert_eq!(frame.role, BufferRole::Frame);
        }
    }
}
