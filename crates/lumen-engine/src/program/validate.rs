use std::collections::HashSet;

use super::{BindingAccess, ProgramError, ProgramLayout};

/// Parses and validates WGSL, then checks it against `layout`.
///
/// Runs entirely on the CPU (naga), so it is usable before any device exists.
pub fn validate_source(source: &str, layout: &ProgramLayout) -> Result<naga::Module, ProgramError> {
    check_table(layout)?;

    let module = naga::front::wgsl::parse_str(source).map_err(|e| ProgramError::Build {
        program: layout.label,
        log: e.emit_to_string(source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| ProgramError::Build {
        program: layout.label,
        log: e.emit_to_string(source),
    })?;

    for kernel in layout.kernels {
        let entry = kernel.id.entry_point();
        let ep = module
            .entry_points
            .iter()
            .find(|ep| ep.name == entry && ep.stage == naga::ShaderStage::Compute)
            .ok_or(ProgramError::MissingEntryPoint {
                program: layout.label,
                entry,
            })?;
        if ep.workgroup_size != kernel.workgroup_size {
            return Err(ProgramError::WorkgroupMismatch {
                entry,
                expected: kernel.workgroup_size,
                found: ep.workgroup_size,
            });
        }
    }

    for slot in layout.slots {
        let (_, var) = module
            .global_variables
            .iter()
            .find(|(_, var)| var.name.as_deref() == Some(slot.name))
            .ok_or(ProgramError::MissingBinding {
                program: layout.label,
                name: slot.name,
            })?;

        let found = var.binding.as_ref().map(|rb| (rb.group, rb.binding));
        if found != Some((0, slot.binding)) {
            return Err(ProgramError::BindingMismatch {
                name: slot.name,
                expected: slot.binding,
                found,
            });
        }

        if declared_access(var.space) != Some(slot.access) {
            return Err(ProgramError::AccessMismatch {
                name: slot.name,
                expected: slot.access,
            });
        }
    }

    Ok(module)
}

fn check_table(layout: &ProgramLayout) -> Result<(), ProgramError> {
    let mut seen = HashSet::new();
    for slot in layout.slots {
        if !seen.insert(slot.binding) {
            return Err(ProgramError::DuplicateBinding {
                program: layout.label,
                binding: slot.binding,
            });
        }
    }
    for kernel in layout.kernels {
        for &name in kernel.slots {
            if layout.slot(name).is_none() {
                return Err(ProgramError::UnknownSlot {
                    kernel: kernel.id,
                    name,
                });
            }
        }
    }
    Ok(())
}

fn declared_access(space: naga::AddressSpace) -> Option<BindingAccess> {
    match space {
        naga::AddressSpace::Uniform => Some(BindingAccess::Uniform),
        naga::AddressSpace::Storage { access } => {
            if access.contains(naga::StorageAccess::STORE) {
                Some(BindingAccess::ReadWrite)
            } else {
                Some(BindingAccess::ReadOnly)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffers::BufferRole;
    use crate::program::{BindingSlot, KernelId, KernelLayout};

    static TINY: ProgramLayout = ProgramLayout {
        label: "tiny",
        slots: &[
            BindingSlot::new("frame", 0, BufferRole::Frame, BindingAccess::ReadWrite),
            BindingSlot::new("params", 1, BufferRole::Params, BindingAccess::Uniform),
        ],
        kernels: &[KernelLayout {
            id: KernelId::Fragment,
            workgroup_size: [8, 8, 1],
            slots: &["frame", "params"],
        }],
    };

    const TINY_SRC: &str = r#"
struct Params { width: u32, height: u32 }
@group(0) @binding(0) var<storage, read_write> frame: array<u32>;
@group(0) @binding(1) var<uniform> params: Params;

@compute @workgroup_size(8, 8, 1)
fn fragment_kernel(@builtin(global_invocation_id) gid: vec3<u32>) {
    if (gid.x >= params.width || gid.y >= params.height) { return; }
    frame[gid.y * params.width + gid.x] = 0xff0000ffu;
}
"#;

    #[test]
    fn accepts_matching_program() {
        let module = validate_source(TINY_SRC, &TINY).unwrap();
        assert_eq!(module.entry_points.len(), 1);
    }

    #[test]
    fn syntax_error_yields_build_log() {
        let err = validate_source("fn broken( {", &TINY).unwrap_err();
        match err {
            ProgramError::Build { log, .. } => assert!(!log.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_entry_point_is_reported() {
        let src = TINY_SRC.replace("fn fragment_kernel", "fn other_kernel");
        let err = validate_source(&src, &TINY).unwrap_err();
        assert!(matches!(err, ProgramError::MissingEntryPoint { entry: "fragment_kernel", .. }));
    }

    #[test]
    fn renumbered_binding_is_reported() {
        let src = TINY_SRC.replace("@binding(1) var<uniform>", "@binding(3) var<uniform>");
        let err = validate_source(&src, &TINY).unwrap_err();
        match err {
            ProgramError::BindingMismatch { name, expected, found } => {
                assert_eq!(name, "params");
                assert_eq!(expected, 1);
                assert_eq!(found, Some((0, 3)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn read_only_storage_where_write_expected_is_reported() {
        let src = TINY_SRC
            .replace("var<storage, read_write> frame", "var<storage, read> frame")
            .replace("frame[gid.y * params.width + gid.x] = 0xff0000ffu;", "let first = frame[0];");
        let err = validate_source(&src, &TINY).unwrap_err();
        assert!(matches!(err, ProgramError::AccessMismatch { name: "frame", .. }));
    }

    #[test]
    fn workgroup_size_must_match_table() {
        let src = TINY_SRC.replace("@workgroup_size(8, 8, 1)", "@workgroup_size(16, 16, 1)");
        let err = validate_source(&src, &TINY).unwrap_err();
        assert!(matches!(err, ProgramError::WorkgroupMismatch { found: [16, 16, 1], .. }));
    }

    #[test]
    fn duplicate_table_binding_is_rejected_before_parsing() {
        static DUP: ProgramLayout = ProgramLayout {
            label: "dup",
            slots: &[
                BindingSlot::new("a", 0, BufferRole::Frame, BindingAccess::ReadWrite),
                BindingSlot::new("b", 0, BufferRole::Params, BindingAccess::Uniform),
            ],
            kernels: &[],
        };
        let err = validate_source("", &DUP).unwrap_err();
        assert!(matches!(err, ProgramError::DuplicateBinding { binding: 0, .. }));
    }

    #[test]
    fn shipped_kernels_match_their_tables() {
        for mode in crate::mode::RenderMode::ALL {
            let src = std::fs::read_to_string(mode.kernel_path()).unwrap();
            if let Err(err) = validate_source(&src, mode.layout()) {
                panic!("{mode}: {err}");
            }
        }
    }
}
