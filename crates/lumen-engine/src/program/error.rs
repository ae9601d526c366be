use std::path::PathBuf;

use crate::buffers::BufferRole;

use super::{BindingAccess, KernelId};

/// Program load, validation and binding failures. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("cannot read kernel source `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parse or validation failure; `log` is the rendered diagnostic.
    #[error("{program} program failed to build:\n{log}")]
    Build { program: &'static str, log: String },

    #[error("{program} program has no compute entry point `{entry}`")]
    MissingEntryPoint {
        program: &'static str,
        entry: &'static str,
    },

    #[error("`{entry}` declares @workgroup_size({found:?}), expected {expected:?}")]
    WorkgroupMismatch {
        entry: &'static str,
        expected: [u32; 3],
        found: [u32; 3],
    },

    #[error("{program} program does not declare binding `{name}`")]
    MissingBinding {
        program: &'static str,
        name: &'static str,
    },

    #[error("binding `{name}` is declared at {found:?}, expected @group(0) @binding({expected})")]
    BindingMismatch {
        name: &'static str,
        expected: u32,
        found: Option<(u32, u32)>,
    },

    #[error("binding `{name}` is declared with the wrong address space or access, expected {expected:?}")]
    AccessMismatch {
        name: &'static str,
        expected: BindingAccess,
    },

    #[error("binding table of {program} uses binding {binding} twice")]
    DuplicateBinding { program: &'static str, binding: u32 },

    #[error("kernel `{kernel}` names unknown slot `{name}`")]
    UnknownSlot { kernel: KernelId, name: &'static str },

    #[error("{program} program has no kernel `{kernel}`")]
    UnknownKernel {
        program: &'static str,
        kernel: KernelId,
    },

    #[error("kernel `{kernel}` has not been bound")]
    Unbound { kernel: KernelId },

    #[error("kernel `{kernel}` is bound to a released `{role}` buffer; rebind before dispatch")]
    Stale { kernel: KernelId, role: BufferRole },

    #[error(transparent)]
    Buffer(#[from] crate::buffers::BufferError),
}
