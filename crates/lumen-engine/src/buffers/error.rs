use super::BufferRole;

#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("no `{0}` buffer has been allocated")]
    Missing(BufferRole),

    #[error("write of {size} bytes does not fit the `{role}` buffer ({capacity} bytes)")]
    Overflow {
        role: BufferRole,
        size: u64,
        capacity: u64,
    },
}
