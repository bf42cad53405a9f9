// ─── Error ──────────────────────────────────────────────────────────────────
use crate::types::type_name;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no field with that name")]
    NotFound,
    #[error("type mismatch: expected {}, got {}", type_name(*.expected), type_name(*.actual))]
    TypeMismatch { expected: u32, actual: u32 },
    #[error("item index {index} out of range (field holds {count})")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("allocation failed")]
    OutOfMemory,
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("a field with that name already exists")]
    FieldExists,
    #[error("malformed field data: {0}")]
    BadData(String),
    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::collections::TryReserveError> for StoreError {
    fn from(_: std::collections::TryReserveError) -> Self {
        StoreError::OutOfMemory
    }
}
