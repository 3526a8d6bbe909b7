use thiserror::Error;

/// Rejected grid operations.
///
/// Every mutation that returns one of these leaves the collection exactly as
/// it was. They indicate a caller bug (stale index, misspelled key), never a
/// user-facing condition, so hosts usually log and move on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("unknown field key '{0}'")]
    InvalidFieldKey(String),

    #[error("index {index} out of range for {len} entities")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("deletion is disabled for this grid")]
    DeleteDisabled,

    #[error("reordering is disabled for this grid")]
    ReorderDisabled,

    #[error("field schema must contain at least one key")]
    EmptySchema,

    #[error("duplicate field key '{0}'")]
    DuplicateFieldKey(String),

    /// `id` is the record identifier in emitted snapshots and cannot double as a field.
    #[error("field key '{0}' is reserved")]
    ReservedFieldKey(String),
}

impl GridError {
    /// Stable machine-readable code (used by the replay CLI output).
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFieldKey(_) => "invalid_field_key",
            Self::IndexOutOfRange { .. } => "index_out_of_range",
            Self::DeleteDisabled => "delete_disabled",
            Self::ReorderDisabled => "reorder_disabled",
            Self::EmptySchema => "empty_schema",
            Self::DuplicateFieldKey(_) => "duplicate_field_key",
            Self::ReservedFieldKey(_) => "reserved_field_key",
        }
    }
}
