use thiserror::Error;

/// Errors produced while building, encoding, or decoding an [`Item`](crate::Item).
///
/// Every codec and store operation reports failure through this type. Decode
/// failures are all-or-nothing: when one of these is returned, no partially
/// decoded item is handed back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// A required input was absent or unusable (empty property name,
    /// interior NUL in text destined for a NUL-terminated field).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The buffer is truncated or its fields are inconsistent with each other.
    #[error("malformed buffer: {0}")]
    Malformed(String),

    /// A length does not fit the field that must carry it.
    #[error("{what} size {size} exceeds limit {limit}")]
    Overflow {
        what: &'static str,
        size: usize,
        limit: usize,
    },

    /// Unrecognized wire version or property type tag.
    #[error("unsupported {0}")]
    Unsupported(String),

    /// Allocation failed while growing a store or building a buffer.
    #[error("allocation failed: {0}")]
    ResourceExhausted(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, MetricsError>;
