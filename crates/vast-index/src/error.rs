//! Errors raised while persisting or rebuilding partitions.

/// Errors the Index component can raise (spec.md §7, `io` and `internal`
/// kinds).
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("I/O failure at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode partition: {0}")]
    Encode(#[source] bincode::error::EncodeError),

    #[error("failed to decode partition: {0}")]
    Decode(#[source] bincode::error::DecodeError),

    /// Raised when a query names an event type no resident or passive
    /// partition has ever indexed; distinguishable from "no matches" so
    /// callers can decide whether to trigger a rebuild from the Archive.
    #[error("partition {id} not found among resident or persisted partitions")]
    NotFound { id: uuid::Uuid },
}
