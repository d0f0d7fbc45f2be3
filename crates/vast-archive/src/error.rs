//! Errors raised while storing or retrieving segments.

/// Errors the Archive component can raise (spec.md §7, `io` and
/// `internal` kinds).
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to read segment {id} at {path}: {source}")]
    Read {
        id: uuid::Uuid,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to persist segment {id} at {path}: {source}")]
    Write {
        id: uuid::Uuid,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("segment {id} is corrupt: {source}")]
    Decode {
        id: uuid::Uuid,
        #[source]
        source: bincode::error::DecodeError,
    },

    #[error("failed to encode segment {id}: {0}", id = .1)]
    Encode(#[source] bincode::error::EncodeError, uuid::Uuid),

    #[error("segment {new} [{new_lo}, {new_hi}) overlaps already-archived segment {existing}")]
    OverlappingRange {
        new: uuid::Uuid,
        new_lo: u64,
        new_hi: u64,
        existing: uuid::Uuid,
    },

    /// Raised when a previously faulted segment is looked up; it is
    /// excluded from results rather than causing the whole lookup to fail.
    #[error("segment {id} is faulted and excluded from lookups")]
    Faulted { id: uuid::Uuid },
}
