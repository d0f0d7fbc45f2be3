//! Errors raised while recovering or persisting Identifier state.

#[derive(Debug, thiserror::Error)]
pub enum IdentifierError {
    #[error("failed to read counter state at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to persist counter state at {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt counter state at {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: bincode::error::DecodeError,
    },

    #[error("failed to encode counter state: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}
