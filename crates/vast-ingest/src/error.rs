//! Errors raised while converting, batching, importing, or exporting
//! events (spec.md §7, mostly the `io`/`parse`/`internal` kinds).

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("I/O failure at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field '{field}' of type '{expected}' has no value of that shape: {found}")]
    TypeMismatch { field: String, expected: &'static str, found: String },

    #[error("record is missing required field '{0}'")]
    MissingField(String),

    #[error("value '{0}' is not a valid {1}")]
    InvalidValue(String, &'static str),

    #[error(transparent)]
    Identifier(#[from] vast_ids::IdentifierError),

    #[error(transparent)]
    Archive(#[from] vast_archive::ArchiveError),

    #[error(transparent)]
    Index(#[from] vast_index::IndexError),

    #[error(transparent)]
    Expr(#[from] vast_expr::ExprError),

    #[error("failed to encode event for export: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("{0} component unreachable")]
    ComponentUnavailable(&'static str),

    #[error("{0} gave no reply (mailbox dropped mid-request)")]
    NoReply(&'static str),
}

impl From<vast_actor::MailboxClosed> for IngestError {
    fn from(_: vast_actor::MailboxClosed) -> Self {
        IngestError::ComponentUnavailable("downstream")
    }
}
