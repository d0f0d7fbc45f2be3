//! Errors raised while parsing, resolving, or serving a query.

/// Errors the Search component can raise (spec.md §7: `parse` and
/// `resolve` kinds are per-query and keep the actor alive; everything
/// else here wraps a downstream component's own `io`/`internal` error).
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to parse query: {0}")]
    Parse(#[from] vast_expr::ExprError),

    #[error("failed to resolve query: {0}")]
    Resolve(#[from] vast_resolve::ResolveError),

    #[error("index component unreachable")]
    IndexUnavailable,

    #[error("index query failed: {0}")]
    Index(#[from] vast_index::IndexError),

    #[error("archive component unreachable")]
    ArchiveUnavailable,

    #[error("archive lookup failed: {0}")]
    Archive(#[from] vast_archive::ArchiveError),

    #[error("no such query: {id}")]
    NotFound { id: uuid::Uuid },
}
