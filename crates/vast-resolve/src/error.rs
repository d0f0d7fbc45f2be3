//! Errors raised while resolving a [`vast_expr::Expr`] against a schema.

/// Errors `schema_resolve` can raise. `type_resolve` never fails: a
/// per-type specialization that can't apply simply collapses to `none`.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    /// A `schema_extractor` matched two fields whose types are not
    /// congruent, so there is no single type to build a `data_extractor`
    /// disjunction from.
    #[error("type clash in '{type_name}': '{a}' is not congruent with '{b}'")]
    TypeClash { type_name: String, a: String, b: String },

    /// A `schema_extractor` matched no type in the schema at all.
    #[error("invalid key: {}", key.join("."))]
    InvalidKey { key: Vec<String> },
}
