//! Errors raised while building or loading a [`crate::Schema`].

/// Errors raised while assembling a schema from named type declarations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    /// Two declarations bound the same name to non-congruent types, and
    /// neither declared the other as an alias.
    #[error("schema has two incongruent types both named '{name}'")]
    DuplicateName { name: String },

    /// A `toml` schema file failed to parse into type declarations.
    #[error("failed to parse schema file: {0}")]
    Toml(String),

    /// An alias declaration referenced a name that no type in the schema
    /// defines.
    #[error("alias '{alias}' refers to unknown type '{target}'")]
    UnknownAlias { alias: String, target: String },
}
