//! The CLI's own error type (spec.md §7's `config` kind) plus the catch-all
//! wrapper `main` reports on: a fatal error anywhere in this binary prints
//! one line to stderr and exits 1, per spec.md §6/§7.

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    ConflictingFlags(String),

    #[error("--{flag} requires --{requires}")]
    MissingDependency { flag: &'static str, requires: &'static str },

    #[error("no actor-selection flag given and --all was not implied; pass -C, a component flag, -E, -I, or -Q")]
    NoModeSelected,

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to create working directory layout at {path}: {source}")]
    Layout {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Schema(#[from] vast_schema::SchemaError),
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Identifier(#[from] vast_ids::IdentifierError),

    #[error(transparent)]
    Archive(#[from] vast_archive::ArchiveError),

    #[error(transparent)]
    Index(#[from] vast_index::IndexError),

    #[error(transparent)]
    Ingest(#[from] vast_ingest::IngestError),

    #[error(transparent)]
    Search(#[from] vast_search::SearchError),

    #[error(transparent)]
    Expr(#[from] vast_expr::ExprError),

    #[error("{0} gave no reply")]
    NoReply(&'static str),

    #[error("{0} component unreachable")]
    ComponentUnavailable(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<vast_actor::MailboxClosed> for CliError {
    fn from(_: vast_actor::MailboxClosed) -> Self {
        CliError::ComponentUnavailable("downstream")
    }
}
