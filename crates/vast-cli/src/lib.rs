//! The `vast` binary: flag parsing, configuration resolution, and
//! component wiring for a node, an import/export job, or a query console
//! (spec.md §6).

mod banner;
mod cli;
mod config;
mod error;
mod run;

pub use banner::print as print_banner;
pub use cli::{maybe_print_advanced_help, Cli};
pub use config::{resolve as resolve_settings, Mode, NodeParts, Settings};
pub use error::{CliError, ConfigError};
pub use run::run;
