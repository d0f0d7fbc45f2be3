//! Turns a parsed [`Cli`] into a validated [`Settings`], applying the
//! conflict/dependency rules spec.md §6 states ("console excludes all
//! other actor flags"; "importer/exporter/receiver/identifier pairwise
//! excluded"; "import.* require importer"; "export.* require exporter and
//! a query") and layering in an optional `vast.toml` config file under
//! `--dir` (ambient configuration surface, spec.md §9 non-goals excluding
//! only the CLI *parser*, not a config layer).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use vast_archive::Compression;

use crate::cli::{Cli, CompressionArg, FormatArg};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeParts {
    pub identifier: bool,
    pub archive: bool,
    pub index: bool,
    pub search: bool,
    pub receiver: bool,
}

impl NodeParts {
    fn all() -> Self {
        NodeParts { identifier: true, archive: true, index: true, search: true, receiver: true }
    }

    fn none() -> Self {
        NodeParts { identifier: false, archive: false, index: false, search: false, receiver: false }
    }

    fn any(&self) -> bool {
        self.identifier || self.archive || self.index || self.search || self.receiver
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Node(NodeParts),
    Importer,
    Exporter,
    Console,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub dir: PathBuf,
    pub mode: Mode,
    pub schema: Option<PathBuf>,
    pub read: Option<PathBuf>,
    pub write: Option<PathBuf>,
    pub interface: Option<String>,
    pub batch_size: usize,
    pub compression: Compression,
    pub limit: Option<usize>,
    pub query: Option<String>,
    pub pcap_flush: usize,
    pub format: FormatArg,
    pub max_events: usize,
    pub max_parts: usize,
    pub active_parts: usize,
    pub rebuild: bool,
    pub mailbox_capacity: usize,
}

/// Optional overrides loaded from `<dir>/vast.toml`. Every field is
/// optional so an operator can pin only the values they care about; a CLI
/// flag left at its own default is layered under the file, while an
/// explicitly-overridden CLI flag always wins (see `layer` below).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct FileConfig {
    batch_size: Option<usize>,
    compression: Option<String>,
    max_events: Option<usize>,
    max_parts: Option<usize>,
    active_parts: Option<usize>,
    pcap_flush: Option<usize>,
}

fn load_file_config(dir: &Path) -> Result<FileConfig, ConfigError> {
    let path = dir.join("vast.toml");
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml { path: path.display().to_string(), source })
}

/// Validates `cli`, layers in `<dir>/vast.toml`, and creates the on-disk
/// directory layout (spec.md §6: `log/`, `archive/`, `index/`,
/// `identifier/`).
pub fn resolve(cli: &Cli) -> Result<Settings, ConfigError> {
    let mode = resolve_mode(cli)?;
    validate_dependencies(cli)?;

    let file = load_file_config(&cli.dir)?;
    create_layout(&cli.dir)?;

    let batch_size = layer(cli.batch_size, 1000, file.batch_size);
    let max_events = layer(cli.max_events, 1_048_576, file.max_events);
    let max_parts = layer(cli.max_parts, 256, file.max_parts);
    let active_parts = layer(cli.active_parts, 4, file.active_parts);
    let pcap_flush = layer(cli.pcap_flush, 1000, file.pcap_flush);

    let compression = match file.compression.as_deref() {
        Some("none") if cli.compression == CompressionArg::Zstd => Compression::None,
        _ => match cli.compression {
            CompressionArg::None => Compression::None,
            CompressionArg::Zstd => Compression::Zstd { level: 3 },
        },
    };

    Ok(Settings {
        dir: cli.dir.clone(),
        mode,
        schema: cli.schema.clone(),
        read: cli.read.clone(),
        write: cli.write.clone(),
        interface: cli.interface.clone(),
        batch_size,
        compression,
        limit: cli.limit,
        query: cli.query.clone(),
        pcap_flush,
        format: cli.format,
        max_events,
        max_parts,
        active_parts,
        rebuild: cli.rebuild,
        mailbox_capacity: cli.mailbox_capacity,
    })
}

/// A CLI value still at its hard-coded default defers to the file's value,
/// if any; an operator-overridden CLI value always wins.
fn layer(cli_value: usize, cli_default: usize, file_value: Option<usize>) -> usize {
    if cli_value == cli_default {
        file_value.unwrap_or(cli_value)
    } else {
        cli_value
    }
}

fn resolve_mode(cli: &Cli) -> Result<Mode, ConfigError> {
    let node_flags_set = cli.all || cli.receiver || cli.archive || cli.index || cli.identifier || cli.search;

    if cli.console && (node_flags_set || cli.importer || cli.exporter) {
        return Err(ConfigError::ConflictingFlags(
            "--console excludes every other actor-selection flag".to_string(),
        ));
    }
    if (cli.importer || cli.exporter) && node_flags_set {
        return Err(ConfigError::ConflictingFlags(
            "--importer/--exporter cannot combine with node component flags (-C/--receiver/--archive/--index/--identifier/--search)"
                .to_string(),
        ));
    }

    if cli.console {
        return Ok(Mode::Console);
    }
    if cli.importer {
        return Ok(Mode::Importer);
    }
    if cli.exporter {
        return Ok(Mode::Exporter);
    }

    let mut parts = NodeParts::none();
    if cli.all {
        parts = NodeParts::all();
    } else {
        parts.identifier = cli.identifier;
        parts.archive = cli.archive;
        parts.index = cli.index;
        parts.search = cli.search;
        parts.receiver = cli.receiver;
    }
    if !parts.any() {
        // No actor-selection flag at all: run a full local node, the same
        // default a bare invocation of the original tool gave you.
        parts = NodeParts::all();
    }
    Ok(Mode::Node(parts))
}

fn validate_dependencies(cli: &Cli) -> Result<(), ConfigError> {
    if (cli.schema.is_some() || cli.read.is_some() || cli.interface.is_some()) && !cli.importer {
        return Err(ConfigError::MissingDependency { flag: "schema/read/interface", requires: "importer" });
    }
    if cli.write.is_some() && !cli.exporter {
        return Err(ConfigError::MissingDependency { flag: "write", requires: "exporter" });
    }
    if cli.exporter && cli.query.is_none() {
        return Err(ConfigError::MissingDependency { flag: "exporter", requires: "query" });
    }
    if cli.importer && (cli.read.is_none() || cli.schema.is_none() || cli.interface.is_none()) {
        return Err(ConfigError::MissingDependency { flag: "importer", requires: "read/schema/interface" });
    }
    Ok(())
}

fn create_layout(dir: &Path) -> Result<(), ConfigError> {
    for sub in ["log", "archive", "index", "identifier"] {
        let path = dir.join(sub);
        std::fs::create_dir_all(&path)
            .map_err(|source| ConfigError::Layout { path: path.display().to_string(), source })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut full = vec!["vast"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn bare_invocation_defaults_to_a_full_local_node() {
        let dir = tempfile::tempdir().unwrap();
        let cli = parse(&["-d", dir.path().to_str().unwrap()]);
        let settings = resolve(&cli).unwrap();
        assert_eq!(settings.mode, Mode::Node(NodeParts::all()));
    }

    #[test]
    fn console_excludes_other_actor_flags() {
        let dir = tempfile::tempdir().unwrap();
        let cli = parse(&["-d", dir.path().to_str().unwrap(), "-Q", "--archive"]);
        assert!(matches!(resolve(&cli), Err(ConfigError::ConflictingFlags(_))));
    }

    #[test]
    fn exporter_without_query_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = parse(&["-d", dir.path().to_str().unwrap(), "-E", "--write", "out.json"]);
        assert!(matches!(resolve(&cli), Err(ConfigError::MissingDependency { flag: "exporter", .. })));
    }

    #[test]
    fn importer_requires_schema_read_and_interface() {
        let dir = tempfile::tempdir().unwrap();
        let cli = parse(&["-d", dir.path().to_str().unwrap(), "-I"]);
        assert!(matches!(resolve(&cli), Err(ConfigError::MissingDependency { flag: "importer", .. })));
    }

    #[test]
    fn creates_the_on_disk_layout() {
        let dir = tempfile::tempdir().unwrap();
        let cli = parse(&["-d", dir.path().to_str().unwrap(), "--archive"]);
        resolve(&cli).unwrap();
        for sub in ["log", "archive", "index", "identifier"] {
            assert!(dir.path().join(sub).is_dir());
        }
    }

    #[test]
    fn file_config_fills_in_unset_cli_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vast.toml"), "max-events = 500\n").unwrap();
        let cli = parse(&["-d", dir.path().to_str().unwrap(), "--archive"]);
        let settings = resolve(&cli).unwrap();
        assert_eq!(settings.max_events, 500);
    }
}
