//! The flag surface (spec.md §6): general, actor-selection, per-component
//! host/port, import/export, index-sizing, and logger groups, plus a
//! second "advanced" tier surfaced only with `-z`/`--advanced`.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

/// A single binary with grouped options, matching the original tool's
/// "node / import / export / console" split without four separate
/// subcommands.
#[derive(Parser, Debug)]
#[command(name = "vast", about = "A distributed event store for network telemetry", disable_version_flag = true)]
pub struct Cli {
    /// Working directory holding `log/`, `archive/`, `index/`, `identifier/`.
    #[arg(short = 'd', long = "dir", default_value = ".", global = true)]
    pub dir: PathBuf,

    /// Reveal the advanced (scheduler-tuning) flags in `--help`.
    #[arg(short = 'z', long = "advanced", global = true)]
    pub advanced: bool,

    /// Print the version and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    pub print_version: bool,

    // --- actor selection ---
    /// Run every node component (receiver, archive, index, identifier, search).
    #[arg(short = 'C', long = "all")]
    pub all: bool,
    /// Run the receiver component.
    #[arg(long = "receiver", group = "pairwise")]
    pub receiver: bool,
    /// Run the archive component.
    #[arg(long = "archive")]
    pub archive: bool,
    /// Run the index component.
    #[arg(long = "index")]
    pub index: bool,
    /// Run the identifier component.
    #[arg(long = "identifier", group = "pairwise")]
    pub identifier: bool,
    /// Run the search component.
    #[arg(long = "search")]
    pub search: bool,
    /// Export a query's results to a file.
    #[arg(short = 'E', long = "exporter", group = "pairwise")]
    pub exporter: bool,
    /// Import records from a file into the store.
    #[arg(short = 'I', long = "importer", group = "pairwise")]
    pub importer: bool,
    /// Run an interactive query console.
    #[arg(short = 'Q', long = "console")]
    pub console: bool,

    // --- per-component host/port (recorded for a future distributed
    // deployment; this binary always wires selected components
    // in-process — see DESIGN.md) ---
    #[arg(long = "receiver-host", default_value = "127.0.0.1")]
    pub receiver_host: String,
    #[arg(long = "receiver-port")]
    pub receiver_port: Option<u16>,
    #[arg(long = "archive-host", default_value = "127.0.0.1")]
    pub archive_host: String,
    #[arg(long = "archive-port")]
    pub archive_port: Option<u16>,
    #[arg(long = "index-host", default_value = "127.0.0.1")]
    pub index_host: String,
    #[arg(long = "index-port")]
    pub index_port: Option<u16>,
    #[arg(long = "identifier-host", default_value = "127.0.0.1")]
    pub identifier_host: String,
    #[arg(long = "identifier-port")]
    pub identifier_port: Option<u16>,
    #[arg(long = "search-host", default_value = "127.0.0.1")]
    pub search_host: String,
    #[arg(long = "search-port")]
    pub search_port: Option<u16>,

    // --- import / export parameters ---
    /// Path to the TOML schema declaring event types.
    #[arg(long = "schema")]
    pub schema: Option<PathBuf>,
    /// Path to read records from (importer).
    #[arg(long = "read")]
    pub read: Option<PathBuf>,
    /// Path to write results to (exporter).
    #[arg(long = "write")]
    pub write: Option<PathBuf>,
    /// Schema type name the imported file's records are shaped as.
    #[arg(long = "interface")]
    pub interface: Option<String>,
    /// Number of events per archived/indexed batch.
    #[arg(long = "batch-size", default_value_t = 1000)]
    pub batch_size: usize,
    /// Segment compression for freshly archived batches.
    #[arg(long = "compression", value_enum, default_value_t = CompressionArg::Zstd)]
    pub compression: CompressionArg,
    /// Drop PCAP flows idle longer than this many seconds (accepted for
    /// interface compatibility; this workspace's exporter does not
    /// reconstruct flow state, so the cutoff has no effect here).
    #[arg(long = "pcap-cutoff")]
    pub pcap_cutoff: Option<u64>,
    /// Cap concurrently tracked PCAP flows (same caveat as `--pcap-cutoff`).
    #[arg(long = "pcap-maxflows")]
    pub pcap_maxflows: Option<usize>,
    /// Stop after this many exported events.
    #[arg(long = "limit")]
    pub limit: Option<usize>,
    /// The query string to run (exporter, console's initial query).
    #[arg(long = "query")]
    pub query: Option<String>,
    /// Flush the export sink every N events when writing PCAP.
    #[arg(long = "pcap-flush", default_value_t = 1000)]
    pub pcap_flush: usize,
    /// Export rendering format.
    #[arg(long = "format", value_enum, default_value_t = FormatArg::Json)]
    pub format: FormatArg,

    // --- index sizing ---
    /// Events per partition before it is sealed.
    #[arg(long = "max-events", default_value_t = 1_048_576)]
    pub max_events: usize,
    /// Total partitions an index keeps on disk before evicting the oldest.
    #[arg(long = "max-parts", default_value_t = 256)]
    pub max_parts: usize,
    /// Active (still-being-written) partitions kept resident at once.
    #[arg(long = "active-parts", default_value_t = 4)]
    pub active_parts: usize,
    /// Rebuild every partition from Archive on startup.
    #[arg(long = "rebuild")]
    pub rebuild: bool,

    // --- logger ---
    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Force trace-level logging regardless of `-v`.
    #[arg(short = 'V', long = "debug", global = true)]
    pub debug: bool,
    /// Disable ANSI colors in log output.
    #[arg(long = "no-colors", global = true)]
    pub no_colors: bool,

    // --- advanced (hidden from plain --help; see main.rs's -z handling) ---
    /// Worker threads in the async runtime (defaults to the Tokio default).
    #[arg(long = "worker-threads", hide = true, global = true)]
    pub worker_threads: Option<usize>,
    /// Maximum in-flight messages per mailbox before a sender blocks.
    #[arg(long = "mailbox-capacity", default_value_t = 64, hide = true, global = true)]
    pub mailbox_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompressionArg {
    None,
    Zstd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Ascii,
    Json,
    Pcap,
}

/// Prints a custom help that also lists the advanced flags, used when `-z`
/// (or `--advanced`) accompanies `-h`/`--help` — clap's derive API has no
/// built-in notion of a flag that unhides other flags at parse time, so
/// this is handled as a pre-pass over `argv` before [`Cli::parse`] runs.
pub fn maybe_print_advanced_help(args: &[String]) -> bool {
    let wants_help = args.iter().any(|a| a == "-h" || a == "--help");
    let wants_advanced = args.iter().any(|a| a == "-z" || a == "--advanced");
    if !(wants_help && wants_advanced) {
        return false;
    }
    use clap::CommandFactory;
    let mut command = Cli::command();
    command.build();
    print!("{}", command.render_long_help());
    println!();
    println!("Advanced:");
    println!("      --worker-threads <N>      Worker threads in the async runtime");
    println!("      --mailbox-capacity <N>    Per-actor mailbox capacity [default: 64]");
    true
}
