//! Entry point: parse flags, init the logger, resolve settings, and hand
//! off to [`vast_cli::run`]. Exit codes per spec.md §6: `0` on success,
//! help, or `--version`; `1` on configuration or initialization failure.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vast_cli::{maybe_print_advanced_help, print_banner, resolve_settings, run, Cli};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if maybe_print_advanced_help(&args) {
        return ExitCode::SUCCESS;
    }

    let cli = Cli::parse();

    if cli.print_version {
        println!("vast {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    init_logger(&cli);
    print_banner(cli.no_colors);

    let settings = match resolve_settings(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("vast: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = cli.worker_threads {
        builder.worker_threads(threads);
    }
    let runtime = match builder.build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("vast: failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(settings)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("vast: {err}");
            ExitCode::FAILURE
        }
    }
}

/// `-v`/`-vv`/`-vvv` raise verbosity one step at a time; `-V`/`--debug`
/// forces trace level outright, matching spec.md §6's logger group.
fn init_logger(cli: &Cli) {
    let level = if cli.debug {
        "trace"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!cli.no_colors)
        .with_target(false)
        .init();
}
