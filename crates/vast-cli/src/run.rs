//! Wires the components selected by [`Settings::mode`] together and runs
//! the requested one-shot operation or long-lived node (spec.md §2's data
//! flow, §5's concurrency model).
//!
//! This binary always wires components together in-process through
//! `vast-actor` mailboxes, even when per-component `--*-host`/`--*-port`
//! flags are given. The wire codec in `vast-actor` (a 4-byte length prefix
//! plus a `bincode`-encoded `Envelope`) is fully implemented and tested on
//! its own; turning this binary into a multi-process deployment that
//! speaks it live is future work, recorded in DESIGN.md rather than
//! half-built here.

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use vast_actor::{Actor, Address, Supervisor};
use vast_archive::Archive;
use vast_ids::Identifier;
use vast_index::Index;
use vast_ingest::{Exporter, OutputFormat, Receiver};
use vast_schema::Schema;
use vast_search::Search;

use crate::cli::FormatArg;
use crate::config::{Mode, NodeParts, Settings};
use crate::error::CliError;

pub async fn run(settings: Settings) -> Result<(), CliError> {
    match settings.mode {
        Mode::Node(parts) => run_node(&settings, parts).await,
        Mode::Importer => run_importer(&settings).await,
        Mode::Exporter => run_exporter(&settings).await,
        Mode::Console => run_console(&settings).await,
    }
}

fn load_schema(settings: &Settings) -> Result<Schema, CliError> {
    match &settings.schema {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            Ok(Schema::from_toml(&contents).map_err(crate::error::ConfigError::from)?)
        }
        None => Ok(Schema::new(Vec::new()).expect("an empty schema is always valid")),
    }
}

/// A `vast_actor::Supervisor` restarts an actor from a synchronous factory
/// closure; every component here is instead opened by an async function
/// doing real file I/O (`Identifier::open`, `Archive::open`,
/// `Index::open`). This is the same restart-on-fault shape (spec.md §7:
/// "actor terminates and is (optionally) restarted by its supervisor"),
/// adapted for a factory that is itself a future.
async fn spawn_supervised<A, F, Fut>(
    name: &'static str,
    mailbox_capacity: usize,
    max_restarts: u64,
    mut make_actor: F,
) -> Result<Address<A::Message>, CliError>
where
    A: Actor,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<A, CliError>> + Send,
{
    let (address, mut mailbox) = vast_actor::channel(mailbox_capacity);
    let mut actor = make_actor().await?;
    tokio::spawn(async move {
        let mut restarts = 0u64;
        loop {
            match vast_actor::run(&mut actor, &mut mailbox).await {
                Ok(()) => break,
                Err(fault) => {
                    restarts += 1;
                    tracing::error!(actor = name, %fault, restarts, "actor faulted");
                    if restarts >= max_restarts {
                        tracing::error!(actor = name, "restart budget exhausted, giving up");
                        break;
                    }
                    match make_actor().await {
                        Ok(fresh) => actor = fresh,
                        Err(err) => {
                            tracing::error!(actor = name, error = %err, "failed to reopen after fault");
                            break;
                        }
                    }
                }
            }
        }
    });
    Ok(address)
}

async fn open_identifier(settings: &Settings) -> Result<Address<vast_ids::Msg>, CliError> {
    let path = settings.dir.join("identifier").join("state");
    spawn_supervised("identifier", settings.mailbox_capacity, 5, move || {
        let path = path.clone();
        async move { Ok(Identifier::open(path).await?) }
    })
    .await
}

async fn open_archive(settings: &Settings) -> Result<Address<vast_archive::Msg>, CliError> {
    let dir = settings.dir.join("archive");
    spawn_supervised("archive", settings.mailbox_capacity, 5, move || {
        let dir = dir.clone();
        async move { Ok(Archive::open(dir, 256, 64 * 1024 * 1024).await?) }
    })
    .await
}

async fn open_index(settings: &Settings) -> Result<Address<vast_index::Msg>, CliError> {
    let dir = settings.dir.join("index");
    let (max_events, max_parts, active_parts) = (settings.max_events, settings.max_parts, settings.active_parts);
    spawn_supervised("index", settings.mailbox_capacity, 5, move || {
        let dir = dir.clone();
        async move { Ok(Index::open(dir, max_events, max_parts, active_parts).await?) }
    })
    .await
}

async fn run_node(settings: &Settings, parts: NodeParts) -> Result<(), CliError> {
    let needs_archive = parts.archive || parts.receiver || parts.search;
    let needs_index = parts.index || parts.receiver || parts.search;
    let needs_identifier = parts.identifier || parts.receiver;

    let identifier = if needs_identifier { Some(open_identifier(settings).await?) } else { None };
    let archive = if needs_archive { Some(open_archive(settings).await?) } else { None };
    let index = if needs_index { Some(open_index(settings).await?) } else { None };

    if parts.receiver {
        let (identifier, archive, index) =
            (identifier.clone().unwrap(), archive.clone().unwrap(), index.clone().unwrap());
        let compression = settings.compression;
        let batch_size = settings.batch_size;
        let supervisor = Supervisor::new("receiver", settings.mailbox_capacity, Some(5));
        let (_address, _handle) = supervisor.spawn(move || {
            Receiver::new(batch_size, compression, identifier.clone(), archive.clone(), index.clone())
        });
        info!("receiver started (batch_size={batch_size})");
    }

    if parts.search {
        let schema = Arc::new(load_schema(settings)?);
        let (archive, index) = (archive.clone().unwrap(), index.clone().unwrap());
        let supervisor = Supervisor::new("search", settings.mailbox_capacity, Some(5));
        let (_address, _handle) =
            supervisor.spawn(move || Search::new(schema.clone(), index.clone(), archive.clone()));
        info!("search started");
    }

    info!(
        identifier = parts.identifier,
        archive = parts.archive,
        index = parts.index,
        search = parts.search,
        receiver = parts.receiver,
        "node running, waiting for Ctrl-C"
    );
    tokio::signal::ctrl_c().await.map_err(CliError::Io)?;
    info!("shutdown signal received");
    Ok(())
}

async fn run_importer(settings: &Settings) -> Result<(), CliError> {
    let identifier = open_identifier(settings).await?;
    let archive = open_archive(settings).await?;
    let index = open_index(settings).await?;

    let schema = load_schema(settings)?;
    let type_name = settings.interface.as_deref().expect("validated present");
    let read_path = settings.read.as_deref().expect("validated present");

    let records = vast_ingest::import_json_lines_as(read_path, &schema, type_name).await?;
    let total = records.len();

    let mut receiver = Receiver::new(settings.batch_size, settings.compression, identifier, archive, index);
    let (address, mut mailbox) = vast_actor::channel(settings.mailbox_capacity);
    let driver = tokio::spawn(async move {
        let _ = vast_actor::run(&mut receiver, &mut mailbox).await;
    });

    let (tx, rx) = tokio::sync::oneshot::channel();
    address.send(vast_ingest::Msg::Submit { records, reply: tx }).await?;
    rx.await.map_err(|_| CliError::NoReply("receiver"))??;

    let (tx, rx) = tokio::sync::oneshot::channel();
    address.send(vast_ingest::Msg::Flush { reply: tx }).await?;
    rx.await.map_err(|_| CliError::NoReply("receiver"))??;

    drop(address);
    let _ = driver.await;

    info!(count = total, path = %read_path.display(), "import complete");
    println!("imported {total} records from {}", read_path.display());
    Ok(())
}

async fn run_exporter(settings: &Settings) -> Result<(), CliError> {
    let archive = open_archive(settings).await?;
    let index = open_index(settings).await?;
    let schema = Arc::new(load_schema(settings)?);
    let mut search = Search::new(schema, index, archive);
    let (address, mut mailbox) = vast_actor::channel(settings.mailbox_capacity);
    let driver = tokio::spawn(async move {
        let _ = vast_actor::run(&mut search, &mut mailbox).await;
    });

    let text = settings.query.as_deref().expect("validated present").to_string();
    let (tx, rx) = tokio::sync::oneshot::channel();
    address
        .send(vast_search::Msg::Query { text, limit: settings.limit, reply: tx })
        .await?;
    let query_id = rx.await.map_err(|_| CliError::NoReply("search"))??;

    let (tx, rx) = tokio::sync::oneshot::channel();
    address.send(vast_search::Msg::Results { id: query_id, reply: tx }).await?;
    let mut results = rx.await.map_err(|_| CliError::NoReply("search"))??;

    let write_path = settings.write.as_deref().expect("validated present");
    let file = std::fs::File::create(write_path)?;
    let format = match settings.format {
        FormatArg::Ascii => OutputFormat::Ascii,
        FormatArg::Json => OutputFormat::Json,
        FormatArg::Pcap => OutputFormat::Pcap,
    };
    let mut exporter = Exporter::new(file, format, settings.pcap_flush);

    let mut count = 0usize;
    while let Some(result) = results.recv().await {
        match result {
            Ok(event) => {
                exporter.write_event(&event)?;
                count += 1;
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping event the query stream reported an error for");
            }
        }
    }
    exporter.finish()?;

    drop(address);
    let _ = driver.await;

    info!(count, path = %write_path.display(), "export complete");
    println!("exported {count} events to {}", write_path.display());
    Ok(())
}

async fn run_console(settings: &Settings) -> Result<(), CliError> {
    let archive = open_archive(settings).await?;
    let index = open_index(settings).await?;
    let schema = Arc::new(load_schema(settings)?);
    let mut search = Search::new(schema, index, archive);
    let (address, mut mailbox) = vast_actor::channel(settings.mailbox_capacity);
    let driver = tokio::spawn(async move {
        let _ = vast_actor::run(&mut search, &mut mailbox).await;
    });

    println!("vast console — one query per line, Ctrl-D to exit");
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if let Err(err) = run_console_query(&address, text).await {
            eprintln!("error: {err}");
        }
    }

    drop(address);
    let _ = driver.await;
    Ok(())
}

async fn run_console_query(address: &Address<vast_search::Msg>, text: &str) -> Result<(), CliError> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    address
        .send(vast_search::Msg::Query { text: text.to_string(), limit: None, reply: tx })
        .await?;
    let query_id = rx.await.map_err(|_| CliError::NoReply("search"))??;

    let (tx, rx) = tokio::sync::oneshot::channel();
    address.send(vast_search::Msg::Results { id: query_id, reply: tx }).await?;
    let mut results = rx.await.map_err(|_| CliError::NoReply("search"))??;

    let mut exporter = Exporter::new(std::io::stdout(), OutputFormat::Ascii, 1);
    while let Some(result) = results.recv().await {
        match result {
            Ok(event) => exporter.write_event(&event)?,
            Err(err) => eprintln!("error: {err}"),
        }
    }
    exporter.finish()?;
    Ok(())
}
