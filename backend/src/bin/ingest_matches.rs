//! Ingest a directory of match payloads into the JSON-lines match store.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use winrate::domain::ports::MatchRepository;
use winrate::domain::{IngestionService, MatchPayload, MatchRecordWide, MatchStore};
use winrate::outbound::persistence::JsonlMatchRepository;

const STORE_ENV: &str = "WINRATE_DATA_PATH";

/// `ingest-matches` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ingest-matches",
    about = "Extract ranked solo queue matches from payload files into the match store",
    version
)]
struct CliArgs {
    /// Directory holding one match payload per `.json` file.
    #[arg(long = "input", value_name = "dir")]
    input_dir: PathBuf,
    /// JSON-lines match store. Falls back to `WINRATE_DATA_PATH` when omitted.
    #[arg(long = "store", value_name = "path")]
    store_path: Option<PathBuf>,
}

/// Tally of payload files that did not yield a record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Extraction {
    filtered: usize,
    rejected: usize,
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        warn!(%error, "tracing init failed");
    }
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let store_path = resolve_store_path(args.store_path)?;
    let (records, extraction) = extract_records(&args.input_dir)?;

    let repository = JsonlMatchRepository::open(&store_path)?;
    let existing = repository
        .load_all()
        .await
        .map_err(|error| io::Error::other(format!("load match store: {error}")))?;
    let (store, _) = MatchStore::from_records(existing);
    let service = IngestionService::new(Arc::new(store), Arc::new(repository));
    let summary = service
        .ingest_batch(records)
        .await
        .map_err(|error| io::Error::other(format!("ingest batch failed: {error}")))?;

    println!("store={}", store_path.display());
    println!("appended={}", summary.appended);
    println!("duplicates={}", summary.duplicates);
    println!("filtered={}", extraction.filtered);
    println!("rejected={}", extraction.rejected);
    Ok(())
}

fn resolve_store_path(explicit: Option<PathBuf>) -> io::Result<PathBuf> {
    if let Some(path) = explicit {
        if path.as_os_str().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--store must not be empty when provided",
            ));
        }
        return Ok(path);
    }

    let from_env = env::var_os(STORE_ENV).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("match store missing: set --store or {STORE_ENV}"),
        )
    })?;
    if from_env.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{STORE_ENV} must not be empty"),
        ));
    }
    Ok(PathBuf::from(from_env))
}

/// Decode every `.json` file in `input_dir`, in file-name order.
///
/// Filtered payloads (unfinished, other queues, AFK) and malformed ones are
/// counted and skipped; only directory I/O failures abort.
fn extract_records(input_dir: &Path) -> io::Result<(Vec<MatchRecordWide>, Extraction)> {
    let dir = Dir::open_ambient_dir(input_dir, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open input directory '{}': {error}",
            input_dir.display()
        ))
    })?;

    let mut names = Vec::new();
    for entry in dir.entries()? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = PathBuf::from(entry.file_name());
        if name.extension().is_some_and(|ext| ext == "json") {
            names.push(name);
        }
    }
    names.sort();

    let mut records = Vec::with_capacity(names.len());
    let mut extraction = Extraction::default();
    for name in names {
        let raw = dir.read_to_string(&name)?;
        let payload: MatchPayload = match serde_json::from_str(&raw) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(file = %name.display(), %error, "undecodable match payload");
                extraction.rejected += 1;
                continue;
            }
        };
        match payload.into_wide_record() {
            Ok(record) => records.push(record),
            Err(error) if error.is_filtered() => {
                info!(file = %name.display(), reason = %error, "match skipped");
                extraction.filtered += 1;
            }
            Err(error) => {
                warn!(file = %name.display(), %error, "malformed match payload");
                extraction.rejected += 1;
            }
        }
    }
    Ok((records, extraction))
}
