use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use tally_core::LedgerStore;
use tally_import::{ReconcileConfig, Reconciler};
use tally_storage::{CsvLedgerStore, MemoryLedgerStore};

const USAGE: &str = "usage: tally [--config <file>] [--ledger <path>] <statement.ofx>";

#[derive(Debug, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    ledger: Option<PathBuf>,
    statement: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = load_config(args.config.as_deref())?;

    let Some(ledger_path) = args.ledger.clone().or_else(|| config.ledger.path.clone()) else {
        bail!("no ledger configured: pass --ledger or set [ledger] path\n{USAGE}");
    };
    let store = open_ledger(&ledger_path).await;

    let run = Reconciler::new(config)
        .run_file(&args.statement, &store)
        .with_context(|| format!("reconciling {}", args.statement.display()))?;

    println!("{}", serde_json::to_string_pretty(&run)?);
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut config = None;
    let mut ledger = None;
    let mut statement = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                config = Some(PathBuf::from(args.next().context("--config needs a value")?));
            }
            "--ledger" | "-l" => {
                ledger = Some(PathBuf::from(args.next().context("--ledger needs a value")?));
            }
            "--help" | "-h" => bail!("{USAGE}"),
            flag if flag.starts_with('-') => bail!("unknown option '{flag}'\n{USAGE}"),
            _ if statement.is_some() => bail!("only one statement per run\n{USAGE}"),
            _ => statement = Some(PathBuf::from(&arg)),
        }
    }

    let statement = statement.with_context(|| format!("missing statement file\n{USAGE}"))?;
    Ok(Args {
        config,
        ledger,
        statement,
    })
}

/// An explicit `--config` must exist; otherwise the platform config file is
/// used when present, and defaults when not.
fn load_config(explicit: Option<&Path>) -> Result<ReconcileConfig> {
    if let Some(path) = explicit {
        return ReconcileConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()));
    }

    let default_path = directories::ProjectDirs::from("com", "tally", "Tally")
        .map(|dirs| dirs.config_dir().join("tally.toml"));
    match default_path {
        Some(path) if path.exists() => {
            tracing::info!("Using config {}", path.display());
            ReconcileConfig::load(&path).with_context(|| format!("loading config {}", path.display()))
        }
        _ => Ok(ReconcileConfig::default()),
    }
}

/// Open the ledger by file type. A ledger that cannot be opened still yields
/// a store, one that reports itself unavailable on read.
async fn open_ledger(path: &Path) -> Box<dyn LedgerStore> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "db" | "sqlite" | "sqlite3" => match open_sqlite_snapshot(path).await {
            Ok(snapshot) => {
                tracing::info!("Loaded {} ledger rows from {}", snapshot.len(), path.display());
                Box::new(snapshot)
            }
            Err(e) => {
                tracing::warn!("Cannot open ledger database {}: {e}", path.display());
                Box::new(MemoryLedgerStore::unavailable(e.to_string()))
            }
        },
        _ => {
            let store = CsvLedgerStore::new(path);
            tracing::info!("Reading ledger worksheet {}", store.path().display());
            Box::new(store)
        }
    }
}

async fn open_sqlite_snapshot(path: &Path) -> Result<MemoryLedgerStore, tally_storage::StorageError> {
    let pool = tally_storage::open_db(path).await?;
    let snapshot = tally_storage::load_snapshot(&pool).await;
    pool.close().await;
    snapshot
}
