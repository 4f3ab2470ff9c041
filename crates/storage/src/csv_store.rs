use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tally_core::{AmountInput, DateInput, EntryId, LedgerStore, StoreError, StoredEntry};

use crate::StorageError;

/// One worksheet row. Columns are matched by header name; the entry forms
/// write the Portuguese names, exports from other tools the English ones.
/// Unknown columns (`data_registro`, `competencia`, `observacao`) are ignored.
#[derive(Debug, Deserialize)]
struct WorksheetRow {
    #[serde(rename = "tipo", alias = "kind", default)]
    kind: String,
    #[serde(rename = "valor", alias = "amount", default)]
    amount: String,
    #[serde(rename = "fornecedor", alias = "vendor", default)]
    vendor: String,
    #[serde(rename = "data_liquidacao", alias = "liquidation_date", default)]
    liquidation_date: String,
    #[serde(default)]
    status: String,
    #[serde(rename = "categoria", alias = "category", default)]
    category: String,
}

/// The ledger worksheet exported as CSV, re-read on every call.
#[derive(Debug, Clone)]
pub struct CsvLedgerStore {
    path: PathBuf,
}

impl CsvLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for CsvLedgerStore {
    fn read_all_entries(&self) -> Result<Vec<StoredEntry>, StoreError> {
        let file = File::open(&self.path).map_err(StorageError::from)?;
        let rows = read_entries(file)?;
        tracing::debug!("Read {} ledger rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

/// Parse a worksheet export. Row ids are 0-based data-row positions, so a
/// row that fails to decode is skipped without shifting the ids after it.
pub fn read_entries<R: Read>(data: R) -> Result<Vec<StoredEntry>, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    // An unreadable header row makes every row unreadable.
    reader.headers()?;

    let mut entries = Vec::new();
    for (position, result) in reader.deserialize::<WorksheetRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("Skipping ledger row {position}: {e}");
                continue;
            }
        };
        entries.push(StoredEntry {
            id: EntryId(position as i64),
            kind: row.kind,
            liquidation_date: DateInput::Text(row.liquidation_date),
            amount: AmountInput::Text(row.amount),
            vendor: row.vendor,
            category: row.category,
            status: row.status,
        });
    }

    Ok(entries)
}
