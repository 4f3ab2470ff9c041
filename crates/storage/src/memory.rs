use tally_core::{LedgerStore, StoreError, StoredEntry};

/// A fixed set of rows held in memory.
///
/// Also stands in for a ledger that could not be opened: built with
/// [`MemoryLedgerStore::unavailable`], every read reports the given reason.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    rows: Vec<StoredEntry>,
    unavailable: Option<String>,
}

impl MemoryLedgerStore {
    pub fn new(rows: Vec<StoredEntry>) -> Self {
        Self { rows, unavailable: None }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            unavailable: Some(reason.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn read_all_entries(&self) -> Result<Vec<StoredEntry>, StoreError> {
        match &self.unavailable {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(self.rows.clone()),
        }
    }
}
