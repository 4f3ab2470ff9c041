pub mod csv_store;
pub mod db;
pub mod memory;

use thiserror::Error;

pub use csv_store::{read_entries, CsvLedgerStore};
pub use db::{get_all_entries, load_snapshot, open_db, DbPool};
#[cfg(any(test, feature = "test-util"))]
pub use db::{create_db, insert_entry, NewLedgerEntry};
pub use memory::MemoryLedgerStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StorageError> for tally_core::StoreError {
    fn from(e: StorageError) -> Self {
        tally_core::StoreError::Unavailable(e.to_string())
    }
}
