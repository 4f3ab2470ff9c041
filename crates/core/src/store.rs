use thiserror::Error;

use crate::entry::EntryId;
use crate::normalize::{AmountInput, DateInput};

/// A ledger row exactly as the store holds it, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub id: EntryId,
    pub kind: String,
    pub liquidation_date: DateInput,
    pub amount: AmountInput,
    pub vendor: String,
    pub category: String,
    pub status: String,
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Ledger store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the ledger. Reconciliation never writes through this seam.
pub trait LedgerStore {
    fn read_all_entries(&self) -> Result<Vec<StoredEntry>, StoreError>;
}

impl<S: LedgerStore + ?Sized> LedgerStore for &S {
    fn read_all_entries(&self) -> Result<Vec<StoredEntry>, StoreError> {
        (**self).read_all_entries()
    }
}

impl<S: LedgerStore + ?Sized> LedgerStore for Box<S> {
    fn read_all_entries(&self) -> Result<Vec<StoredEntry>, StoreError> {
        (**self).read_all_entries()
    }
}
