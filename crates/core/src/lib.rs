pub mod entry;
pub mod money;
pub mod normalize;
pub mod period;
pub mod store;

pub use entry::{EntryId, EntryKind, EntryStatus, LedgerEntry};
pub use money::Money;
pub use normalize::{amount_or_zero, parse_amount, parse_date, AmountInput, DateInput, FieldError};
pub use period::DateRange;
pub use store::{LedgerStore, StoreError, StoredEntry};
