use tally_core::{
    amount_or_zero, parse_date, EntryKind, EntryStatus, LedgerEntry, LedgerStore, StoredEntry,
};

use crate::diagnostics::{LedgerStatus, ParseWarning};

/// The expense side of the join, plus what happened while reading it.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub entries: Vec<LedgerEntry>,
    pub status: LedgerStatus,
    pub warnings: Vec<ParseWarning>,
    /// Expense rows whose date could not be normalized.
    pub dropped: usize,
}

/// Read the ledger and keep its expenses, normalized for matching.
///
/// A store that cannot be read projects to no entries. That is logged and
/// reported as [`LedgerStatus::Unavailable`] rather than returned as an error.
pub fn project_expenses<S: LedgerStore + ?Sized>(store: &S) -> Projection {
    let rows = match store.read_all_entries() {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!("{e}; reconciling against an empty ledger");
            return Projection {
                entries: Vec::new(),
                status: LedgerStatus::Unavailable { reason: e.to_string() },
                warnings: Vec::new(),
                dropped: 0,
            };
        }
    };

    let status = LedgerStatus::Available { rows: rows.len() };
    if rows.is_empty() {
        tracing::info!("Ledger is empty");
    }

    let mut entries = Vec::new();
    let mut warnings = Vec::new();
    let mut dropped = 0;

    for row in rows {
        if EntryKind::from_label(&row.kind) != EntryKind::Expense {
            continue;
        }
        match project_row(row) {
            Ok((entry, warning)) => {
                if let Some(w) = warning {
                    warnings.push(w);
                }
                entries.push(entry);
            }
            Err(w) => {
                dropped += 1;
                warnings.push(w);
            }
        }
    }

    tracing::debug!("Projected {} expense entries ({} dropped)", entries.len(), dropped);

    Projection {
        entries,
        status,
        warnings,
        dropped,
    }
}

fn project_row(row: StoredEntry) -> Result<(LedgerEntry, Option<ParseWarning>), ParseWarning> {
    let liquidation_date = parse_date(&row.liquidation_date).map_err(|e| {
        tracing::warn!("Ledger entry {}: dropped ({e})", row.id);
        ParseWarning::LedgerEntry { id: row.id, message: e.to_string() }
    })?;

    let (amount, error) = amount_or_zero(&row.amount);
    let warning = error.map(|e| {
        tracing::warn!("Ledger entry {}: amount fell back to zero ({e})", row.id);
        ParseWarning::LedgerEntry { id: row.id, message: e.to_string() }
    });

    let entry = LedgerEntry {
        id: row.id,
        kind: EntryKind::Expense,
        liquidation_date,
        amount: amount.abs(),
        vendor: row.vendor,
        category: row.category,
        status: EntryStatus::from_label(&row.status),
    };
    Ok((entry, warning))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_core::{AmountInput, DateInput, EntryId};
    use tally_storage::MemoryLedgerStore;

    fn row(id: i64, kind: &str, date: &str, amount: AmountInput) -> StoredEntry {
        StoredEntry {
            id: EntryId(id),
            kind: kind.into(),
            liquidation_date: DateInput::from(date),
            amount,
            vendor: "Atacadão".into(),
            category: "Mercadoria".into(),
            status: "Pago".into(),
        }
    }

    #[test]
    fn keeps_only_expenses_with_ids() {
        let store = MemoryLedgerStore::new(vec![
            row(0, "Despesa", "2026-01-10", AmountInput::from(200.0)),
            row(1, "Receita", "2026-01-10", AmountInput::from(200.0)),
            row(2, "expense", "11/01/2026", AmountInput::from("35,90")),
        ]);
        let p = project_expenses(&store);
        assert_eq!(p.status, LedgerStatus::Available { rows: 3 });
        assert_eq!(p.entries.len(), 2);
        assert_eq!(p.entries[0].id, EntryId(0));
        assert_eq!(p.entries[0].amount.canonical(), "200.00");
        assert_eq!(p.entries[0].status, EntryStatus::Paid);
        assert_eq!(p.entries[1].id, EntryId(2));
        assert_eq!(
            p.entries[1].liquidation_date,
            NaiveDate::from_ymd_opt(2026, 1, 11).unwrap()
        );
        assert_eq!(p.entries[1].amount.canonical(), "35.90");
        assert!(p.warnings.is_empty());
    }

    #[test]
    fn unavailable_store_is_not_an_error() {
        let p = project_expenses(&MemoryLedgerStore::unavailable("sheet offline"));
        assert!(p.entries.is_empty());
        assert!(matches!(p.status, LedgerStatus::Unavailable { ref reason } if reason.contains("sheet offline")));
    }

    #[test]
    fn empty_store_is_available() {
        let p = project_expenses(&MemoryLedgerStore::new(vec![]));
        assert!(p.entries.is_empty());
        assert_eq!(p.status, LedgerStatus::Available { rows: 0 });
    }

    #[test]
    fn bad_amount_becomes_zero_with_warning() {
        let store = MemoryLedgerStore::new(vec![row(7, "Despesa", "2026-01-10", AmountInput::from("?"))]);
        let p = project_expenses(&store);
        assert_eq!(p.entries.len(), 1);
        assert!(p.entries[0].amount.is_zero());
        assert!(matches!(
            p.warnings[0],
            ParseWarning::LedgerEntry { id: EntryId(7), .. }
        ));
    }

    #[test]
    fn negative_expense_amount_is_projected_as_magnitude() {
        let store = MemoryLedgerStore::new(vec![row(0, "Despesa", "2026-01-10", AmountInput::from("-200,00"))]);
        let p = project_expenses(&store);
        assert_eq!(p.entries[0].amount.canonical(), "200.00");
        assert!(p.warnings.is_empty());
    }

    #[test]
    fn bad_date_drops_row() {
        let store = MemoryLedgerStore::new(vec![
            row(0, "Despesa", "", AmountInput::from(1.0)),
            row(1, "Despesa", "2026-01-10", AmountInput::from(1.0)),
        ]);
        let p = project_expenses(&store);
        assert_eq!(p.entries.len(), 1);
        assert_eq!(p.dropped, 1);
        assert_eq!(p.warnings.len(), 1);
    }

    #[test]
    fn works_through_a_trait_object() {
        let store: Box<dyn LedgerStore> = Box::new(MemoryLedgerStore::new(vec![row(
            0,
            "Despesa",
            "2026-01-10",
            AmountInput::from(1.0),
        )]));
        assert_eq!(project_expenses(&store).entries.len(), 1);
        assert_eq!(project_expenses(store.as_ref()).entries.len(), 1);
    }
}
