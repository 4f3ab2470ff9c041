use chrono::NaiveDate;
use serde::Serialize;
use tally_core::{EntryId, Money};

use crate::match_engine::{MatchMode, MatchResult};

/// A bank outflow with no ledger expense on the same date and amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedRow {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
}

/// A bank outflow confirmed by a ledger expense.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRow {
    pub date: NaiveDate,
    pub bank_description: String,
    pub amount: Money,
    pub vendor: String,
    pub category: String,
    pub entry_id: EntryId,
}

/// Counts and detail rows, with no display formatting applied.
///
/// Rows are sorted by date, then amount, then description; matched rows
/// break remaining ties on the ledger entry id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub match_mode: MatchMode,
    pub matched_count: usize,
    pub unmatched_count: usize,
    pub unmatched: Vec<UnmatchedRow>,
    pub matched: Vec<MatchedRow>,
}

impl ReconciliationReport {
    pub fn from_result(result: &MatchResult) -> Self {
        let mut unmatched: Vec<UnmatchedRow> = result
            .unmatched
            .iter()
            .map(|c| UnmatchedRow {
                date: c.date(),
                description: c.transaction.description.clone(),
                amount: c.amount,
            })
            .collect();
        unmatched.sort_by(|a, b| {
            (a.date, a.amount, &a.description).cmp(&(b.date, b.amount, &b.description))
        });

        let mut matched: Vec<MatchedRow> = result
            .matched
            .iter()
            .map(|p| MatchedRow {
                date: p.candidate.date(),
                bank_description: p.candidate.transaction.description.clone(),
                amount: p.candidate.amount,
                vendor: p.entry.vendor.clone(),
                category: p.entry.category.clone(),
                entry_id: p.entry.id,
            })
            .collect();
        matched.sort_by(|a, b| {
            (a.date, a.amount, &a.bank_description, a.entry_id)
                .cmp(&(b.date, b.amount, &b.bank_description, b.entry_id))
        });

        Self {
            match_mode: result.mode,
            matched_count: matched.len(),
            unmatched_count: unmatched.len(),
            unmatched,
            matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_engine::{MatchedPair, OutflowCandidate};
    use crate::ofx::BankTransaction;
    use tally_core::{EntryKind, EntryStatus, LedgerEntry};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn candidate(day: u32, cents: i64, desc: &str) -> OutflowCandidate {
        OutflowCandidate::from_transaction(&BankTransaction {
            date: date(day),
            amount: Money::from_cents(-cents),
            description: desc.into(),
            fit_id: None,
        })
        .unwrap()
    }

    fn entry(id: i64, day: u32, cents: i64, vendor: &str) -> LedgerEntry {
        LedgerEntry {
            id: EntryId(id),
            kind: EntryKind::Expense,
            liquidation_date: date(day),
            amount: Money::from_cents(cents),
            vendor: vendor.into(),
            category: "Energia".into(),
            status: EntryStatus::Paid,
        }
    }

    fn sample() -> MatchResult {
        MatchResult {
            mode: MatchMode::ManyToMany,
            matched: vec![
                MatchedPair { candidate: candidate(12, 4210, "LUZ"), entry: entry(5, 12, 4210, "Enel") },
                MatchedPair { candidate: candidate(10, 20000, "PIX"), entry: entry(2, 10, 20000, "Atacadão") },
                MatchedPair { candidate: candidate(10, 20000, "PIX"), entry: entry(1, 10, 20000, "Assaí") },
            ],
            unmatched: vec![candidate(15, 990, "TARIFA"), candidate(11, 5000, "SAQUE")],
        }
    }

    #[test]
    fn counts_follow_rows() {
        let report = ReconciliationReport::from_result(&sample());
        assert_eq!(report.matched_count, 3);
        assert_eq!(report.unmatched_count, 2);
        assert_eq!(report.match_mode, MatchMode::ManyToMany);
    }

    #[test]
    fn rows_are_sorted() {
        let report = ReconciliationReport::from_result(&sample());
        let unmatched: Vec<_> = report.unmatched.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(unmatched, ["SAQUE", "TARIFA"]);

        let ids: Vec<_> = report.matched.iter().map(|r| r.entry_id.0).collect();
        assert_eq!(ids, [1, 2, 5]);
    }

    #[test]
    fn matched_row_links_vendor_and_category() {
        let report = ReconciliationReport::from_result(&sample());
        let row = &report.matched[2];
        assert_eq!(row.bank_description, "LUZ");
        assert_eq!(row.amount.canonical(), "42.10");
        assert_eq!(row.vendor, "Enel");
        assert_eq!(row.category, "Energia");
    }

    #[test]
    fn amounts_are_absolute() {
        let report = ReconciliationReport::from_result(&sample());
        assert!(report.unmatched.iter().all(|r| !r.amount.is_negative()));
    }

    #[test]
    fn empty_result() {
        let report = ReconciliationReport::from_result(&MatchResult {
            mode: MatchMode::OneToOne,
            matched: vec![],
            unmatched: vec![],
        });
        assert_eq!(report.matched_count, 0);
        assert_eq!(report.unmatched_count, 0);
    }

    #[test]
    fn serializes_plain_values() {
        let json = serde_json::to_value(ReconciliationReport::from_result(&sample())).unwrap();
        assert_eq!(json["match_mode"], "many_to_many");
        assert_eq!(json["unmatched"][0]["date"], "2026-01-11");
        assert_eq!(json["unmatched"][0]["amount"], "50.00");
        assert_eq!(json["matched"][0]["entry_id"], 1);
    }
}
