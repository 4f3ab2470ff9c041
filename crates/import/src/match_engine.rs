use std::collections::{HashMap, VecDeque};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_core::{EntryKind, LedgerEntry, Money};

use crate::ofx::BankTransaction;

/// A bank transaction with a strictly negative amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutflowCandidate {
    pub transaction: BankTransaction,
    /// Absolute value of the transaction amount.
    pub amount: Money,
}

impl OutflowCandidate {
    /// `None` for inflows and zero amounts.
    pub fn from_transaction(tx: &BankTransaction) -> Option<Self> {
        if !tx.amount.is_negative() {
            return None;
        }
        Some(Self {
            transaction: tx.clone(),
            amount: tx.amount.abs(),
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.transaction.date
    }
}

/// Keeps only outflows, in statement order.
pub fn outflow_candidates(transactions: &[BankTransaction]) -> Vec<OutflowCandidate> {
    transactions
        .iter()
        .filter_map(OutflowCandidate::from_transaction)
        .collect()
}

/// The join key: calendar date plus the canonical two-decimal amount string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MatchKey {
    pub date: NaiveDate,
    pub amount: String,
}

impl MatchKey {
    pub fn new(date: NaiveDate, amount: Money) -> Self {
        Self {
            date,
            amount: amount.canonical(),
        }
    }

    pub fn for_candidate(candidate: &OutflowCandidate) -> Self {
        Self::new(candidate.date(), candidate.amount)
    }

    pub fn for_entry(entry: &LedgerEntry) -> Self {
        Self::new(entry.liquidation_date, entry.amount)
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.date, self.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Every candidate pairs with every expense sharing its key; N candidates
    /// and M entries on one key give N×M pairs.
    #[default]
    ManyToMany,
    /// Each expense is consumed by at most one candidate, in statement order.
    OneToOne,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::ManyToMany => write!(f, "many_to_many"),
            MatchMode::OneToOne => write!(f, "one_to_one"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedPair {
    pub candidate: OutflowCandidate,
    pub entry: LedgerEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub mode: MatchMode,
    pub matched: Vec<MatchedPair>,
    pub unmatched: Vec<OutflowCandidate>,
}

impl MatchResult {
    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }

    pub fn unmatched_count(&self) -> usize {
        self.unmatched.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MatchEngine {
    pub mode: MatchMode,
}

impl MatchEngine {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    /// Equi-join `candidates` against `entries` on [`MatchKey`].
    ///
    /// Entries are indexed once by key; each candidate then probes the index
    /// once. Entries whose kind is not expense never enter the index.
    pub fn find_matches(&self, candidates: &[OutflowCandidate], entries: &[LedgerEntry]) -> MatchResult {
        let mut index: HashMap<MatchKey, VecDeque<&LedgerEntry>> = HashMap::new();
        for entry in entries.iter().filter(|e| e.kind == EntryKind::Expense) {
            index.entry(MatchKey::for_entry(entry)).or_default().push_back(entry);
        }

        let mut matched = Vec::new();
        let mut unmatched = Vec::new();

        for candidate in candidates {
            let key = MatchKey::for_candidate(candidate);
            let hits = index.get_mut(&key).filter(|bucket| !bucket.is_empty());

            match (hits, self.mode) {
                (None, _) => unmatched.push(candidate.clone()),
                (Some(bucket), MatchMode::ManyToMany) => {
                    matched.extend(bucket.iter().map(|entry| MatchedPair {
                        candidate: candidate.clone(),
                        entry: (*entry).clone(),
                    }));
                }
                (Some(bucket), MatchMode::OneToOne) => {
                    if let Some(entry) = bucket.pop_front() {
                        matched.push(MatchedPair {
                            candidate: candidate.clone(),
                            entry: entry.clone(),
                        });
                    }
                }
            }
        }

        MatchResult {
            mode: self.mode,
            matched,
            unmatched,
        }
    }
}
