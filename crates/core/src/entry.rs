use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

/// Positional identifier of a row in the ledger store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub i64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Expense,
    Revenue,
    Other(String),
}

impl EntryKind {
    /// Accepts the labels written by the entry forms (`Despesa`, `Receita`)
    /// as well as their English names, case-insensitively.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "expense" | "despesa" => EntryKind::Expense,
            "revenue" | "receita" => EntryKind::Revenue,
            _ => EntryKind::Other(label.trim().to_string()),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Expense => write!(f, "expense"),
            EntryKind::Revenue => write!(f, "revenue"),
            EntryKind::Other(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Paid,
    Payable,
    Received,
    Other(String),
}

impl EntryStatus {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "paid" | "pago" => EntryStatus::Paid,
            "payable" | "a pagar" => EntryStatus::Payable,
            "received" | "recebido" => EntryStatus::Received,
            _ => EntryStatus::Other(label.trim().to_string()),
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::Paid => write!(f, "paid"),
            EntryStatus::Payable => write!(f, "payable"),
            EntryStatus::Received => write!(f, "received"),
            EntryStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A ledger row after projection: date and amount already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub liquidation_date: NaiveDate,
    /// Magnitude only; worksheets record expenses with either sign.
    pub amount: Money,
    pub vendor: String,
    pub category: String,
    pub status: EntryStatus,
}
