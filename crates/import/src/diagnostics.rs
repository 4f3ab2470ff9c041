use serde::Serialize;
use tally_core::EntryId;

/// A field that matched its pattern but could not be parsed, and fell back
/// to a default instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ParseWarning {
    StatementBlock { index: usize, message: String },
    LedgerEntry { id: EntryId, message: String },
}

/// Whether the ledger could be read. An unavailable ledger projects to no
/// entries, same as an empty one, so the two are kept apart here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LedgerStatus {
    Available { rows: usize },
    Unavailable { reason: String },
}

impl LedgerStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, LedgerStatus::Available { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingDate,
    MissingAmount,
    UnparseableDate,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingDate => write!(f, "missing posting date"),
            SkipReason::MissingAmount => write!(f, "missing amount"),
            SkipReason::UnparseableDate => write!(f, "unparseable posting date"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedBlock {
    /// 0-based position of the block in the statement.
    pub index: usize,
    pub reason: SkipReason,
}

/// Everything a run absorbed instead of failing on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub extracted: usize,
    pub outflow_candidates: usize,
    pub skipped_blocks: Vec<SkippedBlock>,
    pub parse_warnings: Vec<ParseWarning>,
    pub ledger: LedgerStatus,
    /// Expense rows dropped because their date could not be normalized.
    pub ledger_rows_dropped: usize,
    /// Block scanning stopped at the configured limit.
    pub truncated: bool,
}

impl Diagnostics {
    pub fn parse_warning_count(&self) -> usize {
        self.parse_warnings.len()
    }

    pub fn skipped_block_count(&self) -> usize {
        self.skipped_blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_status_serializes_tagged() {
        let json = serde_json::to_string(&LedgerStatus::Unavailable { reason: "offline".into() }).unwrap();
        assert_eq!(json, r#"{"state":"unavailable","reason":"offline"}"#);
        assert!(!LedgerStatus::Unavailable { reason: String::new() }.is_available());
        assert!(LedgerStatus::Available { rows: 0 }.is_available());
    }

    #[test]
    fn parse_warning_serializes_tagged() {
        let w = ParseWarning::LedgerEntry { id: EntryId(4), message: "bad".into() };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"source":"ledger_entry","id":4,"message":"bad"}"#);
    }

    #[test]
    fn skip_reason_display() {
        assert_eq!(SkipReason::MissingAmount.to_string(), "missing amount");
        let json = serde_json::to_string(&SkipReason::UnparseableDate).unwrap();
        assert_eq!(json, "\"unparseable_date\"");
    }
}
