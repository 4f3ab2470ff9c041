pub mod config;
pub mod diagnostics;
pub mod match_engine;
pub mod ofx;
pub mod projector;
pub mod reconcile;
pub mod report;

pub use config::{ConfigError, ReconcileConfig};
pub use diagnostics::{Diagnostics, LedgerStatus, ParseWarning, SkipReason, SkippedBlock};
pub use match_engine::{
    outflow_candidates, MatchEngine, MatchKey, MatchMode, MatchResult, MatchedPair, OutflowCandidate,
};
pub use ofx::{BankTransaction, BlockOutcome, Extraction, StatementExtractor, StatementHeader};
pub use projector::{project_expenses, Projection};
pub use reconcile::{ReconcileError, Reconciler, ReconciliationRun};
pub use report::{MatchedRow, ReconciliationReport, UnmatchedRow};

