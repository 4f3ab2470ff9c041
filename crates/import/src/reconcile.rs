use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use tally_core::LedgerStore;

use crate::config::ReconcileConfig;
use crate::diagnostics::Diagnostics;
use crate::match_engine::{outflow_candidates, MatchEngine};
use crate::ofx::{StatementExtractor, StatementHeader};
use crate::projector::project_expenses;
use crate::report::ReconciliationReport;

/// Failures that stop a run. Everything else is absorbed into
/// [`Diagnostics`].
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Failed to read statement {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Statement is {size} bytes, limit is {limit}")]
    StatementTooLarge { size: u64, limit: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationRun {
    pub header: StatementHeader,
    pub report: ReconciliationReport,
    pub diagnostics: Diagnostics,
}

/// One statement against one ledger snapshot: extract, keep outflows,
/// project expenses, join, report.
pub struct Reconciler {
    config: ReconcileConfig,
    extractor: StatementExtractor,
    engine: MatchEngine,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        let extractor = StatementExtractor::new(
            config.statement.max_blocks,
            config.statement.fallback_description.clone(),
        );
        let engine = MatchEngine::new(config.matching.mode);
        Self {
            config,
            extractor,
            engine,
        }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn run_file<S: LedgerStore + ?Sized>(
        &self,
        path: &Path,
        store: &S,
    ) -> Result<ReconciliationRun, ReconcileError> {
        let read_err = |source: std::io::Error| ReconcileError::Read {
            path: path.to_path_buf(),
            source,
        };
        // Reject before reading the whole file into memory.
        let size = std::fs::metadata(path).map_err(read_err)?.len();
        self.check_size(size)?;
        let data = std::fs::read(path).map_err(read_err)?;
        self.run(&data, store)
    }

    pub fn run<S: LedgerStore + ?Sized>(
        &self,
        statement: &[u8],
        store: &S,
    ) -> Result<ReconciliationRun, ReconcileError> {
        self.check_size(statement.len() as u64)?;

        let extraction = self.extractor.extract(statement);
        let candidates = outflow_candidates(&extraction.transactions);
        let projection = project_expenses(store);

        let result = self.engine.find_matches(&candidates, &projection.entries);
        let report = ReconciliationReport::from_result(&result);

        let mut parse_warnings = extraction.warnings;
        parse_warnings.extend(projection.warnings);

        let diagnostics = Diagnostics {
            extracted: extraction.transactions.len(),
            outflow_candidates: candidates.len(),
            skipped_blocks: extraction.skipped,
            parse_warnings,
            ledger: projection.status,
            ledger_rows_dropped: projection.dropped,
            truncated: extraction.truncated,
        };

        if let Some(period) = extraction.header.period {
            tracing::debug!("Statement period {} ({} days)", period, period.days());
        }
        tracing::info!(
            "Reconciled {} outflows ({} transactions, {} blocks skipped): {} matched pairs, {} unmatched, mode {}",
            diagnostics.outflow_candidates,
            diagnostics.extracted,
            diagnostics.skipped_block_count(),
            report.matched_count,
            report.unmatched_count,
            report.match_mode,
        );
        if diagnostics.parse_warning_count() > 0 {
            tracing::warn!(
                "{} fields fell back to defaults during this run",
                diagnostics.parse_warning_count()
            );
        }

        Ok(ReconciliationRun {
            header: extraction.header,
            report,
            diagnostics,
        })
    }

    fn check_size(&self, size: u64) -> Result<(), ReconcileError> {
        let limit = self.config.statement.max_bytes;
        if size > limit as u64 {
            return Err(ReconcileError::StatementTooLarge { size, limit });
        }
        Ok(())
    }
}
