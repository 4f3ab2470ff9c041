//! Tolerant OFX statement scanning.
//!
//! Exports from different banks disagree on closing-tag discipline, so the
//! statement is not parsed as SGML. Each `<STMTTRN>`..`</STMTTRN>` region is
//! located first, then every field is searched for independently inside it.
//! A block that lacks a required field is skipped; the rest of the statement
//! is unaffected.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use tally_core::{amount_or_zero, parse_date, AmountInput, DateInput, DateRange, FieldError, Money};

use crate::diagnostics::{ParseWarning, SkipReason, SkippedBlock};

pub const DEFAULT_FALLBACK_DESCRIPTION: &str = "Sem descrição";
pub const DEFAULT_MAX_BLOCKS: usize = 100_000;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_block, r"(?is)<STMTTRN>(.*?)</STMTTRN>");

re!(re_posted, r"(?i)<DTPOSTED>[ \t]*(\d{8})");
re!(re_amount, r"(?i)<TRNAMT>[ \t]*([+-]?[\d.,]+)");
re!(re_memo, r"(?i)<MEMO>[ \t]*([^<\r\n]+)");
re!(re_name, r"(?i)<NAME>[ \t]*([^<\r\n]+)");
re!(re_fitid, r"(?i)<FITID>[ \t]*([^<\r\n]+)");

re!(re_acctid, r"(?i)<ACCTID>[ \t]*([^<\r\n]+)");
re!(re_bankid, r"(?i)<BANKID>[ \t]*([^<\r\n]+)");
re!(re_curdef, r"(?i)<CURDEF>[ \t]*([A-Za-z]{3})");
re!(re_dtstart, r"(?i)<DTSTART>[ \t]*(\d{8})");
re!(re_dtend, r"(?i)<DTEND>[ \t]*(\d{8})");

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankTransaction {
    pub date: NaiveDate,
    /// Signed: negative for outflows.
    pub amount: Money,
    pub description: String,
    pub fit_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    Parsed(BankTransaction),
    Skipped(SkipReason),
}

/// Account and period details, when the statement carries them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatementHeader {
    pub account_id: Option<String>,
    pub bank_id: Option<String>,
    pub currency: Option<String>,
    pub period: Option<DateRange>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub header: StatementHeader,
    /// In statement order.
    pub transactions: Vec<BankTransaction>,
    pub skipped: Vec<SkippedBlock>,
    pub warnings: Vec<ParseWarning>,
    pub truncated: bool,
}

impl Extraction {
    pub fn block_count(&self) -> usize {
        self.transactions.len() + self.skipped.len()
    }
}

// ── Extractor ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StatementExtractor {
    pub max_blocks: usize,
    pub fallback_description: String,
}

impl Default for StatementExtractor {
    fn default() -> Self {
        Self {
            max_blocks: DEFAULT_MAX_BLOCKS,
            fallback_description: DEFAULT_FALLBACK_DESCRIPTION.to_string(),
        }
    }
}

impl StatementExtractor {
    pub fn new(max_blocks: usize, fallback_description: impl Into<String>) -> Self {
        Self {
            max_blocks,
            fallback_description: fallback_description.into(),
        }
    }

    pub fn extract(&self, data: &[u8]) -> Extraction {
        self.extract_text(&decode_latin1(data))
    }

    pub fn extract_text(&self, text: &str) -> Extraction {
        let mut extraction = Extraction {
            header: parse_header(text),
            ..Extraction::default()
        };

        for (index, caps) in re_block().captures_iter(text).enumerate() {
            if index >= self.max_blocks {
                tracing::warn!(
                    "Statement has more than {} transaction blocks; ignoring the rest",
                    self.max_blocks
                );
                extraction.truncated = true;
                break;
            }

            let block = caps.get(1).map_or("", |m| m.as_str());
            let (outcome, warning) = self.parse_block(block);

            if let Some(e) = warning {
                tracing::warn!("Block {index}: amount fell back to zero ({e})");
                extraction.warnings.push(ParseWarning::StatementBlock {
                    index,
                    message: e.to_string(),
                });
            }

            match outcome {
                BlockOutcome::Parsed(tx) => {
                    tracing::debug!("Block {index}: {} {} {}", tx.date, tx.amount, tx.description);
                    extraction.transactions.push(tx);
                }
                BlockOutcome::Skipped(reason) => {
                    tracing::debug!("Block {index} skipped: {reason}");
                    extraction.skipped.push(SkippedBlock { index, reason });
                }
            }
        }

        extraction
    }

    /// Parse the inside of one `<STMTTRN>` block.
    ///
    /// Returns the outcome plus the amount error, if the amount was present
    /// but fell back to zero.
    pub fn parse_block(&self, block: &str) -> (BlockOutcome, Option<FieldError>) {
        let Some(raw_date) = capture(re_posted(), block) else {
            return (BlockOutcome::Skipped(SkipReason::MissingDate), None);
        };
        let Some(raw_amount) = capture(re_amount(), block) else {
            return (BlockOutcome::Skipped(SkipReason::MissingAmount), None);
        };
        let Ok(date) = parse_date(&DateInput::from(raw_date)) else {
            return (BlockOutcome::Skipped(SkipReason::UnparseableDate), None);
        };

        let (amount, warning) = amount_or_zero(&AmountInput::from(raw_amount));

        let description = capture(re_memo(), block)
            .or_else(|| capture(re_name(), block))
            .map(str::to_string)
            .unwrap_or_else(|| self.fallback_description.clone());

        let tx = BankTransaction {
            date,
            amount,
            description,
            fit_id: capture(re_fitid(), block).map(str::to_string),
        };
        (BlockOutcome::Parsed(tx), warning)
    }
}

/// Single-byte decode: every byte maps to the code point of the same value,
/// so no input is ever rejected.
pub fn decode_latin1(data: &[u8]) -> String {
    data.iter().map(|&b| char::from(b)).collect()
}

/// Extract with the default limits and fallback description.
pub fn extract(data: &[u8]) -> Extraction {
    StatementExtractor::default().extract(data)
}

fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

fn parse_header(text: &str) -> StatementHeader {
    let date = |re: &Regex| {
        capture(re, text).and_then(|s| parse_date(&DateInput::from(s)).ok())
    };
    let period = match (date(re_dtstart()), date(re_dtend())) {
        (Some(start), Some(end)) => Some(DateRange::new(start, end)),
        _ => None,
    };

    StatementHeader {
        account_id: capture(re_acctid(), text).map(str::to_string),
        bank_id: capture(re_bankid(), text).map(str::to_string),
        currency: capture(re_curdef(), text).map(|s| s.to_uppercase()),
        period,
    }
}
