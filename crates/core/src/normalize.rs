//! Canonicalization of the heterogeneous amount and date encodings found in
//! bank statements and ledger worksheets.
//!
//! Both the statement extractor and the ledger projector go through these
//! functions, which is what makes their outputs comparable.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Empty value")]
    Empty,
    #[error("Unparseable amount: {0}")]
    Amount(String),
    #[error("Unparseable date: {0}")]
    Date(String),
}

/// An amount as it arrives from a source: already numeric, or text.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountInput {
    Number(Decimal),
    Float(f64),
    Text(String),
}

impl From<Decimal> for AmountInput {
    fn from(d: Decimal) -> Self {
        AmountInput::Number(d)
    }
}

impl From<f64> for AmountInput {
    fn from(f: f64) -> Self {
        AmountInput::Float(f)
    }
}

impl From<&str> for AmountInput {
    fn from(s: &str) -> Self {
        AmountInput::Text(s.to_string())
    }
}

impl From<String> for AmountInput {
    fn from(s: String) -> Self {
        AmountInput::Text(s)
    }
}

/// A date as it arrives from a source: already typed, or text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

impl From<NaiveDate> for DateInput {
    fn from(d: NaiveDate) -> Self {
        DateInput::Date(d)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(dt: NaiveDateTime) -> Self {
        DateInput::DateTime(dt)
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        DateInput::Text(s)
    }
}

pub fn parse_amount(input: &AmountInput) -> Result<Money, FieldError> {
    match input {
        AmountInput::Number(d) => Ok(Money::from_decimal(*d)),
        AmountInput::Float(f) => Decimal::from_f64(*f)
            .map(Money::from_decimal)
            .ok_or_else(|| FieldError::Amount(f.to_string())),
        AmountInput::Text(s) => parse_amount_text(s),
    }
}

/// Falls back to zero when the amount cannot be parsed.
///
/// The error is handed back alongside the value so callers can count it.
pub fn amount_or_zero(input: &AmountInput) -> (Money, Option<FieldError>) {
    match parse_amount(input) {
        Ok(m) => (m, None),
        Err(e) => (Money::zero(), Some(e)),
    }
}

pub fn parse_date(input: &DateInput) -> Result<NaiveDate, FieldError> {
    match input {
        DateInput::Date(d) => Ok(*d),
        DateInput::DateTime(dt) => Ok(dt.date()),
        DateInput::Text(s) => parse_date_text(s),
    }
}

fn parse_amount_text(raw: &str) -> Result<Money, FieldError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(FieldError::Empty);
    }

    let (mut negative, mut s) = split_sign(&compact);

    // Accounting notation: (75,25)
    if s.starts_with('(') && s.ends_with(')') && s.len() > 2 {
        negative = !negative;
        s = &s[1..s.len() - 1];
    }

    // Currency prefix such as `R$`, `US$`, `$` or `€`, possibly followed by
    // the sign (`R$-150,00`).
    let s = s.trim_start_matches(|c: char| c.is_alphabetic() || c == '$' || c == '€' || c == '£');
    let (inner_negative, s) = split_sign(s);
    negative ^= inner_negative;

    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return Err(FieldError::Amount(raw.to_string()));
    }

    let normalized = unify_separators(s).ok_or_else(|| FieldError::Amount(raw.to_string()))?;

    let mut dec = Decimal::from_str(&normalized).map_err(|_| FieldError::Amount(raw.to_string()))?;
    if negative {
        dec = -dec;
    }
    Ok(Money::from_decimal(dec))
}

/// Rewrite `s` (digits, periods and commas only) with a single `.` decimal
/// point and no grouping.
///
/// A comma is the decimal separator, and periods before it are thousands
/// grouping (`1.234,56`). Without a comma, a lone period is a decimal point
/// (`150.50`) unless three digits follow it, which reads just as well as
/// grouping (`1.234`) and is rejected. Several periods must be well-formed
/// groups (`1.234.567`). Anything else (`1,234.56`, `1,234,567`) is `None`.
fn unify_separators(s: &str) -> Option<String> {
    if let Some((int, frac)) = s.split_once(',') {
        if frac.contains([',', '.']) || frac.is_empty() {
            return None;
        }
        let int = ungroup(int)?;
        return Some(format!("{int}.{frac}"));
    }

    match s.matches('.').count() {
        0 => Some(s.to_string()),
        1 => {
            let (int, frac) = s.split_once('.')?;
            (frac.len() != 3 && !frac.is_empty()).then(|| format!("{int}.{frac}"))
        }
        _ => ungroup(s),
    }
}

/// `1.234.567` to `1234567`; a bare `1234` passes through.
fn ungroup(s: &str) -> Option<String> {
    let mut groups = s.split('.');
    let head = groups.next()?;
    if head.is_empty() || (s.contains('.') && head.len() > 3) {
        return None;
    }
    let mut out = head.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        out.push_str(group);
    }
    Some(out)
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

fn parse_date_text(raw: &str) -> Result<NaiveDate, FieldError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(FieldError::Empty);
    }

    // Compact YYYYMMDD, possibly followed by a time and zone
    // (`20240115120000[-5:EST]`); only the first eight digits count.
    if let Some(head) = s.get(..8) {
        if head.bytes().all(|b| b.is_ascii_digit()) {
            return NaiveDate::parse_from_str(head, "%Y%m%d")
                .map_err(|_| FieldError::Date(raw.to_string()));
        }
    }

    // Drop a trailing time component (`2026-01-10 00:00:00`, `2026-01-10T08:00`).
    let day = s.split([' ', 'T']).next().unwrap_or(s);

    for fmt in ["%d/%m/%Y", "%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(day, fmt) {
            return Ok(date);
        }
    }

    Err(FieldError::Date(raw.to_string()))
}
