use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A monetary amount held at exactly two fractional digits.
///
/// Every constructor rescales to two places, so numerically equal amounts
/// always render to the same string (`150.5`, `150.50` and `150.500` all
/// display as `150.50`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        let mut value = decimal.round_dp(2);
        if value.is_zero() {
            value = Decimal::ZERO;
        }
        value.rescale(2);
        Money(value)
    }

    pub fn zero() -> Self {
        Money::from_decimal(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Money::from_decimal(self.0.abs())
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Fixed two-decimal string, period separator, no currency symbol.
    pub fn canonical(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
