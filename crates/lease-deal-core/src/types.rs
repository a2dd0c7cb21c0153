use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::LeaseDealError;
use crate::LeaseDealResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.095 = 9.5%). Never as percentages.
pub type Rate = Decimal;

/// Round a monetary amount to cents, half away from zero.
///
/// `Decimal::round_dp` rounds half-to-even, which drifts by a cent against
/// contract figures, so every currency rounding in the engine goes through
/// here.
pub fn round_currency(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `a * b`, or `NumericOverflow` naming `context`.
pub fn checked_product(a: Decimal, b: Decimal, context: &str) -> LeaseDealResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| LeaseDealError::NumericOverflow {
        context: context.into(),
    })
}

/// `a / b`, or `DivisionByZero` / `NumericOverflow` naming `context`.
pub fn checked_quotient(a: Decimal, b: Decimal, context: &str) -> LeaseDealResult<Decimal> {
    if b.is_zero() {
        return Err(LeaseDealError::DivisionByZero {
            context: context.into(),
        });
    }
    a.checked_div(b).ok_or_else(|| LeaseDealError::NumericOverflow {
        context: context.into(),
    })
}

/// Jurisdiction whose tax rules apply to the lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    /// Tax is charged on each payment.
    J1,
    /// Tax is charged once on the agreed price and capitalized.
    J2,
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::J1 => write!(f, "J1"),
            Self::J2 => write!(f, "J2"),
        }
    }
}

impl std::str::FromStr for Jurisdiction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "J1" => Ok(Self::J1),
            "J2" => Ok(Self::J2),
            other => Err(format!("Unknown jurisdiction '{other}'. Use: J1, J2")),
        }
    }
}

/// Inclusive range of lease terms in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRange {
    pub min: u32,
    pub max: u32,
}

impl TermRange {
    pub fn contains(&self, term_months: u32) -> bool {
        term_months >= self.min && term_months <= self.max
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_currency_half_up() {
        assert_eq!(round_currency(dec!(2.345)), dec!(2.35));
        assert_eq!(round_currency(dec!(2.355)), dec!(2.36));
        assert_eq!(round_currency(dec!(555.5555)), dec!(555.56));
    }

    #[test]
    fn test_round_currency_negative() {
        assert_eq!(round_currency(dec!(-1.005)), dec!(-1.01));
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(checked_product(dec!(2.5), dec!(4), "x").unwrap(), dec!(10));
        assert!(matches!(
            checked_product(Decimal::MAX, dec!(2), "x"),
            Err(LeaseDealError::NumericOverflow { .. })
        ));
        assert!(matches!(
            checked_quotient(dec!(1), Decimal::ZERO, "x"),
            Err(LeaseDealError::DivisionByZero { .. })
        ));
        assert!(matches!(
            checked_quotient(Decimal::MAX, dec!(0.1), "x"),
            Err(LeaseDealError::NumericOverflow { .. })
        ));
    }

    #[test]
    fn test_jurisdiction_parse() {
        assert_eq!("j1".parse::<Jurisdiction>().unwrap(), Jurisdiction::J1);
        assert_eq!("J2".parse::<Jurisdiction>().unwrap(), Jurisdiction::J2);
        assert!("J3".parse::<Jurisdiction>().is_err());
    }

    #[test]
    fn test_term_range_contains() {
        let range = TermRange { min: 24, max: 48 };
        assert!(range.contains(24));
        assert!(range.contains(48));
        assert!(!range.contains(12));
    }
}
