//! Payment cadence conversion.
//!
//! Thresholds and comparisons are expressed on a monthly basis; these helpers
//! move per-payment amounts to and from that basis and count payments over a
//! term.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LeaseDealError;
use crate::types::{checked_product, checked_quotient, round_currency, Money};
use crate::LeaseDealResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// How often the lessee pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Weekly,
    Biweekly,
    Semimonthly,
    #[default]
    Monthly,
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 4] = [
        PaymentFrequency::Weekly,
        PaymentFrequency::Biweekly,
        PaymentFrequency::Semimonthly,
        PaymentFrequency::Monthly,
    ];

    pub fn payments_per_year(self) -> u32 {
        match self {
            Self::Weekly => 52,
            Self::Biweekly => 26,
            Self::Semimonthly => 24,
            Self::Monthly => 12,
        }
    }
}

impl std::fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Semimonthly => "semimonthly",
            Self::Monthly => "monthly",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PaymentFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "semimonthly" => Ok(Self::Semimonthly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!(
                "Unknown frequency '{other}'. Use: weekly, biweekly, semimonthly, monthly"
            )),
        }
    }
}

/// Monthly equivalent of a per-payment amount, rounded to cents.
pub fn to_monthly_equivalent(amount: Money, frequency: PaymentFrequency) -> LeaseDealResult<Money> {
    let annual = checked_product(
        amount,
        Decimal::from(frequency.payments_per_year()),
        "annualized payment",
    )?;
    Ok(round_currency(checked_quotient(
        annual,
        MONTHS_PER_YEAR,
        "monthly equivalent",
    )?))
}

/// Per-payment amount equivalent to a monthly amount, rounded to cents.
pub fn from_monthly_equivalent(
    monthly_amount: Money,
    frequency: PaymentFrequency,
) -> LeaseDealResult<Money> {
    let annual = checked_product(monthly_amount, MONTHS_PER_YEAR, "annualized payment")?;
    Ok(round_currency(checked_quotient(
        annual,
        Decimal::from(frequency.payments_per_year()),
        "per-payment equivalent",
    )?))
}

/// Number of payments over `term_months`, rounded half up.
pub fn number_of_payments(term_months: u32, frequency: PaymentFrequency) -> LeaseDealResult<u32> {
    // floor(term * ppy / 12 + 1/2) in integer arithmetic
    let twice_scaled = 2 * u64::from(term_months) * u64::from(frequency.payments_per_year());
    u32::try_from((twice_scaled + 12) / 24).map_err(|_| LeaseDealError::InvalidInput {
        field: "term_months".into(),
        reason: format!("Term of {term_months} months has too many {frequency} payments"),
    })
}
