//! Customer price derivation from the lender's cost basis.
//!
//! The agreed price is chosen so that the total of base payments recovers
//! `recovery_multiple` times the cost basis, given a residual set at a fixed
//! percentage of that same price. Substituting `residual = rp * price` into
//! the lease identity
//!
//! ```text
//! total = (price - residual) + (price + residual) * mf * term
//! ```
//!
//! gives the closed form
//!
//! ```text
//! price = total / ((1 - rp) + (1 + rp) * mf * term)
//! ```

use rust_decimal::Decimal;

use crate::amortization::reverse_capitalized_cost;
use crate::config::DealConfig;
use crate::error::LeaseDealError;
use crate::frequency::{number_of_payments, PaymentFrequency};
use crate::types::{checked_product, checked_quotient, round_currency, Money};
use crate::LeaseDealResult;

/// Agreed price whose payments recover the configured multiple of cost basis.
/// Rounded to cents.
pub fn agreed_price_from_cost_basis(
    cost_basis: Money,
    term_months: u32,
    config: &DealConfig,
) -> LeaseDealResult<Money> {
    if term_months == 0 {
        return Err(LeaseDealError::InvalidInput {
            field: "term_months".into(),
            reason: "Lease term must be greater than zero".into(),
        });
    }

    let rp = config.residual_percent;
    let mf_term = checked_product(config.money_factor, Decimal::from(term_months), "mf * term")?;
    let denominator = (Decimal::ONE - rp)
        + checked_product(Decimal::ONE + rp, mf_term, "agreed price denominator")?;
    let recovery = checked_product(cost_basis, config.recovery_multiple, "recovery target")?;

    Ok(round_currency(checked_quotient(
        recovery,
        denominator,
        "agreed price denominator",
    )?))
}

/// Flat-multiple pricing kept for comparison against older quotes.
///
/// This model fixes the base payment at `cost_basis * recovery_multiple / n`
/// and the residual at a percentage of cost basis, then backs the price out
/// of the payment with [`reverse_capitalized_cost`]. The calculator never
/// uses it.
pub fn flat_multiple_agreed_price(
    cost_basis: Money,
    term_months: u32,
    frequency: PaymentFrequency,
    config: &DealConfig,
) -> LeaseDealResult<Money> {
    let n = number_of_payments(term_months, frequency)?;
    if n == 0 {
        return Err(LeaseDealError::InvalidInput {
            field: "term_months".into(),
            reason: "Lease term must yield at least one payment".into(),
        });
    }

    let recovery = checked_product(cost_basis, config.recovery_multiple, "recovery target")?;
    let base_payment =
        round_currency(checked_quotient(recovery, Decimal::from(n), "flat base payment")?);
    let residual = round_currency(checked_product(
        cost_basis,
        config.residual_percent,
        "flat residual",
    )?);
    let cap = reverse_capitalized_cost(
        base_payment,
        residual,
        term_months,
        n,
        config.money_factor,
    )?;
    Ok(round_currency(cap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_agreed_price_36_months() {
        let price = agreed_price_from_cost_basis(dec!(10000), 36, &DealConfig::default()).unwrap();
        assert_eq!(price, dec!(10000.00));
    }

    #[test]
    fn test_shorter_term_means_higher_price() {
        let config = DealConfig::default();
        let p12 = agreed_price_from_cost_basis(dec!(10000), 12, &config).unwrap();
        let p24 = agreed_price_from_cost_basis(dec!(10000), 24, &config).unwrap();
        let p48 = agreed_price_from_cost_basis(dec!(10000), 48, &config).unwrap();
        assert!(p12 > p24);
        assert!(p24 > p48);
    }

    #[test]
    fn test_zero_money_factor() {
        // price * (1 - 0.15) = 20000
        let config = DealConfig {
            money_factor: Decimal::ZERO,
            ..DealConfig::default()
        };
        let price = agreed_price_from_cost_basis(dec!(10000), 36, &config).unwrap();
        assert_eq!(price, round_currency(dec!(20000) / dec!(0.85)));
    }

    #[test]
    fn test_zero_term_rejected() {
        assert!(agreed_price_from_cost_basis(dec!(10000), 0, &DealConfig::default()).is_err());
    }

    #[test]
    fn test_huge_cost_basis_overflows_cleanly() {
        let huge = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let err = agreed_price_from_cost_basis(huge, 36, &DealConfig::default()).unwrap_err();
        assert!(matches!(err, LeaseDealError::NumericOverflow { .. }));
    }

    #[test]
    fn test_flat_multiple_price_is_positive() {
        let price = flat_multiple_agreed_price(
            dec!(10000),
            36,
            PaymentFrequency::Monthly,
            &DealConfig::default(),
        )
        .unwrap();
        // base 555.56, residual 1500: cap ~ (20000.16 + 0.0004) / 1.99999972
        assert_eq!(price, dec!(10000.08));
    }
}
