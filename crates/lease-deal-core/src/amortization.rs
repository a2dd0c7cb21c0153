use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::LeaseDealError;
use crate::types::{checked_product, checked_quotient, Money, Rate};
use crate::LeaseDealResult;

/// Level periodic payment that amortizes `principal` over `n_payments`.
///
/// The periodic rate is `annual_rate / payments_per_year`. A zero rate falls
/// back to straight division; otherwise the annuity formula
/// `P * r(1+r)^n / ((1+r)^n - 1)` is used with `(1+r)^n` computed by binary
/// exponentiation, so weekly schedules of several hundred payments stay exact.
/// The result is not rounded.
pub fn amortized_payment(
    principal: Money,
    annual_rate: Rate,
    n_payments: u32,
    payments_per_year: u32,
) -> LeaseDealResult<Money> {
    if n_payments == 0 {
        return Err(LeaseDealError::InvalidInput {
            field: "n_payments".into(),
            reason: "Number of payments must be > 0".into(),
        });
    }
    if payments_per_year == 0 {
        return Err(LeaseDealError::InvalidInput {
            field: "payments_per_year".into(),
            reason: "Payments per year must be > 0".into(),
        });
    }

    let periodic_rate = annual_rate / Decimal::from(payments_per_year);
    if periodic_rate.is_zero() {
        return checked_quotient(principal, Decimal::from(n_payments), "straight-line payment");
    }

    let factor = (Decimal::ONE + periodic_rate)
        .checked_powu(u64::from(n_payments))
        .ok_or_else(|| LeaseDealError::NumericOverflow {
            context: format!("(1 + r)^n with n = {n_payments}"),
        })?;
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(LeaseDealError::DivisionByZero {
            context: "amortized payment annuity factor".into(),
        });
    }

    let numerator = checked_product(
        checked_product(principal, periodic_rate, "amortized payment")?,
        factor,
        "amortized payment",
    )?;
    checked_quotient(numerator, denominator, "amortized payment annuity factor")
}

/// Recover the capitalized cost that produces `base_payment`.
///
/// Inverts `total = (cap - residual) + (cap + residual) * mf * term` for
/// `cap`, with the money factor always applied monthly over `term_months`
/// whatever the payment cadence:
/// `cap = (base_payment * n - residual * (mf*term - 1)) / (1 + mf*term)`.
/// The result is not rounded.
pub fn reverse_capitalized_cost(
    base_payment: Money,
    residual: Money,
    term_months: u32,
    n_payments: u32,
    money_factor: Decimal,
) -> LeaseDealResult<Money> {
    let mf_term = checked_product(money_factor, Decimal::from(term_months), "mf * term")?;
    let denominator = Decimal::ONE + mf_term;
    let total_of_payments =
        checked_product(base_payment, Decimal::from(n_payments), "total of payments")?;
    let residual_term = checked_product(residual, mf_term - Decimal::ONE, "residual rent term")?;

    checked_quotient(
        total_of_payments - residual_term,
        denominator,
        "reverse capitalized cost (1 + mf * term)",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::round_currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amortized_payment_twelve_percent() {
        let pmt = amortized_payment(dec!(10000), dec!(0.12), 12, 12).unwrap();
        assert_eq!(round_currency(pmt), dec!(888.49));
    }

    #[test]
    fn test_amortized_payment_zero_rate() {
        let pmt = amortized_payment(dec!(10000), Decimal::ZERO, 12, 12).unwrap();
        assert_eq!(pmt, dec!(10000) / dec!(12));
    }

    #[test]
    fn test_amortized_payment_long_weekly_schedule() {
        // 72 months of weekly payments
        let pmt = amortized_payment(dec!(10000), dec!(0.12), 312, 52).unwrap();
        assert!(pmt > dec!(10000) / dec!(312));
        assert!(pmt < dec!(50));
    }

    #[test]
    fn test_amortized_payment_zero_periods() {
        assert!(amortized_payment(dec!(10000), dec!(0.12), 0, 12).is_err());
    }

    #[test]
    fn test_reverse_capitalized_cost_exact() {
        // mf*term = 0.075: total = 15000 + 45000 * 0.075 = 18375 over 30 payments
        let cap = reverse_capitalized_cost(dec!(612.5), dec!(15000), 30, 30, dec!(0.0025)).unwrap();
        assert_eq!(cap, dec!(30000));
    }

    #[test]
    fn test_reverse_capitalized_cost_zero_money_factor() {
        // No rent charge: total = cap - residual
        let cap = reverse_capitalized_cost(dec!(250), dec!(3000), 36, 36, Decimal::ZERO).unwrap();
        assert_eq!(cap, dec!(12000));
    }
}
