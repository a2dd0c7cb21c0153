use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::deal::calculator::{DealCalculation, MAX_AMOUNT, MAX_TERM_MONTHS};
use crate::error::LeaseDealError;
use crate::frequency::number_of_payments;
use crate::types::{round_currency, Money};
use crate::LeaseDealResult;

/// One payment of a deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Payment number (1-indexed)
    pub payment_number: u32,
    pub base_payment: Money,
    pub tax: Money,
    pub total_payment: Money,
    /// Base payments collected through this payment
    pub cumulative_base_payments: Money,
    /// Base payments still owed after this payment
    pub remaining_base_payments: Money,
}

/// Lay out every payment of a deal.
///
/// All rows carry the rounded base payment except the last, which takes
/// whatever remains so the schedule sums exactly to the total of base
/// payments. Stored deals whose payment count does not match their term and
/// frequency are rejected.
pub fn payment_schedule(calc: &DealCalculation) -> LeaseDealResult<Vec<ScheduleRow>> {
    if calc.term_months == 0 || calc.term_months > MAX_TERM_MONTHS {
        return Err(LeaseDealError::InvalidInput {
            field: "term_months".into(),
            reason: format!("Lease term must be between 1 and {MAX_TERM_MONTHS} months"),
        });
    }
    let n = calc.number_of_payments;
    let expected = number_of_payments(calc.term_months, calc.payment_frequency)?;
    if n != expected {
        return Err(LeaseDealError::InvalidInput {
            field: "number_of_payments".into(),
            reason: format!(
                "{} months of {} payments is {expected} payments, not {n}",
                calc.term_months, calc.payment_frequency
            ),
        });
    }

    for (field, amount) in [
        ("base_payment", calc.base_payment),
        ("total_of_base_payments", calc.total_of_base_payments),
        ("payment_tax_rate", calc.payment_tax_rate),
    ] {
        if amount.abs() > MAX_AMOUNT {
            return Err(LeaseDealError::InvalidInput {
                field: field.into(),
                reason: format!("Amount cannot exceed {MAX_AMOUNT}"),
            });
        }
    }

    let mut rows = Vec::with_capacity(n as usize);
    let mut cumulative = Decimal::ZERO;

    for payment_number in 1..=n {
        let base_payment = if payment_number == n {
            calc.total_of_base_payments - cumulative
        } else {
            calc.base_payment
        };
        let tax = round_currency(base_payment * calc.payment_tax_rate);
        cumulative += base_payment;

        rows.push(ScheduleRow {
            payment_number,
            base_payment,
            tax,
            total_payment: base_payment + tax,
            cumulative_base_payments: cumulative,
            remaining_base_payments: calc.total_of_base_payments - cumulative,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DealConfig;
    use crate::deal::calculator::{calculate_deal, DealInput};
    use crate::frequency::PaymentFrequency;
    use crate::types::Jurisdiction;
    use rust_decimal_macros::dec;

    fn calc(frequency: PaymentFrequency) -> DealCalculation {
        let input = DealInput {
            cost_basis: dec!(10000),
            term_months: 36,
            doc_fee: Decimal::ZERO,
            jurisdiction: Jurisdiction::J1,
            payment_frequency: frequency,
            down_payment: Decimal::ZERO,
        };
        calculate_deal(&input, &DealConfig::default()).unwrap()
    }

    #[test]
    fn test_schedule_length() {
        assert_eq!(payment_schedule(&calc(PaymentFrequency::Monthly)).unwrap().len(), 36);
        assert_eq!(payment_schedule(&calc(PaymentFrequency::Weekly)).unwrap().len(), 156);
    }

    #[test]
    fn test_last_payment_absorbs_rounding() {
        let rows = payment_schedule(&calc(PaymentFrequency::Monthly)).unwrap();
        // 35 * 555.56 = 19444.60, leaving 555.40
        let last = rows.last().unwrap();
        assert_eq!(last.base_payment, dec!(555.40));
        assert_eq!(last.cumulative_base_payments, dec!(20000.00));
        assert_eq!(last.remaining_base_payments, Decimal::ZERO);
    }

    #[test]
    fn test_first_row_matches_deal() {
        let deal = calc(PaymentFrequency::Monthly);
        let first = &payment_schedule(&deal).unwrap()[0];
        assert_eq!(first.payment_number, 1);
        assert_eq!(first.base_payment, deal.base_payment);
        assert_eq!(first.tax, deal.tax_per_payment);
        assert_eq!(first.total_payment, deal.total_payment);
    }

    #[test]
    fn test_tampered_payment_count_rejected() {
        let deal = DealCalculation {
            number_of_payments: u32::MAX,
            ..calc(PaymentFrequency::Monthly)
        };
        assert!(payment_schedule(&deal).is_err());

        let deal = DealCalculation {
            term_months: u32::MAX,
            ..calc(PaymentFrequency::Monthly)
        };
        assert!(payment_schedule(&deal).is_err());
    }
}
