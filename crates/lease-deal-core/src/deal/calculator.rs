//! Closed-end lease deal calculation.
//!
//! Derives the agreed price from the lender's cost basis, then walks the
//! standard lease worksheet: residual, capitalized cost, depreciation, rent
//! charge, base and total payment, investor payment, spread and the amounts
//! due at signing. Every currency step is rounded to cents before it feeds
//! the next one, so results match contract worksheets to the cent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::amortized_payment;
use crate::config::DealConfig;
use crate::error::LeaseDealError;
use crate::frequency::{number_of_payments, to_monthly_equivalent, PaymentFrequency};
use crate::pricing::agreed_price_from_cost_basis;
use crate::types::{checked_product, checked_quotient, round_currency, Jurisdiction, Money, Rate};
use crate::LeaseDealResult;

/// Longest lease term accepted, in months.
pub const MAX_TERM_MONTHS: u32 = 600;

/// Largest cost basis, fee or down payment accepted.
pub const MAX_AMOUNT: Money = rust_decimal_macros::dec!(1_000_000_000_000);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Form inputs for one deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealInput {
    /// Lender's acquisition cost for the vehicle (ACV)
    pub cost_basis: Money,
    /// Lease term in months
    pub term_months: u32,
    /// Documentation fee, capitalized and also collected at signing
    pub doc_fee: Money,
    /// Jurisdiction whose tax rules apply
    pub jurisdiction: Jurisdiction,
    /// Payment cadence
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    /// Cash down, applied as capitalized-cost reduction
    #[serde(default)]
    pub down_payment: Money,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Every intermediate and final figure of a deal.
///
/// Produced fresh by [`calculate_deal`] for each input. Field names and units
/// (money in currency, rates as fractions) are read by persistence and
/// contract generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealCalculation {
    pub cost_basis: Money,
    pub term_months: u32,
    pub doc_fee: Money,
    pub jurisdiction: Jurisdiction,
    pub payment_frequency: PaymentFrequency,
    pub down_payment: Money,

    /// Customer-facing vehicle price
    pub agreed_price: Money,
    /// Assumed value at lease end
    pub residual_value: Money,
    /// Upfront sales tax on the agreed price, capitalized
    pub sales_tax_on_price: Money,
    pub gross_cap_cost: Money,
    pub cap_cost_reduction: Money,
    pub adjusted_cap_cost: Money,
    pub depreciation: Money,
    pub rent_charge: Money,
    pub total_of_base_payments: Money,
    pub number_of_payments: u32,
    pub base_payment: Money,
    pub base_payment_monthly_equivalent: Money,
    /// Tax rate charged on each payment
    pub payment_tax_rate: Rate,
    pub tax_per_payment: Money,
    pub total_payment: Money,
    /// Level payment amortizing the cost basis at the investor rate
    pub investor_payment: Money,
    /// Base payment less investor payment, per payment
    pub spread: Money,
    pub monthly_spread_equivalent: Money,
    /// Agreed price less cost basis
    pub markup: Money,
    pub amount_due_at_signing: Money,
    pub purchase_option_price: Money,
    pub down_payment_dealer_portion: Money,
    pub down_payment_investor_portion: Money,

    pub money_factor: Decimal,
    pub residual_percent: Rate,
}

impl DealCalculation {
    /// Form inputs this calculation was produced from.
    pub fn deal_input(&self) -> DealInput {
        DealInput {
            cost_basis: self.cost_basis,
            term_months: self.term_months,
            doc_fee: self.doc_fee,
            jurisdiction: self.jurisdiction,
            payment_frequency: self.payment_frequency,
            down_payment: self.down_payment,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Calculate a complete deal for the given inputs and pricing policy.
pub fn calculate_deal(input: &DealInput, config: &DealConfig) -> LeaseDealResult<DealCalculation> {
    validate_input(input)?;
    let tax = config.tax_for(input.jurisdiction)?;
    let frequency = input.payment_frequency;
    let term = Decimal::from(input.term_months);

    // Form amounts enter at cents like everything derived from them
    let cost_basis = round_currency(input.cost_basis);
    let doc_fee = round_currency(input.doc_fee);
    let down_payment = round_currency(input.down_payment);

    // -- Price and residual ----------------------------------------------------
    let agreed_price = agreed_price_from_cost_basis(cost_basis, input.term_months, config)?;
    let residual_value = round_currency(checked_product(
        config.residual_percent,
        agreed_price,
        "residual value",
    )?);

    // -- Capitalized cost --------------------------------------------------------
    let sales_tax_on_price = round_currency(checked_product(
        agreed_price,
        tax.upfront_tax_rate,
        "sales tax on price",
    )?);
    let gross_cap_cost = agreed_price + doc_fee + sales_tax_on_price;
    let cap_cost_reduction = down_payment;
    let adjusted_cap_cost = gross_cap_cost - cap_cost_reduction;

    // -- Depreciation and rent ----------------------------------------------------
    let depreciation = adjusted_cap_cost - residual_value;
    let rent_base = checked_product(
        adjusted_cap_cost + residual_value,
        config.money_factor,
        "rent charge",
    )?;
    let rent_charge = round_currency(checked_product(rent_base, term, "rent charge")?);
    let total_of_base_payments = depreciation + rent_charge;

    // -- Payments --------------------------------------------------------------
    let n = number_of_payments(input.term_months, frequency)?;
    if n == 0 {
        return Err(LeaseDealError::InvalidInput {
            field: "term_months".into(),
            reason: format!(
                "Term of {} months yields no {} payments",
                input.term_months, frequency
            ),
        });
    }
    let base_payment = round_currency(checked_quotient(
        total_of_base_payments,
        Decimal::from(n),
        "base payment",
    )?);
    let base_payment_monthly_equivalent = to_monthly_equivalent(base_payment, frequency)?;
    let tax_per_payment = round_currency(checked_product(
        base_payment,
        tax.payment_tax_rate,
        "tax per payment",
    )?);
    let total_payment = base_payment + tax_per_payment;

    // -- Investor economics ------------------------------------------------------
    let investor_payment = round_currency(amortized_payment(
        cost_basis,
        config.investor_annual_rate,
        n,
        frequency.payments_per_year(),
    )?);
    let spread = base_payment - investor_payment;
    let monthly_spread_equivalent = to_monthly_equivalent(spread, frequency)?;
    let markup = agreed_price - cost_basis;

    // -- Signing and lease end ---------------------------------------------------
    let amount_due_at_signing = down_payment + total_payment + doc_fee;
    let purchase_option_price = residual_value + config.purchase_option_fee;
    let down_payment_dealer_portion = round_currency(checked_product(
        down_payment,
        config.dealer_down_payment_share,
        "dealer down payment portion",
    )?);
    let down_payment_investor_portion = down_payment - down_payment_dealer_portion;

    Ok(DealCalculation {
        cost_basis,
        term_months: input.term_months,
        doc_fee,
        jurisdiction: input.jurisdiction,
        payment_frequency: frequency,
        down_payment,
        agreed_price,
        residual_value,
        sales_tax_on_price,
        gross_cap_cost,
        cap_cost_reduction,
        adjusted_cap_cost,
        depreciation,
        rent_charge,
        total_of_base_payments,
        number_of_payments: n,
        base_payment,
        base_payment_monthly_equivalent,
        payment_tax_rate: tax.payment_tax_rate,
        tax_per_payment,
        total_payment,
        investor_payment,
        spread,
        monthly_spread_equivalent,
        markup,
        amount_due_at_signing,
        purchase_option_price,
        down_payment_dealer_portion,
        down_payment_investor_portion,
        money_factor: config.money_factor,
        residual_percent: config.residual_percent,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &DealInput) -> LeaseDealResult<()> {
    if input.cost_basis <= Decimal::ZERO {
        return Err(LeaseDealError::InvalidInput {
            field: "cost_basis".into(),
            reason: "Cost basis must be positive".into(),
        });
    }
    if input.term_months == 0 {
        return Err(LeaseDealError::InvalidInput {
            field: "term_months".into(),
            reason: "Lease term must be greater than zero".into(),
        });
    }
    if input.term_months > MAX_TERM_MONTHS {
        return Err(LeaseDealError::InvalidInput {
            field: "term_months".into(),
            reason: format!("Lease term cannot exceed {MAX_TERM_MONTHS} months"),
        });
    }
    for (field, amount) in [
        ("cost_basis", input.cost_basis),
        ("doc_fee", input.doc_fee),
        ("down_payment", input.down_payment),
    ] {
        if amount > MAX_AMOUNT {
            return Err(LeaseDealError::InvalidInput {
                field: field.into(),
                reason: format!("Amount cannot exceed {MAX_AMOUNT}"),
            });
        }
    }
    if input.doc_fee < Decimal::ZERO {
        return Err(LeaseDealError::InvalidInput {
            field: "doc_fee".into(),
            reason: "Documentation fee cannot be negative".into(),
        });
    }
    if input.down_payment < Decimal::ZERO {
        return Err(LeaseDealError::InvalidInput {
            field: "down_payment".into(),
            reason: "Down payment cannot be negative".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
