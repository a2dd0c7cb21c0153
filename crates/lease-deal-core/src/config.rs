//! Pricing policy for the deal engine.
//!
//! Every constant the calculator, optimizer and validator depend on lives in
//! [`DealConfig`], so a policy or jurisdiction change is a configuration
//! change rather than an edit to the calculation code.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LeaseDealError;
use crate::types::{Jurisdiction, Money, Rate};
use crate::LeaseDealResult;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Monthly money factor. 1/36 truncated to eight places.
pub const DEFAULT_MONEY_FACTOR: Decimal = dec!(0.02777777);
pub const DEFAULT_RESIDUAL_PERCENT: Rate = dec!(0.15);
pub const DEFAULT_INVESTOR_ANNUAL_RATE: Rate = dec!(0.12);
pub const DEFAULT_RECOVERY_MULTIPLE: Decimal = dec!(2);
pub const DEFAULT_MIN_SPREAD: Money = dec!(100);
pub const DEFAULT_TARGET_SPREAD: Money = dec!(200);
pub const DEFAULT_MAX_MARKUP: Money = dec!(5000);
pub const DEFAULT_MIN_BASE_PAYMENT: Money = dec!(200);
pub const DEFAULT_PURCHASE_OPTION_FEE: Money = dec!(300);
pub const DEFAULT_DEALER_DOWN_PAYMENT_SHARE: Rate = dec!(0.50);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Tax rates applied in one jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionTax {
    /// Use tax charged on every base payment
    pub payment_tax_rate: Rate,
    /// Sales tax charged once on the agreed price and capitalized
    pub upfront_tax_rate: Rate,
}

/// Named pricing policy consumed by every engine entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealConfig {
    /// Monthly money factor, applied monthly whatever the payment cadence
    pub money_factor: Decimal,
    /// Residual value as a fraction of agreed price
    pub residual_percent: Rate,
    /// Annual rate of the investor amortization on the cost basis
    pub investor_annual_rate: Rate,
    /// Total of base payments targeted as a multiple of cost basis
    pub recovery_multiple: Decimal,
    /// Minimum monthly-equivalent spread
    pub min_spread: Money,
    /// Monthly-equivalent spread the term optimizer steers toward
    pub target_spread: Money,
    /// Maximum agreed price over cost basis
    pub max_markup: Money,
    /// Minimum monthly-equivalent base payment
    pub min_base_payment: Money,
    /// Flat fee added to the residual to form the purchase option price
    pub purchase_option_fee: Money,
    /// Fraction of the down payment retained by the dealer
    pub dealer_down_payment_share: Rate,
    /// Tax rates per jurisdiction
    pub tax_table: BTreeMap<Jurisdiction, JurisdictionTax>,
}

impl Default for DealConfig {
    fn default() -> Self {
        let mut tax_table = BTreeMap::new();
        tax_table.insert(
            Jurisdiction::J1,
            JurisdictionTax {
                payment_tax_rate: dec!(0.095),
                upfront_tax_rate: Decimal::ZERO,
            },
        );
        tax_table.insert(
            Jurisdiction::J2,
            JurisdictionTax {
                payment_tax_rate: Decimal::ZERO,
                upfront_tax_rate: dec!(0.0625),
            },
        );

        Self {
            money_factor: DEFAULT_MONEY_FACTOR,
            residual_percent: DEFAULT_RESIDUAL_PERCENT,
            investor_annual_rate: DEFAULT_INVESTOR_ANNUAL_RATE,
            recovery_multiple: DEFAULT_RECOVERY_MULTIPLE,
            min_spread: DEFAULT_MIN_SPREAD,
            target_spread: DEFAULT_TARGET_SPREAD,
            max_markup: DEFAULT_MAX_MARKUP,
            min_base_payment: DEFAULT_MIN_BASE_PAYMENT,
            purchase_option_fee: DEFAULT_PURCHASE_OPTION_FEE,
            dealer_down_payment_share: DEFAULT_DEALER_DOWN_PAYMENT_SHARE,
            tax_table,
        }
    }
}

impl DealConfig {
    /// Resolve the tax rates for a jurisdiction.
    pub fn tax_for(&self, jurisdiction: Jurisdiction) -> LeaseDealResult<JurisdictionTax> {
        self.tax_table
            .get(&jurisdiction)
            .copied()
            .ok_or_else(|| LeaseDealError::UnknownJurisdiction(jurisdiction.to_string()))
    }

    /// Reject policies the engine cannot price with.
    pub fn validate(&self) -> LeaseDealResult<()> {
        if self.money_factor < Decimal::ZERO {
            return Err(invalid("money_factor", "Money factor cannot be negative"));
        }
        if self.residual_percent < Decimal::ZERO || self.residual_percent >= Decimal::ONE {
            return Err(invalid(
                "residual_percent",
                "Residual percent must be in [0, 1)",
            ));
        }
        if self.investor_annual_rate < Decimal::ZERO {
            return Err(invalid(
                "investor_annual_rate",
                "Investor rate cannot be negative",
            ));
        }
        if self.recovery_multiple <= Decimal::ZERO {
            return Err(invalid(
                "recovery_multiple",
                "Recovery multiple must be positive",
            ));
        }
        if self.dealer_down_payment_share < Decimal::ZERO
            || self.dealer_down_payment_share > Decimal::ONE
        {
            return Err(invalid(
                "dealer_down_payment_share",
                "Dealer share must be in [0, 1]",
            ));
        }
        for (field, value) in [
            ("min_spread", self.min_spread),
            ("max_markup", self.max_markup),
            ("min_base_payment", self.min_base_payment),
            ("purchase_option_fee", self.purchase_option_fee),
        ] {
            if value < Decimal::ZERO {
                return Err(invalid(field, "Threshold cannot be negative"));
            }
        }
        for (jurisdiction, tax) in &self.tax_table {
            if tax.payment_tax_rate < Decimal::ZERO || tax.upfront_tax_rate < Decimal::ZERO {
                return Err(invalid(
                    "tax_table",
                    &format!("Tax rates for {jurisdiction} cannot be negative"),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> LeaseDealError {
    LeaseDealError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DealConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_tax_table() {
        let config = DealConfig::default();
        let j1 = config.tax_for(Jurisdiction::J1).unwrap();
        assert_eq!(j1.payment_tax_rate, dec!(0.095));
        assert_eq!(j1.upfront_tax_rate, Decimal::ZERO);
        let j2 = config.tax_for(Jurisdiction::J2).unwrap();
        assert_eq!(j2.upfront_tax_rate, dec!(0.0625));
    }

    #[test]
    fn test_missing_jurisdiction() {
        let mut config = DealConfig::default();
        config.tax_table.remove(&Jurisdiction::J2);
        match config.tax_for(Jurisdiction::J2).unwrap_err() {
            LeaseDealError::UnknownJurisdiction(j) => assert_eq!(j, "J2"),
            other => panic!("Expected UnknownJurisdiction, got {other:?}"),
        }
    }

    #[test]
    fn test_residual_percent_out_of_range() {
        let config = DealConfig {
            residual_percent: dec!(1),
            ..DealConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_override_from_json() {
        let config: DealConfig =
            serde_json::from_str(r#"{"max_markup": "7500", "min_spread": "150"}"#).unwrap();
        assert_eq!(config.max_markup, dec!(7500));
        assert_eq!(config.min_spread, dec!(150));
        assert_eq!(config.money_factor, DEFAULT_MONEY_FACTOR);
        assert_eq!(config.tax_table.len(), 2);
    }
}
