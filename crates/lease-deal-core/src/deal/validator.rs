//! Deal validation with corrective term suggestions.
//!
//! Each pricing threshold is checked independently, so one deal can carry
//! several errors at once. A threshold violation also runs a narrow search
//! over the standard program terms for a term the dealer can switch to.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::DealConfig;
use crate::deal::calculator::{calculate_deal, DealCalculation};
use crate::deal::optimizer::{
    evaluate_terms, valid_term_range, TermSearchInput, TermSearchMode, DISCRETE_TERMS,
};
use crate::types::TermRange;
use crate::LeaseDealResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Deal figure a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationField {
    BasePayment,
    Spread,
    Markup,
    AgreedPrice,
    ResidualValue,
    TaxRate,
}

impl std::fmt::Display for ValidationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::BasePayment => "basePayment",
            Self::Spread => "spread",
            Self::Markup => "markup",
            Self::AgreedPrice => "agreedPrice",
            Self::ResidualValue => "residualValue",
            Self::TaxRate => "taxRate",
        };
        write!(f, "{s}")
    }
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: ValidationField,
    pub message: String,
    /// Term in months that fixes this error, when one exists
    pub suggested_value: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    /// Smallest and largest standard program terms that pass every threshold
    pub valid_term_range: Option<TermRange>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Re-check a finished deal against the pricing policy.
///
/// Threshold failures are always reported. When the stored deal cannot be
/// re-priced at other terms, they come back without suggestions and without
/// a valid term range.
pub fn validate_deal(
    calc: &DealCalculation,
    config: &DealConfig,
) -> LeaseDealResult<ValidationResult> {
    let mut errors = Vec::new();

    if calc.agreed_price <= Decimal::ZERO {
        errors.push(ValidationError {
            field: ValidationField::AgreedPrice,
            message: format!("Agreed price {} must be positive", calc.agreed_price),
            suggested_value: None,
        });
    }
    if calc.residual_value <= Decimal::ZERO {
        errors.push(ValidationError {
            field: ValidationField::ResidualValue,
            message: format!("Residual value {} must be positive", calc.residual_value),
            suggested_value: None,
        });
    }

    // Without a tax rate no alternative term can be priced, so the threshold
    // checks below run without suggestions.
    let searchable = match config.tax_for(calc.jurisdiction) {
        Ok(_) => true,
        Err(e) => {
            errors.push(ValidationError {
                field: ValidationField::TaxRate,
                message: e.to_string(),
                suggested_value: None,
            });
            false
        }
    };
    let search = TermSearchInput::from(calc);

    if calc.base_payment_monthly_equivalent < config.min_base_payment {
        let suggestion = if searchable {
            suggestion_or_none(find_max_term_for_min_payment(&search, config))
        } else {
            None
        };
        errors.push(ValidationError {
            field: ValidationField::BasePayment,
            message: format!(
                "Monthly base payment {} is below the {} minimum",
                calc.base_payment_monthly_equivalent, config.min_base_payment
            ),
            suggested_value: suggestion,
        });
    }

    if calc.monthly_spread_equivalent < config.min_spread {
        let suggestion = if searchable {
            suggestion_or_none(find_min_term_for_min_spread(&search, config))
        } else {
            None
        };
        errors.push(ValidationError {
            field: ValidationField::Spread,
            message: format!(
                "Monthly spread {} is below the {} minimum",
                calc.monthly_spread_equivalent, config.min_spread
            ),
            suggested_value: suggestion,
        });
    }

    if calc.markup > config.max_markup {
        let suggestion = if searchable {
            suggestion_or_none(find_term_for_max_markup(&search, config))
        } else {
            None
        };
        errors.push(ValidationError {
            field: ValidationField::Markup,
            message: format!(
                "Markup {} exceeds the {} maximum",
                calc.markup, config.max_markup
            ),
            suggested_value: suggestion,
        });
    }

    let valid_term_range = if searchable {
        match evaluate_terms(&search, TermSearchMode::Discrete, config) {
            Ok(evaluations) => valid_term_range(&evaluations),
            Err(e) => {
                tracing::debug!(error = %e, "stored deal cannot be re-priced");
                None
            }
        }
    } else {
        None
    };

    if !errors.is_empty() {
        tracing::debug!(
            term = calc.term_months,
            errors = errors.len(),
            "deal failed validation"
        );
    }

    Ok(ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        valid_term_range,
    })
}

fn suggestion_or_none(found: LeaseDealResult<Option<u32>>) -> Option<u32> {
    found.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "no corrective term, stored deal cannot be re-priced");
        None
    })
}

/// Longest standard term whose monthly base payment still meets the minimum.
pub fn find_max_term_for_min_payment(
    input: &TermSearchInput,
    config: &DealConfig,
) -> LeaseDealResult<Option<u32>> {
    for &term in DISCRETE_TERMS.iter().rev() {
        let calc = calculate_deal(&input.at_term(term), config)?;
        if calc.base_payment_monthly_equivalent >= config.min_base_payment {
            return Ok(Some(term));
        }
    }
    Ok(None)
}

/// Shortest standard term whose monthly spread meets the minimum.
pub fn find_min_term_for_min_spread(
    input: &TermSearchInput,
    config: &DealConfig,
) -> LeaseDealResult<Option<u32>> {
    for term in DISCRETE_TERMS {
        let calc = calculate_deal(&input.at_term(term), config)?;
        if calc.monthly_spread_equivalent >= config.min_spread {
            return Ok(Some(term));
        }
    }
    Ok(None)
}

/// Shortest standard term whose markup stays within the maximum.
pub fn find_term_for_max_markup(
    input: &TermSearchInput,
    config: &DealConfig,
) -> LeaseDealResult<Option<u32>> {
    for term in DISCRETE_TERMS {
        let calc = calculate_deal(&input.at_term(term), config)?;
        if calc.markup <= config.max_markup {
            return Ok(Some(term));
        }
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::calculator::DealInput;
    use crate::frequency::PaymentFrequency;
    use crate::types::Jurisdiction;
    use rust_decimal_macros::dec;

    fn deal(cost_basis: Decimal, term_months: u32) -> DealCalculation {
        let input = DealInput {
            cost_basis,
            term_months,
            doc_fee: Decimal::ZERO,
            jurisdiction: Jurisdiction::J1,
            payment_frequency: PaymentFrequency::Monthly,
            down_payment: Decimal::ZERO,
        };
        calculate_deal(&input, &DealConfig::default()).unwrap()
    }

    fn fields(result: &ValidationResult) -> Vec<ValidationField> {
        result.errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_valid_deal() {
        let result = validate_deal(&deal(dec!(10000), 36), &DealConfig::default()).unwrap();
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
        assert!(result.errors.is_empty());
        // 12 fails markup, 72 fails spread
        assert_eq!(result.valid_term_range, Some(TermRange { min: 24, max: 60 }));
    }

    #[test]
    fn test_markup_too_high_suggests_longer_term() {
        // 12 months prices the car at 16216.22, a 6216.22 markup
        let result = validate_deal(&deal(dec!(10000), 12), &DealConfig::default()).unwrap();
        assert!(!result.is_valid);
        assert_eq!(fields(&result), vec![ValidationField::Markup]);
        assert_eq!(result.errors[0].suggested_value, Some(24));
    }

    #[test]
    fn test_low_payment_suggests_shorter_term() {
        // 2000 cost basis over 36 months pays 111.11
        let result = validate_deal(&deal(dec!(2000), 36), &DealConfig::default()).unwrap();
        let payment_error = result
            .errors
            .iter()
            .find(|e| e.field == ValidationField::BasePayment)
            .unwrap();
        assert_eq!(payment_error.suggested_value, Some(12));
    }

    #[test]
    fn test_multiple_errors_reported_together() {
        let config = DealConfig {
            min_base_payment: dec!(10_000),
            max_markup: dec!(-100_000),
            ..DealConfig::default()
        };
        let result = validate_deal(&deal(dec!(10000), 36), &config).unwrap();
        let found = fields(&result);
        assert!(found.contains(&ValidationField::BasePayment));
        assert!(found.contains(&ValidationField::Markup));
        assert!(result.valid_term_range.is_none());
    }

    #[test]
    fn test_spread_violation_has_no_suggestion_when_unreachable() {
        let config = DealConfig {
            min_spread: dec!(1_000_000),
            ..DealConfig::default()
        };
        let result = validate_deal(&deal(dec!(10000), 36), &config).unwrap();
        let spread_error = result
            .errors
            .iter()
            .find(|e| e.field == ValidationField::Spread)
            .unwrap();
        assert_eq!(spread_error.suggested_value, None);
    }

    #[test]
    fn test_unresolvable_tax_rate() {
        let calc = deal(dec!(10000), 36);
        let mut config = DealConfig::default();
        config.tax_table.remove(&Jurisdiction::J1);
        let result = validate_deal(&calc, &config).unwrap();
        assert!(fields(&result).contains(&ValidationField::TaxRate));
        assert!(result.valid_term_range.is_none());
    }

    #[test]
    fn test_field_display() {
        assert_eq!(ValidationField::BasePayment.to_string(), "basePayment");
        assert_eq!(
            serde_json::to_value(ValidationField::BasePayment).unwrap(),
            serde_json::json!("basePayment")
        );
    }
}
