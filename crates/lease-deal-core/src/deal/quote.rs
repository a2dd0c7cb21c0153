use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::DealConfig;
use crate::deal::calculator::{calculate_deal, DealCalculation, DealInput};
use crate::deal::optimizer::{
    calculate_optimal_term, OptimalTermResult, TermSearchInput, TermSearchMode,
};
use crate::deal::validator::{validate_deal, ValidationResult};
use crate::frequency::PaymentFrequency;
use crate::types::{with_metadata, ComputationOutput, Jurisdiction, Money};
use crate::LeaseDealResult;

/// Deal form as the dealer fills it in; the term may still be blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub cost_basis: Money,
    /// Chosen by the term optimizer when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_months: Option<u32>,
    pub doc_fee: Money,
    pub jurisdiction: Jurisdiction,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    #[serde(default)]
    pub down_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealQuote {
    pub calculation: DealCalculation,
    pub validation: ValidationResult,
    /// Present when the term was chosen by the optimizer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimal_term: Option<OptimalTermResult>,
}

/// Price a deal form end to end: pick a term if none was given, calculate
/// the deal, then validate it. Validation failures come back as warnings
/// alongside the full deal.
pub fn quote_deal(
    request: &QuoteRequest,
    config: &DealConfig,
) -> LeaseDealResult<ComputationOutput<DealQuote>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    config.validate()?;

    let (term_months, optimal_term) = match request.term_months {
        Some(term) => (term, None),
        None => {
            let search = TermSearchInput {
                cost_basis: request.cost_basis,
                doc_fee: request.doc_fee,
                jurisdiction: request.jurisdiction,
                payment_frequency: request.payment_frequency,
                down_payment: None,
            };
            let optimal = calculate_optimal_term(&search, TermSearchMode::Continuous, config)?;
            if !optimal.is_valid {
                warnings.push(format!(
                    "No term between 1 and 48 months meets every pricing threshold; \
                     showing {} months, the closest to the target spread.",
                    optimal.term
                ));
            }
            (optimal.term, Some(optimal))
        }
    };

    let input = DealInput {
        cost_basis: request.cost_basis,
        term_months,
        doc_fee: request.doc_fee,
        jurisdiction: request.jurisdiction,
        payment_frequency: request.payment_frequency,
        down_payment: request.down_payment,
    };
    let calculation = calculate_deal(&input, config)?;
    let validation = validate_deal(&calculation, config)?;

    for error in &validation.errors {
        match error.suggested_value {
            Some(term) => warnings.push(format!("{} (try {} months)", error.message, term)),
            None => warnings.push(error.message.clone()),
        }
    }

    if calculation.down_payment > Decimal::ZERO
        && calculation.down_payment >= calculation.gross_cap_cost
    {
        warnings.push("Down payment covers the entire capitalized cost.".into());
    }

    let term_source = if optimal_term.is_some() {
        "continuous search over 1-48 months"
    } else {
        "supplied"
    };
    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "money_factor": config.money_factor.to_string(),
        "money_factor_basis": "monthly regardless of payment frequency",
        "residual_percent": config.residual_percent.to_string(),
        "investor_annual_rate": config.investor_annual_rate.to_string(),
        "recovery_multiple": config.recovery_multiple.to_string(),
        "rounding": "half-up to cents at every step",
        "term": term_source,
    });

    Ok(with_metadata(
        "Closed-end lease, price derived from cost basis by money-factor identity",
        &assumptions,
        warnings,
        elapsed,
        DealQuote {
            calculation,
            validation,
            optimal_term,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(term_months: Option<u32>) -> QuoteRequest {
        QuoteRequest {
            cost_basis: dec!(10000),
            term_months,
            doc_fee: Decimal::ZERO,
            jurisdiction: Jurisdiction::J1,
            payment_frequency: PaymentFrequency::Monthly,
            down_payment: Decimal::ZERO,
        }
    }

    #[test]
    fn test_quote_with_term() {
        let out = quote_deal(&request(Some(36)), &DealConfig::default()).unwrap();
        assert!(out.result.optimal_term.is_none());
        assert_eq!(out.result.calculation.term_months, 36);
        assert!(out.result.validation.is_valid);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_quote_picks_term() {
        let out = quote_deal(&request(None), &DealConfig::default()).unwrap();
        let optimal = out.result.optimal_term.unwrap();
        assert!(optimal.is_valid);
        assert_eq!(out.result.calculation.term_months, optimal.term);
    }

    #[test]
    fn test_down_payment_does_not_move_chosen_term() {
        let request = QuoteRequest {
            down_payment: dec!(3000),
            ..request(None)
        };
        let out = quote_deal(&request, &DealConfig::default()).unwrap();
        let optimal = out.result.optimal_term.unwrap();
        assert_eq!(optimal.term, 39);
        assert_eq!(optimal.spread, dec!(201.90));
        assert_eq!(out.result.calculation.down_payment, dec!(3000));
    }

    #[test]
    fn test_quote_warns_on_invalid_deal() {
        let out = quote_deal(&request(Some(12)), &DealConfig::default()).unwrap();
        assert!(!out.result.validation.is_valid);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("try 24 months"));
    }

    #[test]
    fn test_quote_rejects_bad_config() {
        let config = DealConfig {
            residual_percent: dec!(1.5),
            ..DealConfig::default()
        };
        assert!(quote_deal(&request(Some(36)), &config).is_err());
    }
}
