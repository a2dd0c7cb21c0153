//! Lease term search.
//!
//! Every candidate term is priced in full as a deal with no down payment and
//! checked against the spread, markup and payment thresholds. The validity predicate is not monotonic in
//! the term, so candidates are scanned exhaustively.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::DealConfig;
use crate::deal::calculator::{calculate_deal, DealCalculation, DealInput};
use crate::error::LeaseDealError;
use crate::frequency::PaymentFrequency;
use crate::types::{Jurisdiction, Money, TermRange};
use crate::LeaseDealResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MIN_CONTINUOUS_TERM: u32 = 1;
pub const MAX_CONTINUOUS_TERM: u32 = 48;
pub const DISCRETE_TERMS: [u32; 6] = [12, 24, 36, 48, 60, 72];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which terms a search considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TermSearchMode {
    /// Every month from 1 to 48
    #[default]
    Continuous,
    /// The standard program terms 12, 24, 36, 48, 60 and 72
    Discrete,
}

impl TermSearchMode {
    /// Candidate terms in ascending order.
    pub fn candidates(self) -> Vec<u32> {
        match self {
            Self::Continuous => (MIN_CONTINUOUS_TERM..=MAX_CONTINUOUS_TERM).collect(),
            Self::Discrete => DISCRETE_TERMS.to_vec(),
        }
    }

    pub fn allows(self, term_months: u32) -> bool {
        match self {
            Self::Continuous => (MIN_CONTINUOUS_TERM..=MAX_CONTINUOUS_TERM).contains(&term_months),
            Self::Discrete => DISCRETE_TERMS.contains(&term_months),
        }
    }
}

impl std::str::FromStr for TermSearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "continuous" => Ok(Self::Continuous),
            "discrete" => Ok(Self::Discrete),
            other => Err(format!(
                "Unknown search mode '{other}'. Use: continuous, discrete"
            )),
        }
    }
}

/// Deal inputs with the term left open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSearchInput {
    pub cost_basis: Money,
    pub doc_fee: Money,
    pub jurisdiction: Jurisdiction,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    /// Cash down for the remediation searches; candidate pricing in
    /// [`evaluate_terms`] always assumes none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<Money>,
}

impl TermSearchInput {
    /// Full deal inputs at a given term.
    pub fn at_term(&self, term_months: u32) -> DealInput {
        DealInput {
            cost_basis: self.cost_basis,
            term_months,
            doc_fee: self.doc_fee,
            jurisdiction: self.jurisdiction,
            payment_frequency: self.payment_frequency,
            down_payment: self.down_payment.unwrap_or(Decimal::ZERO),
        }
    }
}

impl From<&DealCalculation> for TermSearchInput {
    fn from(calc: &DealCalculation) -> Self {
        Self {
            cost_basis: calc.cost_basis,
            doc_fee: calc.doc_fee,
            jurisdiction: calc.jurisdiction,
            payment_frequency: calc.payment_frequency,
            down_payment: Some(calc.down_payment),
        }
    }
}

/// Threshold figures for one candidate term, all on a monthly basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEvaluation {
    pub term_months: u32,
    pub monthly_spread: Money,
    pub markup: Money,
    pub monthly_base_payment: Money,
    pub is_valid: bool,
}

/// Term chosen by the optimizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimalTermResult {
    pub term: u32,
    /// False when no candidate met every threshold and the nearest was used
    pub is_valid: bool,
    /// Monthly-equivalent spread at the chosen term
    pub spread: Money,
    pub markup: Money,
    /// Monthly-equivalent base payment at the chosen term
    pub base_payment: Money,
    /// Smallest and largest valid candidate terms
    pub valid_range: Option<TermRange>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// True when a deal's monthly figures satisfy every pricing threshold.
pub fn meets_constraints(
    monthly_spread: Money,
    markup: Money,
    monthly_base_payment: Money,
    config: &DealConfig,
) -> bool {
    monthly_spread >= config.min_spread
        && markup <= config.max_markup
        && monthly_base_payment >= config.min_base_payment
}

/// Price every candidate term of `mode` with no down payment, in ascending
/// term order.
pub fn evaluate_terms(
    input: &TermSearchInput,
    mode: TermSearchMode,
    config: &DealConfig,
) -> LeaseDealResult<Vec<TermEvaluation>> {
    let no_down = TermSearchInput {
        down_payment: None,
        ..input.clone()
    };
    mode.candidates()
        .into_iter()
        .map(|term| {
            let calc = calculate_deal(&no_down.at_term(term), config)?;
            Ok(TermEvaluation {
                term_months: term,
                monthly_spread: calc.monthly_spread_equivalent,
                markup: calc.markup,
                monthly_base_payment: calc.base_payment_monthly_equivalent,
                is_valid: meets_constraints(
                    calc.monthly_spread_equivalent,
                    calc.markup,
                    calc.base_payment_monthly_equivalent,
                    config,
                ),
            })
        })
        .collect()
}

/// Envelope of the valid terms among `evaluations`.
pub fn valid_term_range(evaluations: &[TermEvaluation]) -> Option<TermRange> {
    let mut valid = evaluations.iter().filter(|e| e.is_valid).map(|e| e.term_months);
    let first = valid.next()?;
    let (min, max) = valid.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
    Some(TermRange { min, max })
}

/// Pick the term whose monthly spread is closest to the target spread.
///
/// Only valid terms compete; ties go to the shorter term. When no term is
/// valid, the closest term overall is returned with `is_valid = false` so the
/// caller can still show a deal and explain what is wrong with it.
pub fn calculate_optimal_term(
    input: &TermSearchInput,
    mode: TermSearchMode,
    config: &DealConfig,
) -> LeaseDealResult<OptimalTermResult> {
    let evaluations = evaluate_terms(input, mode, config)?;
    let valid_range = valid_term_range(&evaluations);

    let best_valid = closest_to_target(evaluations.iter().filter(|e| e.is_valid), config);
    let (chosen, is_valid) = match best_valid {
        Some(e) => (e, true),
        None => {
            tracing::debug!(
                cost_basis = %input.cost_basis,
                ?mode,
                "no term satisfies pricing thresholds, falling back to nearest spread"
            );
            let nearest = closest_to_target(evaluations.iter(), config).ok_or_else(|| {
                LeaseDealError::InvalidInput {
                    field: "mode".into(),
                    reason: "Search mode has no candidate terms".into(),
                }
            })?;
            (nearest, false)
        }
    };

    tracing::debug!(
        term = chosen.term_months,
        is_valid,
        monthly_spread = %chosen.monthly_spread,
        "selected lease term"
    );

    Ok(OptimalTermResult {
        term: chosen.term_months,
        is_valid,
        spread: chosen.monthly_spread,
        markup: chosen.markup,
        base_payment: chosen.monthly_base_payment,
        valid_range,
    })
}

fn closest_to_target<'a>(
    evaluations: impl Iterator<Item = &'a TermEvaluation>,
    config: &DealConfig,
) -> Option<&'a TermEvaluation> {
    let mut best: Option<(&TermEvaluation, Money)> = None;
    for e in evaluations {
        let distance = (e.monthly_spread - config.target_spread).abs();
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((e, distance)),
        }
    }
    best.map(|(e, _)| e)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ten_thousand_basis() -> TermSearchInput {
        TermSearchInput {
            cost_basis: dec!(10000),
            doc_fee: Decimal::ZERO,
            jurisdiction: Jurisdiction::J1,
            payment_frequency: PaymentFrequency::Monthly,
            down_payment: None,
        }
    }

    #[test]
    fn test_candidates() {
        assert_eq!(TermSearchMode::Continuous.candidates().len(), 48);
        assert_eq!(TermSearchMode::Continuous.candidates()[0], 1);
        assert_eq!(
            TermSearchMode::Discrete.candidates(),
            vec![12, 24, 36, 48, 60, 72]
        );
    }

    #[test]
    fn test_evaluations_ascending() {
        let evals =
            evaluate_terms(&ten_thousand_basis(), TermSearchMode::Discrete, &DealConfig::default())
                .unwrap();
        let terms: Vec<u32> = evals.iter().map(|e| e.term_months).collect();
        assert_eq!(terms, vec![12, 24, 36, 48, 60, 72]);
    }

    #[test]
    fn test_optimal_term_is_valid_and_in_range() {
        let config = DealConfig::default();
        let result =
            calculate_optimal_term(&ten_thousand_basis(), TermSearchMode::Continuous, &config)
                .unwrap();
        assert!(result.is_valid);
        assert!(TermSearchMode::Continuous.allows(result.term));
        assert!(result.spread >= config.min_spread);
        assert!(result.markup <= config.max_markup);
        let range = result.valid_range.unwrap();
        assert!(range.contains(result.term));
    }

    #[test]
    fn test_optimal_term_closest_to_target() {
        let config = DealConfig::default();
        let input = ten_thousand_basis();
        let result = calculate_optimal_term(&input, TermSearchMode::Continuous, &config).unwrap();
        let evals = evaluate_terms(&input, TermSearchMode::Continuous, &config).unwrap();
        let best_distance = (result.spread - config.target_spread).abs();
        for e in evals.iter().filter(|e| e.is_valid) {
            assert!((e.monthly_spread - config.target_spread).abs() >= best_distance);
        }
    }

    #[test]
    fn test_fallback_when_nothing_valid() {
        let config = DealConfig {
            min_spread: dec!(1_000_000),
            ..DealConfig::default()
        };
        let result =
            calculate_optimal_term(&ten_thousand_basis(), TermSearchMode::Discrete, &config)
                .unwrap();
        assert!(!result.is_valid);
        assert!(result.valid_range.is_none());
        assert!(DISCRETE_TERMS.contains(&result.term));
    }

    #[test]
    fn test_valid_term_range_envelope() {
        let evals = vec![
            TermEvaluation {
                term_months: 12,
                monthly_spread: dec!(10),
                markup: dec!(0),
                monthly_base_payment: dec!(500),
                is_valid: false,
            },
            TermEvaluation {
                term_months: 24,
                monthly_spread: dec!(300),
                markup: dec!(0),
                monthly_base_payment: dec!(500),
                is_valid: true,
            },
            TermEvaluation {
                term_months: 36,
                monthly_spread: dec!(10),
                markup: dec!(0),
                monthly_base_payment: dec!(500),
                is_valid: false,
            },
            TermEvaluation {
                term_months: 48,
                monthly_spread: dec!(300),
                markup: dec!(0),
                monthly_base_payment: dec!(500),
                is_valid: true,
            },
        ];
        assert_eq!(
            valid_term_range(&evals),
            Some(TermRange { min: 24, max: 48 })
        );
    }

    #[test]
    fn test_tie_goes_to_shorter_term() {
        let config = DealConfig::default();
        let evals = vec![
            TermEvaluation {
                term_months: 24,
                monthly_spread: dec!(250),
                markup: dec!(0),
                monthly_base_payment: dec!(500),
                is_valid: true,
            },
            TermEvaluation {
                term_months: 36,
                monthly_spread: dec!(150),
                markup: dec!(0),
                monthly_base_payment: dec!(500),
                is_valid: true,
            },
        ];
        let best = closest_to_target(evals.iter(), &config).unwrap();
        assert_eq!(best.term_months, 24);
    }

    #[test]
    fn test_candidates_priced_without_down_payment() {
        let config = DealConfig::default();
        let with_down = TermSearchInput {
            down_payment: Some(dec!(3000)),
            ..ten_thousand_basis()
        };
        assert_eq!(
            evaluate_terms(&with_down, TermSearchMode::Continuous, &config).unwrap(),
            evaluate_terms(&ten_thousand_basis(), TermSearchMode::Continuous, &config).unwrap()
        );
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(
            "discrete".parse::<TermSearchMode>().unwrap(),
            TermSearchMode::Discrete
        );
        assert!("binary".parse::<TermSearchMode>().is_err());
    }
}
