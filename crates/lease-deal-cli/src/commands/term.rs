use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use lease_deal_core::deal::optimizer::{evaluate_terms, TermEvaluation};
use lease_deal_core::{
    calculate_optimal_term, DealConfig, Jurisdiction, OptimalTermResult, PaymentFrequency,
    TermSearchInput, TermSearchMode,
};

use crate::input;

/// Arguments for the lease term search
#[derive(Args)]
pub struct OptimalTermArgs {
    /// Path to JSON input file (used when --cost-basis is not given)
    #[arg(long)]
    pub input: Option<String>,

    /// Lender cost basis (ACV) of the vehicle
    #[arg(long)]
    pub cost_basis: Option<Decimal>,

    /// Documentation fee
    #[arg(long, default_value = "0")]
    pub doc_fee: Decimal,

    /// Tax jurisdiction: J1, J2
    #[arg(long, default_value = "J1")]
    pub jurisdiction: Jurisdiction,

    /// Payment frequency: weekly, biweekly, semimonthly, monthly
    #[arg(long, default_value = "monthly")]
    pub frequency: PaymentFrequency,

    /// Candidate terms: continuous (1-48) or discrete (12-72 by 12)
    #[arg(long, default_value = "continuous")]
    pub mode: TermSearchMode,

    /// Include the figures for every candidate term
    #[arg(long)]
    pub all: bool,
}

#[derive(Serialize)]
struct OptimalTermOutput {
    #[serde(flatten)]
    optimal: OptimalTermResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates: Option<Vec<TermEvaluation>>,
}

pub fn run_optimal_term(
    args: OptimalTermArgs,
    config: &DealConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let search: TermSearchInput = match args.cost_basis {
        Some(cost_basis) => TermSearchInput {
            cost_basis,
            doc_fee: args.doc_fee,
            jurisdiction: args.jurisdiction,
            payment_frequency: args.frequency,
            down_payment: None,
        },
        None => input::stdin::read_file_or_stdin(args.input.as_deref(), "term search")?,
    };

    let optimal = calculate_optimal_term(&search, args.mode, config)?;
    let candidates = if args.all {
        Some(evaluate_terms(&search, args.mode, config)?)
    } else {
        None
    };

    Ok(serde_json::to_value(OptimalTermOutput {
        optimal,
        candidates,
    })?)
}
