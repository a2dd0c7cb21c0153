use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lease_deal_core::deal::quote::{self, QuoteRequest};
use lease_deal_core::deal::schedule;
use lease_deal_core::{
    calculate_deal, validate_deal, DealCalculation, DealConfig, DealInput, Jurisdiction,
    PaymentFrequency,
};

use crate::input;

/// Deal form fields shared by the deal, quote and schedule commands
#[derive(Args)]
pub struct DealFormArgs {
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

    /// Cash down payment
    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,
}

/// Arguments for the deal, schedule and quote commands
#[derive(Args)]
pub struct DealArgs {
    #[command(flatten)]
    pub form: DealFormArgs,

    /// Lease term in months (quote searches for one when omitted)
    #[arg(long)]
    pub term: Option<u32>,
}

/// Arguments for validating a stored deal
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to a deal calculation JSON file (or pipe it on stdin)
    #[arg(long)]
    pub input: Option<String>,
}

fn deal_input(form: &DealFormArgs, term: Option<u32>) -> Result<DealInput, Box<dyn std::error::Error>> {
    match form.cost_basis {
        Some(cost_basis) => {
            let term_months = term.ok_or("--term is required with --cost-basis")?;
            Ok(DealInput {
                cost_basis,
                term_months,
                doc_fee: form.doc_fee,
                jurisdiction: form.jurisdiction,
                payment_frequency: form.frequency,
                down_payment: form.down_payment,
            })
        }
        None => input::stdin::read_file_or_stdin(form.input.as_deref(), "deal calculation"),
    }
}

pub fn run_deal(args: DealArgs, config: &DealConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let input = deal_input(&args.form, args.term)?;
    let result = calculate_deal(&input, config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: DealArgs, config: &DealConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let input = deal_input(&args.form, args.term)?;
    let calc = calculate_deal(&input, config)?;
    Ok(serde_json::to_value(schedule::payment_schedule(&calc)?)?)
}

pub fn run_validate(
    args: ValidateArgs,
    config: &DealConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let calc: DealCalculation =
        input::stdin::read_file_or_stdin(args.input.as_deref(), "deal validation")?;
    let result = validate_deal(&calc, config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_quote(args: DealArgs, config: &DealConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let request: QuoteRequest = match args.form.cost_basis {
        Some(cost_basis) => QuoteRequest {
            cost_basis,
            term_months: args.term,
            doc_fee: args.form.doc_fee,
            jurisdiction: args.form.jurisdiction,
            payment_frequency: args.form.frequency,
            down_payment: args.form.down_payment,
        },
        None => input::stdin::read_file_or_stdin(args.form.input.as_deref(), "deal quote")?,
    };
    let result = quote::quote_deal(&request, config)?;
    Ok(serde_json::to_value(result)?)
}
