use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use lease_deal_core::frequency::{from_monthly_equivalent, number_of_payments, to_monthly_equivalent};
use lease_deal_core::PaymentFrequency;

/// Arguments for payment frequency conversion
#[derive(Args)]
pub struct ConvertArgs {
    /// Amount to convert
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Decimal,

    /// Payment frequency: weekly, biweekly, semimonthly, monthly
    #[arg(long)]
    pub frequency: PaymentFrequency,

    /// Treat the amount as monthly and convert it to the given frequency
    #[arg(long)]
    pub from_monthly: bool,

    /// Also report the payment count over this many months
    #[arg(long)]
    pub term: Option<u32>,
}

#[derive(Serialize)]
struct ConvertOutput {
    frequency: PaymentFrequency,
    payments_per_year: u32,
    per_payment_amount: Decimal,
    monthly_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    number_of_payments: Option<u32>,
}

pub fn run_convert(args: ConvertArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (per_payment_amount, monthly_amount) = if args.from_monthly {
        (from_monthly_equivalent(args.amount, args.frequency)?, args.amount)
    } else {
        (args.amount, to_monthly_equivalent(args.amount, args.frequency)?)
    };
    let number_of_payments = args
        .term
        .map(|t| number_of_payments(t, args.frequency))
        .transpose()?;

    let output = ConvertOutput {
        frequency: args.frequency,
        payments_per_year: args.frequency.payments_per_year(),
        per_payment_amount,
        monthly_amount,
        number_of_payments,
    };
    Ok(serde_json::to_value(output)?)
}
