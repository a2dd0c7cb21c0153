use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use lease_deal_core::{DealCalculation, DealConfig};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse an optional JSON policy override; empty means the default policy.
fn parse_config(config_json: Option<String>) -> NapiResult<DealConfig> {
    match config_json {
        Some(json) if !json.trim().is_empty() => {
            let config: DealConfig = serde_json::from_str(&json).map_err(to_napi_error)?;
            config.validate().map_err(to_napi_error)?;
            Ok(config)
        }
        _ => Ok(DealConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// Deal calculation
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_deal(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: lease_deal_core::DealInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = parse_config(config_json)?;
    let output = lease_deal_core::calculate_deal(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn payment_schedule(calculation_json: String) -> NapiResult<String> {
    let calc: DealCalculation = serde_json::from_str(&calculation_json).map_err(to_napi_error)?;
    let rows = lease_deal_core::deal::schedule::payment_schedule(&calc).map_err(to_napi_error)?;
    serde_json::to_string(&rows).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Term search and validation
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct OptimalTermRequest {
    #[serde(flatten)]
    input: lease_deal_core::TermSearchInput,
    #[serde(default)]
    mode: lease_deal_core::TermSearchMode,
}

#[napi]
pub fn calculate_optimal_term(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let request: OptimalTermRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = parse_config(config_json)?;
    let output = lease_deal_core::calculate_optimal_term(&request.input, request.mode, &config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn validate_deal(calculation_json: String, config_json: Option<String>) -> NapiResult<String> {
    let calc: DealCalculation = serde_json::from_str(&calculation_json).map_err(to_napi_error)?;
    let config = parse_config(config_json)?;
    let output = lease_deal_core::validate_deal(&calc, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn quote_deal(request_json: String, config_json: Option<String>) -> NapiResult<String> {
    let request: lease_deal_core::deal::quote::QuoteRequest =
        serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let config = parse_config(config_json)?;
    let output =
        lease_deal_core::deal::quote::quote_deal(&request, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Frequency conversion
// ---------------------------------------------------------------------------

#[napi]
pub fn to_monthly_equivalent(amount: String, frequency: String) -> NapiResult<String> {
    let amount: rust_decimal::Decimal = amount.parse().map_err(to_napi_error)?;
    let frequency: lease_deal_core::PaymentFrequency =
        frequency.parse().map_err(to_napi_error)?;
    let monthly = lease_deal_core::frequency::to_monthly_equivalent(amount, frequency)
        .map_err(to_napi_error)?;
    Ok(monthly.to_string())
}

#[napi]
pub fn from_monthly_equivalent(monthly_amount: String, frequency: String) -> NapiResult<String> {
    let amount: rust_decimal::Decimal = monthly_amount.parse().map_err(to_napi_error)?;
    let frequency: lease_deal_core::PaymentFrequency =
        frequency.parse().map_err(to_napi_error)?;
    let per_payment = lease_deal_core::frequency::from_monthly_equivalent(amount, frequency)
        .map_err(to_napi_error)?;
    Ok(per_payment.to_string())
}
