pub mod amortization;
pub mod config;
pub mod deal;
pub mod error;
pub mod frequency;
pub mod pricing;
pub mod types;

pub use config::DealConfig;
pub use deal::calculator::{calculate_deal, DealCalculation, DealInput};
pub use error::LeaseDealError;
pub use frequency::PaymentFrequency;
pub use types::*;

#[cfg(feature = "term_search")]
pub use deal::optimizer::{calculate_optimal_term, OptimalTermResult, TermSearchInput, TermSearchMode};

#[cfg(feature = "validation")]
pub use deal::validator::{validate_deal, ValidationError, ValidationField, ValidationResult};

/// Standard result type for all lease-deal operations
pub type LeaseDealResult<T> = Result<T, LeaseDealError>;
