pub mod calculator;
pub mod schedule;

#[cfg(feature = "term_search")]
pub mod optimizer;

#[cfg(feature = "validation")]
pub mod validator;

#[cfg(feature = "validation")]
pub mod quote;
