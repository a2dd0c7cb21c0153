pub mod convert;
pub mod deal;
pub mod term;
