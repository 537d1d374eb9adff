use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Risk parameters are invalid: {0}")]
    InvalidParameters(String),

    #[error("The provided entry price ({0}) is zero or negative.")]
    InvalidEntryPrice(Decimal),
}
