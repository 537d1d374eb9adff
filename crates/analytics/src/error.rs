use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
