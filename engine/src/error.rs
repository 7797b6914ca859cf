use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("cannot parse {key}={value:?}")]
    Parse { key: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Rejection of a text amount typed into the presentation layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount is not a number: {0:?}")]
    NotANumber(String),

    #[error("amount is not finite: {0}")]
    NotFinite(f64),
}
