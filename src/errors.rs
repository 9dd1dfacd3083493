//! Errors
//!
//! Custom error types used throughout the `pinboost` crate.
use thiserror::Error;

/// Errors that can occur while fitting or querying a booster.
#[derive(Debug, Error)]
pub enum PinboostError {
    /// Malformed configuration, rejected before any boosting round runs.
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Invalid training or prediction data.
    #[error("Invalid data: {0}")]
    DataError(String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// Unable to write model to file.
    #[error("Unable to write model to file: {0}")]
    UnableToWrite(String),
    /// Unable to read model from file.
    #[error("Unable to read model from a file {0}")]
    UnableToRead(String),
}
