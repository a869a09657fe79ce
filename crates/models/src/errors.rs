use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid song id: {0}")]
    InvalidIdentifier(String),
    #[error("invalid date '{0}', expected DD-MM-YYYY")]
    InvalidDateFormat(String),
    #[error("invalid datetime '{0}', expected ISO-8601")]
    InvalidDateTime(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("stored song document has no _id")]
    MissingIdentifier,
}
