use models::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidIdentifier(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidDateFormat(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Stable numeric code for logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::InvalidIdentifier(_) => 2001,
            ServiceError::NotFound(_) => 2002,
            ServiceError::InvalidDateFormat(_) => 2003,
            ServiceError::Validation(_) => 2004,
            ServiceError::StorageUnavailable(_) => 2100,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidIdentifier(_) => Self::InvalidIdentifier(e.to_string()),
            ModelError::InvalidDateFormat(_) | ModelError::InvalidDateTime(_) => Self::InvalidDateFormat(e.to_string()),
            ModelError::Validation(msg) => Self::Validation(msg),
            ModelError::MissingIdentifier => Self::StorageUnavailable(e.to_string()),
        }
    }
}

impl From<mongodb::error::Error> for ServiceError {
    fn from(e: mongodb::error::Error) -> Self {
        Self::StorageUnavailable(e.to_string())
    }
}
