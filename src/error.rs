use crate::domain::money::Money;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum LifecycleError {
    #[error("{entity} {id} not found")]
    #[diagnostic(code(payorder::not_found))]
    NotFound { entity: &'static str, id: u64 },

    #[error("Invalid transition: {0}")]
    #[diagnostic(code(payorder::invalid_transition))]
    InvalidTransition(String),

    #[error("Credit of {requested} exceeds creditable remainder {remaining}")]
    #[diagnostic(code(payorder::over_credit))]
    OverCredit { requested: Money, remaining: Money },

    #[error("Validation error: {0}")]
    #[diagnostic(code(payorder::validation))]
    ValidationError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),

    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl LifecycleError {
    pub fn order_not_found(id: impl Into<u64>) -> Self {
        Self::NotFound {
            entity: "order",
            id: id.into(),
        }
    }

    pub fn delivery_not_found(id: impl Into<u64>) -> Self {
        Self::NotFound {
            entity: "delivery",
            id: id.into(),
        }
    }

    pub fn invalid_transition(reason: impl Into<String>) -> Self {
        Self::InvalidTransition(reason.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::ValidationError(reason.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
