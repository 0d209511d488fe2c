//! Error types for organization tree stores.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    /// Dialing or authenticating against the backend failed.
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Entity already exists: {entity} with id {id}")]
    Conflict { entity: String, id: String },

    /// Unexpected backend failure, passed through with the failing step.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl TreeError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Conflict {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Prefix a backend or connection failure with the step that was
    /// running. Categorized errors that already name their subject are
    /// returned as is.
    pub fn during(self, step: &str) -> Self {
        match self {
            Self::Backend(msg) => Self::Backend(format!("{step}: {msg}")),
            Self::Connection(msg) => Self::Connection(format!("{step}: {msg}")),
            other => other,
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
