use thiserror::Error;

/// Coarse classification used when rendering errors and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ProjectNotFound,
    Validation,
    NotFound,
    Internal,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("This project does not yet exist. Please create an issue for this project first")]
    ProjectNotFound(String),
    #[error("required field(s) missing")]
    MissingRequiredFields,
    #[error("missing _id")]
    MissingId,
    #[error("no update field(s) sent")]
    NoUpdateFields { id: String },
    #[error("could not update")]
    UpdateFailed { id: String },
    #[error("could not delete")]
    DeleteFailed { id: String },
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn db(e: impl std::fmt::Display) -> Self { Self::Db(e.to_string()) }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::ProjectNotFound(_) => ErrorKind::ProjectNotFound,
            ServiceError::MissingRequiredFields
            | ServiceError::MissingId
            | ServiceError::NoUpdateFields { .. } => ErrorKind::Validation,
            ServiceError::UpdateFailed { .. } | ServiceError::DeleteFailed { .. } => ErrorKind::NotFound,
            ServiceError::Db(_) | ServiceError::Model(_) => ErrorKind::Internal,
        }
    }

    /// The issue id the client submitted, echoed back in error payloads.
    pub fn issue_id(&self) -> Option<&str> {
        match self {
            ServiceError::NoUpdateFields { id }
            | ServiceError::UpdateFailed { id }
            | ServiceError::DeleteFailed { id } => Some(id),
            _ => None,
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}
