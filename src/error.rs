use crate::db::dao::DaoLayerError;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Internal(message) => message.as_str(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::Validation(_) | DaoLayerError::InvalidPagination { .. } => {
                AppError::bad_request(err.to_string())
            }
            DaoLayerError::NotFoundOrForbidden { .. } | DaoLayerError::NotFound { .. } => {
                AppError::not_found(err.to_string())
            }
            DaoLayerError::AlreadyInState { .. } => AppError::conflict(err.to_string()),
            // Store details stay in the logs.
            DaoLayerError::Db(_) => AppError::internal("Storage failure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;

    use super::AppError;
    use crate::db::dao::{CompletionState, DaoLayerError};

    #[test]
    fn maps_repository_errors_to_http_kinds() {
        let err = AppError::from(DaoLayerError::Validation("Title required".to_string()));
        assert!(matches!(err, AppError::BadRequest(ref message) if message == "Title required"));

        let err = AppError::from(DaoLayerError::NotFoundOrForbidden { id: 7 });
        assert!(matches!(err, AppError::NotFound(_)));

        let err = AppError::from(DaoLayerError::AlreadyInState {
            id: 7,
            state: CompletionState::Completed,
        });
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn storage_failures_hide_driver_details() {
        let err = AppError::from(DaoLayerError::Db(DbErr::Custom("socket closed".to_string())));
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.message(), "Storage failure");
    }
}
