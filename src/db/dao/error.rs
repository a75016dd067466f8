use std::fmt;

use sea_orm::DbErr;

/// Completion state an item was already in when a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    Completed,
    NotCompleted,
}

impl CompletionState {
    pub fn from_flag(is_completed: bool) -> Self {
        if is_completed {
            Self::Completed
        } else {
            Self::NotCompleted
        }
    }
}

impl fmt::Display for CompletionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::NotCompleted => f.write_str("not completed"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DaoLayerError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("{0}")]
    Validation(String),
    #[error("Invalid pagination: page={page} page_size={page_size}")]
    InvalidPagination { page: u64, page_size: u64 },
    /// Missing and foreign items share this variant so callers cannot tell whose item it is.
    #[error("Schedule item not found or not accessible (id={id})")]
    NotFoundOrForbidden { id: i32 },
    #[error("Schedule item not found (id={id})")]
    NotFound { id: i32 },
    #[error("Schedule item is already {state} (id={id})")]
    AlreadyInState { id: i32, state: CompletionState },
}

impl DaoLayerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type DaoResult<T> = Result<T, DaoLayerError>;

#[cfg(test)]
mod tests {
    use super::{CompletionState, DaoLayerError};

    #[test]
    fn already_in_state_names_the_state() {
        let err = DaoLayerError::AlreadyInState {
            id: 3,
            state: CompletionState::NotCompleted,
        };
        assert_eq!(err.to_string(), "Schedule item is already not completed (id=3)");
    }

    #[test]
    fn completion_state_follows_flag() {
        assert_eq!(CompletionState::from_flag(true), CompletionState::Completed);
        assert_eq!(CompletionState::from_flag(false), CompletionState::NotCompleted);
    }
}
