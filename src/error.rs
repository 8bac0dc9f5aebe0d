use thiserror::Error;

/// Failures raised by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input was rejected before any statement ran.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A statement failed; `operation` names what the store was doing.
    #[error("failed to {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),
}

/// Required creation fields that were missing or unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Student name is required.")]
    MissingName,
    #[error("Student email is required.")]
    MissingEmail,
    #[error("Fee must be a finite number.")]
    InvalidFee,
    #[error("Select a student before scheduling a lesson.")]
    NoStudentSelected,
    #[error("No students registered yet. Add one on the Students tab.")]
    NoStudents,
    #[error("Lesson start is too late to fit a one-hour lesson.")]
    StartOutOfRange,
}

impl StoreError {
    /// The validation failure wrapped by this error, if any.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            StoreError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Tags a SQLite failure with the store operation it interrupted.
pub(crate) trait StoreContext<T> {
    fn during(self, operation: &'static str) -> StoreResult<T>;
}

impl<T> StoreContext<T> for Result<T, rusqlite::Error> {
    fn during(self, operation: &'static str) -> StoreResult<T> {
        self.map_err(|source| StoreError::Storage { operation, source })
    }
}
