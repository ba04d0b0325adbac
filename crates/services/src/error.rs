//! Shared error types for the services crate.

use thiserror::Error;

use learn_core::assessment::TransitionError;
use learn_core::model::{QuestionError, QuizId, SessionStateError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Why an assessment could not be opened. Terminal for that attempt.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("quiz {0} not found")]
    QuizNotFound(QuizId),
    #[error("quiz {0} has no questions")]
    NoQuestions(QuizId),
    #[error("no signed-in user")]
    NotSignedIn,
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the assessment service and runner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Errors emitted by `SessionStateService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionStateServiceError {
    #[error(transparent)]
    Transition(#[from] SessionStateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ResultHistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while assembling `AppServices`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    SqliteInit(#[from] SqliteInitError),
}
