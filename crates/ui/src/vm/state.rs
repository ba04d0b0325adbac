use services::{AssessmentError, HistoryError, LoadError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The quiz does not exist or has nothing to ask.
    NotFound,
    NotSignedIn,
    /// The gateway could not be reached or returned bad data.
    Unavailable,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            ViewError::NotFound => "This quiz could not be found.",
            ViewError::NotSignedIn => "Please log in to take this quiz.",
            ViewError::Unavailable => {
                "The quiz is unavailable right now. Please go back and try again later."
            }
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<&LoadError> for ViewError {
    fn from(err: &LoadError) -> Self {
        match err {
            LoadError::QuizNotFound(_) | LoadError::NoQuestions(_) => ViewError::NotFound,
            LoadError::NotSignedIn => ViewError::NotSignedIn,
            LoadError::Question(_) | LoadError::Storage(_) => ViewError::Unavailable,
            _ => ViewError::Unknown,
        }
    }
}

impl From<&AssessmentError> for ViewError {
    fn from(err: &AssessmentError) -> Self {
        match err {
            AssessmentError::Load(load) => ViewError::from(load),
            _ => ViewError::Unknown,
        }
    }
}

impl From<&HistoryError> for ViewError {
    fn from(_: &HistoryError) -> Self {
        ViewError::Unavailable
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

impl<T> ViewState<T> {
    #[must_use]
    pub fn from_result<E>(result: Result<T, E>) -> Self
    where
        for<'a> ViewError: From<&'a E>,
    {
        match result {
            Ok(value) => ViewState::Ready(value),
            Err(err) => ViewState::Error(ViewError::from(&err)),
        }
    }

    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }
}
