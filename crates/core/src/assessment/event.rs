use crate::model::{OptionLetter, QuestionId, QuizResult, ResultSummary};

/// Why the submit-confirmation prompt is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPrompt {
    /// Opened by the user; can be dismissed.
    Manual,
    /// Opened by timer expiry; submits on its own after the presentation delay.
    TimeUp,
}

/// Everything that can happen to an attempt, from the user or from a timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SelectAnswer {
        question_id: QuestionId,
        letter: OptionLetter,
    },
    ToggleBookmark {
        question_id: QuestionId,
    },
    Next,
    Previous,
    GoTo(usize),
    RequestSubmit,
    CancelSubmit,
    ConfirmSubmit,
    Tick,
    SavedIndicatorElapsed {
        generation: u64,
    },
    AutoSubmitElapsed,
    SubmissionSucceeded,
    SubmissionFailed {
        message: String,
    },
    RetrySubmit,
    Abandon,
}

impl Event {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Event::SelectAnswer { .. } => "select answer",
            Event::ToggleBookmark { .. } => "toggle bookmark",
            Event::Next => "next",
            Event::Previous => "previous",
            Event::GoTo(_) => "go to",
            Event::RequestSubmit => "request submit",
            Event::CancelSubmit => "cancel submit",
            Event::ConfirmSubmit => "confirm submit",
            Event::Tick => "tick",
            Event::SavedIndicatorElapsed { .. } => "saved indicator elapsed",
            Event::AutoSubmitElapsed => "auto submit elapsed",
            Event::SubmissionSucceeded => "submission succeeded",
            Event::SubmissionFailed { .. } => "submission failed",
            Event::RetrySubmit => "retry submit",
            Event::Abandon => "abandon",
        }
    }
}

/// Work the owner of the session must carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartTimer,
    StopTimer,
    /// (Re)arm the saved-indicator timeout; a newer generation supersedes older ones.
    ScheduleSavedIndicator { generation: u64 },
    CancelSavedIndicator,
    ScheduleAutoSubmit,
    CancelAutoSubmit,
    /// Insert this row into `user_quiz_results`.
    Persist(QuizResult),
    /// Hand the summary to the results view.
    Finished(ResultSummary),
}
