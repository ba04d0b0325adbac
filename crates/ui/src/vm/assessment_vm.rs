use learn_core::assessment::{Event, Phase, SubmitPrompt};
use learn_core::model::{OptionLetter, QuizId};
use services::{AssessmentError, AssessmentRunner, AssessmentService, RunnerOutcome};

use crate::vm::results_vm::ResultsVm;
use crate::vm::state::{ViewError, ViewState};
use crate::vm::time_fmt::format_clock;

/// Countdown at or below this many seconds is shown as urgent.
const URGENT_SECONDS: u32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssessmentIntent {
    Select(OptionLetter),
    ToggleBookmark,
    Next,
    Previous,
    GoTo(usize),
    RequestSubmit,
    CancelSubmit,
    ConfirmSubmit,
    Retry,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssessmentOutcome {
    Continue,
    SubmissionFailed { message: String },
    Completed(ResultsVm),
}

impl From<RunnerOutcome> for AssessmentOutcome {
    fn from(outcome: RunnerOutcome) -> Self {
        match outcome {
            RunnerOutcome::Continue => AssessmentOutcome::Continue,
            RunnerOutcome::SubmissionFailed { message } => {
                AssessmentOutcome::SubmissionFailed { message }
            }
            RunnerOutcome::Completed(summary) => {
                AssessmentOutcome::Completed(ResultsVm::from(&summary))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub letter: char,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptVm {
    pub title: &'static str,
    pub message: &'static str,
    pub can_cancel: bool,
}

impl PromptVm {
    fn for_prompt(prompt: SubmitPrompt) -> Self {
        match prompt {
            SubmitPrompt::Manual => Self {
                title: "Submit quiz?",
                message: "You can still go back and change your answers.",
                can_cancel: true,
            },
            SubmitPrompt::TimeUp => Self {
                title: "Time's up!",
                message: "Your answers are being submitted.",
                can_cancel: false,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionVm {
    Idle,
    Submitting,
    Failed { message: String },
    Done,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub progress_label: String,
    pub answered_label: String,
    pub text: String,
    pub options: Vec<OptionVm>,
    pub bookmarked: bool,
    pub saved_visible: bool,
    pub timer_label: Option<String>,
    pub timer_urgent: bool,
    pub is_first: bool,
    pub is_last: bool,
    pub prompt: Option<PromptVm>,
    pub submission: SubmissionVm,
}

/// Screen model for one quiz attempt.
pub struct AssessmentVm {
    state: ViewState<AssessmentRunner>,
}

impl AssessmentVm {
    #[must_use]
    pub fn loading() -> Self {
        Self {
            state: ViewState::Loading,
        }
    }

    /// Load the quiz and start the attempt. Failures become a blocking error state.
    pub async fn open(service: &AssessmentService, quiz_id: QuizId) -> Self {
        let state = ViewState::from_result(service.open(quiz_id).await);
        if let ViewState::Error(err) = &state {
            tracing::warn!("Quiz {quiz_id} failed to open: {err:?}");
        }
        Self { state }
    }

    #[must_use]
    pub fn state(&self) -> &ViewState<AssessmentRunner> {
        &self.state
    }

    #[must_use]
    pub fn error(&self) -> Option<ViewError> {
        match self.state {
            ViewState::Error(err) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn quiz_title(&self) -> Option<&str> {
        self.state.ready().map(|r| r.session().quiz().title.as_str())
    }

    #[must_use]
    pub fn question(&self) -> Option<QuestionVm> {
        let session = self.state.ready()?.session();
        let question = session.current_question();
        let chosen = session.answers().get(question.id());
        let total = session.questions().len();

        let options = question
            .options()
            .iter()
            .map(|o| OptionVm {
                letter: o.letter.as_char(),
                text: o.text.clone(),
                selected: chosen == Some(o.letter),
            })
            .collect();

        let submission = match session.phase() {
            Phase::InProgress { .. } | Phase::Abandoned => SubmissionVm::Idle,
            Phase::Submitting => SubmissionVm::Submitting,
            Phase::SubmissionFailed { message } => SubmissionVm::Failed {
                message: message.clone(),
            },
            Phase::Completed => SubmissionVm::Done,
        };

        Some(QuestionVm {
            progress_label: format!("{} / {total}", session.current_index() + 1),
            answered_label: format!("{} of {total} answered", session.answers().len()),
            text: question.text().to_owned(),
            options,
            bookmarked: session.bookmarks().contains(question.id()),
            saved_visible: session.saved_indicator_visible(),
            timer_label: session.remaining_seconds().map(format_clock),
            timer_urgent: session
                .remaining_seconds()
                .is_some_and(|s| s <= URGENT_SECONDS),
            is_first: session.current_index() == 0,
            is_last: session.is_last_question(),
            prompt: session.prompt().map(PromptVm::for_prompt),
            submission,
        })
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` if there is no running attempt or the
    /// intent is not valid in the current phase.
    pub async fn handle(
        &mut self,
        intent: AssessmentIntent,
    ) -> Result<AssessmentOutcome, ViewError> {
        let runner = self.state.ready_mut().ok_or(ViewError::Unknown)?;
        let question_id = runner.session().current_question().id();
        let event = match intent {
            AssessmentIntent::Select(letter) => Event::SelectAnswer {
                question_id,
                letter,
            },
            AssessmentIntent::ToggleBookmark => Event::ToggleBookmark { question_id },
            AssessmentIntent::Next => Event::Next,
            AssessmentIntent::Previous => Event::Previous,
            AssessmentIntent::GoTo(index) => Event::GoTo(index),
            AssessmentIntent::RequestSubmit => Event::RequestSubmit,
            AssessmentIntent::CancelSubmit => Event::CancelSubmit,
            AssessmentIntent::ConfirmSubmit => Event::ConfirmSubmit,
            AssessmentIntent::Retry => Event::RetrySubmit,
        };
        runner
            .dispatch(event)
            .await
            .map(AssessmentOutcome::from)
            .map_err(|err| log_rejected(&err))
    }

    /// Wait for the next timer event. `Ok(None)` once no timer is scheduled.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` if there is no running attempt.
    pub async fn pump(&mut self) -> Result<Option<AssessmentOutcome>, ViewError> {
        let runner = self.state.ready_mut().ok_or(ViewError::Unknown)?;
        runner
            .pump()
            .await
            .map(|o| o.map(AssessmentOutcome::from))
            .map_err(|err| log_rejected(&err))
    }

    /// Cancel-safe half of [`AssessmentVm::pump`] for hosts that race timers
    /// against user input. Feed the event to [`AssessmentVm::apply_timer`].
    pub async fn next_timer(&mut self) -> Option<Event> {
        match self.state.ready_mut() {
            Some(runner) => runner.next_timer_event().await,
            None => None,
        }
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` if there is no running attempt.
    pub async fn apply_timer(&mut self, event: Event) -> Result<AssessmentOutcome, ViewError> {
        let runner = self.state.ready_mut().ok_or(ViewError::Unknown)?;
        runner
            .dispatch(event)
            .await
            .map(AssessmentOutcome::from)
            .map_err(|err| log_rejected(&err))
    }

    /// Navigate away. Every pending timer is cancelled.
    pub fn leave(&mut self) {
        if let Some(runner) = self.state.ready_mut() {
            runner.abandon();
        }
        self.state = ViewState::Idle;
    }
}

fn log_rejected(err: &AssessmentError) -> ViewError {
    tracing::debug!("assessment intent rejected: {err}");
    ViewError::from(err)
}
