use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::assessment::event::{Effect, Event, SubmitPrompt};
use crate::grading::grade;
use crate::model::{
    AnswerMap, BookmarkSet, OptionLetter, Question, QuestionId, Quiz, QuizResult, ResultSummary,
    UserId,
};
use crate::time::{Countdown, CountdownTick};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("cannot {event} while {phase}")]
    NotAllowed {
        event: &'static str,
        phase: PhaseKind,
    },

    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),

    #[error("question {question} has no option {letter}")]
    OptionNotOffered {
        question: QuestionId,
        letter: OptionLetter,
    },

    #[error("question index {index} out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },
}

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    InProgress { prompt: Option<SubmitPrompt> },
    Submitting,
    SubmissionFailed { message: String },
    Completed,
    Abandoned,
}

/// Data-free discriminant of [`Phase`], for errors and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    InProgress,
    Confirming,
    Submitting,
    SubmissionFailed,
    Completed,
    Abandoned,
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PhaseKind::InProgress => "in progress",
            PhaseKind::Confirming => "confirming submission",
            PhaseKind::Submitting => "submitting",
            PhaseKind::SubmissionFailed => "submission failed",
            PhaseKind::Completed => "completed",
            PhaseKind::Abandoned => "abandoned",
        };
        f.write_str(label)
    }
}

impl Phase {
    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::InProgress { prompt: None } => PhaseKind::InProgress,
            Phase::InProgress { prompt: Some(_) } => PhaseKind::Confirming,
            Phase::Submitting => PhaseKind::Submitting,
            Phase::SubmissionFailed { .. } => PhaseKind::SubmissionFailed,
            Phase::Completed => PhaseKind::Completed,
            Phase::Abandoned => PhaseKind::Abandoned,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Abandoned)
    }
}

/// Graded result frozen at the moment of submission; retries replay it as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub result: QuizResult,
    pub summary: ResultSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SavedIndicator {
    visible: bool,
    generation: u64,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a quiz: questions in presentation order, answers, timer and phase.
///
/// All changes go through [`AssessmentSession::apply`]; timers and persistence
/// are requested through the returned [`Effect`]s rather than performed here.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    quiz: Quiz,
    user_id: UserId,
    questions: Vec<Question>,
    cursor: usize,
    answers: AnswerMap,
    bookmarks: BookmarkSet,
    countdown: Option<Countdown>,
    phase: Phase,
    saved: SavedIndicator,
    pending: Option<PendingSubmission>,
    submit_attempts: u32,
    started_at: DateTime<Utc>,
}

impl AssessmentSession {
    /// `questions` must already be in presentation order.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::NoQuestions` for an empty question list.
    pub fn new(
        quiz: Quiz,
        user_id: UserId,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, TransitionError> {
        if questions.is_empty() {
            return Err(TransitionError::NoQuestions);
        }
        let countdown = quiz.duration_seconds().map(Countdown::new);
        Ok(Self {
            quiz,
            user_id,
            questions,
            cursor: 0,
            answers: AnswerMap::new(),
            bookmarks: BookmarkSet::new(),
            countdown,
            phase: Phase::InProgress { prompt: None },
            saved: SavedIndicator::default(),
            pending: None,
            submit_attempts: 0,
            started_at,
        })
    }

    /// Effects to run once when the attempt is first shown.
    #[must_use]
    pub fn initial_effects(&self) -> Vec<Effect> {
        if self.countdown.is_some() && matches!(self.phase, Phase::InProgress { .. }) {
            vec![Effect::StartTimer]
        } else {
            Vec::new()
        }
    }

    // ─── Accessors ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.cursor]
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.cursor + 1 == self.questions.len()
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn bookmarks(&self) -> &BookmarkSet {
        &self.bookmarks
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.countdown.map(|c| c.remaining_seconds())
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn prompt(&self) -> Option<SubmitPrompt> {
        match self.phase {
            Phase::InProgress { prompt } => prompt,
            _ => None,
        }
    }

    #[must_use]
    pub fn saved_indicator_visible(&self) -> bool {
        self.saved.visible
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PendingSubmission> {
        self.pending.as_ref()
    }

    /// Number of persistence attempts issued so far, retries included.
    #[must_use]
    pub fn submit_attempts(&self) -> u32 {
        self.submit_attempts
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    // ─── Transitions ───────────────────────────────────────────────────────────

    /// Apply one event. `now` stamps `completed_at` when the attempt is graded.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::NotAllowed` when the event is invalid in the
    /// current phase, and lookup errors for unknown questions or options. A
    /// rejected event leaves the session unchanged.
    pub fn apply(
        &mut self,
        event: Event,
        now: DateTime<Utc>,
    ) -> Result<Vec<Effect>, TransitionError> {
        match event {
            Event::SelectAnswer {
                question_id,
                letter,
            } => {
                self.require_answering(&event)?;
                let question = self.find(question_id)?;
                if !question.offers(letter) {
                    return Err(TransitionError::OptionNotOffered {
                        question: question_id,
                        letter,
                    });
                }
                self.answers.record(question_id, letter);
                self.saved.generation += 1;
                self.saved.visible = true;
                Ok(vec![Effect::ScheduleSavedIndicator {
                    generation: self.saved.generation,
                }])
            }
            Event::SavedIndicatorElapsed { generation } => {
                if generation == self.saved.generation {
                    self.saved.visible = false;
                }
                Ok(Vec::new())
            }
            Event::ToggleBookmark { question_id } => {
                self.require_answering(&event)?;
                self.find(question_id)?;
                self.bookmarks.toggle(question_id);
                Ok(Vec::new())
            }
            Event::Next => {
                self.require_answering(&event)?;
                if self.is_last_question() {
                    self.phase = Phase::InProgress {
                        prompt: Some(SubmitPrompt::Manual),
                    };
                } else {
                    self.cursor += 1;
                }
                Ok(Vec::new())
            }
            Event::Previous => {
                self.require_answering(&event)?;
                self.cursor = self.cursor.saturating_sub(1);
                Ok(Vec::new())
            }
            Event::GoTo(index) => {
                self.require_answering(&event)?;
                if index >= self.questions.len() {
                    return Err(TransitionError::IndexOutOfRange {
                        index,
                        len: self.questions.len(),
                    });
                }
                self.cursor = index;
                Ok(Vec::new())
            }
            Event::RequestSubmit => {
                self.require_answering(&event)?;
                self.phase = Phase::InProgress {
                    prompt: Some(SubmitPrompt::Manual),
                };
                Ok(Vec::new())
            }
            Event::CancelSubmit => match self.phase {
                Phase::InProgress {
                    prompt: Some(SubmitPrompt::Manual),
                } => {
                    self.phase = Phase::InProgress { prompt: None };
                    Ok(Vec::new())
                }
                _ => Err(self.not_allowed(&event)),
            },
            Event::ConfirmSubmit => match self.phase {
                Phase::InProgress { prompt: Some(_) } => Ok(self.submit(now)),
                _ => Err(self.not_allowed(&event)),
            },
            Event::Tick => Ok(self.tick()),
            Event::AutoSubmitElapsed => match self.phase {
                Phase::InProgress {
                    prompt: Some(SubmitPrompt::TimeUp),
                } => Ok(self.submit(now)),
                // A late timer after the attempt moved on.
                _ => Ok(Vec::new()),
            },
            Event::SubmissionSucceeded => {
                if self.phase != Phase::Submitting {
                    return Err(self.not_allowed(&event));
                }
                let Some(pending) = self.pending.as_ref() else {
                    return Err(self.not_allowed(&event));
                };
                let summary = pending.summary.clone();
                self.phase = Phase::Completed;
                self.saved.visible = false;
                Ok(vec![
                    Effect::StopTimer,
                    Effect::CancelSavedIndicator,
                    Effect::CancelAutoSubmit,
                    Effect::Finished(summary),
                ])
            }
            Event::SubmissionFailed { message } => {
                if self.phase != Phase::Submitting {
                    return Err(self.not_allowed(&Event::SubmissionFailed { message }));
                }
                self.phase = Phase::SubmissionFailed { message };
                Ok(Vec::new())
            }
            Event::RetrySubmit => {
                if !matches!(self.phase, Phase::SubmissionFailed { .. }) {
                    return Err(self.not_allowed(&event));
                }
                let Some(pending) = self.pending.as_ref() else {
                    return Err(self.not_allowed(&event));
                };
                let result = pending.result.clone();
                self.phase = Phase::Submitting;
                self.submit_attempts += 1;
                Ok(vec![Effect::Persist(result)])
            }
            Event::Abandon => {
                if self.phase.is_terminal() {
                    return Ok(Vec::new());
                }
                self.phase = Phase::Abandoned;
                self.saved.visible = false;
                Ok(vec![
                    Effect::StopTimer,
                    Effect::CancelSavedIndicator,
                    Effect::CancelAutoSubmit,
                ])
            }
        }
    }

    fn tick(&mut self) -> Vec<Effect> {
        if !matches!(self.phase, Phase::InProgress { .. }) {
            return Vec::new();
        }
        let Some(countdown) = self.countdown.as_mut() else {
            return Vec::new();
        };
        match countdown.tick() {
            CountdownTick::Running(_) | CountdownTick::AlreadyExpired => Vec::new(),
            CountdownTick::Expired => {
                self.phase = Phase::InProgress {
                    prompt: Some(SubmitPrompt::TimeUp),
                };
                vec![Effect::StopTimer, Effect::ScheduleAutoSubmit]
            }
        }
    }

    /// The one scoring path shared by manual and automatic submission.
    fn submit(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let report = grade(&self.questions, &self.answers);
        let time_taken_seconds = self.countdown.map(|c| c.elapsed_seconds());

        let result = QuizResult {
            user_id: self.user_id,
            quiz_id: self.quiz.id,
            score: report.score,
            time_taken_seconds,
            completed_at: now,
        };
        let summary = ResultSummary {
            quiz_id: self.quiz.id,
            score: report.score,
            correct: report.correct,
            incorrect: report.incorrect,
            unanswered: report.unanswered,
            total: report.total,
            time_taken_seconds,
            completed_at: now,
            review: report.review,
        };

        self.pending = Some(PendingSubmission {
            result: result.clone(),
            summary,
        });
        self.phase = Phase::Submitting;
        self.saved.visible = false;
        self.submit_attempts += 1;

        vec![
            Effect::StopTimer,
            Effect::CancelSavedIndicator,
            Effect::CancelAutoSubmit,
            Effect::Persist(result),
        ]
    }

    fn require_answering(&self, event: &Event) -> Result<(), TransitionError> {
        match self.phase {
            Phase::InProgress { prompt: None } => Ok(()),
            _ => Err(self.not_allowed(event)),
        }
    }

    fn not_allowed(&self, event: &Event) -> TransitionError {
        TransitionError::NotAllowed {
            event: event.name(),
            phase: self.phase.kind(),
        }
    }

    fn find(&self, id: QuestionId) -> Result<&Question, TransitionError> {
        self.questions
            .iter()
            .find(|q| q.id() == id)
            .ok_or(TransitionError::UnknownQuestion(id))
    }
}
