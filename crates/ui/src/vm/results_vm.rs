use learn_core::model::{QuestionReview, ResultSummary, Score};
use services::{QuizProgress, ResultListItem};

use crate::vm::time_fmt::{format_clock, format_datetime};

/// Headline band for a finished attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Passed,
    NeedsPractice,
}

impl ScoreBand {
    #[must_use]
    pub fn for_score(score: Score) -> Self {
        match score.value() {
            80..=100 => ScoreBand::Excellent,
            50..=79 => ScoreBand::Passed,
            _ => ScoreBand::NeedsPractice,
        }
    }

    #[must_use]
    pub fn headline(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent work!",
            ScoreBand::Passed => "Good effort!",
            ScoreBand::NeedsPractice => "Keep practicing!",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewLineVm {
    pub number: usize,
    pub question: String,
    pub your_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

impl ReviewLineVm {
    fn from_review(number: usize, review: &QuestionReview) -> Self {
        let your_answer = match (review.chosen, review.chosen_text.as_deref()) {
            (Some(letter), Some(text)) => format!("{}. {text}", letter.as_char()),
            (Some(letter), None) => letter.as_char().to_string(),
            (None, _) => "Not answered".to_owned(),
        };
        let correct_answer = match (review.correct, review.correct_text.as_deref()) {
            (Some(letter), Some(text)) => format!("{}. {text}", letter.as_char()),
            (Some(letter), None) => letter.as_char().to_string(),
            (None, _) => "Unavailable".to_owned(),
        };
        Self {
            number,
            question: review.question_text.clone(),
            your_answer,
            correct_answer,
            is_correct: review.is_correct,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub score_label: String,
    pub band: ScoreBand,
    pub headline: &'static str,
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
    pub total: u32,
    /// `None` for untimed quizzes.
    pub time_taken_label: Option<String>,
    pub review: Vec<ReviewLineVm>,
}

impl From<&ResultSummary> for ResultsVm {
    fn from(summary: &ResultSummary) -> Self {
        let band = ScoreBand::for_score(summary.score);
        Self {
            score_label: format!("{}%", summary.score.value()),
            band,
            headline: band.headline(),
            correct: summary.correct,
            incorrect: summary.incorrect,
            unanswered: summary.unanswered,
            total: summary.total,
            time_taken_label: summary.time_taken_seconds.map(format_clock),
            review: summary
                .review
                .iter()
                .enumerate()
                .map(|(i, r)| ReviewLineVm::from_review(i + 1, r))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultCardVm {
    pub id: i64,
    pub quiz_label: String,
    pub score_label: String,
    pub time_taken_label: Option<String>,
    pub completed_at_str: String,
}

impl From<&ResultListItem> for ResultCardVm {
    fn from(item: &ResultListItem) -> Self {
        Self {
            id: item.id,
            quiz_label: format!("Quiz {}", item.quiz_id),
            score_label: format!("{}%", item.score.value()),
            time_taken_label: item.time_taken_seconds.map(format_clock),
            completed_at_str: format_datetime(item.completed_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressRowVm {
    pub quiz_label: String,
    pub best_label: String,
    pub attempts: u32,
    pub band: ScoreBand,
}

impl From<&QuizProgress> for ProgressRowVm {
    fn from(progress: &QuizProgress) -> Self {
        Self {
            quiz_label: format!("Quiz {}", progress.quiz_id),
            best_label: format!("{}%", progress.best_score.value()),
            attempts: progress.attempts,
            band: ScoreBand::for_score(progress.best_score),
        }
    }
}

#[must_use]
pub fn map_result_cards(items: &[ResultListItem]) -> Vec<ResultCardVm> {
    items.iter().map(ResultCardVm::from).collect()
}

#[must_use]
pub fn map_progress_rows(items: &[QuizProgress]) -> Vec<ProgressRowVm> {
    items.iter().map(ProgressRowVm::from).collect()
}
