use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId, UserId};
use crate::model::question::OptionLetter;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultError {
    #[error("score out of range: {0}")]
    ScoreOutOfRange(i64),
}

/// Percentage score, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Score(u8);

impl Score {
    pub const ZERO: Score = Score(0);
    pub const PERFECT: Score = Score(100);

    /// `round(correct / total * 100)`, with halves rounding up. An empty quiz scores zero.
    #[must_use]
    pub fn from_counts(correct: u32, total: u32) -> Self {
        if total == 0 {
            return Self::ZERO;
        }
        let correct = u64::from(correct.min(total));
        let total = u64::from(total);
        let rounded = (correct * 200 + total) / (total * 2);
        // rounded <= 100 because correct <= total
        Self(u8::try_from(rounded).unwrap_or(100))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = ResultError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .map(Score)
            .ok_or(ResultError::ScoreOutOfRange(value))
    }
}

impl From<Score> for i64 {
    fn from(score: Score) -> Self {
        i64::from(score.0)
    }
}

/// Row written to `user_quiz_results`, once per completed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub user_id: UserId,
    pub quiz_id: QuizId,
    pub score: Score,
    #[serde(rename = "time_taken")]
    pub time_taken_seconds: Option<u32>,
    pub completed_at: DateTime<Utc>,
}

/// Per-question line of the results breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub question_text: String,
    pub chosen: Option<OptionLetter>,
    pub chosen_text: Option<String>,
    pub correct: Option<OptionLetter>,
    pub correct_text: Option<String>,
    pub is_correct: bool,
}

/// What the results view receives after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub quiz_id: QuizId,
    pub score: Score,
    pub correct: u32,
    /// Includes unanswered questions.
    pub incorrect: u32,
    pub unanswered: u32,
    pub total: u32,
    pub time_taken_seconds: Option<u32>,
    pub completed_at: DateTime<Utc>,
    pub review: Vec<QuestionReview>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_rounds_to_nearest_percent() {
        assert_eq!(Score::from_counts(1, 3).value(), 33);
        assert_eq!(Score::from_counts(2, 3).value(), 67);
        assert_eq!(Score::from_counts(1, 8).value(), 13); // 12.5 rounds up
        assert_eq!(Score::from_counts(3, 3), Score::PERFECT);
        assert_eq!(Score::from_counts(0, 5), Score::ZERO);
    }

    #[test]
    fn score_is_bounded_for_every_count() {
        for total in 1..=40 {
            for correct in 0..=total {
                let score = Score::from_counts(correct, total).value();
                assert!(score <= 100);
                // |score - correct/total*100| <= 1/2, kept in integers
                let diff = i64::from(score) * i64::from(total) - i64::from(correct) * 100;
                assert!(2 * diff.abs() <= i64::from(total), "{correct}/{total} -> {score}");
            }
        }
    }

    #[test]
    fn empty_quiz_scores_zero() {
        assert_eq!(Score::from_counts(0, 0), Score::ZERO);
    }

    #[test]
    fn score_rejects_out_of_range_values() {
        assert!(Score::try_from(101_i64).is_err());
        assert!(Score::try_from(-1_i64).is_err());
        assert_eq!(Score::try_from(55_i64).unwrap().value(), 55);
    }
}
