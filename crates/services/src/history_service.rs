use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use learn_core::model::{QuizId, Score, UserId};
use storage::repository::{QuizResultRow, ResultRepository};

use crate::error::HistoryError;

/// Upper bound on rows scanned when aggregating best scores.
const HISTORY_SCAN_LIMIT: u32 = 1_000;

/// Presentation-agnostic list item for one past attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultListItem {
    pub id: i64,
    pub quiz_id: QuizId,
    pub score: Score,
    pub time_taken_seconds: Option<u32>,
    pub completed_at: DateTime<Utc>,
}

impl ResultListItem {
    #[must_use]
    pub fn from_row(row: &QuizResultRow) -> Self {
        Self {
            id: row.id,
            quiz_id: row.result.quiz_id,
            score: row.result.score,
            time_taken_seconds: row.result.time_taken_seconds,
            completed_at: row.result.completed_at,
        }
    }
}

/// Best attempt per quiz, for profile and progress screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgress {
    pub quiz_id: QuizId,
    pub best_score: Score,
    pub attempts: u32,
    pub last_completed_at: DateTime<Utc>,
}

/// Read-only facade over a user's stored quiz results.
#[derive(Clone)]
pub struct ResultHistoryService {
    results: Arc<dyn ResultRepository>,
}

impl ResultHistoryService {
    #[must_use]
    pub fn new(results: Arc<dyn ResultRepository>) -> Self {
        Self { results }
    }

    /// Most recent attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on repository failures.
    pub async fn recent(
        &self,
        user: UserId,
        limit: u32,
    ) -> Result<Vec<ResultListItem>, HistoryError> {
        let rows = self.results.list_results(user, limit).await?;
        Ok(rows.iter().map(ResultListItem::from_row).collect())
    }

    /// One entry per attempted quiz, ordered by quiz id.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on repository failures.
    pub async fn progress(&self, user: UserId) -> Result<Vec<QuizProgress>, HistoryError> {
        let rows = self.results.list_results(user, HISTORY_SCAN_LIMIT).await?;
        let mut by_quiz: BTreeMap<QuizId, QuizProgress> = BTreeMap::new();

        for row in &rows {
            let result = &row.result;
            by_quiz
                .entry(result.quiz_id)
                .and_modify(|p| {
                    p.best_score = p.best_score.max(result.score);
                    p.attempts = p.attempts.saturating_add(1);
                    p.last_completed_at = p.last_completed_at.max(result.completed_at);
                })
                .or_insert(QuizProgress {
                    quiz_id: result.quiz_id,
                    best_score: result.score,
                    attempts: 1,
                    last_completed_at: result.completed_at,
                });
        }

        Ok(by_quiz.into_values().collect())
    }
}
