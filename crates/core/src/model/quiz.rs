use serde::{Deserialize, Serialize};

use crate::model::ids::QuizId;

/// Quiz metadata as read from the gateway's `quizzes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    #[serde(default)]
    pub title: String,
    /// Absent (or zero) means the quiz is untimed.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

impl Quiz {
    #[must_use]
    pub fn new(id: QuizId, title: impl Into<String>, duration_minutes: Option<u32>) -> Self {
        Self {
            id,
            title: title.into(),
            duration_minutes,
        }
    }

    /// Countdown length in seconds, or `None` for untimed quizzes.
    #[must_use]
    pub fn duration_seconds(&self) -> Option<u32> {
        self.duration_minutes
            .filter(|minutes| *minutes > 0)
            .map(|minutes| minutes.saturating_mul(60))
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.duration_seconds().is_some()
    }
}
