use async_trait::async_trait;
use learn_core::model::{QuestionId, QuestionRecord, Quiz, QuizId, QuizResult, UserId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A stored `user_quiz_results` row with its gateway-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResultRow {
    pub id: i64,
    pub result: QuizResult,
}

impl QuizResultRow {
    #[must_use]
    pub fn new(id: i64, result: QuizResult) -> Self {
        Self { id, result }
    }
}

/// Read side of the `quizzes` and `questions` tables, plus the writes used for seeding.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Fetch a quiz by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails; a missing quiz is `Ok(None)`.
    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError>;

    /// Fetch every question row for a quiz, in gateway order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn list_questions(&self, quiz_id: QuizId) -> Result<Vec<QuestionRecord>, StorageError>;

    /// Persist or update a quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError>;

    /// Persist or update a question row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn upsert_question(&self, question: &QuestionRecord) -> Result<(), StorageError>;
}

/// Append-only access to `user_quiz_results`.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Insert a result row and return its ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the insert fails.
    async fn insert_result(&self, result: &QuizResult) -> Result<i64, StorageError>;

    /// List a user's results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn list_results(&self, user_id: UserId, limit: u32)
    -> Result<Vec<QuizResultRow>, StorageError>;
}

/// Local boolean key-value store for session flags.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails; an unset flag is `Ok(None)`.
    async fn get_flag(&self, key: &str) -> Result<Option<bool>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn set_flag(&self, key: &str, value: bool) -> Result<(), StorageError>;
}

/// The gateway's auth session: who is signed in on this device.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be read.
    async fn current_user(&self) -> Result<Option<UserId>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be written.
    async fn sign_in(&self, user: UserId) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be cleared.
    async fn sign_out(&self) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    quizzes: HashMap<QuizId, Quiz>,
    questions: BTreeMap<(QuizId, QuestionId), QuestionRecord>,
    results: Vec<QuizResultRow>,
    flags: HashMap<String, bool>,
    user: Option<UserId>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        Ok(self.lock()?.quizzes.get(&id).cloned())
    }

    async fn list_questions(&self, quiz_id: QuizId) -> Result<Vec<QuestionRecord>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .questions
            .range((quiz_id, QuestionId::new(0))..=(quiz_id, QuestionId::new(u64::MAX)))
            .map(|(_, q)| q.clone())
            .collect())
    }

    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        self.lock()?.quizzes.insert(quiz.id, quiz.clone());
        Ok(())
    }

    async fn upsert_question(&self, question: &QuestionRecord) -> Result<(), StorageError> {
        self.lock()?
            .questions
            .insert((question.quiz_id, question.id), question.clone());
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn insert_result(&self, result: &QuizResult) -> Result<i64, StorageError> {
        let mut guard = self.lock()?;
        let id = i64::try_from(guard.results.len())
            .map_err(|e| StorageError::Serialization(e.to_string()))?
            + 1;
        guard.results.push(QuizResultRow::new(id, result.clone()));
        Ok(id)
    }

    async fn list_results(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<QuizResultRow>, StorageError> {
        let guard = self.lock()?;
        let mut rows: Vec<QuizResultRow> = guard
            .results
            .iter()
            .filter(|row| row.result.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.result
                .completed_at
                .cmp(&a.result.completed_at)
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

#[async_trait]
impl FlagStore for InMemoryRepository {
    async fn get_flag(&self, key: &str) -> Result<Option<bool>, StorageError> {
        Ok(self.lock()?.flags.get(key).copied())
    }

    async fn set_flag(&self, key: &str, value: bool) -> Result<(), StorageError> {
        self.lock()?.flags.insert(key.to_owned(), value);
        Ok(())
    }
}

#[async_trait]
impl AuthGateway for InMemoryRepository {
    async fn current_user(&self) -> Result<Option<UserId>, StorageError> {
        Ok(self.lock()?.user)
    }

    async fn sign_in(&self, user: UserId) -> Result<(), StorageError> {
        self.lock()?.user = Some(user);
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), StorageError> {
        self.lock()?.user = None;
        Ok(())
    }
}

/// Aggregates the gateway contracts behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub quizzes: Arc<dyn QuizRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub flags: Arc<dyn FlagStore>,
    pub auth: Arc<dyn AuthGateway>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            quizzes: Arc::new(repo.clone()),
            results: Arc::new(repo.clone()),
            flags: Arc::new(repo.clone()),
            auth: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learn_core::model::Score;
    use learn_core::time::fixed_now;

    fn result(user: UserId, quiz: u64, score: i64, minutes_later: i64) -> QuizResult {
        QuizResult {
            user_id: user,
            quiz_id: QuizId::new(quiz),
            score: Score::try_from(score).unwrap(),
            time_taken_seconds: None,
            completed_at: fixed_now() + chrono::Duration::minutes(minutes_later),
        }
    }

    #[tokio::test]
    async fn questions_are_scoped_to_their_quiz() {
        let repo = InMemoryRepository::new();
        for (quiz, id) in [(1, 10), (2, 11), (1, 12)] {
            let q = QuestionRecord::with_options(
                QuestionId::new(id),
                QuizId::new(quiz),
                "Q",
                vec!["a".into()],
                "A",
            );
            repo.upsert_question(&q).await.unwrap();
        }

        let ids: Vec<u64> = repo
            .list_questions(QuizId::new(1))
            .await
            .unwrap()
            .iter()
            .map(|q| q.id.value())
            .collect();
        assert_eq!(ids, vec![10, 12]);
    }

    #[tokio::test]
    async fn results_list_newest_first_per_user() {
        let repo = InMemoryRepository::new();
        let me = UserId::random();
        let other = UserId::random();
        repo.insert_result(&result(me, 1, 40, 0)).await.unwrap();
        repo.insert_result(&result(other, 1, 90, 1)).await.unwrap();
        repo.insert_result(&result(me, 2, 80, 2)).await.unwrap();

        let rows = repo.list_results(me, 10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].result.score.value(), 80);
        assert_eq!(rows[1].result.score.value(), 40);

        let limited = repo.list_results(me, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn flags_default_to_unset() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_flag("isLoggedIn").await.unwrap(), None);
        repo.set_flag("isLoggedIn", true).await.unwrap();
        assert_eq!(repo.get_flag("isLoggedIn").await.unwrap(), Some(true));
    }
}
