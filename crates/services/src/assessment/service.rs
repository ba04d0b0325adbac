use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{SeedableRng, rng};

use learn_core::assessment::AssessmentSession;
use learn_core::model::{AssessmentSettings, Question, QuestionRecord, QuizId};
use storage::repository::{AuthGateway, QuizRepository, ResultRepository};

use super::runner::AssessmentRunner;
use crate::Clock;
use crate::error::{AssessmentError, LoadError};

/// Opens assessment attempts: concurrent load, normalisation, shuffle, runner start.
#[derive(Clone)]
pub struct AssessmentService {
    clock: Clock,
    settings: AssessmentSettings,
    quizzes: Arc<dyn QuizRepository>,
    results: Arc<dyn ResultRepository>,
    auth: Arc<dyn AuthGateway>,
    shuffle_seed: Option<u64>,
}

impl AssessmentService {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizRepository>,
        results: Arc<dyn ResultRepository>,
        auth: Arc<dyn AuthGateway>,
    ) -> Self {
        Self {
            clock,
            settings: AssessmentSettings::default(),
            quizzes,
            results,
            auth,
            shuffle_seed: None,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: AssessmentSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use a seeded shuffle instead of the thread RNG.
    #[must_use]
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &AssessmentSettings {
        &self.settings
    }

    /// Fetch the quiz and its questions and build a fresh attempt.
    ///
    /// The quiz row, the question rows and the signed-in user are read
    /// concurrently; any failure aborts the load with nothing partially shown.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::QuizNotFound` if the quiz is missing,
    /// `LoadError::NoQuestions` if it has no questions, `LoadError::NotSignedIn`
    /// without an auth session, and storage or question-shape errors otherwise.
    pub async fn load(&self, quiz_id: QuizId) -> Result<AssessmentSession, LoadError> {
        let (quiz, records, user) = tokio::try_join!(
            self.quizzes.get_quiz(quiz_id),
            self.quizzes.list_questions(quiz_id),
            self.auth.current_user(),
        )
        .inspect_err(|err| tracing::warn!("Failed to load quiz {quiz_id}: {err}"))?;

        let quiz = quiz.ok_or(LoadError::QuizNotFound(quiz_id))?;
        let user = user.ok_or(LoadError::NotSignedIn)?;
        let mut questions = normalize_all(&records)?;
        if questions.is_empty() {
            return Err(LoadError::NoQuestions(quiz_id));
        }
        if self.settings.shuffle_questions() {
            self.shuffle(&mut questions);
        }

        tracing::info!(
            "Loaded quiz {quiz_id}: {} questions, timed: {}",
            questions.len(),
            quiz.is_timed()
        );
        AssessmentSession::new(quiz, user, questions, self.clock.now())
            .map_err(|_| LoadError::NoQuestions(quiz_id))
    }

    /// Load an attempt and start driving it.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Load` if loading fails.
    pub async fn open(&self, quiz_id: QuizId) -> Result<AssessmentRunner, AssessmentError> {
        let session = self.load(quiz_id).await?;
        Ok(self.start(session))
    }

    /// Start the timers for an already loaded attempt. Must run inside a Tokio runtime.
    #[must_use]
    pub fn start(&self, session: AssessmentSession) -> AssessmentRunner {
        AssessmentRunner::start(session, self.clock, self.settings, Arc::clone(&self.results))
    }

    fn shuffle(&self, questions: &mut [Question]) {
        match self.shuffle_seed {
            Some(seed) => questions.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => questions.shuffle(&mut rng()),
        }
    }
}

fn normalize_all(records: &[QuestionRecord]) -> Result<Vec<Question>, LoadError> {
    records
        .iter()
        .map(|r| r.normalize().map_err(LoadError::from))
        .collect()
}
