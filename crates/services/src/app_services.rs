use std::sync::Arc;

use learn_core::model::AssessmentSettings;
use storage::repository::Storage;

use crate::Clock;
use crate::assessment::AssessmentService;
use crate::error::{AppServicesError, SessionStateServiceError};
use crate::history_service::ResultHistoryService;
use crate::session_state_service::SessionStateService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    assessments: Arc<AssessmentService>,
    history: Arc<ResultHistoryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: AssessmentSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, settings))
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock, settings: AssessmentSettings) -> Self {
        let assessments = Arc::new(
            AssessmentService::new(
                clock,
                Arc::clone(&storage.quizzes),
                Arc::clone(&storage.results),
                Arc::clone(&storage.auth),
            )
            .with_settings(settings),
        );
        let history = Arc::new(ResultHistoryService::new(Arc::clone(&storage.results)));
        Self {
            storage,
            assessments,
            history,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn assessments(&self) -> Arc<AssessmentService> {
        Arc::clone(&self.assessments)
    }

    #[must_use]
    pub fn history(&self) -> Arc<ResultHistoryService> {
        Arc::clone(&self.history)
    }

    /// Read the persisted session flags.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateServiceError::Storage` if the flags cannot be read.
    pub async fn session_state(&self) -> Result<SessionStateService, SessionStateServiceError> {
        SessionStateService::load(
            Arc::clone(&self.storage.flags),
            Arc::clone(&self.storage.auth),
        )
        .await
    }
}
