use std::sync::Arc;

use learn_core::model::{
    HAS_SEEN_ONBOARDING_KEY, IS_LOGGED_IN_KEY, Landing, SessionFlags, SessionState, UserId,
};
use storage::repository::{AuthGateway, FlagStore};

use crate::error::SessionStateServiceError;

/// Owns the app-wide session state, read once at startup and written on each transition.
pub struct SessionStateService {
    flags: Arc<dyn FlagStore>,
    auth: Arc<dyn AuthGateway>,
    state: SessionState,
}

impl SessionStateService {
    /// Read the persisted flags. Unset flags count as `false`.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateServiceError::Storage` if the flags cannot be read.
    pub async fn load(
        flags: Arc<dyn FlagStore>,
        auth: Arc<dyn AuthGateway>,
    ) -> Result<Self, SessionStateServiceError> {
        let stored = SessionFlags {
            has_seen_onboarding: flags.get_flag(HAS_SEEN_ONBOARDING_KEY).await?.unwrap_or(false),
            is_logged_in: flags.get_flag(IS_LOGGED_IN_KEY).await?.unwrap_or(false),
        };
        let state = SessionState::from_flags(stored);
        tracing::debug!("session state at startup: {state:?}");
        Ok(Self { flags, auth, state })
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn landing(&self) -> Landing {
        self.state.landing()
    }

    /// # Errors
    ///
    /// Returns `SessionStateServiceError::Storage` if the auth session cannot be read.
    pub async fn current_user(&self) -> Result<Option<UserId>, SessionStateServiceError> {
        if self.state != SessionState::Authenticated {
            return Ok(None);
        }
        Ok(self.auth.current_user().await?)
    }

    /// # Errors
    ///
    /// Returns `SessionStateServiceError::Storage` if the flag cannot be written.
    pub async fn complete_onboarding(&mut self) -> Result<(), SessionStateServiceError> {
        let next = self.state.complete_onboarding();
        self.commit(next).await
    }

    /// # Errors
    ///
    /// Returns `SessionStateServiceError::Transition` before onboarding, or
    /// `SessionStateServiceError::Storage` if the session cannot be written.
    pub async fn log_in(&mut self, user: UserId) -> Result<(), SessionStateServiceError> {
        let next = self.state.log_in()?;
        self.auth.sign_in(user).await?;
        self.commit(next).await?;
        tracing::info!("User {user} logged in");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionStateServiceError::Transition` if nobody is logged in, or
    /// `SessionStateServiceError::Storage` if the session cannot be cleared.
    pub async fn log_out(&mut self) -> Result<(), SessionStateServiceError> {
        let next = self.state.log_out()?;
        self.auth.sign_out().await?;
        self.commit(next).await?;
        tracing::info!("User logged out");
        Ok(())
    }

    async fn commit(&mut self, next: SessionState) -> Result<(), SessionStateServiceError> {
        let flags = next.flags();
        self.flags
            .set_flag(HAS_SEEN_ONBOARDING_KEY, flags.has_seen_onboarding)
            .await?;
        self.flags.set_flag(IS_LOGGED_IN_KEY, flags.is_logged_in).await?;
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    async fn service(repo: &InMemoryRepository) -> SessionStateService {
        SessionStateService::load(Arc::new(repo.clone()), Arc::new(repo.clone()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn fresh_install_lands_on_onboarding() {
        let repo = InMemoryRepository::new();
        assert_eq!(service(&repo).await.landing(), Landing::Onboarding);
    }

    #[tokio::test]
    async fn transitions_persist_across_restarts() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let mut svc = service(&repo).await;
        svc.complete_onboarding().await.unwrap();
        svc.log_in(user).await.unwrap();
        assert_eq!(svc.current_user().await.unwrap(), Some(user));

        let restarted = service(&repo).await;
        assert_eq!(restarted.landing(), Landing::Home);
        assert_eq!(repo.get_flag(IS_LOGGED_IN_KEY).await.unwrap(), Some(true));

        let mut svc = restarted;
        svc.log_out().await.unwrap();
        assert_eq!(svc.landing(), Landing::Login);
        assert_eq!(svc.current_user().await.unwrap(), None);
        assert_eq!(repo.current_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn login_before_onboarding_writes_nothing() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo).await;
        let err = svc.log_in(UserId::random()).await.unwrap_err();
        assert!(matches!(err, SessionStateServiceError::Transition(_)));
        assert_eq!(repo.get_flag(IS_LOGGED_IN_KEY).await.unwrap(), None);
        assert_eq!(repo.current_user().await.unwrap(), None);
    }
}
