use thiserror::Error;

/// Storage key for the onboarding flag.
pub const HAS_SEEN_ONBOARDING_KEY: &str = "hasSeenOnboarding";
/// Storage key for the logged-in flag.
pub const IS_LOGGED_IN_KEY: &str = "isLoggedIn";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("cannot {action} while {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: SessionState,
    },
}

/// The two persisted booleans, as read from local key-value storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    pub has_seen_onboarding: bool,
    pub is_logged_in: bool,
}

/// Which top-level screen the app opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Onboarding,
    Login,
    Home,
}

/// Typed session state: anonymous → onboarded → authenticated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Onboarded,
    Authenticated,
}

impl SessionState {
    /// Being logged in implies onboarding was seen, even if that flag was never written.
    #[must_use]
    pub fn from_flags(flags: SessionFlags) -> Self {
        match (flags.has_seen_onboarding, flags.is_logged_in) {
            (_, true) => Self::Authenticated,
            (true, false) => Self::Onboarded,
            (false, false) => Self::Anonymous,
        }
    }

    #[must_use]
    pub fn flags(self) -> SessionFlags {
        SessionFlags {
            has_seen_onboarding: !matches!(self, Self::Anonymous),
            is_logged_in: matches!(self, Self::Authenticated),
        }
    }

    #[must_use]
    pub fn landing(self) -> Landing {
        match self {
            Self::Anonymous => Landing::Onboarding,
            Self::Onboarded => Landing::Login,
            Self::Authenticated => Landing::Home,
        }
    }

    /// Idempotent once onboarded.
    #[must_use]
    pub fn complete_onboarding(self) -> Self {
        match self {
            Self::Anonymous => Self::Onboarded,
            other => other,
        }
    }

    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTransition` before onboarding is complete.
    pub fn log_in(self) -> Result<Self, SessionStateError> {
        match self {
            Self::Anonymous => Err(SessionStateError::InvalidTransition {
                action: "log in",
                state: self,
            }),
            Self::Onboarded | Self::Authenticated => Ok(Self::Authenticated),
        }
    }

    /// Logging out keeps the onboarding flag.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::InvalidTransition` if nobody is logged in.
    pub fn log_out(self) -> Result<Self, SessionStateError> {
        match self {
            Self::Authenticated => Ok(Self::Onboarded),
            _ => Err(SessionStateError::InvalidTransition {
                action: "log out",
                state: self,
            }),
        }
    }
}
