//! Timed assessment state machine.
//!
//! [`AssessmentSession::apply`] is a pure reducer: it never sleeps, spawns or
//! performs I/O. Timers and persistence are requested as [`Effect`]s and
//! their completions come back in as [`Event`]s.

mod event;
mod session;

pub use event::{Effect, Event, SubmitPrompt};
pub use session::{AssessmentSession, PendingSubmission, Phase, PhaseKind, TransitionError};

#[cfg(test)]
mod tests;
