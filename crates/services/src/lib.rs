#![forbid(unsafe_code)]

pub mod app_services;
pub mod assessment;
pub mod error;
pub mod history_service;
pub mod session_state_service;

pub use learn_core::Clock;

pub use app_services::AppServices;
pub use assessment::{AssessmentRunner, AssessmentService, RunnerOutcome};
pub use error::{
    AppServicesError, AssessmentError, HistoryError, LoadError, SessionStateServiceError,
};
pub use history_service::{QuizProgress, ResultHistoryService, ResultListItem};
pub use session_state_service::SessionStateService;
