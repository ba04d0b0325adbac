mod runner;
mod service;

pub use runner::{AssessmentRunner, RunnerOutcome};
pub use service::AssessmentService;
