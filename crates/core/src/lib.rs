#![forbid(unsafe_code)]

pub mod assessment;
pub mod grading;
pub mod model;
pub mod time;

pub use time::Clock;
