#![forbid(unsafe_code)]

pub mod vm;

pub use vm::{ViewError, ViewState};
