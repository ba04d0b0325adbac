#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    AuthGateway, FlagStore, InMemoryRepository, QuizRepository, QuizResultRow, ResultRepository,
    Storage, StorageError,
};
