// Persistence for feedback and feature usage.

pub mod sqlite;

pub use sqlite::SqliteStorage;
