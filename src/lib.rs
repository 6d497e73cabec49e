//! # Autofill API - backend for the job application autofill extension
//!
//! Stores everything the extension needs to find form fields on ATS pages:
//! - Field mappings: ordered CSS selector candidates per platform and field
//! - Application logs: one immutable record per autofill attempt
//! - Custom selectors: per-domain overrides entered by the user
//! - A seeder that bootstraps the default Greenhouse mappings
//!
//! Everything is persisted in SQLite and served over HTTP+JSON.

pub mod mapping;
pub mod attempt;
pub mod selector;
pub mod seed;
pub mod storage;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use mapping::{FieldMapping, FieldType, NewFieldMapping, PlatformMappings};
pub use attempt::{ApplicationLog, NewApplicationLog};
pub use selector::{CustomSelector, NewCustomSelector};
pub use seed::SeedOutcome;
pub use storage::SqliteStore;

/// Result type alias for Autofill API operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Autofill API operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The referenced row does not exist. Carries the entity label used in
    /// the client-facing message ("Mapping", "Selector").
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Unknown field type: {0}")]
    InvalidFieldType(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
