//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with three independent tables:
//! - field_mappings(platform, field_name, selectors, field_type)
//! - application_logs(url, platform, fields_filled, fields_failed, resume_uploaded)
//! - custom_selectors(domain, field_name, selector)
//!
//! There are no foreign keys between them.

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, DbStats};
