//! Custom selectors - per-domain overrides entered by the user
//!
//! These sit on top of platform mappings for job boards that no mapping
//! covers. The API does not merge the two; the extension decides precedence.
//! Several overrides may exist for the same `(domain, field_name)`; all of
//! them are returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for creating an override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomSelector {
    /// Literal host, e.g. `jobs.apple.com`
    pub domain: String,
    pub field_name: String,
    /// A single CSS selector
    pub selector: String,
}

impl NewCustomSelector {
    pub fn new(domain: impl Into<String>, field_name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            field_name: field_name.into(),
            selector: selector.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSelector {
    pub id: i64,
    pub domain: String,
    pub field_name: String,
    pub selector: String,
    pub created_at: DateTime<Utc>,
}
