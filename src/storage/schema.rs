//! Database schema definitions
//!
//! Timestamps are stored as text in a single fixed offset (UTC) so they sort
//! lexically. List columns (`selectors`, `fields_filled`, `fields_failed`)
//! hold JSON arrays.

/// SQL to create the field_mappings table
pub const CREATE_FIELD_MAPPINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS field_mappings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    platform TEXT NOT NULL,
    field_name TEXT NOT NULL,
    selectors TEXT NOT NULL DEFAULT '[]',
    field_type TEXT NOT NULL DEFAULT 'input',
    created_at TEXT NOT NULL,
    updated_at TEXT
)
"#;

/// SQL to create the application_logs table
pub const CREATE_APPLICATION_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS application_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    platform TEXT NOT NULL,
    fields_filled TEXT NOT NULL DEFAULT '[]',
    fields_failed TEXT NOT NULL DEFAULT '[]',
    resume_uploaded INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
)
"#;

/// SQL to create the custom_selectors table
/// No uniqueness on (domain, field_name): duplicates are returned to the caller
pub const CREATE_CUSTOM_SELECTORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS custom_selectors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    domain TEXT NOT NULL,
    field_name TEXT NOT NULL,
    selector TEXT NOT NULL,
    created_at TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_field_mappings_platform ON field_mappings(platform)",
    "CREATE INDEX IF NOT EXISTS idx_application_logs_created ON application_logs(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_custom_selectors_domain ON custom_selectors(domain)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_FIELD_MAPPINGS_TABLE,
        CREATE_APPLICATION_LOGS_TABLE,
        CREATE_CUSTOM_SELECTORS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
