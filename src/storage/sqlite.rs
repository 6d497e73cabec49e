//! SQLite storage implementation

use std::path::Path;
use std::time::Duration;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use crate::{Error, Result};
use crate::attempt::{self, ApplicationLog, NewApplicationLog};
use crate::mapping::{FieldMapping, FieldType, NewFieldMapping};
use crate::selector::{CustomSelector, NewCustomSelector};
use super::schema;

/// How long a writer waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const FIELD_MAPPING_COLUMNS: &str =
    "id, platform, field_name, selectors, field_type, created_at, updated_at";
const APPLICATION_LOG_COLUMNS: &str =
    "id, url, platform, fields_filled, fields_failed, resume_uploaded, created_at";
const CUSTOM_SELECTOR_COLUMNS: &str = "id, domain, field_name, selector, created_at";

/// SQLite-backed storage for mappings, logs and selector overrides.
///
/// One store wraps one connection. The HTTP layer opens a store per request
/// and drops it when the request finishes.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist) and make sure the
    /// schema is in place
    pub fn open(path: &Path) -> Result<Self> {
        let store = Self::connect(path)?;
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open a connection to a database whose schema is already initialized
    pub fn connect(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Field Mapping Operations ==========

    /// Insert a mapping. No dedup: `(platform, field_name)` may repeat.
    pub fn insert_field_mapping(&mut self, mapping: &NewFieldMapping) -> Result<FieldMapping> {
        let tx = self.conn.transaction()?;
        let record = insert_field_mapping_in(&tx, mapping, Utc::now())?;
        tx.commit()?;
        Ok(record)
    }

    /// All mappings of a platform, oldest first
    pub fn find_field_mappings_by_platform(&self, platform: &str) -> Result<Vec<FieldMapping>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FIELD_MAPPING_COLUMNS} FROM field_mappings WHERE platform = ?1 ORDER BY id ASC"
        ))?;

        let mappings = stmt
            .query_map([platform], row_to_field_mapping)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(mappings)
    }

    /// Replace every field of an existing mapping and stamp `updated_at`
    pub fn update_field_mapping(&mut self, id: i64, mapping: &NewFieldMapping) -> Result<FieldMapping> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            r#"
            UPDATE field_mappings
            SET platform = ?1, field_name = ?2, selectors = ?3, field_type = ?4, updated_at = ?5
            WHERE id = ?6
            "#,
            params![
                mapping.platform,
                mapping.field_name,
                serde_json::to_string(&mapping.selectors)?,
                mapping.field_type.as_str(),
                Utc::now(),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound("Mapping"));
        }

        let record = get_field_mapping_in(&tx, id)?.ok_or(Error::NotFound("Mapping"))?;
        tx.commit()?;
        Ok(record)
    }

    /// Delete a mapping by id
    pub fn delete_field_mapping(&mut self, id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute("DELETE FROM field_mappings WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(Error::NotFound("Mapping"));
        }
        tx.commit()?;
        Ok(())
    }

    /// Insert a platform's default mappings unless the platform already has
    /// rows. Returns the number of rows inserted, or `None` if it was skipped.
    ///
    /// The existence check and the inserts run under one write lock, so two
    /// concurrent calls cannot both seed.
    pub fn seed_platform(&mut self, platform: &str, mappings: &[NewFieldMapping]) -> Result<Option<usize>> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if platform_exists_in(&tx, platform)? {
            return Ok(None);
        }

        let now = Utc::now();
        for mapping in mappings {
            insert_field_mapping_in(&tx, mapping, now)?;
        }
        tx.commit()?;
        Ok(Some(mappings.len()))
    }

    /// Count all mappings
    pub fn count_field_mappings(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM field_mappings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Application Log Operations ==========

    /// Record an autofill attempt
    pub fn insert_application_log(&mut self, log: &NewApplicationLog) -> Result<ApplicationLog> {
        let created_at = Utc::now();
        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO application_logs (url, platform, fields_filled, fields_failed, resume_uploaded, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                log.url,
                log.platform,
                serde_json::to_string(&log.fields_filled)?,
                serde_json::to_string(&log.fields_failed)?,
                attempt::flag::to_int(log.resume_uploaded),
                created_at,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(ApplicationLog {
            id,
            url: log.url.clone(),
            platform: log.platform.clone(),
            fields_filled: log.fields_filled.clone(),
            fields_failed: log.fields_failed.clone(),
            resume_uploaded: log.resume_uploaded,
            created_at,
        })
    }

    /// Most recent logs first. Rows created within the same instant come
    /// back in reverse insertion order. Values past `i64::MAX` saturate.
    pub fn list_application_logs(&self, skip: u64, limit: u64) -> Result<Vec<ApplicationLog>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let skip = i64::try_from(skip).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {APPLICATION_LOG_COLUMNS} FROM application_logs
             ORDER BY created_at DESC, id DESC
             LIMIT ?1 OFFSET ?2"
        ))?;

        let logs = stmt
            .query_map(params![limit, skip], row_to_application_log)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(logs)
    }

    /// Count all logs
    pub fn count_application_logs(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM application_logs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Custom Selector Operations ==========

    /// Insert a selector override. Duplicates are allowed.
    pub fn insert_custom_selector(&mut self, selector: &NewCustomSelector) -> Result<CustomSelector> {
        let created_at = Utc::now();
        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO custom_selectors (domain, field_name, selector, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![selector.domain, selector.field_name, selector.selector, created_at],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(CustomSelector {
            id,
            domain: selector.domain.clone(),
            field_name: selector.field_name.clone(),
            selector: selector.selector.clone(),
            created_at,
        })
    }

    /// Overrides for an exact domain, oldest first
    pub fn find_custom_selectors_by_domain(&self, domain: &str) -> Result<Vec<CustomSelector>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CUSTOM_SELECTOR_COLUMNS} FROM custom_selectors WHERE domain = ?1 ORDER BY id ASC"
        ))?;

        let selectors = stmt
            .query_map([domain], row_to_custom_selector)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(selectors)
    }

    /// Delete a selector override by id
    pub fn delete_custom_selector(&mut self, id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute("DELETE FROM custom_selectors WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(Error::NotFound("Selector"));
        }
        tx.commit()?;
        Ok(())
    }

    /// Count all selector overrides
    pub fn count_custom_selectors(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM custom_selectors", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            field_mappings: self.count_field_mappings()?,
            application_logs: self.count_application_logs()?,
            custom_selectors: self.count_custom_selectors()?,
        })
    }
}

fn insert_field_mapping_in(
    conn: &Connection,
    mapping: &NewFieldMapping,
    created_at: DateTime<Utc>,
) -> Result<FieldMapping> {
    conn.execute(
        r#"
        INSERT INTO field_mappings (platform, field_name, selectors, field_type, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            mapping.platform,
            mapping.field_name,
            serde_json::to_string(&mapping.selectors)?,
            mapping.field_type.as_str(),
            created_at,
        ],
    )?;

    Ok(FieldMapping {
        id: conn.last_insert_rowid(),
        platform: mapping.platform.clone(),
        field_name: mapping.field_name.clone(),
        selectors: mapping.selectors.clone(),
        field_type: mapping.field_type,
        created_at,
        updated_at: None,
    })
}

fn get_field_mapping_in(conn: &Connection, id: i64) -> Result<Option<FieldMapping>> {
    conn.query_row(
        &format!("SELECT {FIELD_MAPPING_COLUMNS} FROM field_mappings WHERE id = ?1"),
        [id],
        row_to_field_mapping,
    )
    .optional()
    .map_err(Into::into)
}

fn platform_exists_in(conn: &Connection, platform: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM field_mappings WHERE platform = ?1)",
        [platform],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Decode a JSON text column into a list of strings
fn json_list(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_field_mapping(row: &rusqlite::Row) -> rusqlite::Result<FieldMapping> {
    let field_type_str: String = row.get(4)?;
    let field_type: FieldType = field_type_str.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(FieldMapping {
        id: row.get(0)?,
        platform: row.get(1)?,
        field_name: row.get(2)?,
        selectors: json_list(row, 3)?,
        field_type,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn row_to_application_log(row: &rusqlite::Row) -> rusqlite::Result<ApplicationLog> {
    let resume_uploaded: i64 = row.get(5)?;

    Ok(ApplicationLog {
        id: row.get(0)?,
        url: row.get(1)?,
        platform: row.get(2)?,
        fields_filled: json_list(row, 3)?,
        fields_failed: json_list(row, 4)?,
        resume_uploaded: attempt::flag::from_int(resume_uploaded),
        created_at: row.get(6)?,
    })
}

fn row_to_custom_selector(row: &rusqlite::Row) -> rusqlite::Result<CustomSelector> {
    Ok(CustomSelector {
        id: row.get(0)?,
        domain: row.get(1)?,
        field_name: row.get(2)?,
        selector: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbStats {
    pub field_mappings: usize,
    pub application_logs: usize,
    pub custom_selectors: usize,
}
