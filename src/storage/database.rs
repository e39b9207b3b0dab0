//! SQLite Database
//!
//! Embedded database for persistent storage using rusqlite with r2d2 connection pooling.
//!
//! Holds the per-owner discovery history, the use-case tracking sets and
//! evaluation records. Structured columns (agent responses, name lists,
//! parsed content) are stored as JSON text.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use avagama_core::{DiscoveryType, RecordStatus};
use avagama_normalize::{ContentResult, NameList};

use crate::models::discovery::DiscoveryRecord;
use crate::models::evaluation::{EvaluationRecord, EvaluationRequest};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{database_path, ensure_dir};

/// Raw discovery history row from the database
#[derive(Debug, Clone)]
pub struct StoredDiscoveryRow {
    pub id: String,
    pub owner_id: String,
    pub discovery_type: String,
    pub input: String,
    pub formatted_message: String,
    pub agent_response: String,
    pub names: String,
    pub status: String,
    pub agent_error: Option<String>,
    pub created_at: String,
}

impl StoredDiscoveryRow {
    fn into_record(self) -> AppResult<DiscoveryRecord> {
        Ok(DiscoveryRecord {
            id: self.id,
            owner_id: self.owner_id,
            discovery_type: self.discovery_type.parse::<DiscoveryType>()?,
            input: serde_json::from_str(&self.input)?,
            formatted_message: self.formatted_message,
            agent_response: serde_json::from_str(&self.agent_response)?,
            names: serde_json::from_str::<NameList>(&self.names)?,
            status: self.status.parse::<RecordStatus>()?,
            agent_error: self
                .agent_error
                .as_deref()
                .map(serde_json::from_str::<Value>)
                .transpose()?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Raw evaluation row from the database
#[derive(Debug, Clone)]
pub struct StoredEvaluationRow {
    pub id: String,
    pub owner_id: String,
    pub process_name: String,
    pub submitted_payload: String,
    pub formatted_message: String,
    pub agent_response: Option<String>,
    pub parsed_content: Option<String>,
    pub status: String,
    pub is_shortlisted: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl StoredEvaluationRow {
    fn into_record(self) -> AppResult<EvaluationRecord> {
        Ok(EvaluationRecord {
            id: self.id,
            owner_id: self.owner_id,
            process_name: self.process_name,
            submitted_payload: serde_json::from_str::<EvaluationRequest>(&self.submitted_payload)?,
            formatted_message: self.formatted_message,
            agent_response: self
                .agent_response
                .as_deref()
                .map(serde_json::from_str::<Value>)
                .transpose()?,
            parsed_content: self
                .parsed_content
                .as_deref()
                .map(serde_json::from_str::<StoredContent>)
                .transpose()?
                .map(ContentResult::from),
            status: self.status.parse::<RecordStatus>()?,
            is_shortlisted: self.is_shortlisted,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Column form of `ContentResult`, tagged so a parsed mapping that happens
/// to look like `{"raw_text": ...}` reads back as `Parsed`.
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
enum StoredContent {
    Parsed(Map<String, Value>),
    RawText(String),
}

impl From<&ContentResult> for StoredContent {
    fn from(content: &ContentResult) -> Self {
        match content {
            ContentResult::Parsed(map) => StoredContent::Parsed(map.clone()),
            ContentResult::RawText(text) => StoredContent::RawText(text.clone()),
        }
    }
}

impl From<StoredContent> for ContentResult {
    fn from(stored: StoredContent) -> Self {
        match stored {
            StoredContent::Parsed(map) => ContentResult::Parsed(map),
            StoredContent::RawText(text) => ContentResult::RawText(text),
        }
    }
}

fn parsed_content_column(content: Option<&ContentResult>) -> AppResult<Option<String>> {
    Ok(content
        .map(|c| serde_json::to_string(&StoredContent::from(c)))
        .transpose()?)
}

const EVALUATION_COLUMNS: &str = "id, owner_id, process_name, submitted_payload, formatted_message,
     agent_response, parsed_content, status, is_shortlisted, created_at, updated_at";

fn evaluation_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredEvaluationRow> {
    Ok(StoredEvaluationRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        process_name: row.get(2)?,
        submitted_payload: row.get(3)?,
        formatted_message: row.get(4)?,
        agent_response: row.get(5)?,
        parsed_content: row.get(6)?,
        status: row.get(7)?,
        is_shortlisted: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Fixed-width UTC timestamp; sorts lexicographically in time order.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(text: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid timestamp '{}': {}", text, e)))
}

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Database service for managing SQLite operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create an in-memory database for testing.
    ///
    /// Every connection to `:memory:` is a separate database, so the pool
    /// holds exactly one connection; concurrent callers wait for it.
    pub fn new_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Open the database at ~/.avagama/data.db
    pub fn new() -> AppResult<Self> {
        Self::open(&database_path()?)
    }

    /// Open (or create) a database file with connection pooling
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            ensure_dir(parent)?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch("PRAGMA journal_mode = WAL;")
        });
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;

        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> AppResult<()> {
        let conn = self.get_connection()?;

        // Discovery history: one row per discovery call
        conn.execute(
            "CREATE TABLE IF NOT EXISTS discovery_history (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                discovery_type TEXT NOT NULL,
                input TEXT NOT NULL,
                formatted_message TEXT NOT NULL,
                agent_response TEXT NOT NULL,
                names TEXT NOT NULL DEFAULT '[]',
                status TEXT NOT NULL,
                agent_error TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_discovery_history_owner
             ON discovery_history(owner_id, discovery_type, created_at DESC)",
            [],
        )?;

        // Tracking sets: one row per (owner, type, name) member
        conn.execute(
            "CREATE TABLE IF NOT EXISTS use_case_tracking (
                owner_id TEXT NOT NULL,
                discovery_type TEXT NOT NULL,
                name TEXT NOT NULL,
                first_seen_at TEXT DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (owner_id, discovery_type, name)
            )",
            [],
        )?;

        // Evaluations
        conn.execute(
            "CREATE TABLE IF NOT EXISTS evaluations (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                process_name TEXT NOT NULL,
                submitted_payload TEXT NOT NULL,
                formatted_message TEXT NOT NULL DEFAULT '',
                agent_response TEXT,
                parsed_content TEXT,
                status TEXT NOT NULL,
                is_shortlisted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_evaluations_owner
             ON evaluations(owner_id, created_at DESC)",
            [],
        )?;

        // Evaluation usage: only ever incremented, deletes do not give quota back
        conn.execute(
            "CREATE TABLE IF NOT EXISTS evaluation_usage (
                owner_id TEXT PRIMARY KEY,
                used INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> AppResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Check if the database is healthy
    pub fn is_healthy(&self) -> bool {
        if let Ok(conn) = self.pool.get() {
            conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
        } else {
            false
        }
    }

    // ========================================================================
    // Discovery history
    // ========================================================================

    /// Append a discovery record to its owner's history
    pub fn insert_discovery(&self, record: &DiscoveryRecord) -> AppResult<()> {
        let conn = self.get_connection()?;
        let agent_error = record
            .agent_error
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        conn.execute(
            "INSERT INTO discovery_history
             (id, owner_id, discovery_type, input, formatted_message, agent_response,
              names, status, agent_error, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id,
                record.owner_id,
                record.discovery_type.as_str(),
                serde_json::to_string(&record.input)?,
                record.formatted_message,
                serde_json::to_string(&record.agent_response)?,
                serde_json::to_string(&record.names)?,
                record.status.as_str(),
                agent_error,
                format_timestamp(&record.created_at),
            ],
        )?;
        Ok(())
    }

    /// An owner's discovery records of one type, newest first
    pub fn list_discoveries(
        &self,
        owner_id: &str,
        discovery_type: DiscoveryType,
    ) -> AppResult<Vec<DiscoveryRecord>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, discovery_type, input, formatted_message, agent_response,
                    names, status, agent_error, created_at
             FROM discovery_history
             WHERE owner_id = ?1 AND discovery_type = ?2
             ORDER BY created_at DESC, rowid DESC",
        )?;

        let rows = stmt
            .query_map(params![owner_id, discovery_type.as_str()], |row| {
                Ok(StoredDiscoveryRow {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    discovery_type: row.get(2)?,
                    input: row.get(3)?,
                    formatted_message: row.get(4)?,
                    agent_response: row.get(5)?,
                    names: row.get(6)?,
                    status: row.get(7)?,
                    agent_error: row.get(8)?,
                    created_at: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(StoredDiscoveryRow::into_record).collect()
    }

    // ========================================================================
    // Evaluations
    // ========================================================================

    /// Insert a new evaluation record.
    ///
    /// A record that is not a draft counts towards its owner's usage in the
    /// same transaction.
    pub fn insert_evaluation(&self, record: &EvaluationRecord) -> AppResult<()> {
        let conn = self.get_connection()?;
        let agent_response = record
            .agent_response
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let parsed_content = parsed_content_column(record.parsed_content.as_ref())?;

        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO evaluations
             (id, owner_id, process_name, submitted_payload, formatted_message,
              agent_response, parsed_content, status, is_shortlisted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.id,
                record.owner_id,
                record.process_name,
                serde_json::to_string(&record.submitted_payload)?,
                record.formatted_message,
                agent_response,
                parsed_content,
                record.status.as_str(),
                record.is_shortlisted,
                format_timestamp(&record.created_at),
                format_timestamp(&record.updated_at),
            ],
        )?;
        if record.status != RecordStatus::Draft {
            increment_usage(&tx, &record.owner_id)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Overwrite one of an owner's evaluations in place, keeping its
    /// `created_at`.
    ///
    /// Returns false when no such evaluation exists for the owner. Moving a
    /// draft to any other status counts towards the owner's usage in the
    /// same transaction.
    pub fn update_evaluation(&self, record: &EvaluationRecord) -> AppResult<bool> {
        let conn = self.get_connection()?;
        let agent_response = record
            .agent_response
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let parsed_content = parsed_content_column(record.parsed_content.as_ref())?;

        let tx = conn.unchecked_transaction()?;
        let previous: Option<String> = tx
            .query_row(
                "SELECT status FROM evaluations WHERE id = ?1 AND owner_id = ?2",
                params![record.id, record.owner_id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        let Some(previous) = previous else {
            return Ok(false);
        };

        tx.execute(
            "UPDATE evaluations
             SET process_name = ?3, submitted_payload = ?4, formatted_message = ?5,
                 agent_response = ?6, parsed_content = ?7, status = ?8,
                 is_shortlisted = ?9, updated_at = ?10
             WHERE id = ?1 AND owner_id = ?2",
            params![
                record.id,
                record.owner_id,
                record.process_name,
                serde_json::to_string(&record.submitted_payload)?,
                record.formatted_message,
                agent_response,
                parsed_content,
                record.status.as_str(),
                record.is_shortlisted,
                format_timestamp(&record.updated_at),
            ],
        )?;
        if previous.parse::<RecordStatus>()? == RecordStatus::Draft
            && record.status != RecordStatus::Draft
        {
            increment_usage(&tx, &record.owner_id)?;
        }
        tx.commit()?;
        Ok(true)
    }

    /// Get one of an owner's evaluations
    pub fn get_evaluation(&self, owner_id: &str, id: &str) -> AppResult<Option<EvaluationRecord>> {
        let conn = self.get_connection()?;
        let sql = format!(
            "SELECT {} FROM evaluations WHERE id = ?1 AND owner_id = ?2",
            EVALUATION_COLUMNS
        );
        let result = conn.query_row(&sql, params![id, owner_id], evaluation_row);

        match result {
            Ok(row) => Ok(Some(row.into_record()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::database(e.to_string())),
        }
    }

    /// An owner's evaluations, newest first
    pub fn list_evaluations(&self, owner_id: &str) -> AppResult<Vec<EvaluationRecord>> {
        let conn = self.get_connection()?;
        let sql = format!(
            "SELECT {} FROM evaluations WHERE owner_id = ?1 ORDER BY created_at DESC, rowid DESC",
            EVALUATION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![owner_id], evaluation_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(StoredEvaluationRow::into_record).collect()
    }

    /// Number of evaluations an owner has ever completed, deleted ones included
    pub fn evaluation_usage(&self, owner_id: &str) -> AppResult<u32> {
        let conn = self.get_connection()?;
        let used: Option<u32> = conn
            .query_row(
                "SELECT used FROM evaluation_usage WHERE owner_id = ?1",
                params![owner_id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(used.unwrap_or(0))
    }

    /// Delete one of an owner's evaluations; returns whether it existed
    pub fn delete_evaluation(&self, owner_id: &str, id: &str) -> AppResult<bool> {
        let conn = self.get_connection()?;
        let deleted = conn.execute(
            "DELETE FROM evaluations WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )?;
        Ok(deleted > 0)
    }

    /// Mark evaluations as shortlisted in one transaction.
    ///
    /// Repeated ids are handled once. Fails without changes if any of them
    /// is already shortlisted. Returns the number of evaluations updated.
    pub fn shortlist_evaluations(&self, owner_id: &str, ids: &[String]) -> AppResult<usize> {
        let mut unique: Vec<&str> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id.as_str()) {
                unique.push(id.as_str());
            }
        }

        let conn = self.get_connection()?;
        let tx = conn.unchecked_transaction()?;

        for id in &unique {
            let already: bool = tx
                .query_row(
                    "SELECT is_shortlisted FROM evaluations WHERE id = ?1 AND owner_id = ?2",
                    params![id, owner_id],
                    |row| row.get(0),
                )
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(false),
                    other => Err(other),
                })?;
            if already {
                return Err(AppError::validation(format!(
                    "Evaluation {} is already shortlisted",
                    id
                )));
            }
        }

        let now = format_timestamp(&Utc::now());
        let mut updated = 0;
        for id in &unique {
            updated += tx.execute(
                "UPDATE evaluations SET is_shortlisted = 1, updated_at = ?3
                 WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id, now],
            )?;
        }

        tx.commit()?;
        Ok(updated)
    }
}

fn increment_usage(conn: &rusqlite::Connection, owner_id: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO evaluation_usage (owner_id, used) VALUES (?1, 1)
         ON CONFLICT(owner_id) DO UPDATE SET used = used + 1",
        params![owner_id],
    )?;
    Ok(())
}
