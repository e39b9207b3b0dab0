//! Use-Case Tracking
//!
//! Per-owner, per-discovery-type sets of every use-case name seen so far.
//! Sets only grow. Adding members is a single atomic add-to-set operation
//! on the store, so concurrent merges for the same key never lose names.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::{params, TransactionBehavior};

use avagama_core::DiscoveryType;
use avagama_normalize::NameList;

use crate::storage::database::Database;
use crate::utils::error::{AppError, AppResult};

/// Durable storage for tracking sets.
pub trait TrackingStore: Send + Sync {
    /// Atomically add `names` to the set for `(owner_id, discovery_type)`,
    /// creating it on first use. Returns how many names were new.
    fn add_members(
        &self,
        owner_id: &str,
        discovery_type: DiscoveryType,
        names: &NameList,
    ) -> AppResult<usize>;

    /// Members in first-seen order; empty when the set does not exist.
    fn members(&self, owner_id: &str, discovery_type: DiscoveryType) -> AppResult<NameList>;
}

/// Merge newly discovered names into the owner's tracking set.
///
/// An empty list returns immediately without touching the store.
pub fn merge_discovered_names(
    store: &dyn TrackingStore,
    owner_id: &str,
    discovery_type: DiscoveryType,
    names: &NameList,
) -> AppResult<usize> {
    if names.is_empty() {
        return Ok(0);
    }

    let added = store.add_members(owner_id, discovery_type, names)?;
    tracing::debug!(
        owner_id,
        discovery_type = discovery_type.as_str(),
        offered = names.len(),
        added,
        "Merged discovered use-case names"
    );
    Ok(added)
}

// ============================================================================
// SQLite store
// ============================================================================

/// Tracking sets stored in the `use_case_tracking` table
#[derive(Clone)]
pub struct SqliteTrackingStore {
    db: Database,
}

impl SqliteTrackingStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl TrackingStore for SqliteTrackingStore {
    fn add_members(
        &self,
        owner_id: &str,
        discovery_type: DiscoveryType,
        names: &NameList,
    ) -> AppResult<usize> {
        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut added = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO use_case_tracking (owner_id, discovery_type, name)
                 VALUES (?1, ?2, ?3)",
            )?;
            for name in names {
                added += stmt.execute(params![owner_id, discovery_type.as_str(), name])?;
            }
        }

        tx.commit()?;
        Ok(added)
    }

    fn members(&self, owner_id: &str, discovery_type: DiscoveryType) -> AppResult<NameList> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM use_case_tracking
             WHERE owner_id = ?1 AND discovery_type = ?2
             ORDER BY rowid",
        )?;
        let names = stmt
            .query_map(params![owner_id, discovery_type.as_str()], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NameList::from(names))
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local tracking sets, lost on exit.
///
/// Passed to `AppState::with_tracking` when tracking should not be persisted.
#[derive(Default)]
pub struct InMemoryTrackingStore {
    sets: Mutex<HashMap<(String, DiscoveryType), NameList>>,
}

impl InMemoryTrackingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackingStore for InMemoryTrackingStore {
    fn add_members(
        &self,
        owner_id: &str,
        discovery_type: DiscoveryType,
        names: &NameList,
    ) -> AppResult<usize> {
        let mut sets = self
            .sets
            .lock()
            .map_err(|e| AppError::internal(format!("Tracking store lock poisoned: {}", e)))?;
        let set = sets
            .entry((owner_id.to_string(), discovery_type))
            .or_default();
        Ok(names.iter().filter(|name| set.insert(name)).count())
    }

    fn members(&self, owner_id: &str, discovery_type: DiscoveryType) -> AppResult<NameList> {
        let sets = self
            .sets
            .lock()
            .map_err(|e| AppError::internal(format!("Tracking store lock poisoned: {}", e)))?;
        Ok(sets
            .get(&(owner_id.to_string(), discovery_type))
            .cloned()
            .unwrap_or_default())
    }
}
