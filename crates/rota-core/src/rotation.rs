//! Persistent rotation records using redb.
//!
//! # Table design
//!
//! A single `ROTATION` table keyed by the user handle (e.g. `@alice`), with
//! the `last_delivered` epoch-millisecond timestamp as the value. Writes are
//! last-write-wins per key; no history is kept.

use std::path::Path;

use redb::{Database, DatabaseError, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RotaError};

// ---------------------------------------------------------------------------
// Table definition
// ---------------------------------------------------------------------------

/// Key: user handle. Value: last delivery, epoch milliseconds.
const ROTATION: TableDefinition<&str, i64> = TableDefinition::new("rotation");

fn store_err(e: impl std::fmt::Display) -> RotaError {
    RotaError::Store(e.to_string())
}

// ---------------------------------------------------------------------------
// RotationEntry
// ---------------------------------------------------------------------------

/// When a user last presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationEntry {
    pub user: String,
    #[serde(rename = "lastDelivered")]
    pub last_delivered: i64,
}

impl RotationEntry {
    pub fn new(user: impl Into<String>, last_delivered: i64) -> Self {
        Self {
            user: user.into(),
            last_delivered,
        }
    }
}

// ---------------------------------------------------------------------------
// RotationStore
// ---------------------------------------------------------------------------

pub trait RotationStore: Send + Sync {
    /// Create or overwrite the entry for `entry.user`.
    fn put(&self, entry: &RotationEntry) -> Result<()>;

    /// Delete the entry for `user`. Deleting a missing user is not an error.
    fn remove(&self, user: &str) -> Result<()>;

    fn get(&self, user: &str) -> Result<Option<RotationEntry>>;

    /// All entries, longest-waiting first.
    fn list(&self) -> Result<Vec<RotationEntry>>;
}

// ---------------------------------------------------------------------------
// RedbRotationStore
// ---------------------------------------------------------------------------

pub struct RedbRotationStore {
    db: Database,
}

impl RedbRotationStore {
    /// Open or create the redb database at `path`.
    ///
    /// Creates the `ROTATION` table if it doesn't already exist. redb holds an
    /// exclusive lock for the life of the handle, so a second open of the same
    /// file fails with [`RotaError::StoreLocked`].
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path).map_err(|e| match e {
            DatabaseError::DatabaseAlreadyOpen => RotaError::StoreLocked(path.to_path_buf()),
            other => store_err(other),
        })?;
        let wt = db.begin_write().map_err(store_err)?;
        wt.open_table(ROTATION).map_err(store_err)?;
        wt.commit().map_err(store_err)?;
        Ok(Self { db })
    }
}

impl RotationStore for RedbRotationStore {
    fn put(&self, entry: &RotationEntry) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        {
            let mut table = wt.open_table(ROTATION).map_err(store_err)?;
            table
                .insert(entry.user.as_str(), entry.last_delivered)
                .map_err(store_err)?;
        }
        wt.commit().map_err(store_err)?;
        tracing::debug!(user = %entry.user, last_delivered = entry.last_delivered, "rotation entry written");
        Ok(())
    }

    fn remove(&self, user: &str) -> Result<()> {
        let wt = self.db.begin_write().map_err(store_err)?;
        let existed = {
            let mut table = wt.open_table(ROTATION).map_err(store_err)?;
            let old = table.remove(user).map_err(store_err)?;
            old.is_some()
        };
        wt.commit().map_err(store_err)?;
        tracing::debug!(user, existed, "rotation entry removed");
        Ok(())
    }

    fn get(&self, user: &str) -> Result<Option<RotationEntry>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(ROTATION).map_err(store_err)?;
        let value = table.get(user).map_err(store_err)?;
        Ok(value.map(|v| RotationEntry::new(user, v.value())))
    }

    fn list(&self) -> Result<Vec<RotationEntry>> {
        let rt = self.db.begin_read().map_err(store_err)?;
        let table = rt.open_table(ROTATION).map_err(store_err)?;

        let mut result = Vec::new();
        for entry in table.iter().map_err(store_err)? {
            let (k, v) = entry.map_err(store_err)?;
            result.push(RotationEntry::new(k.value(), v.value()));
        }
        result.sort_by(|a, b| {
            a.last_delivered
                .cmp(&b.last_delivered)
                .then_with(|| a.user.cmp(&b.user))
        });
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
