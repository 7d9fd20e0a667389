// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded auth-record database backed by redb (pure Rust, ACID).
//!
//! Every mutation runs in one write transaction covering the record and its
//! index entries, so the indexes never disagree with the records.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use uuid::Uuid;

use super::{AuthRecord, StoreError, StoreResult};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: record id → serialized AuthRecord (JSON bytes).
const AUTH_RECORDS: TableDefinition<&str, &[u8]> = TableDefinition::new("auth_records");

/// Unique index: user_id → record id.
const USER_INDEX: TableDefinition<&str, &str> = TableDefinition::new("auth_user_index");

/// Index: refresh token hash → record id.
const REFRESH_INDEX: TableDefinition<&str, &str> = TableDefinition::new("auth_refresh_index");

// =============================================================================
// AuthDatabase
// =============================================================================

pub struct AuthDatabase {
    db: Database,
}

impl AuthDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(format!("cannot create {}: {e}", parent.display())))?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(AUTH_RECORDS)?;
            let _ = write_txn.open_table(USER_INDEX)?;
            let _ = write_txn.open_table(REFRESH_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn find_by_user_id(&self, user_id: &str) -> StoreResult<AuthRecord> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USER_INDEX)?;
        let id = match index.get(user_id)? {
            Some(value) => value.value().to_string(),
            None => return Err(StoreError::NotFound(format!("auth record for user {user_id}"))),
        };
        let records = read_txn.open_table(AUTH_RECORDS)?;
        load_visible(&records, &id)
    }

    pub fn find_by_refresh_hash(&self, refresh_hash: &str) -> StoreResult<AuthRecord> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(REFRESH_INDEX)?;
        let id = match index.get(refresh_hash)? {
            Some(value) => value.value().to_string(),
            None => return Err(StoreError::NotFound("auth record for refresh token".to_string())),
        };
        let records = read_txn.open_table(AUTH_RECORDS)?;
        let record = load_visible(&records, &id)?;

        // Guard against a stale index entry
        if record.refresh_token_hash.as_deref() != Some(refresh_hash) {
            return Err(StoreError::NotFound("auth record for refresh token".to_string()));
        }
        Ok(record)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert a new record. Fails with `AlreadyExists` if the user already
    /// has one.
    pub fn create(&self, record: &AuthRecord) -> StoreResult<()> {
        let id = record.id.to_string();
        let json = serde_json::to_vec(record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USER_INDEX)?;
            if users.get(record.user_id.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!(
                    "auth record for user {}",
                    record.user_id
                )));
            }

            let mut records = write_txn.open_table(AUTH_RECORDS)?;
            if records.get(id.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("auth record {id}")));
            }

            records.insert(id.as_str(), json.as_slice())?;
            users.insert(record.user_id.as_str(), id.as_str())?;

            if let Some(hash) = &record.refresh_token_hash {
                let mut refresh = write_txn.open_table(REFRESH_INDEX)?;
                refresh.insert(hash.as_str(), id.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Overwrite an existing record and re-point the refresh index.
    pub fn update(&self, record: &AuthRecord) -> StoreResult<AuthRecord> {
        let id = record.id.to_string();

        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut records = write_txn.open_table(AUTH_RECORDS)?;
            let existing = load_visible(&records, &id)?;

            if existing.user_id != record.user_id {
                return Err(StoreError::Conflict(format!(
                    "auth record {id} belongs to another user"
                )));
            }

            let mut updated = record.clone();
            updated.created_at = existing.created_at;
            updated.updated_at = Utc::now();

            let json = serde_json::to_vec(&updated)?;
            records.insert(id.as_str(), json.as_slice())?;

            let mut refresh = write_txn.open_table(REFRESH_INDEX)?;
            repoint_refresh_index(
                &mut refresh,
                existing.refresh_token_hash.as_deref(),
                updated.refresh_token_hash.as_deref(),
                &id,
            )?;
            updated
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Compare-and-swap the refresh hash inside one write transaction.
    pub fn rotate_refresh_token(
        &self,
        id: Uuid,
        expected_hash: &str,
        new_hash: &str,
    ) -> StoreResult<AuthRecord> {
        let id = id.to_string();

        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut records = write_txn.open_table(AUTH_RECORDS)?;
            let mut record = load_visible(&records, &id)?;

            if record.refresh_token_hash.as_deref() != Some(expected_hash) {
                return Err(StoreError::Conflict(format!(
                    "refresh token of auth record {id} was already rotated"
                )));
            }

            record.refresh_token_hash = Some(new_hash.to_string());
            record.updated_at = Utc::now();

            let json = serde_json::to_vec(&record)?;
            records.insert(id.as_str(), json.as_slice())?;

            let mut refresh = write_txn.open_table(REFRESH_INDEX)?;
            repoint_refresh_index(&mut refresh, Some(expected_hash), Some(new_hash), &id)?;
            record
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Open a read transaction to prove the file is usable.
    pub fn ping(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(AUTH_RECORDS)?;
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn load_visible<T>(records: &T, id: &str) -> StoreResult<AuthRecord>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let record: AuthRecord = match records.get(id)? {
        Some(value) => serde_json::from_slice(value.value())?,
        None => return Err(StoreError::NotFound(format!("auth record {id}"))),
    };
    if record.is_deleted() {
        return Err(StoreError::NotFound(format!("auth record {id}")));
    }
    Ok(record)
}

fn repoint_refresh_index(
    refresh: &mut redb::Table<'_, &'static str, &'static str>,
    old_hash: Option<&str>,
    new_hash: Option<&str>,
    id: &str,
) -> StoreResult<()> {
    if old_hash == new_hash {
        return Ok(());
    }
    if let Some(old) = old_hash {
        refresh.remove(old)?;
    }
    if let Some(new) = new_hash {
        refresh.insert(new, id)?;
    }
    Ok(())
}
