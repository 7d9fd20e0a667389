// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Auth Record Storage
//!
//! Durable storage for the per-user auth record: user id, role and the digest
//! of the most recently issued refresh token.
//!
//! ## Invariants
//!
//! - Exactly one record per `user_id` (`create` refuses duplicates).
//! - `refresh_token_hash` is never a raw token. It always belongs to the
//!   latest issued refresh token, so older refresh tokens stop resolving as
//!   soon as it is replaced.
//! - Records are created once, at first login, and afterwards only their
//!   refresh hash changes. `deleted_at` exists for soft deletion but is not
//!   set by this service; soft-deleted records are invisible to lookups.
//!
//! ## Layout
//!
//! ```text
//! auth_records        id            -> JSON AuthRecord
//! auth_user_index     user_id       -> id
//! auth_refresh_index  refresh_hash  -> id
//! ```

pub mod auth_database;
pub mod redb_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

pub use auth_database::AuthDatabase;
pub use redb_store::RedbAuthStore;

/// Durable auth entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub id: Uuid,
    /// Unique
    pub user_id: String,
    pub role: Role,
    /// base64(SHA-256(raw refresh token)); `None` until the first issuance
    #[serde(default)]
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AuthRecord {
    /// A fresh record for a newly provisioned user.
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            role,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A conditional update lost against a concurrent writer.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence port for auth records.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn find_by_user_id(&self, user_id: &str) -> StoreResult<AuthRecord>;

    async fn find_by_refresh_hash(&self, refresh_hash: &str) -> StoreResult<AuthRecord>;

    async fn create(&self, record: &AuthRecord) -> StoreResult<()>;

    /// Overwrite the record with the same id, bumping `updated_at`.
    async fn update(&self, record: &AuthRecord) -> StoreResult<AuthRecord>;

    /// Replace the refresh hash only if it still equals `expected_hash`.
    ///
    /// Returns `Conflict` when another writer rotated first.
    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        expected_hash: &str,
        new_hash: &str,
    ) -> StoreResult<AuthRecord>;

    /// Cheap reachability check for readiness checks.
    async fn ping(&self) -> StoreResult<()>;
}
