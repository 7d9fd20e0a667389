// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `AuthStore` implementation over [`AuthDatabase`].
//!
//! redb is synchronous; each call runs on the blocking pool so request tasks
//! never stall the runtime on file I/O.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::{AuthDatabase, AuthRecord, AuthStore, StoreError, StoreResult};

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct RedbAuthStore {
    db: Arc<AuthDatabase>,
    timeout: Duration,
}

impl RedbAuthStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        Ok(Self {
            db: Arc::new(AuthDatabase::open(path)?),
            timeout: DEFAULT_STORE_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Release this handle on the blocking pool. The database file is
    /// closed once the last handle is gone.
    pub async fn close(self) -> StoreResult<()> {
        let handles = Arc::strong_count(&self.db);
        if handles > 1 {
            tracing::warn!(handles, "Auth store still shared at close");
        }
        let db = self.db;
        tokio::task::spawn_blocking(move || drop(db))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))
    }

    async fn blocking<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&AuthDatabase) -> StoreResult<T> + Send + 'static,
    {
        let db = self.db.clone();
        let task = tokio::task::spawn_blocking(move || op(&db));
        // An elapsed call keeps running on the blocking pool; its write may
        // still commit.
        tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| StoreError::Unavailable(format!("store call timed out after {:?}", self.timeout)))?
            .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))?
    }
}

#[async_trait]
impl AuthStore for RedbAuthStore {
    async fn find_by_user_id(&self, user_id: &str) -> StoreResult<AuthRecord> {
        let user_id = user_id.to_string();
        self.blocking(move |db| db.find_by_user_id(&user_id)).await
    }

    async fn find_by_refresh_hash(&self, refresh_hash: &str) -> StoreResult<AuthRecord> {
        let refresh_hash = refresh_hash.to_string();
        self.blocking(move |db| db.find_by_refresh_hash(&refresh_hash)).await
    }

    async fn create(&self, record: &AuthRecord) -> StoreResult<()> {
        let record = record.clone();
        self.blocking(move |db| db.create(&record)).await
    }

    async fn update(&self, record: &AuthRecord) -> StoreResult<AuthRecord> {
        let record = record.clone();
        self.blocking(move |db| db.update(&record)).await
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        expected_hash: &str,
        new_hash: &str,
    ) -> StoreResult<AuthRecord> {
        let expected_hash = expected_hash.to_string();
        let new_hash = new_hash.to_string();
        self.blocking(move |db| db.rotate_refresh_token(id, &expected_hash, &new_hash))
            .await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.blocking(|db| db.ping()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use tempfile::TempDir;

    #[tokio::test]
    async fn concurrent_rotations_have_one_winner() {
        let dir = TempDir::new().unwrap();
        let store = RedbAuthStore::open(&dir.path().join("auth.redb")).unwrap();

        let mut record = AuthRecord::new("user-1", Role::User);
        record.refresh_token_hash = Some("hash-0".to_string());
        store.create(&record).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            let id = record.id;
            handles.push(tokio::spawn(async move {
                store
                    .rotate_refresh_token(id, "hash-0", &format!("hash-{}", i + 1))
                    .await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(StoreError::Conflict(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(winners, 1);
        assert!(store.find_by_refresh_hash("hash-0").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn async_roundtrip_through_blocking_pool() {
        let dir = TempDir::new().unwrap();
        let store = RedbAuthStore::open(&dir.path().join("auth.redb")).unwrap();
        store.ping().await.unwrap();

        let record = AuthRecord::new("user-2", Role::Admin);
        store.create(&record).await.unwrap();
        assert_eq!(store.find_by_user_id("user-2").await.unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn slow_call_times_out_as_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = RedbAuthStore::open(&dir.path().join("auth.redb"))
            .unwrap()
            .with_timeout(Duration::from_millis(20));

        let result = store
            .blocking(|_| {
                std::thread::sleep(Duration::from_millis(300));
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(StoreError::Unavailable(msg)) if msg.contains("timed out")));
    }

    #[tokio::test]
    async fn close_releases_the_file_for_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("auth.redb");
        let store = RedbAuthStore::open(&path).unwrap();
        store.create(&AuthRecord::new("user-3", Role::User)).await.unwrap();
        store.close().await.unwrap();

        let reopened = RedbAuthStore::open(&path).unwrap();
        assert!(reopened.find_by_user_id("user-3").await.is_ok());
    }
}
