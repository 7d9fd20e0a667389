// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-crate test doubles for every port, plus builders for a wired
//! [`AuthService`] and [`AppState`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::{CredentialIssuer, IssuanceSettings, TokenCodec};
use crate::cache::{CacheError, LruSessionCache, SessionCache};
use crate::identity::{
    GoogleProfile, OAuthError, OAuthProvider, SsoCredential, SsoError, TicketVerifier,
};
use crate::profile::{NewUserProfile, ProfileError, UserProfile, UserProfileClient};
use crate::provisioning::PolicyConfig;
use crate::service::AuthService;
use crate::state::AppState;
use crate::storage::{AuthRecord, AuthStore, StoreError, StoreResult};

pub const SECRET: &[u8] = b"asuperstrong32bitpasswordgohere!";
pub const ISSUER: &str = "graderlist-auth";

// =============================================================================
// Session cache
// =============================================================================

/// Cache that is always unreachable.
pub struct DownCache;

#[async_trait]
impl SessionCache for DownCache {
    async fn save(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> Result<String, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

pub fn settings(issuer: &str) -> IssuanceSettings {
    IssuanceSettings {
        issuer: issuer.to_string(),
        access_ttl: Duration::from_secs(3600),
        cache_timeout: Duration::from_secs(5),
    }
}

pub fn issuer_with(cache: Arc<dyn SessionCache>) -> CredentialIssuer {
    CredentialIssuer::new(TokenCodec::new(SECRET), cache, settings(ISSUER))
}

// =============================================================================
// Auth record store
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<HashMap<Uuid, AuthRecord>>,
    pub fail_create: bool,
    pub fail_update: bool,
    pub down: bool,
}

impl MemoryStore {
    pub fn with(records: Vec<AuthRecord>) -> Self {
        let store = Self::default();
        {
            let mut map = store.records.lock().unwrap();
            for r in records {
                map.insert(r.id, r);
            }
        }
        store
    }

    pub fn all(&self) -> Vec<AuthRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn find_by_user_id(&self, user_id: &str) -> StoreResult<AuthRecord> {
        self.records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.user_id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))
    }

    async fn find_by_refresh_hash(&self, refresh_hash: &str) -> StoreResult<AuthRecord> {
        self.records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.refresh_token_hash.as_deref() == Some(refresh_hash))
            .cloned()
            .ok_or_else(|| StoreError::NotFound("refresh".to_string()))
    }

    async fn create(&self, record: &AuthRecord) -> StoreResult<()> {
        if self.fail_create {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        let mut map = self.records.lock().unwrap();
        if map.values().any(|r| r.user_id == record.user_id) {
            return Err(StoreError::AlreadyExists(record.user_id.clone()));
        }
        map.insert(record.id, record.clone());
        Ok(())
    }

    async fn update(&self, record: &AuthRecord) -> StoreResult<AuthRecord> {
        if self.fail_update {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        let mut map = self.records.lock().unwrap();
        if !map.contains_key(&record.id) {
            return Err(StoreError::NotFound(record.id.to_string()));
        }
        map.insert(record.id, record.clone());
        Ok(record.clone())
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        expected_hash: &str,
        new_hash: &str,
    ) -> StoreResult<AuthRecord> {
        let mut map = self.records.lock().unwrap();
        let record = map
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if record.refresh_token_hash.as_deref() != Some(expected_hash) {
            return Err(StoreError::Conflict(id.to_string()));
        }
        record.refresh_token_hash = Some(new_hash.to_string());
        Ok(record.clone())
    }

    async fn ping(&self) -> StoreResult<()> {
        if self.down {
            return Err(StoreError::Unavailable("store closed".to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// User profile service
// =============================================================================

#[derive(Default)]
pub struct FakeUsers {
    pub users: Mutex<Vec<UserProfile>>,
    pub created: Mutex<Vec<NewUserProfile>>,
    pub create_error: Option<ProfileError>,
    pub lookup_error: Option<ProfileError>,
}

impl FakeUsers {
    pub fn with(users: Vec<UserProfile>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Default::default()
        }
    }

    pub fn created(&self) -> Vec<NewUserProfile> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserProfileClient for FakeUsers {
    async fn find_by_email(&self, email: &str) -> Result<UserProfile, ProfileError> {
        if let Some(e) = &self.lookup_error {
            return Err(e.clone());
        }
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(ProfileError::NotFound)
    }

    async fn find_by_student_id(&self, student_id: &str) -> Result<UserProfile, ProfileError> {
        if let Some(e) = &self.lookup_error {
            return Err(e.clone());
        }
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.student_id == student_id)
            .cloned()
            .ok_or(ProfileError::NotFound)
    }

    async fn create(&self, profile: &NewUserProfile) -> Result<UserProfile, ProfileError> {
        if let Some(e) = &self.create_error {
            return Err(e.clone());
        }
        self.created.lock().unwrap().push(profile.clone());
        let user = UserProfile {
            id: format!("user-{}", Uuid::new_v4()),
            email: profile.email.clone(),
            username: profile.username.clone(),
            student_id: profile.student_id.clone(),
            year: profile.year.clone(),
            ..Default::default()
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }
}

// =============================================================================
// Identity providers
// =============================================================================

pub struct FakeSso(pub Result<SsoCredential, SsoError>);

#[async_trait]
impl TicketVerifier for FakeSso {
    async fn verify_ticket(&self, _ticket: &str) -> Result<SsoCredential, SsoError> {
        self.0.clone()
    }
}

pub struct FakeOAuth(pub Result<GoogleProfile, OAuthError>);

#[async_trait]
impl OAuthProvider for FakeOAuth {
    async fn exchange_and_fetch_profile(&self, _code: &str) -> Result<GoogleProfile, OAuthError> {
        self.0.clone()
    }

    fn login_url(&self) -> Result<String, OAuthError> {
        Ok("https://accounts.example/auth?client_id=c".to_string())
    }
}

pub fn student(ouid: &str) -> SsoCredential {
    SsoCredential {
        ouid: ouid.to_string(),
        username: ouid.to_string(),
        email: format!("{ouid}@student.example"),
        firstname: "Somchai".to_string(),
        lastname: "Jaidee".to_string(),
        ..Default::default()
    }
}

pub fn ann() -> GoogleProfile {
    GoogleProfile {
        email: "ann@example.com".to_string(),
        firstname: "Ann".to_string(),
        lastname: "Lee".to_string(),
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// A service over doubles, with handles kept for assertions.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub users: Arc<FakeUsers>,
    pub service: AuthService,
}

pub struct HarnessBuilder {
    store: MemoryStore,
    users: FakeUsers,
    cache: Arc<dyn SessionCache>,
    sso: Result<SsoCredential, SsoError>,
    oauth: Result<GoogleProfile, OAuthError>,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            store: MemoryStore::default(),
            users: FakeUsers::default(),
            cache: Arc::new(LruSessionCache::new(100)),
            sso: Ok(student("6431234521")),
            oauth: Ok(ann()),
        }
    }
}

impl HarnessBuilder {
    pub fn store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn users(mut self, users: FakeUsers) -> Self {
        self.users = users;
        self
    }

    pub fn cache(mut self, cache: Arc<dyn SessionCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn sso(mut self, sso: Result<SsoCredential, SsoError>) -> Self {
        self.sso = sso;
        self
    }

    pub fn oauth(mut self, oauth: Result<GoogleProfile, OAuthError>) -> Self {
        self.oauth = oauth;
        self
    }

    pub fn build(self) -> Harness {
        let store = Arc::new(self.store);
        let users = Arc::new(self.users);
        let service = AuthService::new(
            store.clone(),
            issuer_with(self.cache),
            users.clone(),
            Arc::new(FakeSso(self.sso)),
            Arc::new(FakeOAuth(self.oauth)),
            PolicyConfig::default(),
        );
        Harness {
            store,
            users,
            service,
        }
    }
}

pub fn harness() -> HarnessBuilder {
    HarnessBuilder::default()
}

/// Router state over a default harness.
pub fn test_state() -> AppState {
    AppState::new(Arc::new(harness().build().service))
}
