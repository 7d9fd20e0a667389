// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential issuance and validation.
//!
//! ## Issuance
//!
//! 1. Sign an access token for the record's user.
//! 2. Record `{token, role}` in the session cache under the user id, with
//!    the access-token lifetime as TTL. If the cache cannot record it, no
//!    credential is returned: a token the cache never saw could not be
//!    superseded.
//! 3. Attach a new opaque refresh token. The caller persists its digest.
//!
//! ## Validation
//!
//! Signature → issuer → expiry → cache entry → byte equality with the cached
//! token. Only the most recently issued token for a user passes; the role
//! comes from the cache entry, not from storage.
//!
//! Access tokens carry no nonce, only second-resolution timestamps. Two
//! issuances for the same user within one second produce byte-identical
//! tokens, so the earlier token keeps passing until a later second's token
//! replaces it in the cache.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use super::claims::UserCredential;
use super::codec::TokenCodec;
use super::error::CredentialError;
use super::refresh::RefreshToken;
use crate::cache::{CacheError, SessionCache, SessionEntry};
use crate::storage::AuthRecord;

/// Credential handed to a client after login or refresh.
///
/// `refresh_token` is the raw value; it is returned here once and never
/// stored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds
    pub expires_in: u64,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Issuer name, lifetime and cache bound for issued tokens.
#[derive(Debug, Clone)]
pub struct IssuanceSettings {
    pub issuer: String,
    pub access_ttl: Duration,
    pub cache_timeout: Duration,
}

/// Mints and validates credentials against the session cache.
#[derive(Clone)]
pub struct CredentialIssuer {
    codec: TokenCodec,
    cache: Arc<dyn SessionCache>,
    settings: IssuanceSettings,
}

impl CredentialIssuer {
    pub fn new(codec: TokenCodec, cache: Arc<dyn SessionCache>, settings: IssuanceSettings) -> Self {
        Self { codec, cache, settings }
    }

    pub fn expires_in(&self) -> u64 {
        self.settings.access_ttl.as_secs()
    }

    /// Issue an access token and a new refresh token for `record`.
    pub async fn create_credentials(&self, record: &AuthRecord) -> Result<Credential, CredentialError> {
        let access_token = self.sign_and_record(record).await?;
        let refresh = RefreshToken::generate()?;

        Ok(Credential {
            access_token,
            refresh_token: refresh.raw,
            expires_in: self.expires_in(),
        })
    }

    /// Issue an access token paired with a refresh token the caller already
    /// generated (and has already committed to storage).
    pub async fn create_credentials_with_refresh(
        &self,
        record: &AuthRecord,
        refresh: RefreshToken,
    ) -> Result<Credential, CredentialError> {
        let access_token = self.sign_and_record(record).await?;

        Ok(Credential {
            access_token,
            refresh_token: refresh.raw,
            expires_in: self.expires_in(),
        })
    }

    /// Validate a presented access token.
    pub async fn validate(&self, token: &str) -> Result<UserCredential, CredentialError> {
        let claims = self.codec.verify(token).map_err(|e| {
            debug!(error = %e, "Access token failed verification");
            CredentialError::InvalidToken
        })?;

        if claims.issuer != self.settings.issuer {
            return Err(CredentialError::InvalidToken);
        }

        if claims.is_expired_at(Utc::now().timestamp()) {
            return Err(CredentialError::TokenExpired);
        }

        let raw = match self.bounded(self.cache.get(&claims.user_id)).await {
            Ok(raw) => raw,
            Err(CacheError::NotFound) => return Err(CredentialError::InvalidToken),
            Err(e) => {
                error!(
                    operation = "validate",
                    user_id = %claims.user_id,
                    error = %e,
                    "Cannot connect to cache server"
                );
                return Err(CredentialError::Internal(e.to_string()));
            }
        };

        let entry = SessionEntry::from_json(&raw).map_err(|e| {
            error!(
                operation = "validate",
                user_id = %claims.user_id,
                error = %e,
                "Session cache entry is unreadable"
            );
            CredentialError::Internal(e.to_string())
        })?;

        if entry.token != token {
            return Err(CredentialError::InvalidToken);
        }

        Ok(UserCredential {
            user_id: claims.user_id,
            role: entry.role,
        })
    }

    async fn sign_and_record(&self, record: &AuthRecord) -> Result<String, CredentialError> {
        let token = self
            .codec
            .sign(&record.user_id, &self.settings.issuer, self.settings.access_ttl)?;

        let entry = SessionEntry {
            token: token.clone(),
            role: record.role,
        };
        let value = entry
            .to_json()
            .map_err(|e| CredentialError::Internal(e.to_string()))?;

        if let Err(e) = self
            .bounded(self.cache.save(&record.user_id, &value, self.settings.access_ttl))
            .await
        {
            error!(
                operation = "create_credentials",
                user_id = %record.user_id,
                error = %e,
                "Cannot connect to cache server"
            );
            return Err(CredentialError::Internal(e.to_string()));
        }

        Ok(token)
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.settings.cache_timeout, call)
            .await
            .map_err(|_| CacheError::Unavailable("cache operation timed out".to_string()))?
    }
}
