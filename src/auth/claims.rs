// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access-token claims and the validated user credential.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims embedded in a signed access token.
///
/// Wire names follow the registered JWT claim names plus `user_id`:
/// `{ "iss", "iat", "exp", "user_id" }`. Every field is required; a token
/// missing any of them fails to decode instead of yielding partial claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer
    #[serde(rename = "iss")]
    pub issuer: String,

    /// Issued at (Unix seconds)
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Expiration (Unix seconds)
    #[serde(rename = "exp")]
    pub expires_at: i64,

    /// Subject user ID
    pub user_id: String,
}

impl TokenClaims {
    pub fn new(user_id: impl Into<String>, issuer: impl Into<String>, issued_at: i64, ttl_secs: i64) -> Self {
        Self {
            issuer: issuer.into(),
            issued_at,
            expires_at: issued_at.saturating_add(ttl_secs),
            user_id: user_id.into(),
        }
    }

    /// Whether `expires_at` lies strictly before `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at < now
    }
}

/// The trusted identity asserted for a request.
///
/// Only produced after the presented token matched the session cache entry;
/// `role` is the cache snapshot taken when the token was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserCredential {
    /// Canonical user ID
    pub user_id: String,
    /// Role at issuance time
    pub role: Role,
}
