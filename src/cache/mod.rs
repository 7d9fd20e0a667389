// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Cache
//!
//! The session cache is the single authority on which access token is
//! currently honoured for a user. It stores one compact JSON record per user
//! id (`{"token": .., "role": ..}`) with a TTL equal to the access-token
//! lifetime.
//!
//! ## Contract
//!
//! - `save` overwrites any existing entry for the key (last write wins). This
//!   overwrite is how a newer login revokes an older token.
//! - A write is visible to the next `get` immediately.
//! - Entries expire on their own after the TTL; nothing deletes them
//!   explicitly.
//! - `get` distinguishes a miss (`NotFound`) from an unreachable backend
//!   (`Unavailable`).

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::Role;

pub use memory::LruSessionCache;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("cache entry not found")]
    NotFound,

    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache value is invalid: {0}")]
    InvalidValue(String),
}

/// Key-value store with per-entry expiry.
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn save(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<String, CacheError>;
}

/// The record stored under a user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub token: String,
    pub role: Role,
}

impl SessionEntry {
    pub fn to_json(&self) -> Result<String, CacheError> {
        serde_json::to_string(self).map_err(|e| CacheError::InvalidValue(e.to_string()))
    }

    pub fn from_json(value: &str) -> Result<Self, CacheError> {
        serde_json::from_str(value).map_err(|e| CacheError::InvalidValue(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_is_compact_json() {
        let entry = SessionEntry {
            token: "abc.def.ghi".to_string(),
            role: Role::User,
        };
        assert_eq!(entry.to_json().unwrap(), r#"{"token":"abc.def.ghi","role":"user"}"#);
    }

    #[test]
    fn entry_from_garbage_is_invalid_value() {
        let result = SessionEntry::from_json("not json");
        assert!(matches!(result, Err(CacheError::InvalidValue(_))));
    }
}
