// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User profile service client.
//!
//! The profile service owns user records (names, email, student metadata).
//! This service only looks users up by their external key and creates them on
//! first login.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::{HttpUserProfileClient, ProfileClientConfig};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub faculty_en: String,
    #[serde(default)]
    pub faculty_th: String,
}

/// Profile-creation payload. Empty fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewUserProfile {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub firstname: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub lastname: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub student_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub year: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub faculty_en: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub faculty_th: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("user not found")]
    NotFound,

    /// The profile service refused the request; the message is its own.
    #[error("{0}")]
    Rejected(String),

    #[error("user service unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait UserProfileClient: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<UserProfile, ProfileError>;

    async fn find_by_student_id(&self, student_id: &str) -> Result<UserProfile, ProfileError>;

    async fn create(&self, profile: &NewUserProfile) -> Result<UserProfile, ProfileError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_omits_empty_fields() {
        let profile = NewUserProfile {
            email: "ann@example.com".to_string(),
            username: "Ann".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&profile).unwrap(),
            r#"{"email":"ann@example.com","username":"Ann"}"#
        );
    }

    #[test]
    fn profile_rejection_keeps_upstream_message() {
        let err = ProfileError::Rejected("duplicate email".to_string());
        assert_eq!(err.to_string(), "duplicate email");
    }
}
