// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Verification
//!
//! Adapters for the two federated identity providers:
//!
//! - `sso` - university SSO ticket validation
//! - `google` - Google OAuth code exchange + userinfo fetch
//!
//! Each adapter returns provider-specific claims and maps transport-level
//! failures to its own small error set. Claims are never persisted; the
//! orchestrator only uses them to find or create a user profile.

pub mod google;
pub mod sso;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use google::{GoogleOAuthClient, GoogleOAuthConfig, OAuthError};
pub use sso::{SsoClient, SsoConfig, SsoError};

/// Identity payload returned by the SSO validation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SsoCredential {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub gecos: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub disable: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub firstnameth: String,
    #[serde(default)]
    pub lastnameth: String,
    /// Student identifier
    #[serde(default)]
    pub ouid: String,
}

/// Profile fields read from Google's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default, rename = "given_name")]
    pub firstname: String,
    #[serde(default, rename = "family_name")]
    pub lastname: String,
}

/// Verified claims from either provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalIdentity {
    Student(SsoCredential),
    Google(GoogleProfile),
}

impl ExternalIdentity {
    pub fn provider(&self) -> &'static str {
        match self {
            ExternalIdentity::Student(_) => "sso",
            ExternalIdentity::Google(_) => "google",
        }
    }

    /// Key used to look the user up in the profile service.
    pub fn lookup_key(&self) -> &str {
        match self {
            ExternalIdentity::Student(sso) => &sso.ouid,
            ExternalIdentity::Google(profile) => &profile.email,
        }
    }
}

/// Exchanges an SSO ticket for the ticket holder's identity.
#[async_trait]
pub trait TicketVerifier: Send + Sync {
    async fn verify_ticket(&self, ticket: &str) -> Result<SsoCredential, SsoError>;
}

/// OAuth authorization-code flow against an external provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    async fn exchange_and_fetch_profile(&self, code: &str) -> Result<GoogleProfile, OAuthError>;

    /// URL the client is redirected to in order to start the login.
    fn login_url(&self) -> Result<String, OAuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sso_credential_tolerates_missing_fields() {
        let credential: SsoCredential =
            serde_json::from_str(r#"{"ouid":"6531234521","firstname":"Somchai"}"#).unwrap();
        assert_eq!(credential.ouid, "6531234521");
        assert_eq!(credential.firstname, "Somchai");
        assert!(credential.roles.is_empty());
        assert!(!credential.disable);
    }

    #[test]
    fn google_profile_reads_userinfo_names() {
        let profile: GoogleProfile = serde_json::from_str(
            r#"{"email":"a@example.com","given_name":"Ann","family_name":"Lee","picture":"x"}"#,
        )
        .unwrap();
        assert_eq!(profile.firstname, "Ann");
        assert_eq!(profile.lastname, "Lee");
    }

    #[test]
    fn lookup_key_depends_on_provider() {
        let student = ExternalIdentity::Student(SsoCredential {
            ouid: "6531234521".to_string(),
            email: "s@student.example".to_string(),
            ..Default::default()
        });
        assert_eq!(student.lookup_key(), "6531234521");
        assert_eq!(student.provider(), "sso");

        let google = ExternalIdentity::Google(GoogleProfile {
            email: "a@example.com".to_string(),
            ..Default::default()
        });
        assert_eq!(google.lookup_key(), "a@example.com");
        assert_eq!(google.provider(), "google");
    }
}
