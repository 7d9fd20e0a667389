// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{Credential, Role, UserCredential};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyTicketRequest {
    /// One-time ticket issued by the SSO provider
    #[serde(default)]
    pub ticket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyGoogleLoginRequest {
    /// Authorization code from the Google redirect
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidateRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CredentialResponse {
    pub credential: Credential,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidateResponse {
    pub user_id: String,
    pub role: Role,
}

impl From<UserCredential> for ValidateResponse {
    fn from(user: UserCredential) -> Self {
        Self {
            user_id: user.user_id,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GoogleLoginUrlResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let req: VerifyTicketRequest = serde_json::from_str("{}").unwrap();
        assert!(req.ticket.is_empty());

        let req: RefreshTokenRequest = serde_json::from_str("{}").unwrap();
        assert!(req.refresh_token.is_empty());
    }

    #[test]
    fn validate_response_serializes_role_lowercase() {
        let response = ValidateResponse::from(UserCredential {
            user_id: "user-1".to_string(),
            role: Role::Admin,
        });
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"user_id":"user-1","role":"admin"}"#
        );
    }
}
