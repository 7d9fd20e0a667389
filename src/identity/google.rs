// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Google OAuth client (authorization-code flow).
//!
//! `exchange_and_fetch_profile` trades the code for an access token at the
//! token endpoint, then reads the user's email and names from the userinfo
//! endpoint. Each step has its own error so the orchestrator can tell a bad
//! code (caller error) from a provider outage.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{GoogleProfile, OAuthProvider};

pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OAuthError {
    /// Provider refused the authorization code
    #[error("invalid code")]
    InvalidCode,

    /// Userinfo endpoint unreachable or failing
    #[error("OAuth provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Userinfo body could not be read
    #[error("failed to read OAuth provider response: {0}")]
    IoFailure(String),

    /// Userinfo body is not the expected shape
    #[error("malformed OAuth provider response: {0}")]
    MalformedResponse(String),

    /// Client configuration is unusable (bad URL, HTTP client build failure)
    #[error("OAuth client misconfigured: {0}")]
    Config(String),
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct GoogleOAuthClient {
    http: Client,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleOAuthConfig) -> Result<Self, OAuthError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OAuthError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let mut form = HashMap::new();
        form.insert("grant_type", "authorization_code");
        form.insert("code", code);
        form.insert("client_id", self.config.client_id.as_str());
        form.insert("client_secret", self.config.client_secret.as_str());
        form.insert("redirect_uri", self.config.redirect_uri.as_str());

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OAuth token exchange request failed");
                OAuthError::InvalidCode
            })?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "OAuth provider rejected code");
            return Err(OAuthError::InvalidCode);
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "OAuth token response is not decodable");
            OAuthError::InvalidCode
        })?;

        if token.access_token.trim().is_empty() {
            return Err(OAuthError::InvalidCode);
        }
        Ok(token.access_token)
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    async fn exchange_and_fetch_profile(&self, code: &str) -> Result<GoogleProfile, OAuthError> {
        let access_token = self.exchange_code(code).await?;

        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(|e| OAuthError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::ProviderUnavailable(format!(
                "userinfo returned {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| OAuthError::IoFailure(e.to_string()))?;

        let profile = serde_json::from_slice::<GoogleProfile>(&body)
            .map_err(|e| OAuthError::MalformedResponse(e.to_string()))?;
        if profile.email.trim().is_empty() {
            return Err(OAuthError::MalformedResponse(
                "userinfo has no email".to_string(),
            ));
        }
        Ok(profile)
    }

    fn login_url(&self) -> Result<String, OAuthError> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| OAuthError::Config(format!("invalid auth URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &SCOPES.join(" "));

        Ok(url.into())
    }
}
