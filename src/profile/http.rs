// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP implementation of [`UserProfileClient`].
//!
//! Endpoints (relative to the configured base URL):
//!
//! - `GET  /users/email/{email}`
//! - `GET  /users/student/{student_id}`
//! - `POST /users`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use super::{NewUserProfile, ProfileError, UserProfile, UserProfileClient};

#[derive(Debug, Clone)]
pub struct ProfileClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Error bodies from the profile service: `{"error": ..}` or `{"message": ..}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpUserProfileClient {
    http: Client,
    base_url: Url,
}

impl HttpUserProfileClient {
    pub fn new(config: ProfileClientConfig) -> Result<Self, ProfileError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ProfileError::Unavailable(format!("invalid user service URL: {e}")))?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProfileError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProfileError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProfileError::Unavailable("user service URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_profile(&self, segments: &[&str]) -> Result<UserProfile, ProfileError> {
        let url = self.endpoint(segments)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProfileError::Unavailable(e.to_string()))?;

        read_profile(response).await
    }
}

#[async_trait]
impl UserProfileClient for HttpUserProfileClient {
    async fn find_by_email(&self, email: &str) -> Result<UserProfile, ProfileError> {
        self.get_profile(&["users", "email", email]).await
    }

    async fn find_by_student_id(&self, student_id: &str) -> Result<UserProfile, ProfileError> {
        self.get_profile(&["users", "student", student_id]).await
    }

    async fn create(&self, profile: &NewUserProfile) -> Result<UserProfile, ProfileError> {
        let url = self.endpoint(&["users"])?;
        let response = self
            .http
            .post(url)
            .json(profile)
            .send()
            .await
            .map_err(|e| ProfileError::Unavailable(e.to_string()))?;

        read_profile(response).await
    }
}

async fn read_profile(response: Response) -> Result<UserProfile, ProfileError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<UserProfile>()
            .await
            .map_err(|e| ProfileError::Unavailable(format!("invalid user service response: {e}")));
    }

    match status {
        StatusCode::NOT_FOUND => Err(ProfileError::NotFound),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            let body = response.text().await.unwrap_or_default();
            Err(ProfileError::Rejected(rejection_message(&body, status)))
        }
        _ => Err(ProfileError::Unavailable(format!("user service returned {status}"))),
    }
}

fn rejection_message(body: &str, status: StatusCode) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(msg) = parsed.error.or(parsed.message) {
            return msg;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("rejected").to_string()
    } else {
        trimmed.to_string()
    }
}
