// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SSO ticket validation client.
//!
//! Posts the ticket to `{host}/serviceValidation` with the service
//! credentials in `DeeAppID` / `DeeAppSecret` headers and the ticket in
//! `DeeTicket`.
//!
//! | Provider answer | Result |
//! |---|---|
//! | 200 + decodable body | `SsoCredential` |
//! | 429 | `SsoError::RateLimited` |
//! | anything else, transport error, undecodable 200 | `SsoError::InvalidTicket` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::{SsoCredential, TicketVerifier};

const VALIDATION_PATH: &str = "/serviceValidation";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SsoError {
    #[error("invalid ticket")]
    InvalidTicket,

    #[error("too many requests to the SSO provider")]
    RateLimited,

    #[error("SSO client misconfigured: {0}")]
    Config(String),
}

#[derive(Debug, Clone)]
pub struct SsoConfig {
    pub host: String,
    pub app_id: String,
    pub app_secret: String,
    pub timeout: Duration,
}

pub struct SsoClient {
    http: Client,
    endpoint: String,
    app_id: String,
    app_secret: String,
}

impl SsoClient {
    pub fn new(config: SsoConfig) -> Result<Self, SsoError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SsoError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: format!("{}{VALIDATION_PATH}", config.host.trim_end_matches('/')),
            app_id: config.app_id,
            app_secret: config.app_secret,
        })
    }
}

#[async_trait]
impl TicketVerifier for SsoClient {
    async fn verify_ticket(&self, ticket: &str) -> Result<SsoCredential, SsoError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("DeeAppID", &self.app_id)
            .header("DeeAppSecret", &self.app_secret)
            .header("DeeTicket", ticket)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "SSO validation request failed");
                SsoError::InvalidTicket
            })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => return Err(SsoError::RateLimited),
            status => {
                debug!(status = %status, "SSO rejected ticket");
                return Err(SsoError::InvalidTicket);
            }
        }

        response.json::<SsoCredential>().await.map_err(|e| {
            warn!(error = %e, "SSO validation response is not decodable");
            SsoError::InvalidTicket
        })
    }
}
