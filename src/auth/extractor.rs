// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require a valid access token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is UserCredential
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::UserCredential;
use crate::error::ServiceError;
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Reads `Authorization: Bearer <token>` and runs full validation, including
/// the session-cache check, so a superseded token is rejected here too.
pub struct Auth(pub UserCredential);

impl FromRequestParts<AppState> for Auth {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ServiceError::unauthenticated("authorization header is required"))?
            .to_str()
            .map_err(|_| ServiceError::unauthenticated("invalid authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::unauthenticated("invalid authorization header"))?;

        let user = state.service.validate(token.trim()).await?;
        Ok(Auth(user))
    }
}
