// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    auth::Auth,
    error::{ErrorBody, ServiceError},
    models::{
        CredentialResponse, GoogleLoginUrlResponse, RefreshTokenRequest, ValidateRequest,
        ValidateResponse, VerifyGoogleLoginRequest, VerifyTicketRequest,
    },
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/v1/auth/ticket",
    request_body = VerifyTicketRequest,
    tag = "Auth",
    responses(
        (status = 200, body = CredentialResponse),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 429, body = ErrorBody)
    )
)]
pub async fn verify_ticket(
    State(state): State<AppState>,
    Json(request): Json<VerifyTicketRequest>,
) -> Result<Json<CredentialResponse>, ServiceError> {
    let credential = state.service.verify_ticket(&request.ticket).await?;
    Ok(Json(CredentialResponse { credential }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/google",
    request_body = VerifyGoogleLoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = CredentialResponse),
        (status = 400, body = ErrorBody),
        (status = 503, body = ErrorBody)
    )
)]
pub async fn verify_google_login(
    State(state): State<AppState>,
    Json(request): Json<VerifyGoogleLoginRequest>,
) -> Result<Json<CredentialResponse>, ServiceError> {
    let credential = state.service.verify_google_login(&request.code).await?;
    Ok(Json(CredentialResponse { credential }))
}

#[utoipa::path(
    get,
    path = "/v1/auth/google/url",
    tag = "Auth",
    responses((status = 200, body = GoogleLoginUrlResponse))
)]
pub async fn google_login_url(
    State(state): State<AppState>,
) -> Result<Json<GoogleLoginUrlResponse>, ServiceError> {
    let url = state.service.google_login_url()?;
    Ok(Json(GoogleLoginUrlResponse { url }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/validate",
    request_body = ValidateRequest,
    tag = "Auth",
    responses(
        (status = 200, body = ValidateResponse),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ServiceError> {
    let user = state.service.validate(&request.token).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    request_body = RefreshTokenRequest,
    tag = "Auth",
    responses(
        (status = 200, body = CredentialResponse),
        (status = 401, body = ErrorBody),
        (status = 500, body = ErrorBody)
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<CredentialResponse>, ServiceError> {
    let credential = state.service.refresh_token(&request.refresh_token).await?;
    Ok(Json(CredentialResponse { credential }))
}

/// Identity behind the bearer token.
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, body = ValidateResponse),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn me(Auth(user): Auth) -> Json<ValidateResponse> {
    Json(user.into())
}
