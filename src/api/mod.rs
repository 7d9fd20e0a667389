// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info_span, Span};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{Credential, Role},
    error::ErrorBody,
    models::{
        CredentialResponse, GoogleLoginUrlResponse, RefreshTokenRequest, ValidateRequest,
        ValidateResponse, VerifyGoogleLoginRequest, VerifyTicketRequest,
    },
    state::AppState,
};

pub mod auth;
pub mod health;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/ticket", post(auth::verify_ticket))
        .route("/auth/google", post(auth::verify_google_login))
        .route("/auth/google/url", get(auth::google_login_url))
        .route("/auth/validate", post(auth::validate))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/me", get(auth::me));

    let health_routes = Router::new()
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness));

    Router::new()
        .nest("/v1", v1_routes)
        .nest("/health", health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(CorsLayer::permissive()),
        )
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::verify_ticket,
        auth::verify_google_login,
        auth::google_login_url,
        auth::validate,
        auth::refresh_token,
        auth::me,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Credential,
            CredentialResponse,
            ErrorBody,
            GoogleLoginUrlResponse,
            RefreshTokenRequest,
            Role,
            ValidateRequest,
            ValidateResponse,
            VerifyGoogleLoginRequest,
            VerifyTicketRequest,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Auth", description = "Login, token validation and refresh"),
        (name = "Health", description = "Liveness and readiness checks")
    )
)]
struct ApiDoc;
