// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use graderlist_auth::{
    api::router,
    auth::{CredentialIssuer, TokenCodec},
    cache::LruSessionCache,
    config::{self, AppConfig},
    identity::{GoogleOAuthClient, SsoClient},
    init_tracing,
    profile::HttpUserProfileClient,
    service::AuthService,
    shutdown::{self, CleanupTask},
    state::AppState,
    storage::RedbAuthStore,
};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing(config::log_format_from_env());

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        error!(error = %e, path = %config.data_dir.display(), "Cannot create data directory");
        return ExitCode::FAILURE;
    }
    let store = match RedbAuthStore::open(&config.auth_db_path()) {
        Ok(store) => store.with_timeout(config.store_timeout),
        Err(e) => {
            error!(error = %e, "Failed to open auth store");
            return ExitCode::FAILURE;
        }
    };

    let cache = Arc::new(LruSessionCache::new(config.cache.capacity));
    let credentials = CredentialIssuer::new(
        TokenCodec::new(config.jwt.secret.as_bytes()),
        cache.clone(),
        config.issuance_settings(),
    );

    let sso = match SsoClient::new(config.sso.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build SSO client");
            return ExitCode::FAILURE;
        }
    };
    let oauth = match GoogleOAuthClient::new(config.google.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build Google OAuth client");
            return ExitCode::FAILURE;
        }
    };
    let users = match HttpUserProfileClient::new(config.user_service.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build user profile client");
            return ExitCode::FAILURE;
        }
    };

    let service = AuthService::new(
        Arc::new(store.clone()),
        credentials,
        Arc::new(users),
        Arc::new(sso),
        Arc::new(oauth),
        config.policy,
    );
    let app = router(AppState::new(Arc::new(service)));

    let listener = match TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %config.bind_addr, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };
    info!(addr = %config.bind_addr, "Graderlist auth listening (docs at /docs)");

    let token = CancellationToken::new();
    shutdown::spawn_signal_listener(token.clone());
    let sweeper = tokio::spawn(cache.clone().run_purge(config.cache.purge_interval, token.clone()));

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(token.clone().cancelled_owned())
        .await;
    if let Err(e) = &served {
        error!(error = %e, "HTTP server failed");
    }
    token.cancel();
    info!("HTTP server drained, releasing resources");

    let tasks = vec![
        CleanupTask::new("auth_store", async move {
            if let Err(e) = store.close().await {
                error!(error = %e, "Failed to close auth store");
            }
        }),
        CleanupTask::new("session_cache", async move {
            if let Err(e) = sweeper.await {
                error!(error = %e, "Session cache sweeper failed");
            }
            let dropped = cache.clear();
            info!(dropped, "Session cache cleared");
        }),
    ];
    let report = shutdown::run_cleanup(tasks, config.shutdown_timeout).await;
    info!(completed = report.completed.len(), aborted = report.aborted, "Shutdown complete");

    if served.is_err() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
