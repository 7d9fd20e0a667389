// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Graderlist Auth - federated login credential service
//!
//! Turns a verified external identity (university SSO ticket or Google OAuth
//! code) into a short-lived signed access token plus a single-use refresh
//! token. At most one access token per user is valid at a time.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, credential issuance, bearer extractor
//! - `cache` - Session cache port and in-process LRU backing
//! - `identity` - SSO ticket and Google OAuth adapters
//! - `profile` - User profile service client
//! - `provisioning` - Study-year and faculty policy for new students
//! - `service` - Auth orchestrator behind every endpoint
//! - `storage` - Auth record store (redb)

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod profile;
pub mod provisioning;
pub mod service;
pub mod shutdown;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, DEFAULT_LOG_FILTER};

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).init(),
    }
}
