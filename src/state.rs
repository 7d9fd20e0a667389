// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::service::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AuthService>,
}

impl AppState {
    pub fn new(service: Arc<AuthService>) -> Self {
        Self { service }
    }
}
