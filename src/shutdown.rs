// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Graceful shutdown.
//!
//! A signal listener cancels a shared [`CancellationToken`]; the HTTP server
//! drains on that token, then every owned resource gets its own cleanup task.
//! Cleanup runs concurrently and is bounded as a whole: whatever has not
//! finished when the deadline passes is aborted.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// A named cleanup future for one resource.
pub struct CleanupTask {
    name: &'static str,
    future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
}

impl CleanupTask {
    pub fn new<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            name,
            future: Box::pin(future),
        }
    }
}

/// How cleanup ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub completed: Vec<&'static str>,
    pub aborted: usize,
}

/// Cancel `token` on SIGINT, or SIGTERM on unix.
pub fn spawn_signal_listener(token: CancellationToken) {
    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        info!(signal, "Shutdown signal received");
        token.cancel();
    });
}

async fn wait_for_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}

/// Run every cleanup task concurrently, aborting the rest after `timeout`.
pub async fn run_cleanup(tasks: Vec<CleanupTask>, timeout: Duration) -> CleanupReport {
    let mut set = JoinSet::new();
    for task in tasks {
        let name = task.name;
        let future = task.future;
        set.spawn(async move {
            future.await;
            name
        });
    }

    let mut completed = Vec::new();
    let drained = tokio::time::timeout(timeout, async {
        while let Some(result) = set.join_next().await {
            match result {
                Ok(name) => {
                    info!(resource = name, "Cleanup finished");
                    completed.push(name);
                }
                Err(e) => error!(error = %e, "Cleanup task failed"),
            }
        }
    })
    .await;

    let aborted = set.len();
    if drained.is_err() {
        warn!(
            remaining = aborted,
            timeout_secs = timeout.as_secs(),
            "Cleanup timed out, aborting remaining tasks"
        );
        set.abort_all();
    }

    CleanupReport { completed, aborted }
}
