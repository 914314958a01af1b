// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Health and metrics HTTP endpoint.
//!
//! Serves `/healthz`, `/readyz`, and `/metrics` for probes and scraping.
//! The controller's actual behavior is observable only through logs and
//! gateway convergence; this endpoint exists for the ambient machinery
//! around it.

use crate::metrics;
use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tracing::info;

async fn healthz() -> &'static str {
    "ok"
}

async fn readyz() -> &'static str {
    "ok"
}

async fn metrics_handler() -> String {
    metrics::render()
}

/// Serve the health/metrics endpoint until the process exits.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn run_http_server(addr: &str) -> Result<()> {
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding http endpoint on {addr}"))?;
    info!(addr = %addr, "serving health and metrics endpoint");

    axum::serve(listener, app)
        .await
        .context("http endpoint failed")
}
