// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

use agwsync::azure::{ArmAuth, ArmClient};
use agwsync::config::SyncerConfig;
use agwsync::constants::DEFAULT_ARM_BASE_URL;
use agwsync::director::Director;
use agwsync::secrets::KubeSecrets;
use agwsync::server::run_http_server;
use agwsync::store::TargetStore;
use agwsync::watch::run_gateway_watcher;
use anyhow::Result;
use clap::Parser;
use kube::Client;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, error, info};

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .thread_name("agwsync-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Respects RUST_LOG for filtering and RUST_LOG_FORMAT for json/text output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let config = SyncerConfig::parse();
    info!(
        gateway = %config.gateway_name,
        resource_group = %config.resource_group,
        prefix = %config.listener_prefix,
        "starting agwsync controller"
    );

    debug!("initializing Kubernetes client");
    let client = Client::try_default().await?;

    let auth = match config.arm_token.clone() {
        Some(token) => {
            info!("using static ARM token from configuration");
            ArmAuth::StaticToken(token)
        }
        None => {
            info!("no static ARM token configured, using IMDS managed identity");
            ArmAuth::managed_identity()
        }
    };
    let arm = ArmClient::new(
        DEFAULT_ARM_BASE_URL,
        config.subscription_id.clone(),
        config.api_version.clone(),
        auth,
        config.sync_interval(),
    );

    let store = TargetStore::new();
    let director = Director::new(
        arm,
        KubeSecrets::new(client.clone()),
        store.clone(),
        config.clone(),
    );

    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);

    let mut watcher_handle = tokio::spawn(run_gateway_watcher(
        client,
        store,
        config.backend_pool.clone(),
        stop_rx.clone(),
    ));
    let sync_handle = {
        let stop_rx = stop_rx.clone();
        tokio::spawn(async move { director.run(stop_rx).await })
    };
    let http_addr = config.http_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = run_http_server(&http_addr).await {
            error!("health/metrics endpoint failed: {e:#}");
        }
    });

    // A dead watcher means the store silently goes stale while the sync
    // loop keeps pushing old state, so its exit shuts the process down.
    tokio::select! {
        signal = wait_for_shutdown_signal() => {
            signal?;
            info!("shutdown signal received, draining (send again to abort)");
        }
        result = &mut watcher_handle => {
            match result {
                Ok(()) => error!("gateway watcher exited unexpectedly, shutting down"),
                Err(e) => error!("gateway watcher task failed: {e}, shutting down"),
            }
        }
    }
    let _ = stop_tx.send(true);

    // A second signal exits immediately without waiting for the in-flight cycle
    tokio::spawn(async {
        if wait_for_shutdown_signal().await.is_ok() {
            error!("second shutdown signal, aborting");
            std::process::exit(1);
        }
    });

    match sync_handle.await {
        Ok(()) => info!("sync loop drained"),
        Err(e) => error!("sync loop task failed: {e}"),
    }
    if !watcher_handle.is_finished() {
        watcher_handle.abort();
    }

    info!("agwsync controller stopped");
    Ok(())
}

/// Wait for SIGTERM or SIGINT.
async fn wait_for_shutdown_signal() -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
    Ok(())
}
