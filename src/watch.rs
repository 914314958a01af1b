// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Watch event adapter: gateway notifications → desired-state mutations.
//!
//! A long-lived watcher subscribes to `Gateway` resources cluster-wide and
//! folds every add/update notification into the [`TargetStore`]: each
//! TLS-enabled server block contributes one termination target per declared
//! host, keyed by host, last writer wins. Server blocks without TLS simply
//! yield no targets.
//!
//! Delete notifications do not remove targets. The upstream design has no
//! delete path, and inventing removal semantics here would silently change
//! convergence behavior; instead the retained hosts are logged at warn
//! level so the staleness is visible. See DESIGN.md.

use crate::crd::Gateway;
use crate::store::TargetStore;
use crate::target::TerminationTarget;
use futures::{pin_mut, TryStreamExt};
use kube::runtime::{
    watcher,
    watcher::{Config as WatcherConfig, Event},
    WatchStreamExt,
};
use kube::{Api, Client, ResourceExt};
use tokio::sync::watch as signal;
use tracing::{debug, info, warn};

/// Fold one gateway object into the store.
///
/// Returns the number of targets upserted. Malformed input is not an
/// error: server blocks without TLS or without a credential name are
/// skipped with a debug log.
pub fn apply_gateway(store: &TargetStore, gateway: &Gateway, backend_pool: &str) -> usize {
    let namespace = gateway.namespace().unwrap_or_default();
    let name = gateway.name_any();
    let mut upserted = 0;

    for server in &gateway.spec.servers {
        let Some(tls) = &server.tls else {
            continue;
        };
        let Some(credential_name) = tls.credential_name.as_deref() else {
            debug!(
                gateway = %name,
                namespace = %namespace,
                "TLS server block has no credential name, skipping"
            );
            continue;
        };

        for host in &server.hosts {
            debug!(
                host = %host,
                secret = %credential_name,
                "adding termination target"
            );
            store.upsert(TerminationTarget {
                host: host.clone(),
                namespace: namespace.clone(),
                secret_name: credential_name.to_string(),
                backend_pool: backend_pool.to_string(),
                port: server.port.as_ref().map(|p| p.number),
            });
            upserted += 1;
        }
    }

    upserted
}

/// What the watch loop does after one stream item.
#[derive(Debug, PartialEq, Eq)]
enum WatchFlow {
    Continue,
    Stop,
}

/// Process one item from the watch stream.
///
/// The watcher yields `Err` items for transient failures (apiserver
/// errors, relist failures) and keeps polling afterwards, so errors are
/// logged and the loop continues; only stream exhaustion stops it.
fn handle_watch_item(
    store: &TargetStore,
    item: Result<Option<Event<Gateway>>, watcher::Error>,
    backend_pool: &str,
) -> WatchFlow {
    match item {
        Ok(Some(Event::Apply(gateway) | Event::InitApply(gateway))) => {
            let count = apply_gateway(store, &gateway, backend_pool);
            if count > 0 {
                info!(
                    gateway = %gateway.name_any(),
                    namespace = %gateway.namespace().unwrap_or_default(),
                    targets = count,
                    "updated termination targets from gateway"
                );
            }
            WatchFlow::Continue
        }
        Ok(Some(Event::Delete(gateway))) => {
            let hosts: Vec<String> = gateway
                .spec
                .servers
                .iter()
                .filter(|s| s.tls.is_some())
                .flat_map(|s| s.hosts.iter().cloned())
                .collect();
            if !hosts.is_empty() {
                warn!(
                    gateway = %gateway.name_any(),
                    hosts = ?hosts,
                    "gateway deleted; termination targets retained (no delete path)"
                );
            }
            WatchFlow::Continue
        }
        Ok(Some(Event::Init | Event::InitDone)) => WatchFlow::Continue,
        Ok(None) => {
            warn!("gateway watch stream ended");
            WatchFlow::Stop
        }
        Err(e) => {
            warn!("transient gateway watch error, stream will retry: {e}");
            WatchFlow::Continue
        }
    }
}

/// Watch gateway resources until the stop signal fires.
///
/// Transient watch failures are logged and retried with the watcher's
/// default backoff; every (re)listed object flows through
/// [`apply_gateway`], which makes the store self-healing on reconnect.
/// Returns only on the stop signal or if the stream is exhausted, which
/// the caller treats as fatal.
pub async fn run_gateway_watcher(
    client: Client,
    store: TargetStore,
    backend_pool: String,
    mut stop: signal::Receiver<bool>,
) {
    let api = Api::<Gateway>::all(client);
    let stream = watcher(api, WatcherConfig::default()).default_backoff();
    pin_mut!(stream);

    info!("watching Gateway resources");

    loop {
        tokio::select! {
            _ = stop.changed() => {
                info!("stop signal received, ending gateway watch");
                return;
            }
            item = stream.try_next() => {
                if handle_watch_item(&store, item, &backend_pool) == WatchFlow::Stop {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod watch_tests;
