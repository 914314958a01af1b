// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Unit tests for `watch.rs`

use super::*;
use crate::crd::{GatewayServer, GatewaySpec, ServerPort, ServerTls};

fn gateway(namespace: &str, servers: Vec<GatewayServer>) -> Gateway {
    let mut gateway = Gateway::new("test-gateway", GatewaySpec { servers });
    gateway.metadata.namespace = Some(namespace.to_string());
    gateway
}

fn tls_server(hosts: &[&str], credential: Option<&str>, port: i32) -> GatewayServer {
    GatewayServer {
        hosts: hosts.iter().map(ToString::to_string).collect(),
        port: Some(ServerPort {
            number: port,
            name: Some("https".to_string()),
            protocol: Some("HTTPS".to_string()),
        }),
        tls: Some(ServerTls {
            mode: Some("SIMPLE".to_string()),
            credential_name: credential.map(ToString::to_string),
        }),
    }
}

#[test]
fn test_server_without_tls_yields_no_targets() {
    let store = TargetStore::new();
    let plain = GatewayServer {
        hosts: vec!["plain.example.com".to_string()],
        port: None,
        tls: None,
    };

    let count = apply_gateway(&store, &gateway("default", vec![plain]), "pool");
    assert_eq!(count, 0);
    assert!(store.is_empty());
}

#[test]
fn test_tls_without_credential_is_skipped() {
    let store = TargetStore::new();
    let server = tls_server(&["svc.example.com"], None, 443);

    let count = apply_gateway(&store, &gateway("default", vec![server]), "pool");
    assert_eq!(count, 0);
    assert!(store.is_empty());
}

#[test]
fn test_each_host_becomes_a_target() {
    let store = TargetStore::new();
    let server = tls_server(&["a.example.com", "b.example.com"], Some("ab-tls"), 443);

    let count = apply_gateway(&store, &gateway("prod", vec![server]), "pool");
    assert_eq!(count, 2);

    let snapshot = store.snapshot();
    let a = &snapshot["a.example.com"];
    assert_eq!(a.namespace, "prod");
    assert_eq!(a.secret_name, "ab-tls");
    assert_eq!(a.backend_pool, "pool");
    assert_eq!(a.port, Some(443));
    assert_eq!(snapshot["b.example.com"].secret_name, "ab-tls");
}

#[test]
fn test_mixed_servers_only_tls_counts() {
    let store = TargetStore::new();
    let servers = vec![
        tls_server(&["secure.example.com"], Some("tls"), 443),
        GatewayServer {
            hosts: vec!["plain.example.com".to_string()],
            port: None,
            tls: None,
        },
    ];

    let count = apply_gateway(&store, &gateway("default", servers), "pool");
    assert_eq!(count, 1);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_last_writer_wins_across_gateways() {
    let store = TargetStore::new();
    let first = gateway(
        "team-a",
        vec![tls_server(&["svc.example.com"], Some("old-tls"), 443)],
    );
    let second = gateway(
        "team-b",
        vec![tls_server(&["svc.example.com"], Some("new-tls"), 443)],
    );

    apply_gateway(&store, &first, "pool");
    apply_gateway(&store, &second, "pool");

    assert_eq!(store.len(), 1);
    let target = &store.snapshot()["svc.example.com"];
    assert_eq!(target.namespace, "team-b");
    assert_eq!(target.secret_name, "new-tls");
}

#[test]
fn test_transient_watch_error_keeps_the_loop_running() {
    // The watcher stream yields Err items for apiserver failures and keeps
    // polling; the loop must ride them out instead of terminating.
    let store = TargetStore::new();
    store.upsert(TerminationTarget {
        host: "svc.example.com".to_string(),
        namespace: "default".to_string(),
        secret_name: "tls".to_string(),
        backend_pool: "pool".to_string(),
        port: Some(443),
    });

    let error = watcher::Error::WatchError(Box::new(kube::core::Status {
        status: Some(kube::core::response::StatusSummary::Failure),
        message: "etcdserver: request timed out".to_string(),
        reason: "InternalError".to_string(),
        code: 500,
        details: None,
        metadata: None,
    }));

    let flow = handle_watch_item(&store, Err(error), "pool");
    assert_eq!(flow, WatchFlow::Continue);
    // Existing desired state is untouched by the error.
    assert_eq!(store.len(), 1);
}

#[test]
fn test_apply_event_flows_into_the_store() {
    let store = TargetStore::new();
    let g = gateway(
        "default",
        vec![tls_server(&["svc.example.com"], Some("tls"), 443)],
    );

    let flow = handle_watch_item(&store, Ok(Some(Event::Apply(g))), "pool");
    assert_eq!(flow, WatchFlow::Continue);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_delete_event_retains_targets() {
    let store = TargetStore::new();
    let g = gateway(
        "default",
        vec![tls_server(&["svc.example.com"], Some("tls"), 443)],
    );
    apply_gateway(&store, &g, "pool");

    let flow = handle_watch_item(&store, Ok(Some(Event::Delete(g))), "pool");
    assert_eq!(flow, WatchFlow::Continue);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_exhausted_stream_stops_the_loop() {
    let store = TargetStore::new();
    let flow = handle_watch_item(&store, Ok(None), "pool");
    assert_eq!(flow, WatchFlow::Stop);
}

#[test]
fn test_reapply_is_idempotent() {
    let store = TargetStore::new();
    let g = gateway(
        "default",
        vec![tls_server(&["svc.example.com"], Some("tls"), 443)],
    );

    apply_gateway(&store, &g, "pool");
    apply_gateway(&store, &g, "pool");

    assert_eq!(store.len(), 1);
}
