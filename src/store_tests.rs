// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Unit tests for `store.rs`

use super::*;

fn target(host: &str, secret: &str) -> TerminationTarget {
    TerminationTarget {
        host: host.to_string(),
        namespace: "default".to_string(),
        secret_name: secret.to_string(),
        backend_pool: "pool".to_string(),
        port: Some(443),
    }
}

#[test]
fn test_empty_store() {
    let store = TargetStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert!(store.snapshot().is_empty());
}

#[test]
fn test_upsert_keys_by_host() {
    let store = TargetStore::new();
    store.upsert(target("a.example.com", "a-tls"));
    store.upsert(target("b.example.com", "b-tls"));

    assert_eq!(store.len(), 2);
    let snapshot = store.snapshot();
    assert_eq!(snapshot["a.example.com"].secret_name, "a-tls");
    assert_eq!(snapshot["b.example.com"].secret_name, "b-tls");
}

#[test]
fn test_upsert_last_writer_wins() {
    let store = TargetStore::new();
    store.upsert(target("svc.example.com", "old-tls"));
    store.upsert(target("svc.example.com", "new-tls"));

    assert_eq!(store.len(), 1);
    assert_eq!(store.snapshot()["svc.example.com"].secret_name, "new-tls");
}

#[test]
fn test_snapshot_is_isolated_from_later_writes() {
    let store = TargetStore::new();
    store.upsert(target("a.example.com", "a-tls"));

    let snapshot = store.snapshot();
    store.upsert(target("b.example.com", "b-tls"));

    assert_eq!(snapshot.len(), 1);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_clone_shares_underlying_map() {
    let store = TargetStore::new();
    let writer = store.clone();
    writer.upsert(target("svc.example.com", "svc-tls"));

    assert_eq!(store.len(), 1);
}

#[test]
fn test_snapshot_iterates_in_host_order() {
    let store = TargetStore::new();
    store.upsert(target("z.example.com", "z"));
    store.upsert(target("a.example.com", "a"));
    store.upsert(target("m.example.com", "m"));

    let hosts: Vec<String> = store.snapshot().keys().cloned().collect();
    assert_eq!(hosts, ["a.example.com", "m.example.com", "z.example.com"]);
}
