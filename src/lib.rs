// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! # agwsync - Application Gateway TLS listener sync for Kubernetes
//!
//! agwsync keeps the TLS listener configuration of an Azure Application
//! Gateway (WAF) in sync with `Gateway` resources declared inside a
//! Kubernetes cluster. Each TLS server block on a watched gateway becomes
//! an HTTPS listener, a request routing rule, and an uploaded PKCS#12
//! certificate on the application gateway.
//!
//! ## How it works
//!
//! - A watcher folds gateway add/update events into an in-memory
//!   desired-state store (hostname → termination target).
//! - A sync loop periodically fetches the live gateway configuration,
//!   preserves every resource not carrying the controller's name prefix,
//!   regenerates the owned set from the store, and pushes the merged
//!   document back as a single full update, waiting for the long-running
//!   operation to complete.
//! - Cluster TLS secrets are converted to password-protected PKCS#12
//!   archives on the way out, classifying chain certificates by their
//!   key-usage extension.
//!
//! ## Modules
//!
//! - [`crd`] - Watched `Gateway` custom resource types
//! - [`watch`] - Watch event adapter feeding the desired-state store
//! - [`store`] - Concurrency-safe desired-state store
//! - [`target`] - Termination targets and the owned-name convention
//! - [`director`] - The sync loop and merge algorithm
//! - [`appgw`] - Application gateway wire model
//! - [`azure`] - ARM REST client and long-running-operation polling
//! - [`certs`] - Certificate bundle parsing and PKCS#12 packaging
//! - [`secrets`] - TLS secret lookup
//! - [`metrics`] / [`server`] - Observability endpoint

pub mod appgw;
pub mod azure;
pub mod certs;
pub mod config;
pub mod constants;
pub mod crd;
pub mod director;
pub mod metrics;
pub mod secrets;
pub mod server;
pub mod store;
pub mod sync_errors;
pub mod target;
pub mod watch;
