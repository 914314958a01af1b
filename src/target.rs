// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Termination targets and the owned-resource naming convention.
//!
//! A [`TerminationTarget`] is the controller's record of one host that must
//! be TLS-terminated at the external gateway. Targets are created from
//! watched `Gateway` resources and consumed by the sync cycle, which derives
//! deterministic gateway-side resource names from them.
//!
//! Naming is the only ownership mechanism the gateway API gives us: every
//! resource this controller writes carries the configured prefix, and every
//! resource carrying the prefix is regenerated from scratch on each cycle.
//! The names must therefore round-trip bit-exactly between cycles.

/// One host requiring TLS termination at the external gateway.
///
/// Keyed by `host` in the desired-state store; last writer wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationTarget {
    /// Hostname the listener terminates (e.g. `svc.example.com`)
    pub host: String,
    /// Namespace of the gateway object that declared the host
    pub namespace: String,
    /// Name of the TLS secret holding the certificate and key
    pub secret_name: String,
    /// Backend address pool the routing rule points at
    pub backend_pool: String,
    /// Declared server port, if any
    pub port: Option<i32>,
}

impl TerminationTarget {
    /// Deterministic name for this target's HTTPS listener: `<prefix>-<host>`.
    ///
    /// The routing rule linking the listener to its backend uses the same name.
    #[must_use]
    pub fn listener_name(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.host)
    }

    /// Deterministic name for this target's uploaded SSL certificate:
    /// `<prefix>-<namespace>-<secretName>`.
    ///
    /// Namespace-qualified so identically named secrets in different
    /// namespaces never collide on the gateway.
    #[must_use]
    pub fn certificate_name(&self, prefix: &str) -> String {
        format!("{prefix}-{}-{}", self.namespace, self.secret_name)
    }
}

/// Whether a gateway-side resource name is owned by this controller.
///
/// Owned resources are disposable: the sync cycle drops every owned entry
/// from the fetched configuration and regenerates the set from the current
/// desired state. A hand-created resource that happens to start with the
/// prefix will be discarded on the next cycle; that is the accepted risk of
/// the naming convention.
#[must_use]
pub fn is_owned(resource_name: &str, prefix: &str) -> bool {
    resource_name.starts_with(prefix)
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod target_tests;
