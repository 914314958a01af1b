// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Custom resource types for watched gateway objects.
//!
//! agwsync watches Istio `Gateway` resources (`networking.istio.io/v1alpha3`)
//! and reads exactly the fields it needs: the server blocks, their hosts, and
//! the TLS credential reference. Everything else on the resource is ignored;
//! the CRD itself is installed and owned by the mesh, not by this controller.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Spec of an Istio `Gateway` resource, reduced to the fields this
/// controller consumes.
#[derive(CustomResource, Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "networking.istio.io",
    version = "v1alpha3",
    kind = "Gateway",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    /// Server blocks declared on the gateway
    #[serde(default)]
    pub servers: Vec<GatewayServer>,
}

/// One server block on a gateway: a set of hosts bound to a port, with
/// optional TLS settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayServer {
    /// Hostnames served by this block
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Port the server block is bound to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<ServerPort>,

    /// TLS settings; absent for plain listeners, which this controller skips
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<ServerTls>,
}

/// Port declaration of a server block.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerPort {
    /// Port number
    pub number: i32,

    /// Port name (e.g. `https`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Declared protocol (e.g. `HTTPS`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// TLS settings of a server block.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServerTls {
    /// TLS mode (e.g. `SIMPLE`, `PASSTHROUGH`); informational here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Name of the secret holding the certificate/key pair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_name: Option<String>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
