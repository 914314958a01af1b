// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Wire model for Azure Application Gateway configuration documents.
//!
//! The ARM API has no partial update for application gateways: the sync
//! cycle fetches the whole configuration document, edits the collections it
//! owns, and PUTs the document back in full. Every struct here therefore
//! carries a `#[serde(flatten)]` pass-through map so fields this model does
//! not name survive the round trip untouched: backend pools, probes, SKU,
//! WAF policy and whatever else the operators configured by hand.
//!
//! Only the fields the controller actually reads or writes are modeled:
//! the provisioning state, the resource id, the frontend IP configurations,
//! and the three collections it regenerates (SSL certificates, HTTP
//! listeners, request routing rules).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A full application gateway configuration document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationGateway {
    /// ARM resource id; the base for all sub-resource references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Resource name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Gateway properties
    #[serde(default)]
    pub properties: GatewayProperties,

    /// Fields not modeled here, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApplicationGateway {
    /// Whether the gateway reports an update already in flight.
    ///
    /// A busy gateway must not be modified; racing a concurrent update
    /// would either fail or clobber it.
    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.properties.provisioning_state.as_deref()
            == Some(crate::constants::PROVISIONING_STATE_UPDATING)
    }
}

/// The `properties` envelope of an application gateway.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayProperties {
    /// Provisioning state flag (`Succeeded`, `Updating`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,

    /// Frontend IP configurations; the first entry is the shared frontend
    /// every generated listener references
    // ARM spells this with a capital IP, which camelCase renaming misses
    #[serde(
        default,
        rename = "frontendIPConfigurations",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub frontend_ip_configurations: Vec<FrontendIpConfiguration>,

    /// Uploaded SSL certificates
    #[serde(default)]
    pub ssl_certificates: Vec<SslCertificate>,

    /// HTTP/HTTPS listeners
    #[serde(default)]
    pub http_listeners: Vec<HttpListener>,

    /// Request routing rules
    #[serde(default)]
    pub request_routing_rules: Vec<RequestRoutingRule>,

    /// Fields not modeled here, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference to a sibling sub-resource within the same gateway document.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubResource {
    /// Full ARM path of the referenced sub-resource
    pub id: String,
}

impl SubResource {
    /// Build a reference to a named sub-resource of a gateway:
    /// `<gatewayResourceID>/<subResourceType>/<name>`.
    #[must_use]
    pub fn sibling(gateway_id: &str, sub_type: &str, name: &str) -> Self {
        Self {
            id: format!("{gateway_id}/{sub_type}/{name}"),
        }
    }
}

/// A frontend IP configuration entry.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendIpConfiguration {
    /// ARM id of this frontend IP configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Configuration name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An uploaded SSL certificate.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SslCertificate {
    /// Certificate resource name
    pub name: String,

    #[serde(default)]
    pub properties: SslCertificateProperties,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Properties of an uploaded SSL certificate.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SslCertificateProperties {
    /// Base64 PKCS#12 archive; ARM never echoes this back on reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Passphrase of the archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An HTTP/HTTPS listener.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpListener {
    /// Listener resource name
    pub name: String,

    #[serde(default)]
    pub properties: HttpListenerProperties,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Properties of an HTTP/HTTPS listener.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpListenerProperties {
    /// Shared frontend IP configuration reference
    #[serde(
        default,
        rename = "frontendIPConfiguration",
        skip_serializing_if = "Option::is_none"
    )]
    pub frontend_ip_configuration: Option<SubResource>,

    /// Frontend port reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend_port: Option<SubResource>,

    /// `Http` or `Https`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// Hostname this listener matches on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,

    /// SSL certificate reference for `Https` listeners
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_certificate: Option<SubResource>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A request routing rule linking a listener to a backend.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRoutingRule {
    /// Rule resource name; generated rules share their listener's name
    pub name: String,

    /// Etag; `*` on generated rules so updates never conflict
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    #[serde(default)]
    pub properties: RequestRoutingRuleProperties,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Properties of a request routing rule.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRoutingRuleProperties {
    /// Rule type; generated rules are `Basic`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,

    /// Listener this rule routes from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_listener: Option<SubResource>,

    /// Backend address pool this rule routes to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_address_pool: Option<SubResource>,

    /// Backend HTTP settings applied on the backend leg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_http_settings: Option<SubResource>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
#[path = "appgw_tests.rs"]
mod appgw_tests;
