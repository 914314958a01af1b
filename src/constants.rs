// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Global constants for the agwsync controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Kubernetes Secret Constants
// ============================================================================

/// Data key holding the PEM private key in a `kubernetes.io/tls` secret
pub const SECRET_TLS_KEY: &str = "tls.key";

/// Data key holding the PEM certificate chain in a `kubernetes.io/tls` secret
pub const SECRET_TLS_CERT: &str = "tls.crt";

// ============================================================================
// Application Gateway Constants
// ============================================================================

/// Provisioning state reported by the gateway while an update is in flight.
///
/// A fetched gateway in this state must not be modified; the sync cycle
/// backs off and retries on the next interval.
pub const PROVISIONING_STATE_UPDATING: &str = "Updating";

/// Protocol value for TLS-terminating listeners
pub const PROTOCOL_HTTPS: &str = "Https";

/// Rule type for the routing rules this controller creates
pub const RULE_TYPE_BASIC: &str = "Basic";

/// Sub-resource path segment for frontend ports
pub const SUB_FRONTEND_PORTS: &str = "frontEndPorts";

/// Sub-resource path segment for SSL certificates
pub const SUB_SSL_CERTIFICATES: &str = "sslCertificates";

/// Sub-resource path segment for HTTP listeners
pub const SUB_HTTP_LISTENERS: &str = "httpListeners";

/// Sub-resource path segment for backend address pools
pub const SUB_BACKEND_ADDRESS_POOLS: &str = "backendAddressPools";

/// Sub-resource path segment for backend HTTP settings
pub const SUB_BACKEND_HTTP_SETTINGS: &str = "backendHttpSettingsCollection";

/// Passphrase protecting uploaded PKCS#12 archives.
///
/// The archive only travels inside an authenticated ARM request, so the
/// passphrase is a fixed literal rather than configuration.
pub const PFX_PASSPHRASE: &str = "azure";

// ============================================================================
// Azure Resource Manager Constants
// ============================================================================

/// Default ARM endpoint for the public cloud
pub const DEFAULT_ARM_BASE_URL: &str = "https://management.azure.com";

/// Default `api-version` for application gateway operations
pub const DEFAULT_ARM_API_VERSION: &str = "2023-09-01";

/// IMDS token endpoint for managed-identity authentication
pub const IMDS_TOKEN_URL: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

/// IMDS API version
pub const IMDS_API_VERSION: &str = "2018-02-01";

/// Resource audience for ARM tokens
pub const ARM_TOKEN_RESOURCE: &str = "https://management.azure.com/";

/// Refresh a cached token this many seconds before it expires
pub const TOKEN_REFRESH_SLACK_SECS: u64 = 300;

// ============================================================================
// Controller Defaults
// ============================================================================

/// Default prefix marking gateway-side resources as owned by this controller
pub const DEFAULT_LISTENER_PREFIX: &str = "wd";

/// Default frontend port name referenced by generated listeners
pub const DEFAULT_FRONTEND_PORT_NAME: &str = "https";

/// Default interval between sync cycles, also used as the flat retry delay
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 5;

/// Default bind address for the health/metrics endpoint
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";
