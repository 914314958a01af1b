// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Error types for gateway, secret, and certificate operations.
//!
//! This module provides specialized error types for:
//! - Azure Resource Manager API operations (fetch, update, long-running waits)
//! - Kubernetes TLS secret lookups
//! - Certificate bundle parsing and PKCS#12 packaging
//!
//! All of these are recoverable at the sync-loop boundary: gateway-level
//! errors delay the next cycle, secret- and certificate-level errors skip
//! only the affected termination target.

use thiserror::Error;

/// Errors that can occur when talking to the Azure Resource Manager API.
#[derive(Error, Debug)]
pub enum GatewayApiError {
    /// The ARM endpoint could not be reached at all
    #[error("ARM request to {url} failed: {source}")]
    Unreachable {
        /// URL of the failed request
        url: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// ARM answered with a non-success HTTP status
    #[error("ARM returned HTTP {status} for {url}: {message}")]
    RequestFailed {
        /// HTTP status code returned by ARM
        status: u16,
        /// URL of the failed request
        url: String,
        /// Response body, as far as it could be read
        message: String,
    },

    /// ARM answered 2xx but the body did not match the expected shape
    #[error("unexpected ARM response body from {url}: {reason}")]
    UnexpectedBody {
        /// URL of the request
        url: String,
        /// What failed to parse
        reason: String,
    },

    /// A long-running operation finished in a terminal non-success state
    #[error("gateway operation at {operation_url} ended as '{status}': {message}")]
    OperationFailed {
        /// The status URL that was being polled
        operation_url: String,
        /// Terminal status reported by ARM (`Failed` or `Canceled`)
        status: String,
        /// Error detail from the operation body, if any
        message: String,
    },

    /// No bearer token could be acquired for ARM
    #[error("failed to acquire ARM bearer token: {reason}")]
    TokenAcquisition {
        /// Why token acquisition failed
        reason: String,
    },
}

/// Errors that can occur when fetching TLS material from cluster secrets.
#[derive(Error, Debug)]
pub enum SecretError {
    /// The referenced secret does not exist
    #[error("secret {namespace}/{name} not found")]
    NotFound {
        /// Namespace the secret was looked up in
        namespace: String,
        /// Name of the missing secret
        name: String,
    },

    /// The secret exists but is missing a required data key
    #[error("secret {namespace}/{name} has no '{key}' data key")]
    MissingDataKey {
        /// Namespace of the secret
        namespace: String,
        /// Name of the secret
        name: String,
        /// The absent data key (`tls.key` or `tls.crt`)
        key: String,
    },

    /// The Kubernetes API call itself failed
    #[error("failed to fetch secret {namespace}/{name}")]
    Api {
        /// Namespace of the secret
        namespace: String,
        /// Name of the secret
        name: String,
        /// Underlying client error
        #[source]
        source: kube::Error,
    },
}

/// Errors that can occur while parsing or packaging certificate bundles.
#[derive(Error, Debug)]
pub enum CertificateError {
    /// The private key block is absent or not a parseable key
    #[error("invalid private key: {reason}")]
    InvalidKey {
        /// Parser detail
        reason: String,
    },

    /// A certificate block in the payload failed to decode
    #[error("invalid certificate in bundle: {reason}")]
    InvalidCertificate {
        /// Parser detail
        reason: String,
    },

    /// The payload decoded but contained no digital-signature-capable certificate
    #[error("certificate payload contains no leaf certificate")]
    NoLeafCertificate,

    /// PKCS#12 encoding failed
    #[error("failed to package PKCS#12 archive: {reason}")]
    PackagingFailed {
        /// OpenSSL error detail
        reason: String,
    },
}

#[cfg(test)]
#[path = "sync_errors_tests.rs"]
mod sync_errors_tests;
