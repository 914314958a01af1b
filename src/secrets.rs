// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! TLS secret lookup behind a narrow trait seam.
//!
//! The sync cycle only ever needs two byte strings per target: the PEM key
//! and the PEM certificate chain from a `kubernetes.io/tls` secret. The
//! [`SecretSource`] trait captures exactly that, so the director can be
//! exercised in tests without a cluster; [`KubeSecrets`] is the production
//! implementation on top of the Kubernetes API.

use crate::constants::{SECRET_TLS_CERT, SECRET_TLS_KEY};
use crate::sync_errors::SecretError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use tracing::debug;

/// PEM payloads extracted from one TLS secret.
#[derive(Debug, Clone)]
pub struct TlsMaterial {
    /// Contents of the `tls.key` data key
    pub key_pem: Vec<u8>,
    /// Contents of the `tls.crt` data key
    pub cert_pem: Vec<u8>,
}

/// Source of TLS material for termination targets.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Fetch the TLS key and certificate payload of a named secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError`] when the secret is absent, lacks the TLS
    /// data keys, or the API call fails.
    async fn tls_material(&self, namespace: &str, name: &str) -> Result<TlsMaterial, SecretError>;
}

/// Kubernetes-backed secret source.
#[derive(Clone)]
pub struct KubeSecrets {
    client: Client,
}

impl KubeSecrets {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretSource for KubeSecrets {
    async fn tls_material(&self, namespace: &str, name: &str) -> Result<TlsMaterial, SecretError> {
        debug!(namespace = %namespace, name = %name, "fetching TLS secret");

        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api.get(name).await.map_err(|e| match &e {
            kube::Error::Api(response) if response.code == 404 => SecretError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
            _ => SecretError::Api {
                namespace: namespace.to_string(),
                name: name.to_string(),
                source: e,
            },
        })?;

        let data = secret.data.unwrap_or_default();
        let missing = |key: &str| SecretError::MissingDataKey {
            namespace: namespace.to_string(),
            name: name.to_string(),
            key: key.to_string(),
        };

        let key_pem = data
            .get(SECRET_TLS_KEY)
            .ok_or_else(|| missing(SECRET_TLS_KEY))?
            .0
            .clone();
        let cert_pem = data
            .get(SECRET_TLS_CERT)
            .ok_or_else(|| missing(SECRET_TLS_CERT))?
            .0
            .clone();

        Ok(TlsMaterial { key_pem, cert_pem })
    }
}
