// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Azure Resource Manager client for application gateways.
//!
//! The sync cycle needs three operations against ARM: fetch the gateway
//! configuration document, submit the full document as an update, and wait
//! for the resulting long-running operation to finish. The [`AppGateways`]
//! trait captures that boundary; [`ArmClient`] implements it over the ARM
//! REST API:
//!
//! - `GET`/`PUT` `.../providers/Microsoft.Network/applicationGateways/{name}`
//!   with an `api-version` query parameter;
//! - updates are asynchronous: ARM answers `200`/`201`/`202` with an
//!   `Azure-AsyncOperation` (or `Location`) header naming a status URL,
//!   which [`ArmClient::wait`] polls at a fixed interval until the
//!   operation reports a terminal state.
//!
//! Authentication is a bearer token: either a static token handed in via
//! configuration, or one fetched (and cached until near expiry) from the
//! IMDS managed-identity endpoint available to workloads running on Azure.

use crate::appgw::ApplicationGateway;
use crate::constants::{
    ARM_TOKEN_RESOURCE, IMDS_API_VERSION, IMDS_TOKEN_URL, TOKEN_REFRESH_SLACK_SECS,
};
use crate::sync_errors::GatewayApiError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

/// Header naming the status URL of an asynchronous ARM operation
const ASYNC_OPERATION_HEADER: &str = "Azure-AsyncOperation";

/// Fallback header for operations that only return a polling location
const LOCATION_HEADER: &str = "Location";

/// Terminal success status of an ARM operation
const OPERATION_SUCCEEDED: &str = "Succeeded";

/// Terminal failure statuses of an ARM operation
const OPERATION_FAILED: &str = "Failed";
const OPERATION_CANCELED: &str = "Canceled";

/// Handle to a long-running gateway update.
///
/// `status_url` is `None` when ARM completed the update synchronously.
#[derive(Debug, Clone)]
pub struct OperationHandle {
    /// URL to poll for operation status
    pub status_url: Option<String>,
}

/// Boundary to the cloud gateway API.
#[async_trait]
pub trait AppGateways: Send + Sync {
    /// Fetch the live configuration of a gateway.
    async fn get(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<ApplicationGateway, GatewayApiError>;

    /// Submit a full configuration document as an update.
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        gateway: &ApplicationGateway,
    ) -> Result<OperationHandle, GatewayApiError>;

    /// Block until the operation behind `handle` reaches a terminal state.
    async fn wait(&self, handle: OperationHandle) -> Result<(), GatewayApiError>;
}

/// How the client obtains ARM bearer tokens.
pub enum ArmAuth {
    /// Fixed token supplied via configuration or environment
    StaticToken(String),
    /// Managed identity via the IMDS endpoint, cached until near expiry
    ManagedIdentity {
        /// Token endpoint; injectable so tests can point it at a mock server
        endpoint: String,
        /// Cached token and its expiry, unix seconds
        cache: Mutex<Option<CachedToken>>,
    },
}

impl ArmAuth {
    /// Managed-identity auth against the IMDS endpoint, with an empty cache.
    #[must_use]
    pub fn managed_identity() -> Self {
        Self::ManagedIdentity {
            endpoint: IMDS_TOKEN_URL.to_string(),
            cache: Mutex::new(None),
        }
    }
}

/// A bearer token with its expiry time.
#[derive(Debug, Clone)]
pub struct CachedToken {
    token: String,
    expires_at_unix: u64,
}

/// Token response shape of the IMDS endpoint.
#[derive(Debug, Deserialize)]
struct ImdsTokenResponse {
    access_token: String,
    /// Unix-seconds expiry, stringified by IMDS
    expires_on: String,
}

/// Status body of a polled ARM operation.
#[derive(Debug, Deserialize)]
struct OperationStatus {
    status: String,
    #[serde(default)]
    error: Option<OperationError>,
}

/// Error detail inside a failed operation body.
#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// ARM REST client for application gateways.
pub struct ArmClient {
    http: reqwest::Client,
    base_url: String,
    subscription_id: String,
    api_version: String,
    auth: ArmAuth,
    poll_interval: Duration,
}

impl ArmClient {
    /// Create a client against the given ARM endpoint.
    ///
    /// `base_url` is injectable so tests can point the client at a mock
    /// server; production uses [`crate::constants::DEFAULT_ARM_BASE_URL`].
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        subscription_id: impl Into<String>,
        api_version: impl Into<String>,
        auth: ArmAuth,
        poll_interval: Duration,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            subscription_id: subscription_id.into(),
            api_version: api_version.into(),
            auth,
            poll_interval,
        }
    }

    fn gateway_url(&self, resource_group: &str, name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/applicationGateways/{}?api-version={}",
            self.base_url, self.subscription_id, resource_group, name, self.api_version
        )
    }

    /// Resolve a bearer token, consulting the cache for managed identity.
    async fn bearer_token(&self) -> Result<String, GatewayApiError> {
        match &self.auth {
            ArmAuth::StaticToken(token) => Ok(token.clone()),
            ArmAuth::ManagedIdentity { endpoint, cache } => {
                let mut cached = cache.lock().await;
                let now = unix_now();
                if let Some(token) = cached.as_ref() {
                    if now + TOKEN_REFRESH_SLACK_SECS < token.expires_at_unix {
                        return Ok(token.token.clone());
                    }
                    debug!("cached ARM token near expiry, refreshing");
                }

                let fresh = self.fetch_imds_token(endpoint).await?;
                let token = fresh.token.clone();
                *cached = Some(fresh);
                Ok(token)
            }
        }
    }

    /// Fetch a fresh token from the IMDS endpoint.
    async fn fetch_imds_token(&self, endpoint: &str) -> Result<CachedToken, GatewayApiError> {
        let url = Url::parse_with_params(
            endpoint,
            [
                ("api-version", IMDS_API_VERSION),
                ("resource", ARM_TOKEN_RESOURCE),
            ],
        )
        .map_err(|e| GatewayApiError::TokenAcquisition {
            reason: format!("invalid IMDS endpoint '{endpoint}': {e}"),
        })?;

        let response = self
            .http
            .get(url.as_str())
            .header("Metadata", "true")
            .send()
            .await
            .map_err(|e| GatewayApiError::TokenAcquisition {
                reason: format!("IMDS request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(GatewayApiError::TokenAcquisition {
                reason: format!("IMDS returned HTTP {}", response.status().as_u16()),
            });
        }

        let body: ImdsTokenResponse =
            response
                .json()
                .await
                .map_err(|e| GatewayApiError::TokenAcquisition {
                    reason: format!("malformed IMDS token response: {e}"),
                })?;
        let expires_at_unix =
            body.expires_on
                .parse::<u64>()
                .map_err(|e| GatewayApiError::TokenAcquisition {
                    reason: format!("unparseable token expiry '{}': {e}", body.expires_on),
                })?;

        Ok(CachedToken {
            token: body.access_token,
            expires_at_unix,
        })
    }

    /// Read a response body for error reporting, swallowing read failures.
    async fn error_body(response: reqwest::Response) -> String {
        response.text().await.unwrap_or_default()
    }
}

#[async_trait]
impl AppGateways for ArmClient {
    async fn get(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<ApplicationGateway, GatewayApiError> {
        let url = self.gateway_url(resource_group, name);
        let token = self.bearer_token().await?;

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| GatewayApiError::Unreachable {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayApiError::RequestFailed {
                status: status.as_u16(),
                url,
                message: Self::error_body(response).await,
            });
        }

        response
            .json::<ApplicationGateway>()
            .await
            .map_err(|e| GatewayApiError::UnexpectedBody {
                url,
                reason: e.to_string(),
            })
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        gateway: &ApplicationGateway,
    ) -> Result<OperationHandle, GatewayApiError> {
        let url = self.gateway_url(resource_group, name);
        let token = self.bearer_token().await?;

        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .json(gateway)
            .send()
            .await
            .map_err(|e| GatewayApiError::Unreachable {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayApiError::RequestFailed {
                status: status.as_u16(),
                url,
                message: Self::error_body(response).await,
            });
        }

        let status_url = response
            .headers()
            .get(ASYNC_OPERATION_HEADER)
            .or_else(|| response.headers().get(LOCATION_HEADER))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if status_url.is_none() {
            debug!(gateway = %name, "update completed synchronously, nothing to poll");
        }

        Ok(OperationHandle { status_url })
    }

    async fn wait(&self, handle: OperationHandle) -> Result<(), GatewayApiError> {
        let Some(operation_url) = handle.status_url else {
            return Ok(());
        };

        loop {
            let token = self.bearer_token().await?;
            let response = self
                .http
                .get(&operation_url)
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| GatewayApiError::Unreachable {
                    url: operation_url.clone(),
                    source: e,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(GatewayApiError::RequestFailed {
                    status: status.as_u16(),
                    url: operation_url,
                    message: Self::error_body(response).await,
                });
            }

            let body: OperationStatus =
                response
                    .json()
                    .await
                    .map_err(|e| GatewayApiError::UnexpectedBody {
                        url: operation_url.clone(),
                        reason: e.to_string(),
                    })?;

            match body.status.as_str() {
                OPERATION_SUCCEEDED => return Ok(()),
                OPERATION_FAILED | OPERATION_CANCELED => {
                    let message = body
                        .error
                        .map(|e| format!("{}: {}", e.code, e.message))
                        .unwrap_or_default();
                    return Err(GatewayApiError::OperationFailed {
                        operation_url,
                        status: body.status,
                        message,
                    });
                }
                other => {
                    debug!(status = %other, "gateway operation still running");
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_else(|e| {
            warn!("system clock before unix epoch: {e}");
            0
        })
}

#[cfg(test)]
#[path = "azure_tests.rs"]
mod azure_tests;
