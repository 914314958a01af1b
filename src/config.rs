// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Process configuration.
//!
//! All settings come from flags with environment fallbacks; the defaults
//! match the values the controller has historically shipped with. The
//! PKCS#12 passphrase is deliberately not configurable, see
//! [`crate::constants::PFX_PASSPHRASE`].

use crate::constants::{
    DEFAULT_ARM_API_VERSION, DEFAULT_FRONTEND_PORT_NAME, DEFAULT_HTTP_ADDR,
    DEFAULT_LISTENER_PREFIX, DEFAULT_SYNC_INTERVAL_SECS,
};
use clap::Parser;
use std::time::Duration;

/// Configuration for the agwsync controller.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "agwsync",
    about = "Syncs TLS listeners from Gateway resources to an Azure Application Gateway"
)]
pub struct SyncerConfig {
    /// Azure subscription holding the application gateway
    #[arg(long, env = "AGW_SUBSCRIPTION_ID")]
    pub subscription_id: String,

    /// Resource group of the application gateway
    #[arg(long, env = "AGW_RESOURCE_GROUP")]
    pub resource_group: String,

    /// Name of the application gateway instance
    #[arg(long, env = "AGW_NAME")]
    pub gateway_name: String,

    /// Backend address pool generated routing rules point at
    #[arg(long, env = "AGW_BACKEND_POOL")]
    pub backend_pool: String,

    /// Backend HTTP settings applied by generated routing rules
    #[arg(long, env = "AGW_BACKEND_HTTP_SETTINGS")]
    pub backend_http_settings: String,

    /// Frontend port name referenced by generated listeners
    #[arg(long, env = "AGW_FRONTEND_PORT", default_value = DEFAULT_FRONTEND_PORT_NAME)]
    pub frontend_port: String,

    /// Prefix marking gateway-side resources as owned by this controller
    #[arg(long, env = "AGW_LISTENER_PREFIX", default_value = DEFAULT_LISTENER_PREFIX)]
    pub listener_prefix: String,

    /// Seconds between sync cycles; also the flat retry delay
    #[arg(long, env = "AGW_SYNC_INTERVAL_SECS", default_value_t = DEFAULT_SYNC_INTERVAL_SECS)]
    pub sync_interval_secs: u64,

    /// ARM api-version used for gateway operations
    #[arg(long, env = "AGW_API_VERSION", default_value = DEFAULT_ARM_API_VERSION)]
    pub api_version: String,

    /// Static ARM bearer token; falls back to IMDS managed identity when unset
    #[arg(long, env = "AZURE_ARM_TOKEN", hide_env_values = true)]
    pub arm_token: Option<String>,

    /// Bind address for the health and metrics endpoint
    #[arg(long, env = "AGW_HTTP_ADDR", default_value = DEFAULT_HTTP_ADDR)]
    pub http_addr: String,
}

impl SyncerConfig {
    /// Interval between sync cycles.
    #[must_use]
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
