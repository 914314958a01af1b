// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! The sync loop: merges desired termination state into the live gateway.
//!
//! Each cycle fetches the full application gateway configuration, drops
//! every resource this controller owns (by name prefix), regenerates the
//! owned set from the current desired-state snapshot, and pushes the merged
//! document back. Resources without the prefix pass through every cycle
//! untouched. The full rebuild deliberately avoids tracking resource
//! identity across cycles; owned resources are disposable by convention.
//!
//! Error handling is layered by blast radius:
//! - a target whose secret is missing or whose certificate material is
//!   malformed is skipped for this cycle; the rest proceed;
//! - a gateway that reports an update in flight makes the whole cycle a
//!   no-op (nothing is pushed at all);
//! - fetch or update failures abort the cycle; the loop retries after the
//!   flat interval with no backoff growth;
//! - a fetched gateway without a frontend IP configuration violates a
//!   standing precondition and fails the cycle until an operator fixes it.

use crate::appgw::{
    ApplicationGateway, HttpListener, HttpListenerProperties, RequestRoutingRule,
    RequestRoutingRuleProperties, SslCertificate, SslCertificateProperties, SubResource,
};
use crate::azure::AppGateways;
use crate::certs;
use crate::config::SyncerConfig;
use crate::constants::{
    PFX_PASSPHRASE, PROTOCOL_HTTPS, RULE_TYPE_BASIC, SUB_BACKEND_ADDRESS_POOLS,
    SUB_BACKEND_HTTP_SETTINGS, SUB_FRONTEND_PORTS, SUB_HTTP_LISTENERS, SUB_SSL_CERTIFICATES,
};
use crate::metrics;
use crate::secrets::SecretSource;
use crate::store::TargetStore;
use crate::target::{is_owned, TerminationTarget};
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::collections::BTreeMap;
use std::mem;
use std::time::Instant;
use tokio::sync::watch as signal;
use tracing::{debug, error, info, warn};

/// Outcome of one sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The merged configuration was pushed and the update completed
    Synced {
        /// Targets materialized into listener/rule/certificate triples
        targets: usize,
    },
    /// The gateway reported an update in flight; nothing was touched
    Busy,
}

/// Split a collection into (kept, owned) by the ownership prefix.
///
/// Order is preserved in both halves. Applying the split twice with the
/// same prefix is idempotent: the kept half contains no owned names.
pub fn partition_owned<T>(
    items: Vec<T>,
    prefix: &str,
    name_of: impl Fn(&T) -> &str,
) -> (Vec<T>, Vec<T>) {
    items
        .into_iter()
        .partition(|item| !is_owned(name_of(item), prefix))
}

/// Drives the reconciliation loop against one application gateway.
pub struct Director<G, S> {
    gateways: G,
    secrets: S,
    store: TargetStore,
    config: SyncerConfig,
}

impl<G: AppGateways, S: SecretSource> Director<G, S> {
    #[must_use]
    pub fn new(gateways: G, secrets: S, store: TargetStore, config: SyncerConfig) -> Self {
        Self {
            gateways,
            secrets,
            store,
            config,
        }
    }

    /// Run sync cycles until the stop signal fires.
    ///
    /// The signal prevents new cycles from starting; a cycle already in
    /// flight (including its long-running update wait) runs to completion.
    /// All cycle outcomes (success, busy skip, failure) are followed by
    /// the same flat delay.
    pub async fn run(&self, mut stop: signal::Receiver<bool>) {
        info!(
            gateway = %self.config.gateway_name,
            resource_group = %self.config.resource_group,
            interval_secs = self.config.sync_interval_secs,
            "starting gateway sync loop"
        );

        loop {
            if *stop.borrow() {
                break;
            }

            let started = Instant::now();
            match self.sync_cycle().await {
                Ok(CycleOutcome::Synced { targets }) => {
                    info!(targets, "sync cycle completed");
                    metrics::record_cycle(metrics::OUTCOME_SUCCESS, started.elapsed());
                    metrics::set_target_count(self.store.len());
                }
                Ok(CycleOutcome::Busy) => {
                    info!("gateway is updating, skipping cycle");
                    metrics::record_cycle(metrics::OUTCOME_BUSY, started.elapsed());
                }
                Err(e) => {
                    error!("sync cycle failed: {e:#}");
                    metrics::record_cycle(metrics::OUTCOME_ERROR, started.elapsed());
                }
            }

            tokio::select! {
                () = tokio::time::sleep(self.config.sync_interval()) => {}
                _ = stop.changed() => {}
            }
        }

        info!("gateway sync loop stopped");
    }

    /// Execute one fetch → build → push → wait cycle.
    ///
    /// # Errors
    ///
    /// Returns an error when the gateway cannot be fetched or updated, or
    /// when the fetched configuration violates the frontend-IP
    /// precondition. Per-target failures are absorbed inside the build
    /// step and do not surface here.
    pub async fn sync_cycle(&self) -> Result<CycleOutcome> {
        debug!("fetching application gateway configuration");
        let mut gateway = self
            .gateways
            .get(&self.config.resource_group, &self.config.gateway_name)
            .await
            .context("fetching application gateway")?;

        if gateway.is_updating() {
            return Ok(CycleOutcome::Busy);
        }

        let targets = self.store.snapshot();
        let synced = self.rebuild_owned(&mut gateway, &targets).await?;

        info!(targets = synced, "pushing merged gateway configuration");
        let operation = self
            .gateways
            .create_or_update(
                &self.config.resource_group,
                &self.config.gateway_name,
                &gateway,
            )
            .await
            .context("submitting gateway update")?;
        self.gateways
            .wait(operation)
            .await
            .context("waiting for gateway update to complete")?;

        Ok(CycleOutcome::Synced { targets: synced })
    }

    /// Rebuild the owned slices of the configuration from desired state.
    ///
    /// Drops every owned certificate, listener, and routing rule from the
    /// fetched collections, then appends one regenerated triple per
    /// materializable target. Returns the number of targets materialized.
    async fn rebuild_owned(
        &self,
        gateway: &mut ApplicationGateway,
        targets: &BTreeMap<String, TerminationTarget>,
    ) -> Result<usize> {
        let gateway_id = gateway
            .id
            .clone()
            .context("fetched gateway has no resource id")?;
        // The shared frontend IP is assumed present by design; its absence
        // needs operator intervention, not a retry.
        let frontend_ip_id = gateway
            .properties
            .frontend_ip_configurations
            .first()
            .and_then(|f| f.id.clone())
            .context("fetched gateway has no frontend IP configuration")?;

        let prefix = &self.config.listener_prefix;

        let (mut ssl_certificates, dropped) = partition_owned(
            mem::take(&mut gateway.properties.ssl_certificates),
            prefix,
            |c| c.name.as_str(),
        );
        for cert in &dropped {
            debug!(name = %cert.name, "dropping owned certificate for regeneration");
        }

        let (mut listeners, dropped) = partition_owned(
            mem::take(&mut gateway.properties.http_listeners),
            prefix,
            |l| l.name.as_str(),
        );
        for listener in &dropped {
            debug!(name = %listener.name, "dropping owned listener for regeneration");
        }

        let (mut routing_rules, dropped) = partition_owned(
            mem::take(&mut gateway.properties.request_routing_rules),
            prefix,
            |r| r.name.as_str(),
        );
        for rule in &dropped {
            debug!(name = %rule.name, "dropping owned routing rule for regeneration");
        }

        let mut synced = 0;
        for target in targets.values() {
            debug!(host = %target.host, pool = %target.backend_pool, "syncing target");
            let Some((certificate, listener, rule)) = self
                .materialize_target(target, &gateway_id, &frontend_ip_id)
                .await
            else {
                continue;
            };

            ssl_certificates.push(certificate);
            listeners.push(listener);
            routing_rules.push(rule);
            synced += 1;
        }

        gateway.properties.ssl_certificates = ssl_certificates;
        gateway.properties.http_listeners = listeners;
        gateway.properties.request_routing_rules = routing_rules;

        debug!(
            certificates = gateway.properties.ssl_certificates.len(),
            listeners = gateway.properties.http_listeners.len(),
            rules = gateway.properties.request_routing_rules.len(),
            "merged configuration built"
        );

        Ok(synced)
    }

    /// Build the certificate/listener/rule triple for one target.
    ///
    /// Returns `None` (skipping the target entirely, never a partial
    /// triple) when the secret cannot be fetched or its certificate
    /// material cannot be parsed and packaged.
    async fn materialize_target(
        &self,
        target: &TerminationTarget,
        gateway_id: &str,
        frontend_ip_id: &str,
    ) -> Option<(SslCertificate, HttpListener, RequestRoutingRule)> {
        let prefix = &self.config.listener_prefix;
        let listener_name = target.listener_name(prefix);
        let certificate_name = target.certificate_name(prefix);

        let material = match self
            .secrets
            .tls_material(&target.namespace, &target.secret_name)
            .await
        {
            Ok(material) => material,
            Err(e) => {
                warn!(host = %target.host, "skipping target, secret fetch failed: {e}");
                metrics::record_target_error(metrics::TARGET_ERROR_SECRET);
                return None;
            }
        };

        let archive =
            match certs::parse_tls_material(&material.key_pem, &material.cert_pem)
                .and_then(|bundle| certs::package_pfx(&bundle, PFX_PASSPHRASE))
            {
                Ok(archive) => archive,
                Err(e) => {
                    warn!(host = %target.host, "skipping target, certificate conversion failed: {e}");
                    metrics::record_target_error(metrics::TARGET_ERROR_CERTIFICATE);
                    return None;
                }
            };

        let certificate = SslCertificate {
            name: certificate_name.clone(),
            properties: SslCertificateProperties {
                data: Some(BASE64.encode(archive)),
                password: Some(PFX_PASSPHRASE.to_string()),
                extra: Default::default(),
            },
            extra: Default::default(),
        };

        let listener = HttpListener {
            name: listener_name.clone(),
            properties: HttpListenerProperties {
                frontend_ip_configuration: Some(SubResource {
                    id: frontend_ip_id.to_string(),
                }),
                frontend_port: Some(SubResource::sibling(
                    gateway_id,
                    SUB_FRONTEND_PORTS,
                    &self.config.frontend_port,
                )),
                protocol: Some(PROTOCOL_HTTPS.to_string()),
                host_name: Some(target.host.clone()),
                ssl_certificate: Some(SubResource::sibling(
                    gateway_id,
                    SUB_SSL_CERTIFICATES,
                    &certificate_name,
                )),
                extra: Default::default(),
            },
            extra: Default::default(),
        };

        // The rule shares its listener's name and wires it to the
        // statically configured backend.
        let rule = RequestRoutingRule {
            name: listener_name.clone(),
            etag: Some("*".to_string()),
            properties: RequestRoutingRuleProperties {
                rule_type: Some(RULE_TYPE_BASIC.to_string()),
                http_listener: Some(SubResource::sibling(
                    gateway_id,
                    SUB_HTTP_LISTENERS,
                    &listener_name,
                )),
                backend_address_pool: Some(SubResource::sibling(
                    gateway_id,
                    SUB_BACKEND_ADDRESS_POOLS,
                    &target.backend_pool,
                )),
                backend_http_settings: Some(SubResource::sibling(
                    gateway_id,
                    SUB_BACKEND_HTTP_SETTINGS,
                    &self.config.backend_http_settings,
                )),
                extra: Default::default(),
            },
            extra: Default::default(),
        };

        Some((certificate, listener, rule))
    }
}

#[cfg(test)]
#[path = "director_tests.rs"]
mod director_tests;
