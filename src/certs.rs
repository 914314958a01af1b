// Copyright (c) 2026 the agwsync authors
// SPDX-License-Identifier: MIT

//! Certificate bundle parsing and PKCS#12 packaging.
//!
//! Cluster TLS secrets carry PEM material (`tls.key`, `tls.crt`); the
//! gateway API wants a password-protected PKCS#12 archive as an opaque
//! base64 blob. This module bridges the two:
//!
//! 1. [`parse_tls_material`] decodes the key and every certificate block in
//!    the chain payload, classifying each certificate as leaf or CA by its
//!    key-usage extension: a digital-signature-capable certificate is a
//!    leaf, anything else (including certificates without the extension)
//!    belongs to the CA chain. Classification is independent of the PEM
//!    block order in the secret.
//! 2. [`package_pfx`] assembles the key, the primary leaf, and the CA chain
//!    into a PKCS#12 archive under the given passphrase.
//!
//! Parsing failures are per-target conditions: the sync cycle skips the
//! affected target and carries on with the rest.

use crate::sync_errors::CertificateError;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::stack::Stack;
use openssl::x509::X509;
use x509_parser::prelude::{FromDer, Pem, X509Certificate};

/// PEM label of certificate blocks
const PEM_LABEL_CERTIFICATE: &str = "CERTIFICATE";

/// Parsed TLS material from one cluster secret.
#[derive(Debug)]
pub struct CertificateBundle {
    /// The private key matching the primary leaf certificate
    pub private_key: PKey<Private>,
    /// Digital-signature-capable certificates; the first is the primary
    /// leaf used for packaging
    pub leaf_certs: Vec<X509>,
    /// Chain certificates, in payload order
    pub ca_certs: Vec<X509>,
}

/// Decode a PEM key and certificate payload into a [`CertificateBundle`].
///
/// The certificate payload may contain any number of concatenated PEM
/// blocks in any order; non-certificate blocks are ignored. At least one
/// leaf certificate must be present.
///
/// # Errors
///
/// Returns [`CertificateError`] when the key block is absent or malformed,
/// when any certificate block fails to decode, or when no leaf certificate
/// is found.
pub fn parse_tls_material(
    key_pem: &[u8],
    cert_pem: &[u8],
) -> Result<CertificateBundle, CertificateError> {
    let private_key =
        PKey::private_key_from_pem(key_pem).map_err(|e| CertificateError::InvalidKey {
            reason: e.to_string(),
        })?;

    let mut leaf_certs = Vec::new();
    let mut ca_certs = Vec::new();

    for pem in Pem::iter_from_buffer(cert_pem) {
        let pem = pem.map_err(|e| CertificateError::InvalidCertificate {
            reason: e.to_string(),
        })?;
        if pem.label != PEM_LABEL_CERTIFICATE {
            continue;
        }

        let (_, parsed) = X509Certificate::from_der(&pem.contents).map_err(|e| {
            CertificateError::InvalidCertificate {
                reason: e.to_string(),
            }
        })?;
        let signs_digitally = parsed
            .key_usage()
            .ok()
            .flatten()
            .is_some_and(|ku| ku.value.digital_signature());

        // Re-parse the same DER with openssl for PKCS#12 assembly
        let cert =
            X509::from_der(&pem.contents).map_err(|e| CertificateError::InvalidCertificate {
                reason: e.to_string(),
            })?;

        if signs_digitally {
            leaf_certs.push(cert);
        } else {
            ca_certs.push(cert);
        }
    }

    if leaf_certs.is_empty() {
        return Err(CertificateError::NoLeafCertificate);
    }

    Ok(CertificateBundle {
        private_key,
        leaf_certs,
        ca_certs,
    })
}

/// Package a bundle as a password-protected PKCS#12 archive.
///
/// The archive embeds the private key, the primary leaf certificate, and
/// the full CA chain, the shape the gateway API accepts as a base64 blob
/// alongside the passphrase.
///
/// # Errors
///
/// Returns [`CertificateError::PackagingFailed`] if PKCS#12 assembly or
/// DER encoding fails (e.g. the key does not match the leaf certificate).
pub fn package_pfx(
    bundle: &CertificateBundle,
    passphrase: &str,
) -> Result<Vec<u8>, CertificateError> {
    let leaf = bundle
        .leaf_certs
        .first()
        .ok_or(CertificateError::NoLeafCertificate)?;

    let mut chain = Stack::new().map_err(|e| CertificateError::PackagingFailed {
        reason: e.to_string(),
    })?;
    for ca in &bundle.ca_certs {
        chain
            .push(ca.to_owned())
            .map_err(|e| CertificateError::PackagingFailed {
                reason: e.to_string(),
            })?;
    }

    let mut builder = Pkcs12::builder();
    builder.pkey(&bundle.private_key);
    builder.cert(leaf);
    builder.ca(chain);

    let archive = builder
        .build2(passphrase)
        .map_err(|e| CertificateError::PackagingFailed {
            reason: e.to_string(),
        })?;
    archive
        .to_der()
        .map_err(|e| CertificateError::PackagingFailed {
            reason: e.to_string(),
        })
}

#[cfg(test)]
#[path = "certs_tests.rs"]
mod certs_tests;
