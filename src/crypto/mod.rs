//! # Cryptography module
//!
//! The key block never does signature math itself. It computes digests and
//! hands them to a [`Verifier`], which may live in software, on a token or
//! behind an IPC boundary.

use std::future::Future;

use log::debug;

use crate::errors::{unsupported_err, Result};
use crate::types::{Mpi, PublicParams};

use self::hash::HashAlgorithm;

pub mod eddsa;
pub mod hash;
pub mod public_key;

/// Checks a signature over an already computed digest.
pub trait Verifier {
    /// Verify `sig` over `digest`, which was produced with `hash`, against `key`.
    fn verify(
        &self,
        key: &PublicParams,
        hash: HashAlgorithm,
        digest: &[u8],
        sig: &[Mpi],
    ) -> impl Future<Output = Result<()>>;
}

/// Produces signatures over an already computed digest.
pub trait Signer {
    fn sign(&self, hash: HashAlgorithm, digest: &[u8]) -> Result<Vec<Mpi>>;
}

/// Verifies signatures in process.
///
/// Only EdDSA over Curve25519 is implemented, other algorithms report
/// [`Error::Unsupported`](crate::errors::Error::Unsupported).
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareVerifier;

impl Verifier for SoftwareVerifier {
    async fn verify(
        &self,
        key: &PublicParams,
        hash: HashAlgorithm,
        digest: &[u8],
        sig: &[Mpi],
    ) -> Result<()> {
        debug!("verifying {} signature over {} digest", params_name(key), hash);
        match key {
            PublicParams::EdDSALegacy { oid, q } => eddsa::verify(oid, q, hash, digest, sig),
            _ => unsupported_err!("signature verification for {} keys", params_name(key)),
        }
    }
}

fn params_name(key: &PublicParams) -> &'static str {
    match key {
        PublicParams::RSA { .. } => "RSA",
        PublicParams::DSA { .. } => "DSA",
        PublicParams::Elgamal { .. } => "ElGamal",
        PublicParams::ECDSA { .. } => "ECDSA",
        PublicParams::ECDH { .. } => "ECDH",
        PublicParams::EdDSALegacy { .. } => "EdDSA",
        PublicParams::Unknown { .. } => "unknown",
    }
}
