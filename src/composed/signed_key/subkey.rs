use std::io;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::debug;

use crate::composed::signed_key::shared::{keep_verified, latest_signature};
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::Verifier;
use crate::errors::{format_err, Error, Result};
use crate::packet::{Packet, PacketTrait, PublicSubkey, SecretSubkey, Signature};
use crate::ser::Serialize;
use crate::types::{
    Fingerprint, KeyDetails, KeyId, KeyKind, KeyUsage, KeyVersion, PacketHeaderVersion,
    PublicParams, Tag,
};

/// A subkey packet of either family.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Subkey {
    Public(PublicSubkey),
    Secret(SecretSubkey),
}

impl Subkey {
    /// The subkey without any secret material.
    pub fn public_key(&self) -> PublicSubkey {
        match self {
            Subkey::Public(k) => k.clone(),
            Subkey::Secret(k) => k.public_key(),
        }
    }

    pub fn secret_key(&self) -> Option<&SecretSubkey> {
        match self {
            Subkey::Public(_) => None,
            Subkey::Secret(k) => Some(k),
        }
    }
}

impl TryFrom<Packet> for Subkey {
    type Error = Error;

    fn try_from(packet: Packet) -> Result<Self> {
        match packet {
            Packet::PublicSubkey(k) => Ok(Subkey::Public(k)),
            Packet::SecretSubkey(k) => Ok(Subkey::Secret(k)),
            other => Err(format_err!("expected a subkey, got {:?}", other.tag())),
        }
    }
}

impl From<Subkey> for Packet {
    fn from(key: Subkey) -> Packet {
        match key {
            Subkey::Public(k) => k.into(),
            Subkey::Secret(k) => k.into(),
        }
    }
}

impl From<PublicSubkey> for Subkey {
    fn from(key: PublicSubkey) -> Self {
        Subkey::Public(key)
    }
}

impl From<SecretSubkey> for Subkey {
    fn from(key: SecretSubkey) -> Self {
        Subkey::Secret(key)
    }
}

impl KeyDetails for Subkey {
    fn version(&self) -> KeyVersion {
        match self {
            Subkey::Public(k) => k.version(),
            Subkey::Secret(k) => k.version(),
        }
    }

    fn fingerprint(&self) -> Fingerprint {
        match self {
            Subkey::Public(k) => k.fingerprint(),
            Subkey::Secret(k) => k.fingerprint(),
        }
    }

    fn algorithm(&self) -> PublicKeyAlgorithm {
        match self {
            Subkey::Public(k) => k.algorithm(),
            Subkey::Secret(k) => k.algorithm(),
        }
    }

    fn created_at(&self) -> &DateTime<Utc> {
        match self {
            Subkey::Public(k) => k.created_at(),
            Subkey::Secret(k) => k.created_at(),
        }
    }

    fn public_params(&self) -> &PublicParams {
        match self {
            Subkey::Public(k) => k.public_params(),
            Subkey::Secret(k) => k.public_params(),
        }
    }

    fn kind(&self) -> KeyKind {
        match self {
            Subkey::Public(_) => KeyKind::Public,
            Subkey::Secret(_) => KeyKind::Secret,
        }
    }

    fn serialize_for_hashing(&self, writer: &mut dyn io::Write) -> Result<()> {
        match self {
            Subkey::Public(k) => k.serialize_for_hashing(writer),
            Subkey::Secret(k) => k.serialize_for_hashing(writer),
        }
    }
}

impl Serialize for Subkey {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            Subkey::Public(k) => k.to_writer(writer),
            Subkey::Secret(k) => k.to_writer(writer),
        }
    }

    fn write_len(&self) -> usize {
        match self {
            Subkey::Public(k) => k.write_len(),
            Subkey::Secret(k) => k.write_len(),
        }
    }
}

impl PacketTrait for Subkey {
    fn packet_version(&self) -> PacketHeaderVersion {
        match self {
            Subkey::Public(k) => k.packet_version(),
            Subkey::Secret(k) => k.packet_version(),
        }
    }

    fn tag(&self) -> Tag {
        match self {
            Subkey::Public(k) => k.tag(),
            Subkey::Secret(k) => k.tag(),
        }
    }
}

/// A subkey together with its binding signatures and subkey revocations.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SignedSubkey {
    pub key: Subkey,
    pub bindings: Vec<Signature>,
    pub revocations: Vec<Signature>,
}

impl SignedSubkey {
    pub fn new(key: impl Into<Subkey>) -> Self {
        SignedSubkey {
            key: key.into(),
            bindings: Vec::new(),
            revocations: Vec::new(),
        }
    }

    pub fn add_binding_signature(&mut self, sig: Signature) {
        self.bindings.push(sig);
    }

    pub fn add_revocation(&mut self, sig: Signature) {
        self.revocations.push(sig);
    }

    pub fn key_id(&self) -> KeyId {
        self.key.key_id()
    }

    /// Can the key material perform `usage`, regardless of its bindings?
    pub fn can(&self, usage: KeyUsage) -> bool {
        self.key.can(usage)
    }

    /// Creation time of the latest binding issued by `signer`.
    pub fn certified_time(&self, signer: &impl KeyDetails) -> Option<DateTime<Utc>> {
        latest_signature(&self.bindings, signer).and_then(|sig| sig.created().copied())
    }

    /// Does the latest binding issued by `signer` grant `usage`?
    pub fn is_certified_to(&self, signer: &impl KeyDetails, usage: KeyUsage) -> bool {
        latest_signature(&self.bindings, signer).is_some_and(|sig| sig.allows(usage))
    }

    /// Returns a copy holding only the signatures that verify against `signer`.
    ///
    /// `None` if no binding verifies, or if any revocation does.
    pub async fn verified<V: Verifier>(
        &self,
        signer: &impl KeyDetails,
        verifier: &V,
    ) -> Option<Self> {
        let (bindings, revocations) = futures::join!(
            join_all(
                self.bindings
                    .iter()
                    .map(|sig| sig.verify_key_binding(verifier, signer, &self.key))
            ),
            join_all(
                self.revocations
                    .iter()
                    .map(|sig| sig.verify_key_binding(verifier, signer, &self.key))
            ),
        );

        if revocations.iter().any(Result::is_ok) {
            debug!("subkey {:?} is revoked", self.key_id());
            return None;
        }

        let bindings = keep_verified(&self.bindings, bindings);
        if bindings.is_empty() {
            debug!("subkey {:?} has no valid binding", self.key_id());
            return None;
        }

        Some(SignedSubkey {
            key: self.key.clone(),
            bindings,
            revocations: Vec::new(),
        })
    }

    pub async fn verify_signatures<V: Verifier>(
        &self,
        signer: &impl KeyDetails,
        verifier: &V,
    ) -> bool {
        self.verified(signer, verifier).await.is_some()
    }
}

impl Serialize for SignedSubkey {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        self.key.to_writer_with_header(writer)?;
        for sig in self.bindings.iter().chain(&self.revocations) {
            sig.to_writer_with_header(writer)?;
        }

        Ok(())
    }

    fn write_len(&self) -> usize {
        self.key.write_len_with_header()
            + self
                .bindings
                .iter()
                .chain(&self.revocations)
                .map(PacketTrait::write_len_with_header)
                .sum::<usize>()
    }
}
