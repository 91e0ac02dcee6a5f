use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, SubsecRound, Utc};
use derive_builder::Builder;
use digest::DynDigest;
use log::debug;

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::Signer;
use crate::errors::{bail, ensure, Error, Result};
use crate::packet::signature::{
    Signature, SignatureType, SignatureVersion, Subpacket, SubpacketData,
};
use crate::ser::Serialize;
use crate::types::{KeyDetails, Tag};

/// Everything about a signature except the signature itself.
///
/// Also what gets hashed, together with the signed material.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(build_fn(error = "Error"))]
pub struct SignatureConfig {
    #[builder(default)]
    pub version: SignatureVersion,
    pub typ: SignatureType,
    pub pub_alg: PublicKeyAlgorithm,

    #[builder(default)]
    pub hash_alg: HashAlgorithm,

    #[builder(default)]
    pub hashed_subpackets: Vec<Subpacket>,
    #[builder(default)]
    pub unhashed_subpackets: Vec<Subpacket>,
}

impl SignatureConfig {
    /// A v4 configuration issued by `key` at `created`.
    ///
    /// The creation time and issuer fingerprint are hashed, the issuer
    /// key id is not.
    pub fn for_key(typ: SignatureType, key: &impl KeyDetails, created: DateTime<Utc>) -> Self {
        SignatureConfig {
            version: SignatureVersion::V4,
            typ,
            pub_alg: key.algorithm(),
            hash_alg: HashAlgorithm::default(),
            hashed_subpackets: vec![
                Subpacket::regular(SubpacketData::SignatureCreationTime(created.trunc_subsecs(0))),
                Subpacket::regular(SubpacketData::IssuerFingerprint(key.fingerprint())),
            ],
            unhashed_subpackets: vec![Subpacket::regular(SubpacketData::Issuer(key.key_id()))],
        }
    }

    /// Returns an iterator over all subpackets of this signature.
    pub fn subpackets(&self) -> impl Iterator<Item = &Subpacket> {
        self.hashed_subpackets
            .iter()
            .chain(self.unhashed_subpackets.iter())
    }

    /// Returns an iterator over the hashed subpackets of this signature.
    pub fn hashed_subpackets(&self) -> impl Iterator<Item = &Subpacket> {
        self.hashed_subpackets.iter()
    }

    /// Returns if the signature is a certification or not.
    pub fn is_certification(&self) -> bool {
        matches!(
            self.typ,
            SignatureType::CertGeneric
                | SignatureType::CertPersona
                | SignatureType::CertCasual
                | SignatureType::CertPositive
                | SignatureType::CertRevocation
        )
    }

    /// Create a certification or certification revocation over `id`.
    pub fn sign_certification(
        self,
        signer: &impl Signer,
        key: &impl KeyDetails,
        tag: Tag,
        id: &impl Serialize,
    ) -> Result<Signature> {
        ensure!(
            self.is_certification(),
            "can not sign non certification as certification"
        );
        debug!("signing certification {:?}", self.typ);

        let hash = self.certification_digest(key, tag, id)?;
        self.finish(signer, &hash)
    }

    /// Create a subkey binding or subkey revocation.
    pub fn sign_key_binding(
        self,
        signer: &impl Signer,
        signing_key: &impl KeyDetails,
        key: &impl KeyDetails,
    ) -> Result<Signature> {
        debug!(
            "signing key binding {:?}: {:?} - {:?}",
            self.typ,
            signing_key.key_id(),
            key.key_id()
        );

        let hash = self.key_binding_digest(signing_key, key)?;
        self.finish(signer, &hash)
    }

    /// Create a signature directly over `key`, such as a key revocation.
    pub fn sign_key(self, signer: &impl Signer, key: &impl KeyDetails) -> Result<Signature> {
        debug!("signing key {:?}: {:?}", self.typ, key.key_id());

        let hash = self.key_digest(key)?;
        self.finish(signer, &hash)
    }

    fn finish(self, signer: &impl Signer, hash: &[u8]) -> Result<Signature> {
        let signed_hash_value = [hash[0], hash[1]];
        let signature = signer.sign(self.hash_alg, hash)?;

        Ok(Signature::from_config(self, signed_hash_value, signature))
    }

    pub(crate) fn certification_digest(
        &self,
        key: &impl KeyDetails,
        tag: Tag,
        id: &impl Serialize,
    ) -> Result<Vec<u8>> {
        let mut hasher = self.hash_alg.new_hasher()?;
        hash_key(&mut *hasher, key)?;

        let prefix = match tag {
            Tag::UserId => 0xB4,
            Tag::UserAttribute => 0xD1,
            _ => bail!("invalid tag for certification validation: {:?}", tag),
        };

        let packet_buf = id.to_bytes()?;
        let mut prefix_buf = [prefix, 0u8, 0u8, 0u8, 0u8];
        BigEndian::write_u32(&mut prefix_buf[1..], packet_buf.len().try_into()?);

        // prefixes
        hasher.update(&prefix_buf);
        // the packet content
        hasher.update(&packet_buf);

        self.finish_digest(hasher)
    }

    pub(crate) fn key_binding_digest(
        &self,
        signing_key: &impl KeyDetails,
        key: &impl KeyDetails,
    ) -> Result<Vec<u8>> {
        let mut hasher = self.hash_alg.new_hasher()?;
        // primary first, then the subkey
        hash_key(&mut *hasher, signing_key)?;
        hash_key(&mut *hasher, key)?;

        self.finish_digest(hasher)
    }

    pub(crate) fn key_digest(&self, key: &impl KeyDetails) -> Result<Vec<u8>> {
        let mut hasher = self.hash_alg.new_hasher()?;
        hash_key(&mut *hasher, key)?;

        self.finish_digest(hasher)
    }

    fn finish_digest(&self, mut hasher: Box<dyn DynDigest>) -> Result<Vec<u8>> {
        let len = self.hash_signature_data(&mut *hasher)?;
        hasher.update(&self.trailer(len)?);

        Ok(hasher.finalize().to_vec())
    }

    /// Hashes the signature fields and the hashed subpacket area.
    ///
    /// Returns the number of bytes hashed, which goes into the trailer.
    pub fn hash_signature_data(&self, hasher: &mut dyn DynDigest) -> Result<usize> {
        ensure!(
            self.version == SignatureVersion::V4,
            "unsupported signature version: {:?}",
            self.version
        );

        let mut res = vec![
            // version
            self.version.into(),
            // type
            self.typ.into(),
            // public algorithm
            self.pub_alg.into(),
            // hash algorithm
            self.hash_alg.into(),
            // will be filled with the length
            0u8,
            0u8,
        ];

        // hashed subpackets
        let hashed_subpackets = self.hashed_subpackets.to_bytes()?;

        BigEndian::write_u16(&mut res[4..6], hashed_subpackets.len().try_into()?);
        res.extend(hashed_subpackets);

        hasher.update(&res);

        Ok(res.len())
    }

    pub fn trailer(&self, len: usize) -> Result<[u8; 6]> {
        let mut trailer = [0x04, 0xFF, 0, 0, 0, 0];
        BigEndian::write_u32(&mut trailer[2..], len.try_into()?);
        Ok(trailer)
    }
}

/// When a v4 signature is made over a key, the hash data starts with the octet 0x99,
/// followed by a two-octet length of the key, and then the body of the key packet.
fn hash_key(hasher: &mut dyn DynDigest, key: &impl KeyDetails) -> Result<()> {
    let mut key_buf = Vec::new();
    key.serialize_for_hashing(&mut key_buf)?;
    hasher.update(&key_buf);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailer() {
        let config = SignatureConfigBuilder::default()
            .typ(SignatureType::CertPositive)
            .pub_alg(PublicKeyAlgorithm::EdDSA)
            .build()
            .unwrap();
        assert_eq!(config.trailer(6).unwrap(), [0x04, 0xFF, 0, 0, 0, 6]);
        assert_eq!(config.hash_alg, HashAlgorithm::Sha256);
        assert!(config.is_certification());
    }

    #[test]
    fn test_builder_missing_field() {
        let err = SignatureConfigBuilder::default()
            .typ(SignatureType::KeyRevocation)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("pub_alg"));
    }

    #[test]
    fn test_hash_signature_data() {
        let config = SignatureConfigBuilder::default()
            .typ(SignatureType::SubkeyBinding)
            .pub_alg(PublicKeyAlgorithm::EdDSA)
            .build()
            .unwrap();
        let mut hasher = config.hash_alg.new_hasher().unwrap();
        let len = config.hash_signature_data(&mut *hasher).unwrap();
        assert_eq!(len, 6);

        let mut expected = HashAlgorithm::Sha256.new_hasher().unwrap();
        expected.update(&[0x04, 0x18, 0x16, 0x08, 0x00, 0x00]);
        assert_eq!(hasher.finalize(), expected.finalize());
    }
}
