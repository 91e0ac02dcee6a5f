use std::io;

use bitfield::bitfield;
use byteorder::{BigEndian, WriteBytesExt};
use bytes::Buf;
use chrono::{DateTime, Utc};
use log::debug;
use num_enum::{FromPrimitive, IntoPrimitive};

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::crypto::Verifier;
use crate::errors::{ensure, ensure_eq, unsupported_err, Result};
use crate::packet::signature::{SignatureConfig, Subpacket, SubpacketData};
use crate::packet::PacketTrait;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{Fingerprint, KeyDetails, KeyId, KeyUsage, Mpi, PacketHeaderVersion, Tag};

/// Signature Packet
/// <https://tools.ietf.org/html/rfc4880.html#section-5.2>
#[derive(PartialEq, Eq, Clone, derive_more::Debug)]
pub struct Signature {
    packet_version: PacketHeaderVersion,
    pub config: SignatureConfig,
    #[debug("{}", hex::encode(signed_hash_value))]
    pub signed_hash_value: [u8; 2],
    pub signature: Vec<Mpi>,
}

impl Signature {
    /// Parses a `Signature` packet from the given buffer.
    pub fn from_buf<B: Buf>(packet_version: PacketHeaderVersion, mut i: B) -> Result<Self> {
        let version = SignatureVersion::from(i.read_u8()?);
        if version != SignatureVersion::V4 {
            unsupported_err!("signature version {:?}", version);
        }

        let typ = SignatureType::from(i.read_u8()?);
        let pub_alg = PublicKeyAlgorithm::from(i.read_u8()?);
        let hash_alg = HashAlgorithm::from(i.read_u8()?);

        let hashed_len = i.read_be_u16()?;
        let hashed_area = i.read_take(usize::from(hashed_len))?;
        let hashed_subpackets = Subpacket::from_area(hashed_area)?;

        let unhashed_len = i.read_be_u16()?;
        let unhashed_area = i.read_take(usize::from(unhashed_len))?;
        let unhashed_subpackets = Subpacket::from_area(unhashed_area)?;

        let signed_hash_value = i.read_array::<2>()?;

        let mut signature = Vec::new();
        while i.has_remaining() {
            signature.push(Mpi::from_buf(&mut i)?);
        }

        let config = SignatureConfig {
            version,
            typ,
            pub_alg,
            hash_alg,
            hashed_subpackets,
            unhashed_subpackets,
        };

        Ok(Signature {
            packet_version,
            config,
            signed_hash_value,
            signature,
        })
    }

    /// Constructor for an OpenPGP v4 signature packet.
    pub fn from_config(
        config: SignatureConfig,
        signed_hash_value: [u8; 2],
        signature: Vec<Mpi>,
    ) -> Self {
        Signature {
            packet_version: PacketHeaderVersion::New,
            config,
            signed_hash_value,
            signature,
        }
    }

    pub fn typ(&self) -> SignatureType {
        self.config.typ
    }

    /// Returns what kind of signature this is.
    pub fn is_certification(&self) -> bool {
        self.config.is_certification()
    }

    pub fn created(&self) -> Option<&DateTime<Utc>> {
        self.config.hashed_subpackets().find_map(|p| match &p.data {
            SubpacketData::SignatureCreationTime(d) => Some(d),
            _ => None,
        })
    }

    pub fn issuer(&self) -> Vec<&KeyId> {
        self.config
            .subpackets()
            .filter_map(|p| match &p.data {
                SubpacketData::Issuer(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn issuer_fingerprint(&self) -> Vec<&Fingerprint> {
        self.config
            .subpackets()
            .filter_map(|p| match &p.data {
                SubpacketData::IssuerFingerprint(fp) => Some(fp),
                _ => None,
            })
            .collect()
    }

    /// The key flags granted by this signature, if it carries any.
    pub fn key_flags(&self) -> Option<KeyFlags> {
        self.config.hashed_subpackets().find_map(|p| match &p.data {
            SubpacketData::KeyFlags(d) => Some(d[..].into()),
            _ => None,
        })
    }

    /// Does this signature grant `usage`?
    ///
    /// A signature without a key flags subpacket grants every usage.
    pub fn allows(&self, usage: KeyUsage) -> bool {
        self.key_flags().map_or(true, |flags| flags.allows(usage))
    }

    /// Could `key` have issued this signature, going by the issuer subpackets?
    pub fn match_identity(&self, key: &impl KeyDetails) -> bool {
        let issuers = self.issuer();
        let issuer_fps = self.issuer_fingerprint();

        // If there is no subpacket that signals the issuer, we consider `sig` and `key` a
        // potential match, and will check the cryptographic validity.
        if issuers.is_empty() && issuer_fps.is_empty() {
            return true;
        }

        issuers.iter().any(|&key_id| key_id == &key.key_id())
            || issuer_fps.iter().any(|&fp| fp == &key.fingerprint())
    }

    /// Verifies a certification or certification revocation over `id` made by `key`.
    pub async fn verify_certification<V: Verifier>(
        &self,
        verifier: &V,
        key: &impl KeyDetails,
        tag: Tag,
        id: &impl Serialize,
    ) -> Result<()> {
        debug!("verifying certification {:?} {:?}", key.key_id(), self.typ());
        ensure!(
            self.match_identity(key),
            "verify_certification: No matching issuer or issuer_fingerprint for Key ID: {:?}",
            key.key_id(),
        );

        let hash = self.config.certification_digest(key, tag, id)?;
        self.verify_digest(verifier, key, &hash).await
    }

    /// Verifies a key binding or subkey revocation (which binds a subkey to the primary key).
    pub async fn verify_key_binding<V: Verifier>(
        &self,
        verifier: &V,
        signing_key: &impl KeyDetails,
        key: &impl KeyDetails,
    ) -> Result<()> {
        debug!(
            "verifying key binding: {:?} - {:?}",
            signing_key.key_id(),
            key.key_id()
        );
        ensure!(
            self.match_identity(signing_key),
            "verify_key_binding: No matching issuer or issuer_fingerprint for Key ID: {:?}",
            signing_key.key_id(),
        );

        let hash = self.config.key_binding_digest(signing_key, key)?;
        self.verify_digest(verifier, signing_key, &hash).await
    }

    /// Verifies a direct key signature or a revocation.
    pub async fn verify_key<V: Verifier>(&self, verifier: &V, key: &impl KeyDetails) -> Result<()> {
        debug!("verifying key (revocation): {:?}", key.key_id());
        ensure!(
            self.match_identity(key),
            "verify_key: No matching issuer or issuer_fingerprint for Key ID: {:?}",
            key.key_id(),
        );

        let hash = self.config.key_digest(key)?;
        self.verify_digest(verifier, key, &hash).await
    }

    async fn verify_digest<V: Verifier>(
        &self,
        verifier: &V,
        key: &impl KeyDetails,
        hash: &[u8],
    ) -> Result<()> {
        ensure_eq!(
            self.config.pub_alg,
            key.algorithm(),
            "signature algorithm does not match the key"
        );
        ensure_eq!(
            &self.signed_hash_value[..],
            &hash[..2],
            "invalid signed hash value"
        );

        verifier
            .verify(key.public_params(), self.config.hash_alg, hash, &self.signature)
            .await
    }
}

impl Serialize for Signature {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.config.version.into())?;
        writer.write_u8(self.config.typ.into())?;
        writer.write_u8(self.config.pub_alg.into())?;
        writer.write_u8(self.config.hash_alg.into())?;

        let hashed_len: usize = self.config.hashed_subpackets.write_len();
        writer.write_u16::<BigEndian>(hashed_len.try_into()?)?;
        self.config.hashed_subpackets.to_writer(writer)?;

        let unhashed_len: usize = self.config.unhashed_subpackets.write_len();
        writer.write_u16::<BigEndian>(unhashed_len.try_into()?)?;
        self.config.unhashed_subpackets.to_writer(writer)?;

        writer.write_all(&self.signed_hash_value)?;
        self.signature.to_writer(writer)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        4 + 2
            + self.config.hashed_subpackets.write_len()
            + 2
            + self.config.unhashed_subpackets.write_len()
            + 2
            + self.signature.write_len()
    }
}

impl PacketTrait for Signature {
    fn packet_version(&self) -> PacketHeaderVersion {
        self.packet_version
    }

    fn tag(&self) -> Tag {
        Tag::Signature
    }
}

/// Available signature versions
#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SignatureVersion {
    /// Deprecated
    V2 = 2,
    V3 = 3,
    V4 = 4,

    #[num_enum(catch_all)]
    Other(u8),
}

impl Default for SignatureVersion {
    fn default() -> Self {
        Self::V4
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum SignatureType {
    /// Signature of a binary document.
    Binary = 0x00,
    /// Signature of a canonical text document.
    Text = 0x01,
    /// Standalone signature.
    Standalone = 0x02,
    /// Generic certification of a User ID and Public-Key packet.
    /// The issuer of this certification does not make any particular
    /// assertion as to how well the certifier has checked that the owner
    /// of the key is in fact the person described by the User ID.
    CertGeneric = 0x10,
    /// Persona certification of a User ID and Public-Key packet.
    CertPersona = 0x11,
    /// Casual certification of a User ID and Public-Key packet.
    CertCasual = 0x12,
    /// Positive certification of a User ID and Public-Key packet.
    ///
    /// Most OpenPGP implementations make their "key signatures" as 0x10
    /// certifications.  Some implementations can issue 0x11-0x13
    /// certifications, but few differentiate between the types.
    CertPositive = 0x13,
    /// Subkey Binding Signature
    /// This signature is a statement by the top-level signing key that
    /// indicates that it owns the subkey.
    SubkeyBinding = 0x18,
    /// Primary Key Binding Signature
    KeyBinding = 0x19,
    /// Signature directly on a key
    Key = 0x1F,
    /// Key revocation signature
    /// The signature is calculated directly on the key being revoked.
    KeyRevocation = 0x20,
    /// Subkey revocation signature
    /// The signature is calculated directly on the subkey being revoked.
    SubkeyRevocation = 0x28,
    /// Certification revocation signature
    /// This signature revokes an earlier User ID certification signature.
    CertRevocation = 0x30,
    /// Timestamp signature.
    Timestamp = 0x40,
    /// Third-Party Confirmation signature.
    ThirdParty = 0x50,

    #[num_enum(catch_all)]
    Other(u8),
}

bitfield! {
    #[derive(Default, PartialEq, Eq, Copy, Clone)]
    pub struct KeyFlags(u8);
    impl Debug;

    pub certify, set_certify: 0;
    pub sign, set_sign: 1;
    pub encrypt_comms, set_encrypt_comms: 2;
    pub encrypt_storage, set_encrypt_storage: 3;
    pub shared, set_shared: 4;
    pub authentication, set_authentication: 5;
    pub group, set_group: 7;
}

impl KeyFlags {
    /// Does this set of flags grant `usage`?
    pub fn allows(&self, usage: KeyUsage) -> bool {
        match usage {
            KeyUsage::Encrypt | KeyUsage::Decrypt => self.encrypt_comms() || self.encrypt_storage(),
            KeyUsage::Sign => self.sign(),
        }
    }
}

impl<'a> From<&'a [u8]> for KeyFlags {
    fn from(other: &'a [u8]) -> Self {
        if other.is_empty() {
            Default::default()
        } else {
            KeyFlags(other[0])
        }
    }
}

impl From<KeyFlags> for smallvec::SmallVec<[u8; 1]> {
    fn from(flags: KeyFlags) -> Self {
        smallvec::smallvec![flags.0]
    }
}

impl From<KeyFlags> for SubpacketData {
    fn from(flags: KeyFlags) -> Self {
        SubpacketData::KeyFlags(flags.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_version() {
        assert_eq!(SignatureVersion::default(), SignatureVersion::V4);
        assert_eq!(SignatureVersion::from(3u8), SignatureVersion::V3);
        assert_eq!(SignatureVersion::from(5u8), SignatureVersion::Other(5));
        assert_eq!(u8::from(SignatureVersion::V4), 4);
    }

    #[test]
    fn test_keyflags_usage() {
        let mut flags = KeyFlags::default();
        assert!(!flags.allows(KeyUsage::Encrypt));
        flags.set_encrypt_storage(true);
        assert!(flags.allows(KeyUsage::Encrypt));
        assert!(flags.allows(KeyUsage::Decrypt));
        assert!(!flags.allows(KeyUsage::Sign));
        flags.set_sign(true);
        assert!(flags.allows(KeyUsage::Sign));

        assert_eq!(KeyFlags::from(&[0x03u8][..]), {
            let mut f = KeyFlags::default();
            f.set_certify(true);
            f.set_sign(true);
            f
        });
    }

    #[test]
    fn test_signature_types() {
        assert_eq!(SignatureType::from(0x13u8), SignatureType::CertPositive);
        assert_eq!(SignatureType::from(0x28u8), SignatureType::SubkeyRevocation);
        assert_eq!(SignatureType::from(0x77u8), SignatureType::Other(0x77));
        assert_eq!(u8::from(SignatureType::CertRevocation), 0x30);
    }

    #[test]
    fn test_v3_unsupported() {
        let err = Signature::from_buf(PacketHeaderVersion::New, &[3u8, 0x10][..]).unwrap_err();
        assert!(matches!(err, crate::errors::Error::Unsupported { .. }));
    }
}
