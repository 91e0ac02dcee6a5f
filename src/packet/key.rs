//! Public and secret key packets, for primary keys and subkeys.
//!
//! Ref: <https://tools.ietf.org/html/rfc4880.html#section-5.5>

use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::Buf;
use chrono::{DateTime, SubsecRound, Utc};
use sha1::{Digest, Sha1};

use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::{ensure, unsupported_err, Result};
use crate::parsing::BufParsing;
use crate::ser::{time_to_u32, u32_to_time, Serialize};
use crate::types::{Fingerprint, KeyVersion, PublicParams};

/// The public part shared by all four key packets.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PubKeyInner {
    version: KeyVersion,
    algorithm: PublicKeyAlgorithm,
    created_at: DateTime<Utc>,
    public_params: PublicParams,
    fingerprint: Fingerprint,
}

impl PubKeyInner {
    pub fn new(
        algorithm: PublicKeyAlgorithm,
        created_at: DateTime<Utc>,
        public_params: PublicParams,
    ) -> Result<Self> {
        ensure!(
            public_params.matches(algorithm),
            "public parameters do not match algorithm {}",
            algorithm
        );

        let mut inner = PubKeyInner {
            version: KeyVersion::V4,
            algorithm,
            created_at: created_at.trunc_subsecs(0),
            public_params,
            fingerprint: Fingerprint::new([0u8; 20]),
        };
        inner.fingerprint = inner.compute_fingerprint()?;

        Ok(inner)
    }

    /// Parses the public part of a key packet, leaving any secret material in `i`.
    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let version = KeyVersion::from(i.read_u8()?);
        if version != KeyVersion::V4 {
            unsupported_err!("key version {:?}", version);
        }

        let created_at = u32_to_time(i.read_be_u32()?);
        let algorithm = PublicKeyAlgorithm::from(i.read_u8()?);
        let public_params = PublicParams::from_buf(algorithm, &mut i)?;

        Self::new(algorithm, created_at, public_params)
    }

    fn compute_fingerprint(&self) -> Result<Fingerprint> {
        let mut buf = Vec::with_capacity(3 + self.write_len());
        self.serialize_for_hashing(&mut buf)?;

        let digest: [u8; 20] = Sha1::digest(&buf).into();
        Ok(Fingerprint::new(digest))
    }

    pub fn version(&self) -> KeyVersion {
        self.version
    }

    pub fn algorithm(&self) -> PublicKeyAlgorithm {
        self.algorithm
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn public_params(&self) -> &PublicParams {
        &self.public_params
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Old style packet header for the key, followed by the body.
    pub fn serialize_for_hashing(&self, writer: &mut dyn io::Write) -> Result<()> {
        let body = self.to_bytes()?;
        writer.write_u8(0x99)?;
        writer.write_u16::<BigEndian>(body.len().try_into()?)?;
        writer.write_all(&body)?;

        Ok(())
    }
}

impl Serialize for PubKeyInner {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.version.into())?;
        writer.write_u32::<BigEndian>(time_to_u32(&self.created_at))?;
        writer.write_u8(self.algorithm.into())?;
        self.public_params.to_writer(writer)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        1 + 4 + 1 + self.public_params.write_len()
    }
}

macro_rules! impl_public_key {
    ($name:ident, $tag:expr) => {
        #[derive(Debug, PartialEq, Eq, Clone)]
        pub struct $name {
            packet_version: $crate::types::PacketHeaderVersion,
            inner: PubKeyInner,
        }

        impl $name {
            /// Create a new v4 key packet from its parameters.
            pub fn new(
                packet_version: $crate::types::PacketHeaderVersion,
                algorithm: PublicKeyAlgorithm,
                created_at: DateTime<Utc>,
                public_params: PublicParams,
            ) -> Result<Self> {
                let inner = PubKeyInner::new(algorithm, created_at, public_params)?;
                Ok(Self {
                    packet_version,
                    inner,
                })
            }

            /// Parses the packet body from the given buffer.
            pub fn from_buf<B: Buf>(
                packet_version: $crate::types::PacketHeaderVersion,
                mut i: B,
            ) -> Result<Self> {
                let inner = PubKeyInner::from_buf(&mut i)?;
                ensure!(
                    !i.has_remaining(),
                    "{} trailing bytes after {:?}",
                    i.remaining(),
                    $tag
                );
                Ok(Self {
                    packet_version,
                    inner,
                })
            }
        }

        impl $crate::types::KeyDetails for $name {
            fn version(&self) -> KeyVersion {
                self.inner.version()
            }

            fn fingerprint(&self) -> Fingerprint {
                self.inner.fingerprint()
            }

            fn algorithm(&self) -> PublicKeyAlgorithm {
                self.inner.algorithm()
            }

            fn created_at(&self) -> &DateTime<Utc> {
                self.inner.created_at()
            }

            fn public_params(&self) -> &PublicParams {
                self.inner.public_params()
            }

            fn kind(&self) -> $crate::types::KeyKind {
                $crate::types::KeyKind::Public
            }

            fn serialize_for_hashing(&self, writer: &mut dyn io::Write) -> Result<()> {
                self.inner.serialize_for_hashing(writer)
            }
        }

        impl Serialize for $name {
            fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
                self.inner.to_writer(writer)
            }

            fn write_len(&self) -> usize {
                self.inner.write_len()
            }
        }

        impl $crate::packet::PacketTrait for $name {
            fn packet_version(&self) -> $crate::types::PacketHeaderVersion {
                self.packet_version
            }

            fn tag(&self) -> $crate::types::Tag {
                $tag
            }
        }
    };
}

macro_rules! impl_secret_key {
    ($name:ident, $public:ident, $tag:expr) => {
        #[derive(Debug, PartialEq, Eq, Clone)]
        pub struct $name {
            packet_version: $crate::types::PacketHeaderVersion,
            inner: PubKeyInner,
            secret_params: $crate::types::SecretParams,
        }

        impl $name {
            /// Pair public key material with its secret half.
            pub fn new(public: $public, secret_params: $crate::types::SecretParams) -> Self {
                Self {
                    packet_version: public.packet_version,
                    inner: public.inner,
                    secret_params,
                }
            }

            /// Parses the packet body from the given buffer.
            pub fn from_buf<B: Buf>(
                packet_version: $crate::types::PacketHeaderVersion,
                mut i: B,
            ) -> Result<Self> {
                let inner = PubKeyInner::from_buf(&mut i)?;
                let secret_params = $crate::types::SecretParams::from_buf(&mut i)?;
                Ok(Self {
                    packet_version,
                    inner,
                    secret_params,
                })
            }

            /// The same key without its secret material.
            pub fn public_key(&self) -> $public {
                $public {
                    packet_version: self.packet_version,
                    inner: self.inner.clone(),
                }
            }

            pub fn secret_params(&self) -> &$crate::types::SecretParams {
                &self.secret_params
            }
        }

        impl $crate::types::KeyDetails for $name {
            fn version(&self) -> KeyVersion {
                self.inner.version()
            }

            fn fingerprint(&self) -> Fingerprint {
                self.inner.fingerprint()
            }

            fn algorithm(&self) -> PublicKeyAlgorithm {
                self.inner.algorithm()
            }

            fn created_at(&self) -> &DateTime<Utc> {
                self.inner.created_at()
            }

            fn public_params(&self) -> &PublicParams {
                self.inner.public_params()
            }

            fn kind(&self) -> $crate::types::KeyKind {
                $crate::types::KeyKind::Secret
            }

            fn serialize_for_hashing(&self, writer: &mut dyn io::Write) -> Result<()> {
                self.inner.serialize_for_hashing(writer)
            }
        }

        impl $crate::crypto::Signer for $name {
            fn sign(
                &self,
                hash: $crate::crypto::hash::HashAlgorithm,
                digest: &[u8],
            ) -> Result<Vec<$crate::types::Mpi>> {
                match self.inner.public_params() {
                    PublicParams::EdDSALegacy { .. } => {
                        use $crate::crypto::eddsa;
                        let key = eddsa::SecretKey::from_secret_params(&self.secret_params)?;
                        $crate::crypto::Signer::sign(&key, hash, digest)
                    }
                    _ => unsupported_err!(
                        "signing with {} keys",
                        self.inner.algorithm()
                    ),
                }
            }
        }

        impl Serialize for $name {
            fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
                self.inner.to_writer(writer)?;
                self.secret_params.to_writer(writer)
            }

            fn write_len(&self) -> usize {
                self.inner.write_len() + self.secret_params.write_len()
            }
        }

        impl $crate::packet::PacketTrait for $name {
            fn packet_version(&self) -> $crate::types::PacketHeaderVersion {
                self.packet_version
            }

            fn tag(&self) -> $crate::types::Tag {
                $tag
            }
        }
    };
}

impl_public_key!(PublicKey, crate::types::Tag::PublicKey);
impl_public_key!(PublicSubkey, crate::types::Tag::PublicSubkey);
impl_secret_key!(SecretKey, PublicKey, crate::types::Tag::SecretKey);
impl_secret_key!(SecretSubkey, PublicSubkey, crate::types::Tag::SecretSubkey);
