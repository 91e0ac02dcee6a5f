use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, Bytes};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::{ensure, Result};
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::Mpi;

/// Curve OID of Ed25519 as used by the legacy EdDSA algorithm (id 22).
pub const ED25519_OID: &[u8] = &[0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01];

/// Represent the public parameters for the different algorithms.
///
/// Ref: <https://tools.ietf.org/html/rfc4880.html#section-5.5.2>
#[derive(PartialEq, Eq, Clone, derive_more::Debug)]
pub enum PublicParams {
    RSA {
        n: Mpi,
        e: Mpi,
    },
    DSA {
        p: Mpi,
        q: Mpi,
        g: Mpi,
        y: Mpi,
    },
    Elgamal {
        p: Mpi,
        g: Mpi,
        y: Mpi,
    },
    ECDSA {
        #[debug("{}", hex::encode(oid))]
        oid: Bytes,
        p: Mpi,
    },
    ECDH {
        #[debug("{}", hex::encode(oid))]
        oid: Bytes,
        p: Mpi,
        /// KDF parameters, without the length octet.
        #[debug("{}", hex::encode(kdf))]
        kdf: Bytes,
    },
    EdDSALegacy {
        #[debug("{}", hex::encode(oid))]
        oid: Bytes,
        q: Mpi,
    },
    Unknown {
        #[debug("{}", hex::encode(data))]
        data: Bytes,
    },
}

fn read_oid<B: Buf>(i: &mut B) -> Result<Bytes> {
    let len = i.read_u8()?;
    ensure!(len != 0 && len != 0xFF, "invalid curve oid length {}", len);
    Ok(i.read_take(usize::from(len))?)
}

fn write_oid<W: io::Write>(oid: &[u8], writer: &mut W) -> Result<()> {
    writer.write_u8(oid.len().try_into()?)?;
    writer.write_all(oid)?;
    Ok(())
}

impl PublicParams {
    /// Parses the algorithm specific public key material.
    pub fn from_buf<B: Buf>(alg: PublicKeyAlgorithm, mut i: B) -> Result<Self> {
        let params = match alg {
            PublicKeyAlgorithm::RSA
            | PublicKeyAlgorithm::RSAEncrypt
            | PublicKeyAlgorithm::RSASign => {
                let n = Mpi::from_buf(&mut i)?;
                let e = Mpi::from_buf(&mut i)?;
                PublicParams::RSA { n, e }
            }
            PublicKeyAlgorithm::DSA => {
                let p = Mpi::from_buf(&mut i)?;
                let q = Mpi::from_buf(&mut i)?;
                let g = Mpi::from_buf(&mut i)?;
                let y = Mpi::from_buf(&mut i)?;
                PublicParams::DSA { p, q, g, y }
            }
            PublicKeyAlgorithm::Elgamal | PublicKeyAlgorithm::ElgamalEncrypt => {
                let p = Mpi::from_buf(&mut i)?;
                let g = Mpi::from_buf(&mut i)?;
                let y = Mpi::from_buf(&mut i)?;
                PublicParams::Elgamal { p, g, y }
            }
            PublicKeyAlgorithm::ECDSA => {
                let oid = read_oid(&mut i)?;
                let p = Mpi::from_buf(&mut i)?;
                PublicParams::ECDSA { oid, p }
            }
            PublicKeyAlgorithm::ECDH => {
                let oid = read_oid(&mut i)?;
                let p = Mpi::from_buf(&mut i)?;
                let kdf_len = i.read_u8()?;
                let kdf = i.read_take(usize::from(kdf_len))?;
                PublicParams::ECDH { oid, p, kdf }
            }
            PublicKeyAlgorithm::EdDSA => {
                let oid = read_oid(&mut i)?;
                let q = Mpi::from_buf(&mut i)?;
                PublicParams::EdDSALegacy { oid, q }
            }
            PublicKeyAlgorithm::Unknown(_) => PublicParams::Unknown { data: i.rest() },
        };

        Ok(params)
    }

    /// Is this key material of a shape the given algorithm can use?
    pub fn matches(&self, alg: PublicKeyAlgorithm) -> bool {
        matches!(
            (self, alg),
            (
                PublicParams::RSA { .. },
                PublicKeyAlgorithm::RSA
                    | PublicKeyAlgorithm::RSAEncrypt
                    | PublicKeyAlgorithm::RSASign
            ) | (PublicParams::DSA { .. }, PublicKeyAlgorithm::DSA)
                | (
                    PublicParams::Elgamal { .. },
                    PublicKeyAlgorithm::Elgamal | PublicKeyAlgorithm::ElgamalEncrypt
                )
                | (PublicParams::ECDSA { .. }, PublicKeyAlgorithm::ECDSA)
                | (PublicParams::ECDH { .. }, PublicKeyAlgorithm::ECDH)
                | (PublicParams::EdDSALegacy { .. }, PublicKeyAlgorithm::EdDSA)
                | (PublicParams::Unknown { .. }, PublicKeyAlgorithm::Unknown(_))
        )
    }
}

impl Serialize for PublicParams {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            PublicParams::RSA { n, e } => {
                n.to_writer(writer)?;
                e.to_writer(writer)?;
            }
            PublicParams::DSA { p, q, g, y } => {
                p.to_writer(writer)?;
                q.to_writer(writer)?;
                g.to_writer(writer)?;
                y.to_writer(writer)?;
            }
            PublicParams::Elgamal { p, g, y } => {
                p.to_writer(writer)?;
                g.to_writer(writer)?;
                y.to_writer(writer)?;
            }
            PublicParams::ECDSA { oid, p } => {
                write_oid(oid, writer)?;
                p.to_writer(writer)?;
            }
            PublicParams::ECDH { oid, p, kdf } => {
                write_oid(oid, writer)?;
                p.to_writer(writer)?;
                writer.write_u8(kdf.len().try_into()?)?;
                writer.write_all(kdf)?;
            }
            PublicParams::EdDSALegacy { oid, q } => {
                write_oid(oid, writer)?;
                q.to_writer(writer)?;
            }
            PublicParams::Unknown { data } => {
                writer.write_all(data)?;
            }
        }

        Ok(())
    }

    fn write_len(&self) -> usize {
        match self {
            PublicParams::RSA { n, e } => n.write_len() + e.write_len(),
            PublicParams::DSA { p, q, g, y } => {
                p.write_len() + q.write_len() + g.write_len() + y.write_len()
            }
            PublicParams::Elgamal { p, g, y } => p.write_len() + g.write_len() + y.write_len(),
            PublicParams::ECDSA { oid, p } => 1 + oid.len() + p.write_len(),
            PublicParams::ECDH { oid, p, kdf } => 1 + oid.len() + p.write_len() + 1 + kdf.len(),
            PublicParams::EdDSALegacy { oid, q } => 1 + oid.len() + q.write_len(),
            PublicParams::Unknown { data } => data.len(),
        }
    }
}

/// The secret half of a key packet.
///
/// Only the string-to-key usage octet is interpreted; the remaining
/// material is carried unchanged, protected or not.
/// Ref: <https://tools.ietf.org/html/rfc4880.html#section-5.5.3>
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, derive_more::Debug)]
pub struct SecretParams {
    s2k_usage: u8,
    #[debug("..")]
    data: Vec<u8>,
}

impl SecretParams {
    pub fn new(s2k_usage: u8, data: Vec<u8>) -> Self {
        SecretParams { s2k_usage, data }
    }

    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let s2k_usage = i.read_u8()?;
        let data = i.rest().to_vec();

        Ok(SecretParams { s2k_usage, data })
    }

    /// Unprotected material has an s2k usage of zero.
    pub fn is_encrypted(&self) -> bool {
        self.s2k_usage != 0
    }

    pub fn s2k_usage(&self) -> u8 {
        self.s2k_usage
    }

    /// Algorithm specific material, following the s2k usage octet.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Serialize for SecretParams {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.s2k_usage)?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        1 + self.data.len()
    }
}

/// The two octet checksum over plain secret material.
pub(crate) fn checksum_simple(data: &[u8]) -> u16 {
    data.iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)))
}

/// Writes `mpis` followed by their checksum, as used for unprotected secret keys.
pub(crate) fn plain_secret_data(mpis: &[Mpi]) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    for mpi in mpis {
        mpi.to_writer(&mut data)?;
    }
    let checksum = checksum_simple(&data);
    data.write_u16::<BigEndian>(checksum)?;
    Ok(data)
}
