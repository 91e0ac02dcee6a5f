use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, Bytes};
use chrono::{DateTime, Utc};
use log::warn;
use smallvec::SmallVec;

use crate::errors::{ensure, Result};
use crate::parsing::BufParsing;
use crate::ser::{time_to_u32, u32_to_time, Serialize};
use crate::types::{Fingerprint, KeyId, KeyVersion};
use crate::util::{packet_length, packet_length_len, write_packet_length};

/// The subpacket types a key block interprets.
///
/// Ref: <https://tools.ietf.org/html/rfc4880.html#section-5.2.3.1>
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum SubpacketType {
    SignatureCreationTime,
    KeyExpirationTime,
    Issuer,
    PrimaryUserId,
    KeyFlags,
    IssuerFingerprint,
    Other(u8),
}

impl SubpacketType {
    pub fn as_u8(&self, is_critical: bool) -> u8 {
        let raw: u8 = match self {
            SubpacketType::SignatureCreationTime => 2,
            SubpacketType::KeyExpirationTime => 9,
            SubpacketType::Issuer => 16,
            SubpacketType::PrimaryUserId => 25,
            SubpacketType::KeyFlags => 27,
            SubpacketType::IssuerFingerprint => 33,
            SubpacketType::Other(n) => *n,
        };

        if is_critical {
            // set critical bit
            raw | 0b1000_0000
        } else {
            raw
        }
    }

    #[inline]
    pub fn from_u8(n: u8) -> (Self, bool) {
        let is_critical = (n >> 7) == 1;
        // remove critical bit
        let n = n & 0b0111_1111;

        let m = match n {
            2 => SubpacketType::SignatureCreationTime,
            9 => SubpacketType::KeyExpirationTime,
            16 => SubpacketType::Issuer,
            25 => SubpacketType::PrimaryUserId,
            27 => SubpacketType::KeyFlags,
            33 => SubpacketType::IssuerFingerprint,
            _ => SubpacketType::Other(n),
        };

        (m, is_critical)
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Subpacket {
    pub is_critical: bool,
    pub data: SubpacketData,
}

impl Subpacket {
    /// Construct a new regular subpacket.
    pub const fn regular(data: SubpacketData) -> Self {
        Subpacket {
            is_critical: false,
            data,
        }
    }

    /// Construct a new critical subpacket.
    pub const fn critical(data: SubpacketData) -> Self {
        Subpacket {
            is_critical: true,
            data,
        }
    }

    pub fn typ(&self) -> SubpacketType {
        match &self.data {
            SubpacketData::SignatureCreationTime(_) => SubpacketType::SignatureCreationTime,
            SubpacketData::KeyExpirationTime(_) => SubpacketType::KeyExpirationTime,
            SubpacketData::Issuer(_) => SubpacketType::Issuer,
            SubpacketData::PrimaryUserId(_) => SubpacketType::PrimaryUserId,
            SubpacketData::KeyFlags(_) => SubpacketType::KeyFlags,
            SubpacketData::IssuerFingerprint(_) => SubpacketType::IssuerFingerprint,
            SubpacketData::Other(n, _) => SubpacketType::Other(*n),
        }
    }

    /// Parses a complete subpacket area.
    pub fn from_area(mut area: Bytes) -> Result<Vec<Subpacket>> {
        let mut packets = Vec::new();
        while area.has_remaining() {
            let len = packet_length(&mut area)?;
            ensure!(len > 0, "empty subpacket");
            let (typ, is_critical) = SubpacketType::from_u8(area.read_u8()?);
            let body = area.read_take(len - 1)?;
            let data = SubpacketData::from_body(typ, body)?;
            packets.push(Subpacket { is_critical, data });
        }

        Ok(packets)
    }

    fn body_len(&self) -> usize {
        match &self.data {
            SubpacketData::SignatureCreationTime(_) => 4,
            SubpacketData::KeyExpirationTime(_) => 4,
            SubpacketData::Issuer(_) => 8,
            SubpacketData::PrimaryUserId(_) => 1,
            SubpacketData::KeyFlags(flags) => flags.len(),
            SubpacketData::IssuerFingerprint(_) => 21,
            SubpacketData::Other(_, body) => body.len(),
        }
    }

    fn body_to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match &self.data {
            SubpacketData::SignatureCreationTime(t) => {
                writer.write_u32::<BigEndian>(time_to_u32(t))?;
            }
            SubpacketData::KeyExpirationTime(seconds) => {
                writer.write_u32::<BigEndian>(*seconds)?;
            }
            SubpacketData::Issuer(id) => {
                writer.write_all(id.as_ref())?;
            }
            SubpacketData::PrimaryUserId(is_primary) => {
                writer.write_u8(u8::from(*is_primary))?;
            }
            SubpacketData::KeyFlags(flags) => {
                writer.write_all(flags)?;
            }
            SubpacketData::IssuerFingerprint(fp) => {
                writer.write_u8(KeyVersion::V4.into())?;
                writer.write_all(fp.as_bytes())?;
            }
            SubpacketData::Other(_, body) => {
                writer.write_all(body)?;
            }
        }

        Ok(())
    }
}

impl Serialize for Subpacket {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        write_packet_length(1 + self.body_len(), writer)?;
        writer.write_u8(self.typ().as_u8(self.is_critical))?;
        self.body_to_writer(writer)
    }

    fn write_len(&self) -> usize {
        let len = 1 + self.body_len();
        packet_length_len(len) + len
    }
}

#[derive(derive_more::Debug, PartialEq, Eq, Clone)]
pub enum SubpacketData {
    /// The time the signature was made.
    SignatureCreationTime(DateTime<Utc>),
    /// Seconds after key creation at which the key expires.
    KeyExpirationTime(u32),
    /// The OpenPGP Key ID of the key issuing the signature.
    Issuer(KeyId),
    PrimaryUserId(bool),
    /// Raw key flag octets, see [`KeyFlags`](super::KeyFlags).
    KeyFlags(#[debug("{}", hex::encode(_0))] SmallVec<[u8; 1]>),
    /// V4 fingerprint of the key issuing the signature.
    IssuerFingerprint(Fingerprint),
    /// A subpacket we do not interpret, or one whose body was malformed.
    Other(u8, #[debug("{}", hex::encode(_1))] Bytes),
}

impl SubpacketData {
    fn from_body(typ: SubpacketType, mut body: Bytes) -> Result<Self> {
        let raw = body.clone();
        let parsed = match typ {
            SubpacketType::SignatureCreationTime if body.len() == 4 => {
                SubpacketData::SignatureCreationTime(u32_to_time(body.read_be_u32()?))
            }
            SubpacketType::KeyExpirationTime if body.len() == 4 => {
                SubpacketData::KeyExpirationTime(body.read_be_u32()?)
            }
            SubpacketType::Issuer if body.len() == 8 => {
                SubpacketData::Issuer(KeyId::from(body.read_array::<8>()?))
            }
            SubpacketType::PrimaryUserId if body.len() == 1 => {
                SubpacketData::PrimaryUserId(body.read_u8()? != 0)
            }
            SubpacketType::KeyFlags => SubpacketData::KeyFlags(SmallVec::from_slice(&body)),
            SubpacketType::IssuerFingerprint
                if body.len() == 21 && body[0] == u8::from(KeyVersion::V4) =>
            {
                SubpacketData::IssuerFingerprint(Fingerprint::from_slice(&body[1..])?)
            }
            SubpacketType::Other(n) => SubpacketData::Other(n, body),
            _ => {
                warn!("invalid subpacket body: {:?} {}", typ, hex::encode(&raw));
                SubpacketData::Other(typ.as_u8(false), raw)
            }
        };

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_critical_bit() {
        assert_eq!(SubpacketType::KeyFlags.as_u8(true), 0x9B);
        assert_eq!(SubpacketType::from_u8(0x82), (SubpacketType::SignatureCreationTime, true));
        assert_eq!(SubpacketType::from_u8(0x65), (SubpacketType::Other(0x65), false));
    }

    #[test]
    fn test_area() {
        let created = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
        let packets = vec![
            Subpacket::critical(SubpacketData::SignatureCreationTime(created)),
            Subpacket::regular(SubpacketData::KeyFlags(SmallVec::from_slice(&[0x0C]))),
            Subpacket::regular(SubpacketData::Issuer(KeyId::from([1, 2, 3, 4, 5, 6, 7, 8]))),
            Subpacket::regular(SubpacketData::Other(20, Bytes::from_static(b"notation"))),
        ];
        let bytes = packets.to_bytes().unwrap();
        assert_eq!(&bytes[..6], &[0x05, 0x82, 0x5F, 0x5E, 0x10, 0x00]);

        let back = Subpacket::from_area(bytes.into()).unwrap();
        assert_eq!(back, packets);
    }

    #[test]
    fn test_malformed_body_kept() {
        let area = Bytes::from_static(&[0x03, 0x02, 0xAA, 0xBB]);
        let packets = Subpacket::from_area(area).unwrap();
        assert_eq!(
            packets[0].data,
            SubpacketData::Other(2, Bytes::from_static(&[0xAA, 0xBB]))
        );
        assert_eq!(packets[0].to_bytes().unwrap(), vec![0x03, 0x02, 0xAA, 0xBB]);
    }
}
