use std::io;

use bytes::Bytes;
use log::{debug, warn};

use crate::errors::Result;
use crate::packet::{
    PacketTrait, PublicKey, PublicSubkey, SecretKey, SecretSubkey, Signature, Trust,
    UserAttribute, UserId,
};
use crate::ser::Serialize;
use crate::types::{PacketHeaderVersion, Tag};
use crate::util::impl_try_from_into;

/// Represents a Packet. A packet is the record structure used to encode a chunk of data in OpenPGP.
/// Ref: <https://tools.ietf.org/html/rfc4880.html#section-4>
#[derive(Debug, PartialEq, Eq, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum Packet {
    PublicKey(PublicKey),
    PublicSubkey(PublicSubkey),
    SecretKey(SecretKey),
    SecretSubkey(SecretSubkey),
    Signature(Signature),
    Trust(Trust),
    UserAttribute(UserAttribute),
    UserId(UserId),
    /// A packet that can not be part of a key block, kept verbatim.
    Unknown(Unknown),
}

impl_try_from_into!(
    Packet,
    PublicKey => PublicKey,
    PublicSubkey => PublicSubkey,
    SecretKey => SecretKey,
    SecretSubkey => SecretSubkey,
    Signature => Signature,
    Trust => Trust,
    UserAttribute => UserAttribute,
    UserId => UserId,
    Unknown => Unknown
);

impl Packet {
    /// Decodes a packet body according to its tag.
    pub fn from_body(packet_version: PacketHeaderVersion, tag: Tag, body: Bytes) -> Result<Self> {
        debug!("decoding {:?} body ({} bytes)", tag, body.len());

        let packet = match tag {
            Tag::PublicKey => PublicKey::from_buf(packet_version, body)?.into(),
            Tag::PublicSubkey => PublicSubkey::from_buf(packet_version, body)?.into(),
            Tag::SecretKey => SecretKey::from_buf(packet_version, body)?.into(),
            Tag::SecretSubkey => SecretSubkey::from_buf(packet_version, body)?.into(),
            Tag::Signature => Signature::from_buf(packet_version, body)?.into(),
            Tag::Trust => Trust::from_buf(packet_version, body).into(),
            Tag::UserAttribute => UserAttribute::from_buf(packet_version, body)?.into(),
            Tag::UserId => UserId::from_buf(packet_version, body)?.into(),
            Tag::Marker | Tag::Other(_) => {
                warn!("packet {:?} is not part of a key block", tag);
                Unknown {
                    packet_version,
                    tag,
                    body,
                }
                .into()
            }
        };

        Ok(packet)
    }

    pub fn tag(&self) -> Tag {
        match self {
            Self::PublicKey(p) => p.tag(),
            Self::PublicSubkey(p) => p.tag(),
            Self::SecretKey(p) => p.tag(),
            Self::SecretSubkey(p) => p.tag(),
            Self::Signature(p) => p.tag(),
            Self::Trust(p) => p.tag(),
            Self::UserAttribute(p) => p.tag(),
            Self::UserId(p) => p.tag(),
            Self::Unknown(p) => p.tag(),
        }
    }
}

impl Serialize for Packet {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            Self::PublicKey(p) => p.to_writer_with_header(writer),
            Self::PublicSubkey(p) => p.to_writer_with_header(writer),
            Self::SecretKey(p) => p.to_writer_with_header(writer),
            Self::SecretSubkey(p) => p.to_writer_with_header(writer),
            Self::Signature(p) => p.to_writer_with_header(writer),
            Self::Trust(p) => p.to_writer_with_header(writer),
            Self::UserAttribute(p) => p.to_writer_with_header(writer),
            Self::UserId(p) => p.to_writer_with_header(writer),
            Self::Unknown(p) => p.to_writer_with_header(writer),
        }
    }

    fn write_len(&self) -> usize {
        match self {
            Self::PublicKey(p) => p.write_len_with_header(),
            Self::PublicSubkey(p) => p.write_len_with_header(),
            Self::SecretKey(p) => p.write_len_with_header(),
            Self::SecretSubkey(p) => p.write_len_with_header(),
            Self::Signature(p) => p.write_len_with_header(),
            Self::Trust(p) => p.write_len_with_header(),
            Self::UserAttribute(p) => p.write_len_with_header(),
            Self::UserId(p) => p.write_len_with_header(),
            Self::Unknown(p) => p.write_len_with_header(),
        }
    }
}

/// Body of a packet type the key block does not interpret.
#[derive(derive_more::Debug, PartialEq, Eq, Clone)]
pub struct Unknown {
    packet_version: PacketHeaderVersion,
    tag: Tag,
    #[debug("{}", hex::encode(body))]
    body: Bytes,
}

impl Unknown {
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl Serialize for Unknown {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.body)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.body.len()
    }
}

impl PacketTrait for Unknown {
    fn packet_version(&self) -> PacketHeaderVersion {
        self.packet_version
    }

    fn tag(&self) -> Tag {
        self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keeps_body() {
        let packet = Packet::from_body(
            PacketHeaderVersion::New,
            Tag::Other(11),
            Bytes::from_static(b"literal"),
        )
        .unwrap();
        assert_eq!(packet.tag(), Tag::Other(11));
        assert_eq!(packet.to_bytes().unwrap(), b"\xCB\x07literal".to_vec());
    }

    #[test]
    fn test_try_from() {
        let packet: Packet = UserId::from_str(PacketHeaderVersion::New, "alice").into();
        assert!(Signature::try_from(packet.clone()).is_err());
        assert_eq!(UserId::try_from(packet).unwrap().id(), "alice");
    }
}
