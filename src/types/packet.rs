use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use log::debug;
use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};

use crate::errors::Result;

/// Represents the packet length.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketLength {
    Fixed(u32),
    Indeterminate,
    Partial(u32),
}

/// Packet Tag, see <https://tools.ietf.org/html/rfc4880.html#section-4.3>
///
/// Only the tags that can appear in a transferable key are given names,
/// everything else is carried as `Other`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Tag {
    /// Signature Packet
    Signature = 2,
    /// Secret-Key Packet
    SecretKey = 5,
    /// Public-Key Packet
    PublicKey = 6,
    /// Secret-Subkey Packet
    SecretSubkey = 7,
    /// Marker Packet
    Marker = 10,
    /// Trust Packet
    Trust = 12,
    /// User ID Packet
    UserId = 13,
    /// Public-Subkey Packet
    PublicSubkey = 14,
    /// User Attribute Packet
    UserAttribute = 17,

    #[num_enum(catch_all)]
    Other(u8),
}

/// The version of the packet format.
///
/// There are two packet formats
/// (see <https://tools.ietf.org/html/rfc4880.html#section-4.2>):
///
/// 1) the (current) OpenPGP packet format and
/// 2) the old format as used by implementations predating any IETF specification of OpenPGP.
#[derive(Debug, PartialEq, Eq, Clone, Copy, TryFromPrimitive, Default)]
#[repr(u8)]
pub enum PacketHeaderVersion {
    /// Old Packet Format
    Old = 0,
    /// New Packet Format
    #[default]
    New = 1,
}

impl PacketHeaderVersion {
    pub fn write_header(self, writer: &mut impl io::Write, tag: Tag, len: usize) -> Result<()> {
        debug!("write_header {:?} {:?} {}", self, tag, len);
        let tag: u8 = tag.into();
        match self {
            PacketHeaderVersion::Old => {
                if tag > 0x0F {
                    // old headers only have four bits for the tag
                    return PacketHeaderVersion::New.write_header(writer, tag.into(), len);
                }
                if len < 256 {
                    // one octet
                    writer.write_u8(0b1000_0000 | (tag << 2))?;
                    writer.write_u8(len.try_into()?)?;
                } else if len < 65536 {
                    // two octets
                    writer.write_u8(0b1000_0001 | (tag << 2))?;
                    writer.write_u16::<BigEndian>(len.try_into()?)?;
                } else {
                    // four octets
                    writer.write_u8(0b1000_0010 | (tag << 2))?;
                    writer.write_u32::<BigEndian>(len.try_into()?)?;
                }
            }
            PacketHeaderVersion::New => {
                writer.write_u8(0b1100_0000 | tag)?;
                if len < 192 {
                    writer.write_u8(len.try_into()?)?;
                } else if len < 8384 {
                    writer.write_u8((((len - 192) >> 8) + 192) as u8)?;
                    writer.write_u8(((len - 192) & 0xFF) as u8)?;
                } else {
                    writer.write_u8(255)?;
                    writer.write_u32::<BigEndian>(len.try_into()?)?;
                }
            }
        }

        Ok(())
    }

    /// Length of the header, in bytes.
    pub fn header_len(self, tag: Tag, len: usize) -> usize {
        match self {
            PacketHeaderVersion::Old if u8::from(tag) <= 0x0F => {
                if len < 256 {
                    2
                } else if len < 65536 {
                    3
                } else {
                    5
                }
            }
            _ => {
                if len < 192 {
                    2
                } else if len < 8384 {
                    3
                } else {
                    6
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum KeyVersion {
    V2 = 2,
    V3 = 3,
    V4 = 4,

    #[num_enum(catch_all)]
    Other(u8),
}

impl Default for KeyVersion {
    fn default() -> Self {
        Self::V4
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_write_header() {
        let mut buf = Vec::new();
        PacketHeaderVersion::New
            .write_header(&mut buf, Tag::UserAttribute, 12875)
            .unwrap();

        assert_eq!(hex::encode(buf), "d1ff0000324b");

        let mut buf = Vec::new();
        PacketHeaderVersion::New
            .write_header(&mut buf, Tag::Signature, 302)
            .unwrap();

        assert_eq!(hex::encode(buf), "c2c06e");

        let mut buf = Vec::new();
        PacketHeaderVersion::Old
            .write_header(&mut buf, Tag::PublicKey, 51)
            .unwrap();

        assert_eq!(hex::encode(buf), "9833");
    }

    #[test]
    fn test_old_header_falls_back_for_wide_tags() {
        let mut buf = Vec::new();
        PacketHeaderVersion::Old
            .write_header(&mut buf, Tag::UserAttribute, 10)
            .unwrap();

        assert_eq!(hex::encode(buf), "d10a");
    }

    #[test]
    fn test_tag_roundtrip() {
        assert_eq!(Tag::from(13u8), Tag::UserId);
        assert_eq!(Tag::from(60u8), Tag::Other(60));
        assert_eq!(u8::from(Tag::PublicSubkey), 14);
    }

    #[test]
    fn test_key_version() {
        assert_eq!(KeyVersion::default(), KeyVersion::V4);
        assert_eq!(KeyVersion::from(4u8), KeyVersion::V4);
        assert_eq!(KeyVersion::from(6u8), KeyVersion::Other(6));
        assert_eq!(u8::from(KeyVersion::Other(6)), 6);
    }

    proptest! {
        #[test]
        fn header_len(old in any::<bool>(), tag in 1u8..=17, len in 0usize..100_000) {
            let version = if old { PacketHeaderVersion::Old } else { PacketHeaderVersion::New };
            let tag = Tag::from(tag);
            let mut buf = Vec::new();
            version.write_header(&mut buf, tag, len).unwrap();
            prop_assert_eq!(buf.len(), version.header_len(tag, len));
        }
    }
}
