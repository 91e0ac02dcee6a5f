use std::{fmt, io};

use byteorder::{LittleEndian, WriteBytesExt};
use bytes::{Buf, Bytes};
use log::debug;

use crate::errors::{ensure, Result};
use crate::packet::PacketTrait;
use crate::parsing::BufParsing;
use crate::ser::Serialize;
use crate::types::{PacketHeaderVersion, Tag};
use crate::util::{packet_length, packet_length_len, write_packet_length};

/// User Attribute Packet
/// <https://tools.ietf.org/html/rfc4880.html#section-5.12>
///
/// Only the first attribute subpacket is interpreted.
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub enum UserAttribute {
    Image {
        packet_version: PacketHeaderVersion,
        #[debug("{}", hex::encode(header))]
        header: Bytes,
        #[debug("{} bytes", data.len())]
        data: Bytes,
    },
    Unknown {
        packet_version: PacketHeaderVersion,
        typ: u8,
        #[debug("{}", hex::encode(data))]
        data: Bytes,
    },
}

impl UserAttribute {
    /// Parses a `UserAttribute` packet from the given buffer.
    pub fn from_buf<B: Buf>(packet_version: PacketHeaderVersion, mut i: B) -> Result<Self> {
        let len = packet_length(&mut i)?;
        ensure!(len > 0, "empty user attribute subpacket");
        let typ = i.read_u8()?;
        let mut body = i.read_take(len - 1)?;
        debug!("user attribute typ {} with len {}", typ, len);

        let attr = match typ {
            1 => {
                // little endian, for historical reasons..
                let header_len = body.read_array::<2>()?;
                let header_len = usize::from(u16::from_le_bytes(header_len));
                ensure!(header_len >= 2, "invalid image header length {}", header_len);
                let header = body.read_take(header_len - 2)?;
                let data = body.rest();
                UserAttribute::Image {
                    packet_version,
                    header,
                    data,
                }
            }
            _ => UserAttribute::Unknown {
                packet_version,
                typ,
                data: body,
            },
        };

        Ok(attr)
    }

    pub fn typ(&self) -> u8 {
        match self {
            UserAttribute::Image { .. } => 1,
            UserAttribute::Unknown { typ, .. } => *typ,
        }
    }

    fn subpacket_len(&self) -> usize {
        match self {
            // typ + image header + data length
            UserAttribute::Image { header, data, .. } => 1 + 2 + header.len() + data.len(),
            // typ + data length
            UserAttribute::Unknown { data, .. } => 1 + data.len(),
        }
    }
}

impl fmt::Display for UserAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UserAttribute::Image { data, .. } => {
                write!(f, "User Attribute: Image (len: {})", data.len())
            }
            UserAttribute::Unknown { typ, data, .. } => {
                write!(f, "User Attribute: typ: {} (len: {})", typ, data.len())
            }
        }
    }
}

impl Serialize for UserAttribute {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        write_packet_length(self.subpacket_len(), writer)?;
        writer.write_u8(self.typ())?;

        match self {
            UserAttribute::Image { header, data, .. } => {
                writer.write_u16::<LittleEndian>((header.len() + 2).try_into()?)?;
                writer.write_all(header)?;
                writer.write_all(data)?;
            }
            UserAttribute::Unknown { data, .. } => {
                writer.write_all(data)?;
            }
        }

        Ok(())
    }

    fn write_len(&self) -> usize {
        let len = self.subpacket_len();
        packet_length_len(len) + len
    }
}

impl PacketTrait for UserAttribute {
    fn packet_version(&self) -> PacketHeaderVersion {
        match self {
            UserAttribute::Image { packet_version, .. } => *packet_version,
            UserAttribute::Unknown { packet_version, .. } => *packet_version,
        }
    }

    fn tag(&self) -> Tag {
        Tag::UserAttribute
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_attribute() {
        let mut raw = vec![0x16, 0x01, 0x10, 0x00, 0x01, 0x01];
        raw.extend_from_slice(&[0u8; 12]);
        raw.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]);

        let attr = UserAttribute::from_buf(PacketHeaderVersion::New, &raw[..]).unwrap();
        match &attr {
            UserAttribute::Image { header, data, .. } => {
                assert_eq!(header.len(), 14);
                assert_eq!(data.as_ref(), &[0xFF, 0xD8, 0xFF, 0xE0, 0x00]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(attr.to_bytes().unwrap(), raw);
        assert_eq!(attr.to_string(), "User Attribute: Image (len: 5)");
    }

    #[test]
    fn test_unknown_attribute() {
        let raw = [0x03, 0x65, 0xAA, 0xBB];
        let attr = UserAttribute::from_buf(PacketHeaderVersion::Old, &raw[..]).unwrap();
        assert_eq!(attr.typ(), 0x65);
        assert_eq!(attr.to_bytes().unwrap(), raw.to_vec());
    }
}
