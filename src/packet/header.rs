use bytes::Buf;
use log::debug;

use crate::errors::{bail, Result};
use crate::parsing::BufParsing;
use crate::types::{PacketHeaderVersion, PacketLength, Tag};

/// A decoded packet header.
///
/// Ref: <https://tools.ietf.org/html/rfc4880.html#section-4.2>
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    pub version: PacketHeaderVersion,
    pub tag: Tag,
    pub length: PacketLength,
}

impl PacketHeader {
    /// Parse a single packet header from the given buffer.
    pub fn from_buf<B: Buf>(mut i: B) -> Result<Self> {
        let header = i.read_u8()?;

        let header = match header & 0b1100_0000 {
            0b1100_0000 => {
                // new starts with 0b11
                let tag = Tag::from(header & 0b0011_1111);
                let length = new_length(&mut i)?;
                PacketHeader {
                    version: PacketHeaderVersion::New,
                    tag,
                    length,
                }
            }
            0b1000_0000 => {
                // old starts with 0b10
                let tag = Tag::from((header >> 2) & 0b0000_1111);
                let length = match header & 0b0000_0011 {
                    // One-Octet Lengths
                    0 => PacketLength::Fixed(i.read_u8()?.into()),
                    // Two-Octet Lengths
                    1 => PacketLength::Fixed(i.read_be_u16()?.into()),
                    // Four-Octet Lengths
                    2 => PacketLength::Fixed(i.read_be_u32()?),
                    _ => PacketLength::Indeterminate,
                };
                PacketHeader {
                    version: PacketHeaderVersion::Old,
                    tag,
                    length,
                }
            }
            _ => {
                bail!("unknown packet header version {:b}", header);
            }
        };

        debug!("packet header {:?}", header);
        Ok(header)
    }
}

/// Reads a new format body length.
///
/// Also used for the follow-up lengths of partial bodies.
pub(crate) fn new_length<B: Buf>(i: &mut B) -> Result<PacketLength> {
    let olen = i.read_u8()?;
    let length = match olen {
        // One-Octet Lengths
        0..=191 => PacketLength::Fixed(olen.into()),
        // Two-Octet Lengths
        192..=223 => {
            let a = i.read_u8()?;
            let l = ((u32::from(olen) - 192) << 8) + 192 + u32::from(a);
            PacketLength::Fixed(l)
        }
        // Partial Body Lengths
        224..=254 => PacketLength::Partial(1 << (olen & 0x1F)),
        // Five-Octet Lengths
        255 => PacketLength::Fixed(i.read_be_u32()?),
    };
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_header() {
        let header = PacketHeader::from_buf(&hex::decode("c2c06e").unwrap()[..]).unwrap();
        assert_eq!(header.version, PacketHeaderVersion::New);
        assert_eq!(header.tag, Tag::Signature);
        assert_eq!(header.length, PacketLength::Fixed(302));

        let header = PacketHeader::from_buf(&hex::decode("d1ff0000324b").unwrap()[..]).unwrap();
        assert_eq!(header.tag, Tag::UserAttribute);
        assert_eq!(header.length, PacketLength::Fixed(12875));
    }

    #[test]
    fn test_old_header() {
        let header = PacketHeader::from_buf(&[0x99, 0x01, 0x0d][..]).unwrap();
        assert_eq!(header.version, PacketHeaderVersion::Old);
        assert_eq!(header.tag, Tag::PublicKey);
        assert_eq!(header.length, PacketLength::Fixed(269));

        let header = PacketHeader::from_buf(&[0xb7][..]).unwrap();
        assert_eq!(header.tag, Tag::UserId);
        assert_eq!(header.length, PacketLength::Indeterminate);
    }

    #[test]
    fn test_partial_length() {
        let header = PacketHeader::from_buf(&[0xcd, 0xe2][..]).unwrap();
        assert_eq!(header.tag, Tag::UserId);
        assert_eq!(header.length, PacketLength::Partial(4));
    }

    #[test]
    fn test_invalid_header() {
        assert!(PacketHeader::from_buf(&[0x3f, 0x01][..]).is_err());
        assert!(PacketHeader::from_buf(&[0xc2][..]).is_err());
    }
}
