use std::{fmt, io, str};

use bytes::Bytes;

use crate::errors::Result;
use crate::packet::PacketTrait;
use crate::ser::Serialize;
use crate::types::{PacketHeaderVersion, Tag};

/// User ID Packet
/// <https://tools.ietf.org/html/rfc4880.html#section-5.11>
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UserId {
    packet_version: PacketHeaderVersion,
    id: String,
}

impl UserId {
    /// Parses a `UserId` packet from the given buffer.
    pub fn from_buf(packet_version: PacketHeaderVersion, input: Bytes) -> Result<Self> {
        let id = str::from_utf8(&input)?;

        Ok(UserId {
            packet_version,
            id: id.to_string(),
        })
    }

    /// Create a new `UserId` packet from a string.
    pub fn from_str(packet_version: PacketHeaderVersion, input: &str) -> Self {
        UserId {
            packet_version,
            id: input.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Serialize for UserId {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.id.as_bytes())?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        self.id.len()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "User ID: \"{}\"", self.id)
    }
}

impl PacketTrait for UserId {
    fn packet_version(&self) -> PacketHeaderVersion {
        self.packet_version
    }

    fn tag(&self) -> Tag {
        Tag::UserId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_with_header() {
        let id = UserId::from_str(PacketHeaderVersion::New, "Alice <alice@example.org>");
        let mut buf = Vec::new();
        id.to_writer_with_header(&mut buf).unwrap();

        assert_eq!(&buf[..2], &[0xCD, 25]);
        assert_eq!(&buf[2..], b"Alice <alice@example.org>");
        assert_eq!(id.write_len_with_header(), buf.len());
    }

    #[test]
    fn test_invalid_utf8() {
        let raw = Bytes::from_static(&[0xff, 0xfe]);
        assert!(UserId::from_buf(PacketHeaderVersion::New, raw).is_err());
    }
}
