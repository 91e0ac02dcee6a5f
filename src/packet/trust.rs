use std::io;

use bytes::Bytes;
use log::debug;

use crate::errors::Result;
use crate::packet::PacketTrait;
use crate::ser::Serialize;
use crate::types::{PacketHeaderVersion, Tag};

/// Trust Packet
/// <https://tools.ietf.org/html/rfc4880.html#section-5.10>
///
/// Trust packets are only meaningful inside local keyrings. Key blocks skip
/// them, but the body is kept so a consumed packet buffer stays faithful.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Trust {
    packet_version: PacketHeaderVersion,
    data: Bytes,
}

impl Trust {
    /// Parses a `Trust` packet from the given buffer.
    pub fn from_buf(packet_version: PacketHeaderVersion, data: Bytes) -> Self {
        debug!("trust packet ({} bytes)", data.len());

        Trust {
            packet_version,
            data,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Serialize for Trust {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.data)?;
        Ok(())
    }

    fn write_len(&self) -> usize {
        self.data.len()
    }
}

impl PacketTrait for Trust {
    fn packet_version(&self) -> PacketHeaderVersion {
        self.packet_version
    }

    fn tag(&self) -> Tag {
        Tag::Trust
    }
}
