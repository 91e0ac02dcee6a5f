use std::io;

use crate::errors::Result;
use crate::ser::Serialize;
use crate::types::{PacketHeaderVersion, Tag};

pub trait PacketTrait: Serialize {
    /// The header format this packet was read with, or will be written with.
    fn packet_version(&self) -> PacketHeaderVersion;

    /// Returns the tag for this packet type.
    fn tag(&self) -> Tag;

    /// Writes the packet header followed by the body.
    fn to_writer_with_header<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        let len = self.write_len();
        self.packet_version().write_header(writer, self.tag(), len)?;
        self.to_writer(writer)
    }

    fn write_len_with_header(&self) -> usize {
        let len = self.write_len();
        self.packet_version().header_len(self.tag(), len) + len
    }
}
