use bytes::{Bytes, BytesMut};
use log::debug;

use crate::errors::{bail, Error, Result};
use crate::packet::header::new_length;
use crate::packet::{Packet, PacketHeader};
use crate::parsing::BufParsing;
use crate::types::{PacketLength, Tag};

/// Decodes a stream of packets from raw bytes.
///
/// A packet whose body fails to decode is reported as an error and parsing
/// continues with the next packet. Framing errors end the stream.
/// Marker packets are skipped.
#[derive(Debug)]
pub struct PacketParser {
    input: Bytes,
    done: bool,
}

impl PacketParser {
    pub fn new(input: impl Into<Bytes>) -> Self {
        PacketParser {
            input: input.into(),
            done: false,
        }
    }

    /// The bytes not yet consumed.
    pub fn remaining(&self) -> &[u8] {
        &self.input
    }

    fn read_body(&mut self, length: PacketLength) -> Result<Bytes> {
        match length {
            PacketLength::Fixed(len) => self.take(len),
            PacketLength::Indeterminate => Ok(self.input.rest()),
            PacketLength::Partial(first) => {
                let mut body = BytesMut::new();
                body.extend_from_slice(&self.take(first)?);

                loop {
                    match new_length(&mut self.input)? {
                        PacketLength::Partial(len) => {
                            body.extend_from_slice(&self.take(len)?);
                        }
                        PacketLength::Fixed(len) => {
                            // the last chunk always has a regular length
                            body.extend_from_slice(&self.take(len)?);
                            break;
                        }
                        PacketLength::Indeterminate => {
                            bail!("indeterminate length inside partial body");
                        }
                    }
                }

                debug!("joined partial body of {} bytes", body.len());
                Ok(body.freeze())
            }
        }
    }

    fn take(&mut self, len: u32) -> Result<Bytes> {
        self.input
            .read_take(len.try_into()?)
            .map_err(|source| Error::PacketIncomplete { source })
    }
}

impl Iterator for PacketParser {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done || self.input.is_empty() {
                return None;
            }

            let framed = PacketHeader::from_buf(&mut self.input)
                .and_then(|header| Ok((header, self.read_body(header.length)?)));

            let (header, body) = match framed {
                Ok(framed) => framed,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            };

            if header.tag == Tag::Marker {
                debug!("skipping marker packet");
                continue;
            }

            return Some(Packet::from_body(header.version, header.tag, body));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{PacketTrait, UserId};
    use crate::types::PacketHeaderVersion;

    #[test]
    fn test_user_ids_and_marker() {
        let mut raw = Vec::new();
        UserId::from_str(PacketHeaderVersion::New, "alice")
            .to_writer_with_header(&mut raw)
            .unwrap();
        // marker packet, "PGP"
        raw.extend_from_slice(&[0xCA, 0x03, b'P', b'G', b'P']);
        UserId::from_str(PacketHeaderVersion::Old, "bob")
            .to_writer_with_header(&mut raw)
            .unwrap();

        let packets: Vec<_> = PacketParser::new(raw).collect::<Result<_>>().unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(UserId::try_from(packets[1].clone()).unwrap().id(), "bob");
    }

    #[test]
    fn test_partial_body() {
        // 0xE1: partial chunk of 2 bytes, then a fixed final chunk of 3 bytes
        let raw = vec![0xCD, 0xE1, b'a', b'l', 0x03, b'i', b'c', b'e'];
        let packets: Vec<_> = PacketParser::new(raw).collect::<Result<_>>().unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(UserId::try_from(packets[0].clone()).unwrap().id(), "alice");
    }

    #[test]
    fn test_truncated_body_ends_stream() {
        let mut parser = PacketParser::new(vec![0xCD, 0x09, b'a']);
        let err = parser.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::PacketIncomplete { .. }));
        assert!(parser.next().is_none());
    }
}
