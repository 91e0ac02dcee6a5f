use std::fmt;

use crate::errors::Error;
use crate::packet::{self, Packet, PacketTrait};
use crate::types::{KeyDetails, KeyKind, Tag};

/// Selects the primary key packet type of a [`TransferableKey`](super::TransferableKey).
pub trait KeyFamily: fmt::Debug + Clone + Send + Sync + 'static {
    type Primary: KeyDetails
        + PacketTrait
        + TryFrom<Packet, Error = Error>
        + Into<Packet>
        + Clone
        + PartialEq
        + Send
        + Sync;

    const KIND: KeyKind;

    /// Tag of the packet a block of this family starts with.
    const PRIMARY_TAG: Tag;

    /// Can a subkey packet with this tag be part of the block?
    fn accepts_subkey(tag: Tag) -> bool;
}

/// Blocks that start with a public key packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Public {}

/// Blocks that start with a secret key packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secret {}

impl KeyFamily for Public {
    type Primary = packet::PublicKey;

    const KIND: KeyKind = KeyKind::Public;
    const PRIMARY_TAG: Tag = Tag::PublicKey;

    fn accepts_subkey(tag: Tag) -> bool {
        tag == Tag::PublicSubkey
    }
}

impl KeyFamily for Secret {
    type Primary = packet::SecretKey;

    const KIND: KeyKind = KeyKind::Secret;
    const PRIMARY_TAG: Tag = Tag::SecretKey;

    // secret keys may carry subkeys without their secret half
    fn accepts_subkey(tag: Tag) -> bool {
        matches!(tag, Tag::PublicSubkey | Tag::SecretSubkey)
    }
}
