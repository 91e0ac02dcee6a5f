use std::iter::Peekable;
use std::marker::PhantomData;

use bytes::Bytes;
use log::{debug, warn};

use crate::composed::signed_key::{
    Identity, KeyFamily, SignedIdentity, SignedSubkey, Subkey, TransferableKey,
};
use crate::errors::{bail, structure_err, Error, Result};
use crate::packet::{Packet, PacketParser, SignatureType};
use crate::types::Tag;

impl<F: KeyFamily> TransferableKey<F> {
    /// Groups the leading packets into one block and returns the packets after it.
    ///
    /// Ref: <https://tools.ietf.org/html/rfc4880.html#section-11.1>
    pub fn parse(packets: Vec<Packet>) -> Result<(Self, Vec<Packet>)> {
        let mut packets = packets.into_iter().map(Ok).peekable();
        let key = next_block(&mut packets)?;
        let rest = packets.filter_map(Result::ok).collect();

        Ok((key, rest))
    }

    /// Decodes the first key block found in `bytes`.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        match Self::from_bytes_many(bytes).next() {
            Some(key) => key,
            None => Err(structure_err!("no key block found")),
        }
    }

    /// Decodes every key block in `bytes`, one after another.
    pub fn from_bytes_many(bytes: impl Into<Bytes>) -> KeyBlockParser<F, PacketParser> {
        KeyBlockParser::new(PacketParser::new(bytes))
    }
}

/// Splits a packet stream into successive key blocks.
#[derive(Debug)]
pub struct KeyBlockParser<F, I>
where
    F: KeyFamily,
    I: Iterator<Item = Result<Packet>>,
{
    inner: Peekable<I>,
    _family: PhantomData<F>,
}

impl<F, I> KeyBlockParser<F, I>
where
    F: KeyFamily,
    I: Iterator<Item = Result<Packet>>,
{
    pub fn new(packets: I) -> Self {
        KeyBlockParser {
            inner: packets.peekable(),
            _family: PhantomData,
        }
    }

    /// The packets not consumed so far.
    pub fn into_inner(self) -> Peekable<I> {
        self.inner
    }
}

impl<F, I> Iterator for KeyBlockParser<F, I>
where
    F: KeyFamily,
    I: Iterator<Item = Result<Packet>>,
{
    type Item = Result<TransferableKey<F>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.peek()?;
        Some(next_block(&mut self.inner))
    }
}

/// Reads one transferable key off the front of `packets`.
pub(crate) fn next_block<F, I>(packets: &mut Peekable<I>) -> Result<TransferableKey<F>>
where
    F: KeyFamily,
    I: Iterator<Item = Result<Packet>>,
{
    let mut consumed = Vec::new();

    // -- One primary key packet
    skip_unsupported(packets)?;
    let primary = match packets.next() {
        Some(Ok(packet)) if packet.tag() == F::PRIMARY_TAG => packet,
        Some(Ok(packet)) => {
            return Err(structure_err!(
                "expected {:?} to start the key, found {:?}",
                F::PRIMARY_TAG,
                packet.tag()
            ));
        }
        Some(Err(err)) => return Err(err),
        None => return Err(structure_err!("missing primary key")),
    };
    consumed.push(primary.clone());

    let mut key = TransferableKey::<F>::new(primary.try_into()?);
    debug!("primary key: {:?}", key.key_id());

    // -- Zero or more revocation signatures
    while let Some(packet) = next_if_tag(packets, is_signature_or_trust)? {
        consumed.push(packet.clone());
        match packet {
            Packet::Signature(sig) if sig.typ() == SignatureType::KeyRevocation => {
                key.add_revocation(sig);
            }
            Packet::Signature(sig) => {
                return Err(structure_err!(
                    "unexpected {:?} signature after the primary key",
                    sig.typ()
                ));
            }
            _ => debug!("skipping trust packet"),
        }
    }

    // -- One or more user ids, user attributes may be mixed in
    while let Some(packet) = next_if_tag(packets, is_identity)? {
        consumed.push(packet.clone());
        match packet {
            Packet::UserId(id) => {
                let user = certified_identity(packets, id, &mut consumed)?;
                key.add_user(user);
            }
            Packet::UserAttribute(attr) => {
                let attr = certified_identity(packets, attr, &mut consumed)?;
                key.add_user_attribute(attr);
            }
            other => bail!("unexpected {:?} among identities", other.tag()),
        }
    }

    if key.users().is_empty() {
        return Err(structure_err!("key {:?} has no user id", key.key_id()));
    }

    // -- Zero or more subkeys, each followed by its bindings and revocations
    while let Some(packet) = next_if_tag(packets, F::accepts_subkey)? {
        consumed.push(packet.clone());
        let mut subkey = SignedSubkey::new(Subkey::try_from(packet)?);
        debug!("subkey: {:?}", subkey.key_id());

        while let Some(packet) = next_if_packet(packets, |p| match p {
            Packet::Signature(sig) => matches!(
                sig.typ(),
                SignatureType::SubkeyBinding | SignatureType::SubkeyRevocation
            ),
            Packet::Trust(_) => true,
            _ => false,
        })? {
            consumed.push(packet.clone());
            match packet {
                Packet::Signature(sig) if sig.typ() == SignatureType::SubkeyBinding => {
                    subkey.add_binding_signature(sig);
                }
                Packet::Signature(sig) => subkey.add_revocation(sig),
                _ => debug!("skipping trust packet"),
            }
        }

        key.add_subkey(subkey);
    }

    debug!("key {:?} consumed {} packets", key.key_id(), consumed.len());
    key.packets = consumed;

    Ok(key)
}

fn certified_identity<T, I>(
    packets: &mut Peekable<I>,
    identity: T,
    consumed: &mut Vec<Packet>,
) -> Result<SignedIdentity<T>>
where
    T: Identity,
    I: Iterator<Item = Result<Packet>>,
{
    let mut signed = SignedIdentity::new(identity);

    while let Some(packet) = next_if_tag(packets, is_signature_or_trust)? {
        consumed.push(packet.clone());
        match packet {
            Packet::Signature(sig) if sig.typ() == SignatureType::CertRevocation => {
                signed.add_revocation(sig);
            }
            Packet::Signature(sig) if sig.is_certification() => {
                signed.add_certification(sig);
            }
            Packet::Signature(sig) => {
                warn!("ignoring {:?} signature on {}", sig.typ(), signed.identity);
            }
            _ => debug!("skipping trust packet"),
        }
    }

    Ok(signed)
}

fn is_signature_or_trust(tag: Tag) -> bool {
    matches!(tag, Tag::Signature | Tag::Trust)
}

fn is_identity(tag: Tag) -> bool {
    matches!(tag, Tag::UserId | Tag::UserAttribute)
}

fn next_if_tag<I>(packets: &mut Peekable<I>, pred: impl Fn(Tag) -> bool) -> Result<Option<Packet>>
where
    I: Iterator<Item = Result<Packet>>,
{
    next_if_packet(packets, |p| pred(p.tag()))
}

fn next_if_packet<I>(
    packets: &mut Peekable<I>,
    pred: impl Fn(&Packet) -> bool,
) -> Result<Option<Packet>>
where
    I: Iterator<Item = Result<Packet>>,
{
    skip_unsupported(packets)?;

    Ok(packets
        .next_if(|p| p.as_ref().is_ok_and(&pred))
        .and_then(Result::ok))
}

/// Drops packets we could decode the framing of but do not support.
///
/// Any other error is returned.
fn skip_unsupported<I>(packets: &mut Peekable<I>) -> Result<()>
where
    I: Iterator<Item = Result<Packet>>,
{
    while let Some(Err(err)) = packets.next_if(Result::is_err) {
        match err {
            Error::Unsupported { .. } => warn!("skipping packet: {}", err),
            err => return Err(err),
        }
    }

    Ok(())
}
