use std::io;
use std::sync::Arc;

use log::debug;

use crate::composed::signed_key::{KeyFamily, KeyRef, SignedSubkey, SignedUser, SignedUserAttribute};
use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::errors::Result;
use crate::packet::{Packet, PacketTrait, Signature};
use crate::ser::Serialize;
use crate::types::{Fingerprint, KeyDetails, KeyId};

/// A primary key with its identities, subkeys and the signatures binding them.
///
/// Parsing fills the unverified collections. Only
/// [`resolve`](TransferableKey::resolve) fills the verified ones, and every
/// query that hands out keys looks at verified material only.
///
/// Ref: <https://tools.ietf.org/html/rfc4880.html#section-11.1>
#[derive(derive_more::Debug, Clone)]
pub struct TransferableKey<F: KeyFamily> {
    pub(crate) primary_key: F::Primary,
    pub(crate) revocations: Vec<Signature>,

    pub(crate) users: Vec<SignedUser>,
    pub(crate) user_attributes: Vec<SignedUserAttribute>,
    pub(crate) subkeys: Vec<SignedSubkey>,

    pub(crate) verified_users: Vec<SignedUser>,
    pub(crate) verified_user_attributes: Vec<SignedUserAttribute>,
    pub(crate) verified_subkeys: Vec<SignedSubkey>,

    /// Every packet the parser consumed, in order.
    #[debug("{} packets", packets.len())]
    pub(crate) packets: Vec<Packet>,

    #[debug(skip)]
    pub(crate) diagnostics: Arc<dyn DiagnosticSink>,
}

impl<F: KeyFamily> TransferableKey<F> {
    /// An empty block around `primary_key`, reporting to the [`LogSink`].
    pub fn new(primary_key: F::Primary) -> Self {
        TransferableKey {
            primary_key,
            revocations: Vec::new(),
            users: Vec::new(),
            user_attributes: Vec::new(),
            subkeys: Vec::new(),
            verified_users: Vec::new(),
            verified_user_attributes: Vec::new(),
            verified_subkeys: Vec::new(),
            packets: Vec::new(),
            diagnostics: Arc::new(LogSink),
        }
    }

    /// Send diagnostics to `sink` instead.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    pub fn add_revocation(&mut self, sig: Signature) {
        self.revocations.push(sig);
    }

    pub fn add_user(&mut self, user: SignedUser) {
        self.users.push(user);
    }

    pub fn add_user_attribute(&mut self, attr: SignedUserAttribute) {
        self.user_attributes.push(attr);
    }

    pub fn add_subkey(&mut self, subkey: SignedSubkey) {
        self.subkeys.push(subkey);
    }

    pub fn primary_key(&self) -> &F::Primary {
        &self.primary_key
    }

    pub fn key_id(&self) -> KeyId {
        self.primary_key.key_id()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.primary_key.fingerprint()
    }

    /// Revocations attached to the primary key.
    pub fn revocations(&self) -> &[Signature] {
        &self.revocations
    }

    /// All user ids, verified or not.
    pub fn users(&self) -> &[SignedUser] {
        &self.users
    }

    pub fn user_attributes(&self) -> &[SignedUserAttribute] {
        &self.user_attributes
    }

    pub fn subkeys(&self) -> &[SignedSubkey] {
        &self.subkeys
    }

    pub fn verified_users(&self) -> &[SignedUser] {
        &self.verified_users
    }

    pub fn verified_user_attributes(&self) -> &[SignedUserAttribute] {
        &self.verified_user_attributes
    }

    pub fn verified_subkeys(&self) -> &[SignedSubkey] {
        &self.verified_subkeys
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// Has a resolution run succeeded?
    pub fn is_resolved(&self) -> bool {
        !self.verified_users.is_empty()
    }

    /// The verified user id strings.
    pub fn user_ids(&self) -> Vec<&str> {
        self.verified_users
            .iter()
            .map(|user| user.identity.id())
            .collect()
    }

    /// Looks up the primary key or a verified subkey by its exact key id.
    pub fn get_key_by_id(&self, key_id: &KeyId) -> Option<KeyRef<'_, F::Primary>> {
        if &self.primary_key.key_id() == key_id {
            return Some(KeyRef::Primary(&self.primary_key));
        }

        self.verified_subkeys
            .iter()
            .find(|subkey| &subkey.key_id() == key_id)
            .map(|subkey| KeyRef::Subkey(&subkey.key))
    }

    pub fn has_key_by_id(&self, key_id: &KeyId) -> bool {
        self.get_key_by_id(key_id).is_some()
    }

    /// The primary key, then every user id and every subkey, without signatures.
    ///
    /// Unverified material is included. Use the [`Serialize`] implementation
    /// for the complete block.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.primary_key.to_writer_with_header(&mut buf)?;
        for user in &self.users {
            user.identity.to_writer_with_header(&mut buf)?;
        }
        for subkey in &self.subkeys {
            subkey.key.to_writer_with_header(&mut buf)?;
        }

        Ok(buf)
    }
}

impl<F: KeyFamily> Serialize for TransferableKey<F> {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        self.primary_key.to_writer_with_header(writer)?;
        for sig in &self.revocations {
            sig.to_writer_with_header(writer)?;
        }
        self.users.to_writer(writer)?;
        self.user_attributes.to_writer(writer)?;
        self.subkeys.to_writer(writer)?;

        Ok(())
    }

    fn write_len(&self) -> usize {
        self.primary_key.write_len_with_header()
            + self
                .revocations
                .iter()
                .map(PacketTrait::write_len_with_header)
                .sum::<usize>()
            + self.users.write_len()
            + self.user_attributes.write_len()
            + self.subkeys.write_len()
    }
}

/// Keeps the signatures whose verification succeeded.
pub(crate) fn keep_verified(sigs: &[Signature], results: Vec<Result<()>>) -> Vec<Signature> {
    sigs.iter()
        .zip(results)
        .filter_map(|(sig, res)| match res {
            Ok(()) => Some(sig.clone()),
            Err(err) => {
                debug!("dropping {:?} signature: {}", sig.typ(), err);
                None
            }
        })
        .collect()
}

/// The most recent signature issued by `signer`.
///
/// Ties go to the later signature. Signatures without a creation time sort first.
pub(crate) fn latest_signature<'a>(
    sigs: &'a [Signature],
    signer: &impl KeyDetails,
) -> Option<&'a Signature> {
    sigs.iter()
        .filter(|sig| sig.match_identity(signer))
        .max_by_key(|sig| sig.created())
}
