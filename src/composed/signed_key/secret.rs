use crate::composed::signed_key::{
    KeyRef, Secret, SignedPublicKey, SignedSubkey, Subkey, TransferableKey,
};
use crate::errors::Result;
use crate::packet::{self, Packet};
use crate::types::{KeyKind, KeyUsage};

/// A transferable secret key.
pub type SignedSecretKey = TransferableKey<Secret>;

impl SignedSecretKey {
    /// The key to sign with.
    pub fn signing_key(&self) -> Result<Option<KeyRef<'_, packet::SecretKey>>> {
        self.select_key_for(KeyUsage::Sign, KeyKind::Secret)
    }

    /// The key to decrypt with.
    pub fn decryption_key(&self) -> Result<Option<KeyRef<'_, packet::SecretKey>>> {
        self.select_key_for(KeyUsage::Decrypt, KeyKind::Secret)
    }

    /// The same block with all secret material removed.
    ///
    /// Verified collections are carried over as they are, so the result
    /// does not need to be resolved again.
    pub fn signed_public_key(&self) -> SignedPublicKey {
        SignedPublicKey {
            primary_key: self.primary_key.public_key(),
            revocations: self.revocations.clone(),
            users: self.users.clone(),
            user_attributes: self.user_attributes.clone(),
            subkeys: self.subkeys.iter().map(public_subkey).collect(),
            verified_users: self.verified_users.clone(),
            verified_user_attributes: self.verified_user_attributes.clone(),
            verified_subkeys: self.verified_subkeys.iter().map(public_subkey).collect(),
            packets: self.packets.iter().map(public_packet).collect(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}

fn public_subkey(subkey: &SignedSubkey) -> SignedSubkey {
    SignedSubkey {
        key: Subkey::Public(subkey.key.public_key()),
        bindings: subkey.bindings.clone(),
        revocations: subkey.revocations.clone(),
    }
}

fn public_packet(packet: &Packet) -> Packet {
    match packet {
        Packet::SecretKey(k) => k.public_key().into(),
        Packet::SecretSubkey(k) => k.public_key().into(),
        other => other.clone(),
    }
}
