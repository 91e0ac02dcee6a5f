use crate::composed::signed_key::{KeyRef, Public, TransferableKey};
use crate::errors::Result;
use crate::packet;
use crate::types::{KeyKind, KeyUsage};

/// A transferable public key.
pub type SignedPublicKey = TransferableKey<Public>;

impl SignedPublicKey {
    /// The key to encrypt to.
    pub fn encryption_key(&self) -> Result<Option<KeyRef<'_, packet::PublicKey>>> {
        self.select_key_for(KeyUsage::Encrypt, KeyKind::Public)
    }
}
