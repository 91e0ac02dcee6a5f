use std::io;

use chrono::{DateTime, Utc};

use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::errors::Result;
use crate::types::{Fingerprint, KeyId, KeyKind, KeyUsage, KeyVersion, PublicParams};

/// Metadata of a key packet.
pub trait KeyDetails: std::fmt::Debug {
    /// Returns the [`KeyVersion`] of this key.
    fn version(&self) -> KeyVersion;

    /// Returns the [`Fingerprint`] for this key.
    fn fingerprint(&self) -> Fingerprint;

    /// Returns the [`KeyId`] for this key.
    fn key_id(&self) -> KeyId {
        self.fingerprint().key_id()
    }

    /// Returns the algorithm for this key.
    fn algorithm(&self) -> PublicKeyAlgorithm;

    fn created_at(&self) -> &DateTime<Utc>;

    /// Returns the parameters for the public portion of this key.
    fn public_params(&self) -> &PublicParams;

    /// Whether the packet carries secret material.
    fn kind(&self) -> KeyKind;

    /// Writes the public key in the form used as signature hash input.
    fn serialize_for_hashing(&self, writer: &mut dyn io::Write) -> Result<()>;

    /// Can this key perform the given operation?
    ///
    /// Looks only at the algorithm and at the presence of secret material,
    /// not at what signatures grant.
    fn can(&self, usage: KeyUsage) -> bool {
        let has_secret = self.kind() == KeyKind::Secret;
        match usage {
            KeyUsage::Encrypt => self.algorithm().can_encrypt(),
            KeyUsage::Decrypt => self.algorithm().can_encrypt() && has_secret,
            KeyUsage::Sign => self.algorithm().can_sign() && has_secret,
        }
    }
}

impl<T: KeyDetails + ?Sized> KeyDetails for &T {
    fn version(&self) -> KeyVersion {
        (**self).version()
    }

    fn fingerprint(&self) -> Fingerprint {
        (**self).fingerprint()
    }

    fn key_id(&self) -> KeyId {
        (**self).key_id()
    }

    fn algorithm(&self) -> PublicKeyAlgorithm {
        (**self).algorithm()
    }

    fn created_at(&self) -> &DateTime<Utc> {
        (**self).created_at()
    }

    fn public_params(&self) -> &PublicParams {
        (**self).public_params()
    }

    fn kind(&self) -> KeyKind {
        (**self).kind()
    }

    fn serialize_for_hashing(&self, writer: &mut dyn io::Write) -> Result<()> {
        (**self).serialize_for_hashing(writer)
    }

    fn can(&self, usage: KeyUsage) -> bool {
        (**self).can(usage)
    }
}
