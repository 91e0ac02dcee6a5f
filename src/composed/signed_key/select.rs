use std::io;

use chrono::{DateTime, Utc};
use log::debug;

use crate::composed::signed_key::{KeyFamily, SignedUser, Subkey, TransferableKey};
use crate::crypto::public_key::PublicKeyAlgorithm;
use crate::diagnostics::Diagnostic;
use crate::errors::{verification_err, Result};
use crate::types::{Fingerprint, KeyDetails, KeyKind, KeyUsage, KeyVersion, PublicParams};

/// A key handed out by a block: the primary key or one of its subkeys.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyRef<'a, P> {
    Primary(&'a P),
    Subkey(&'a Subkey),
}

impl<P> Clone for KeyRef<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for KeyRef<'_, P> {}

impl<'a, P: KeyDetails> KeyRef<'a, P> {
    pub fn is_primary(&self) -> bool {
        matches!(self, KeyRef::Primary(_))
    }

    fn details(&self) -> &dyn KeyDetails {
        match self {
            KeyRef::Primary(k) => *k,
            KeyRef::Subkey(k) => *k,
        }
    }
}

impl<P: KeyDetails> KeyDetails for KeyRef<'_, P> {
    fn version(&self) -> KeyVersion {
        self.details().version()
    }

    fn fingerprint(&self) -> Fingerprint {
        self.details().fingerprint()
    }

    fn algorithm(&self) -> PublicKeyAlgorithm {
        self.details().algorithm()
    }

    fn created_at(&self) -> &DateTime<Utc> {
        match self {
            KeyRef::Primary(k) => k.created_at(),
            KeyRef::Subkey(k) => k.created_at(),
        }
    }

    fn public_params(&self) -> &PublicParams {
        match self {
            KeyRef::Primary(k) => k.public_params(),
            KeyRef::Subkey(k) => k.public_params(),
        }
    }

    fn kind(&self) -> KeyKind {
        self.details().kind()
    }

    fn serialize_for_hashing(&self, writer: &mut dyn io::Write) -> Result<()> {
        self.details().serialize_for_hashing(writer)
    }
}

impl<F: KeyFamily> TransferableKey<F> {
    /// Picks the key to use for `usage` among keys of the given kind.
    ///
    /// Verified subkeys that can perform `usage` and whose latest binding
    /// grants it come first, the most recently bound one wins. Among equally
    /// recent bindings the later subkey wins. Otherwise the primary key is
    /// used, if it can perform `usage` and the most recently certified user
    /// id grants it.
    ///
    /// Errors if the block has no verified user id, i.e. it was never
    /// successfully resolved.
    pub fn select_key_for(
        &self,
        usage: KeyUsage,
        kind: KeyKind,
    ) -> Result<Option<KeyRef<'_, F::Primary>>> {
        let primary = &self.primary_key;

        // `max_by_key` returns the last of several maximal elements
        let subkey = self
            .verified_subkeys
            .iter()
            .filter(|subkey| {
                subkey.key.kind() == kind
                    && subkey.can(usage)
                    && subkey.is_certified_to(primary, usage)
            })
            .max_by_key(|subkey| subkey.certified_time(primary));

        if let Some(subkey) = subkey {
            debug!("selected subkey {:?} to {}", subkey.key_id(), usage);
            return Ok(Some(KeyRef::Subkey(&subkey.key)));
        }

        let user = self.most_recently_certified_user().ok_or_else(|| {
            verification_err!("no verified user id on {:?}, resolve the key first", self.key_id())
        })?;

        if primary.kind() == kind && primary.can(usage) && user.is_certified_to(primary, usage) {
            debug!("selected primary key {:?} to {}", primary.key_id(), usage);
            return Ok(Some(KeyRef::Primary(primary)));
        }

        self.diagnostics.emit(Diagnostic::NoKeyForUsage {
            key_id: self.key_id(),
            usage,
            kind,
        });

        Ok(None)
    }

    /// The verified user id with the latest certification by the primary key.
    ///
    /// Ties go to the later user id.
    pub fn most_recently_certified_user(&self) -> Option<&SignedUser> {
        self.verified_users
            .iter()
            .max_by_key(|user| user.certified_time(&self.primary_key))
    }
}
