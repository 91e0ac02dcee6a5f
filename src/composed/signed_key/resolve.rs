use futures::future::join_all;
use log::debug;

use crate::composed::signed_key::{KeyFamily, TransferableKey};
use crate::crypto::Verifier;
use crate::diagnostics::Diagnostic;
use crate::errors::{verification_err, Result};
use crate::types::KeyDetails;

impl<F: KeyFamily> TransferableKey<F> {
    /// Verifies every signature in the block against the primary key.
    ///
    /// Previously verified material is discarded first. Identities and
    /// subkeys are verified concurrently, each one ends up in its verified
    /// collection with only the signatures that checked out. Fails if the
    /// primary key is revoked, can not issue signatures, or if no user id
    /// verifies.
    pub async fn resolve<V: Verifier>(&mut self, verifier: &V) -> Result<()> {
        self.verified_users.clear();
        self.verified_user_attributes.clear();
        self.verified_subkeys.clear();

        let primary = &self.primary_key;
        let key_id = primary.key_id();
        debug!("resolving {:?}", key_id);

        if !primary.algorithm().can_sign() {
            return Err(verification_err!(
                "primary key {:?} uses {}, which can not certify",
                key_id,
                primary.algorithm()
            ));
        }

        let revocations = self
            .revocations
            .iter()
            .map(|sig| sig.verify_key(verifier, primary));
        let revocations = join_all(revocations).await;
        for (sig, res) in self.revocations.iter().zip(revocations) {
            match res {
                Ok(()) => return Err(verification_err!("primary key {:?} is revoked", key_id)),
                Err(err) => self.diagnostics.emit(Diagnostic::UnverifiedRevocation {
                    key_id,
                    typ: sig.typ(),
                    reason: err.to_string(),
                }),
            }
        }

        let users = self
            .users
            .iter()
            .map(|user| user.verified(primary, verifier));
        let user_attributes = self
            .user_attributes
            .iter()
            .map(|attr| attr.verified(primary, verifier));
        let subkeys = self
            .subkeys
            .iter()
            .map(|subkey| subkey.verified(primary, verifier));

        let (users, user_attributes, subkeys) = futures::join!(
            join_all(users),
            join_all(user_attributes),
            join_all(subkeys),
        );

        let mut verified_users = Vec::with_capacity(users.len());
        for (user, verified) in self.users.iter().zip(users) {
            match verified {
                Some(verified) => verified_users.push(verified),
                None => self.diagnostics.emit(Diagnostic::UserIdRejected {
                    key_id,
                    id: user.identity.id().to_string(),
                }),
            }
        }

        if verified_users.is_empty() {
            return Err(verification_err!("no valid user id on {:?}", key_id));
        }

        debug!(
            "{:?}: {} of {} user ids, {} of {} subkeys verified",
            key_id,
            verified_users.len(),
            self.users.len(),
            subkeys.iter().flatten().count(),
            self.subkeys.len()
        );

        self.verified_users = verified_users;
        self.verified_user_attributes = user_attributes.into_iter().flatten().collect();
        self.verified_subkeys = subkeys.into_iter().flatten().collect();

        Ok(())
    }
}
