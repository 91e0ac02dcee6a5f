use std::{fmt, io};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::debug;

use crate::composed::signed_key::shared::{keep_verified, latest_signature};
use crate::crypto::Verifier;
use crate::errors::Result;
use crate::packet::{PacketTrait, Signature, UserAttribute, UserId};
use crate::ser::Serialize;
use crate::types::{KeyDetails, KeyUsage, Tag};

/// Something a primary key can certify: a user id or a user attribute.
pub trait Identity: PacketTrait + Clone + fmt::Debug + fmt::Display {
    /// Tag whose certification hash prefix is used for this identity.
    const TAG: Tag;
}

impl Identity for UserId {
    const TAG: Tag = Tag::UserId;
}

impl Identity for UserAttribute {
    const TAG: Tag = Tag::UserAttribute;
}

/// An identity together with its certifications and certification revocations.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SignedIdentity<T> {
    pub identity: T,
    pub certifications: Vec<Signature>,
    pub revocations: Vec<Signature>,
}

pub type SignedUser = SignedIdentity<UserId>;
pub type SignedUserAttribute = SignedIdentity<UserAttribute>;

impl<T: Identity> SignedIdentity<T> {
    pub fn new(identity: T) -> Self {
        SignedIdentity {
            identity,
            certifications: Vec::new(),
            revocations: Vec::new(),
        }
    }

    pub fn add_certification(&mut self, sig: Signature) {
        self.certifications.push(sig);
    }

    pub fn add_revocation(&mut self, sig: Signature) {
        self.revocations.push(sig);
    }

    /// Creation time of the latest certification issued by `signer`.
    pub fn certified_time(&self, signer: &impl KeyDetails) -> Option<DateTime<Utc>> {
        latest_signature(&self.certifications, signer).and_then(|sig| sig.created().copied())
    }

    /// Does the latest certification issued by `signer` grant `usage`?
    pub fn is_certified_to(&self, signer: &impl KeyDetails, usage: KeyUsage) -> bool {
        latest_signature(&self.certifications, signer).is_some_and(|sig| sig.allows(usage))
    }

    /// Returns a copy holding only the signatures that verify against `signer`.
    ///
    /// `None` if no certification verifies, or if any revocation does.
    pub async fn verified<V: Verifier>(
        &self,
        signer: &impl KeyDetails,
        verifier: &V,
    ) -> Option<Self> {
        let certifications = self
            .certifications
            .iter()
            .map(|sig| sig.verify_certification(verifier, signer, T::TAG, &self.identity));
        let revocations = self
            .revocations
            .iter()
            .map(|sig| sig.verify_certification(verifier, signer, T::TAG, &self.identity));

        let (certifications, revocations) =
            futures::join!(join_all(certifications), join_all(revocations));

        if revocations.iter().any(Result::is_ok) {
            debug!("{} is revoked", self.identity);
            return None;
        }

        let certifications = keep_verified(&self.certifications, certifications);
        if certifications.is_empty() {
            debug!("{} has no valid certification", self.identity);
            return None;
        }

        Some(SignedIdentity {
            identity: self.identity.clone(),
            certifications,
            revocations: Vec::new(),
        })
    }

    pub async fn verify_signatures<V: Verifier>(
        &self,
        signer: &impl KeyDetails,
        verifier: &V,
    ) -> bool {
        self.verified(signer, verifier).await.is_some()
    }
}

impl<T: Identity> Serialize for SignedIdentity<T> {
    fn to_writer<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        self.identity.to_writer_with_header(writer)?;
        for sig in self.certifications.iter().chain(&self.revocations) {
            sig.to_writer_with_header(writer)?;
        }

        Ok(())
    }

    fn write_len(&self) -> usize {
        self.identity.write_len_with_header()
            + self
                .certifications
                .iter()
                .chain(&self.revocations)
                .map(PacketTrait::write_len_with_header)
                .sum::<usize>()
    }
}
