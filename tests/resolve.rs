mod common;

use pretty_assertions::assert_eq;
use testresult::TestResult;

use pgp_keyblock::crypto::hash::HashAlgorithm;
use pgp_keyblock::crypto::public_key::PublicKeyAlgorithm;
use pgp_keyblock::crypto::{SoftwareVerifier, Verifier};
use pgp_keyblock::errors::Result;
use pgp_keyblock::packet::{Packet, PublicKey, SignatureType};
use pgp_keyblock::types::{KeyDetails, Mpi, PacketHeaderVersion, PublicParams};
use pgp_keyblock::{Diagnostic, SignedPublicKey, SignedSecretKey, TransferableKey};

use common::*;

/// Refuses every signature.
struct RejectAll;

impl Verifier for RejectAll {
    async fn verify(
        &self,
        _key: &PublicParams,
        _hash: HashAlgorithm,
        _digest: &[u8],
        _sig: &[Mpi],
    ) -> Result<()> {
        Err("rejected".to_string().into())
    }
}

#[tokio::test]
async fn resolve_public_block() -> TestResult {
    init_logger();
    let key = TestKey::new(1);
    let (mut block, _) = SignedPublicKey::parse(public_block(&key))?;
    assert!(!block.is_resolved());

    block.resolve(&SoftwareVerifier).await?;

    assert!(block.is_resolved());
    assert_eq!(block.user_ids(), vec![ALICE]);
    assert_eq!(block.verified_subkeys().len(), 1);
    assert_eq!(block.verified_subkeys()[0].bindings.len(), 1);

    Ok(())
}

#[tokio::test]
async fn resolve_secret_block() -> TestResult {
    let key = TestKey::new(1);
    let (mut block, _) = SignedSecretKey::parse(secret_block(&key))?;

    block.resolve(&SoftwareVerifier).await?;

    assert_eq!(block.user_ids(), vec![ALICE]);
    assert_eq!(block.verified_subkeys().len(), 2);

    Ok(())
}

#[tokio::test]
async fn failing_user_ids_fail_resolution() -> TestResult {
    let key = TestKey::new(1);
    let sink = CollectingSink::new();

    // the certification is over a different user id than the one it follows
    let mut packets = public_block(&key);
    packets[1] = user("Mallory <mallory@example.org>").into();

    let (block, _) = SignedPublicKey::parse(packets)?;
    let mut block = block.with_diagnostics(sink.clone());

    let err = block.resolve(&SoftwareVerifier).await.unwrap_err();
    assert!(err.is_verification(), "{:?}", err);

    // the subkey binding is fine, but nothing is kept
    let binding_ok = block.subkeys()[0]
        .verify_signatures(block.primary_key(), &SoftwareVerifier)
        .await;
    assert!(binding_ok);
    assert!(block.verified_subkeys().is_empty());
    assert!(!block.is_resolved());

    assert_eq!(
        sink.take(),
        vec![Diagnostic::UserIdRejected {
            key_id: key.public.key_id(),
            id: "Mallory <mallory@example.org>".to_string(),
        }]
    );

    Ok(())
}

#[tokio::test]
async fn resolution_is_idempotent() -> TestResult {
    let key = TestKey::new(1);
    let (mut block, _) = SignedPublicKey::parse(public_block(&key))?;

    block.resolve(&SoftwareVerifier).await?;
    let users = block.verified_users().to_vec();
    let subkeys = block.verified_subkeys().to_vec();

    block.resolve(&SoftwareVerifier).await?;
    assert_eq!(block.verified_users(), &users[..]);
    assert_eq!(block.verified_subkeys(), &subkeys[..]);

    // a failed run leaves nothing verified behind
    assert!(block.resolve(&RejectAll).await.is_err());
    assert!(block.verified_users().is_empty());
    assert!(block.verified_subkeys().is_empty());

    Ok(())
}

#[tokio::test]
async fn revoked_primary_key() -> TestResult {
    let key = TestKey::new(1);
    let mut packets = public_block(&key);
    packets.insert(1, key.revoke(ts(1_700_000_000))?.into());

    let (mut block, _) = SignedPublicKey::parse(packets)?;
    let err = block.resolve(&SoftwareVerifier).await.unwrap_err();
    assert!(err.is_verification(), "{:?}", err);
    assert!(block.verified_users().is_empty());

    Ok(())
}

#[tokio::test]
async fn unverifiable_revocation_is_reported() -> TestResult {
    let key = TestKey::new(1);
    let other = TestKey::new(2);
    let sink = CollectingSink::new();

    let mut packets = public_block(&key);
    packets.insert(1, other.revoke(ts(1_700_000_000))?.into());

    let (block, _) = SignedPublicKey::parse(packets)?;
    let mut block = block.with_diagnostics(sink.clone());
    block.resolve(&SoftwareVerifier).await?;

    assert!(block.is_resolved());
    let diagnostics = sink.take();
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        &diagnostics[0],
        Diagnostic::UnverifiedRevocation { typ: SignatureType::KeyRevocation, .. }
    ));

    Ok(())
}

#[tokio::test]
async fn revoked_user_id_is_dropped() -> TestResult {
    let key = TestKey::new(1);
    let bob = user(BOB);
    let sink = CollectingSink::new();

    let mut packets = public_block(&key);
    let revocation =
        key.certify_as(SignatureType::CertRevocation, &user(ALICE), ts(1_650_000_000), None)?;
    packets.insert(3, revocation.into());
    packets.insert(4, bob.clone().into());
    packets.insert(5, key.certify(&bob, ts(1_600_000_000), None)?.into());

    let (block, _) = SignedPublicKey::parse(packets)?;
    let mut block = block.with_diagnostics(sink.clone());
    block.resolve(&SoftwareVerifier).await?;

    assert_eq!(block.user_ids(), vec![BOB]);
    assert!(block.verified_users()[0].revocations.is_empty());
    assert_eq!(block.users().len(), 2);
    assert!(matches!(
        &sink.take()[..],
        [Diagnostic::UserIdRejected { id, .. }] if id == ALICE
    ));

    Ok(())
}

#[tokio::test]
async fn bad_subkeys_are_dropped() -> TestResult {
    let key = TestKey::new(1);
    let other = TestKey::new(2);
    let foreign = ecdh_subkey(7, ts(1_550_000_000));
    let revoked = ecdh_subkey(8, ts(1_550_000_000));
    let sink = CollectingSink::new();

    let mut packets = public_block(&key);
    packets.extend([
        Packet::from(foreign.clone()),
        other.bind(&foreign, ts(1_600_000_000), None)?.into(),
        revoked.clone().into(),
        key.bind(&revoked, ts(1_600_000_000), None)?.into(),
        key.revoke_subkey(&revoked, ts(1_650_000_000))?.into(),
    ]);

    let (block, _) = SignedPublicKey::parse(packets)?;
    let mut block = block.with_diagnostics(sink.clone());
    assert_eq!(block.subkeys().len(), 3);

    block.resolve(&SoftwareVerifier).await?;
    assert_eq!(block.verified_subkeys().len(), 1);
    assert_eq!(block.verified_subkeys()[0].key_id(), block.subkeys()[0].key_id());

    // subkeys are dropped without a word
    assert!(sink.take().is_empty());

    Ok(())
}

#[tokio::test]
async fn user_attributes_are_verified() -> TestResult {
    let key = TestKey::new(1);
    let attr = pgp_keyblock::packet::UserAttribute::Unknown {
        packet_version: PacketHeaderVersion::New,
        typ: 100,
        data: vec![1, 2, 3].into(),
    };
    let forged = pgp_keyblock::packet::UserAttribute::Unknown {
        packet_version: PacketHeaderVersion::New,
        typ: 101,
        data: vec![4, 5, 6].into(),
    };
    let sink = CollectingSink::new();

    let mut packets = public_block(&key);
    packets.insert(3, attr.clone().into());
    packets.insert(4, key.certify_attribute(&attr, ts(1_600_000_000))?.into());
    packets.insert(5, forged.clone().into());
    packets.insert(6, key.certify_attribute(&attr, ts(1_600_000_000))?.into());

    let (block, _) = SignedPublicKey::parse(packets)?;
    let mut block = block.with_diagnostics(sink.clone());
    assert_eq!(block.user_attributes().len(), 2);

    block.resolve(&SoftwareVerifier).await?;
    assert_eq!(block.verified_user_attributes().len(), 1);
    assert_eq!(block.verified_user_attributes()[0].identity, attr);
    assert!(sink.take().is_empty());

    Ok(())
}

#[tokio::test]
async fn primary_key_must_sign() -> TestResult {
    let ecdh = ecdh_subkey(1, ts(1_500_000_000));
    let primary = PublicKey::new(
        PacketHeaderVersion::New,
        PublicKeyAlgorithm::ECDH,
        *ecdh.created_at(),
        ecdh.public_params().clone(),
    )?;

    let mut block: SignedPublicKey = TransferableKey::new(primary);
    block.add_user(pgp_keyblock::composed::SignedUser::new(user(ALICE)));

    let err = block.resolve(&SoftwareVerifier).await.unwrap_err();
    assert!(err.is_verification(), "{:?}", err);

    Ok(())
}
