mod common;

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use serde_json::json;
use testresult::TestResult;

use pgp_keyblock::composed::{ExportOptionsBuilder, KeyMetadata, DEFAULT_PROVIDER_ID};
use pgp_keyblock::crypto::public_key::PublicKeyAlgorithm;
use pgp_keyblock::crypto::SoftwareVerifier;
use pgp_keyblock::types::{KeyDetails, KeyKind};
use pgp_keyblock::{ExportOptions, SignedPublicKey, SignedSecretKey};

use common::*;

#[tokio::test]
async fn export_public_block() -> TestResult {
    init_logger();
    let key = TestKey::new(1);
    let (mut block, _) = SignedPublicKey::parse(public_block(&key))?;
    block.resolve(&SoftwareVerifier).await?;

    let object = block.to_key_object(&ExportOptions::default())?;

    assert_eq!(object.primary_key, KeyMetadata::from_key(&key.public));
    assert_eq!(object.primary_key.kind, KeyKind::Public);
    assert_eq!(object.subkeys.len(), 1);
    assert_eq!(object.subkeys[0].algorithm, PublicKeyAlgorithm::ECDH);
    assert!(object.subkeys[0].can_encrypt);
    assert_eq!(object.user_ids, vec![ALICE.to_string()]);
    assert_eq!(object.provider_id, DEFAULT_PROVIDER_ID);
    assert_eq!(object.signing_key_id, None);
    assert_eq!(object.decryption_key_id, None);
    assert_eq!(object.serialized, Some(block.serialize()?));

    let value = serde_json::to_value(&object)?;
    assert_eq!(
        value["primary_key"],
        json!({
            "key_id": format!("{:x}", key.public.key_id()),
            "fingerprint": hex::encode(key.public.fingerprint()),
            "algorithm": "EdDSA",
            "created_at": "2017-07-14T02:40:00Z",
            "kind": "public",
            "can_sign": true,
            "can_encrypt": false,
        })
    );
    assert_eq!(value["signing_key_id"], json!(null));
    assert_eq!(value["user_ids"], json!([ALICE]));
    assert_eq!(
        value["serialized"],
        json!(hex::encode(block.serialize()?))
    );

    Ok(())
}

#[tokio::test]
async fn export_secret_block() -> TestResult {
    let key = TestKey::new(1);
    let (mut block, _) = SignedSecretKey::parse(secret_block(&key))?;
    block.resolve(&SoftwareVerifier).await?;

    let options = ExportOptionsBuilder::default()
        .skip_serialize(true)
        .provider_id("token")
        .build()?;
    let object = block.to_key_object(&options)?;

    assert_eq!(object.primary_key.kind, KeyKind::Secret);
    assert_eq!(object.subkeys.len(), 2);
    assert_eq!(object.provider_id, "token");
    assert_eq!(object.serialized, None);

    assert_eq!(object.signing_key_id, Some(key.public.key_id()));
    assert_eq!(object.signing_algorithm, Some(PublicKeyAlgorithm::EdDSA));
    assert_eq!(object.decryption_key_id, Some(block.subkeys()[0].key_id()));
    assert_eq!(object.decryption_algorithm, Some(PublicKeyAlgorithm::ECDH));

    let value = serde_json::to_value(&object)?;
    assert_eq!(
        value["decryption_key_id"],
        json!(format!("{:x}", block.subkeys()[0].key_id()))
    );
    assert_eq!(value["decryption_algorithm"], json!("ECDH"));
    assert_eq!(value["serialized"], json!(null));

    Ok(())
}

#[test]
fn export_unresolved_secret_block_fails() -> TestResult {
    let key = TestKey::new(1);
    let (block, _) = SignedSecretKey::parse(secret_block(&key))?;

    let err = block.to_key_object(&ExportOptions::default()).unwrap_err();
    assert!(err.is_verification(), "{:?}", err);

    Ok(())
}

#[test]
fn export_unresolved_public_block() -> TestResult {
    let key = TestKey::new(1);
    let (block, _) = SignedPublicKey::parse(public_block(&key))?;

    // nothing verified yet, but the structure is still exported
    let object = block.to_key_object(&ExportOptions::default())?;
    assert!(object.user_ids.is_empty());
    assert!(object.subkeys.is_empty());
    assert_eq!(object.serialized, Some(block.serialize()?));

    Ok(())
}

#[tokio::test]
async fn export_lists_verified_but_serializes_everything() -> TestResult {
    let key = TestKey::new(1);
    let mallory = user("Mallory <mallory@example.org>");
    let unbound = ecdh_subkey(9, ts(1_550_000_000));

    // Mallory carries a certification made over Alice, the last subkey has no binding
    let mut packets = public_block(&key);
    packets.insert(3, mallory.clone().into());
    packets.insert(4, key.certify(&user(ALICE), ts(1_600_000_050), None)?.into());
    packets.push(unbound.clone().into());

    let (mut block, _) = SignedPublicKey::parse(packets)?;
    block.resolve(&SoftwareVerifier).await?;
    let bound_id = block.subkeys()[0].key_id();

    let object = block.to_key_object(&ExportOptions::default())?;
    assert_eq!(object.user_ids, vec![ALICE.to_string()]);
    assert_eq!(
        object.subkeys.iter().map(|k| k.key_id).collect::<Vec<_>>(),
        vec![bound_id]
    );

    let serialized = object.serialized.expect("serialized block");
    let reparsed = SignedPublicKey::from_bytes(serialized)?;
    assert_eq!(
        reparsed
            .users()
            .iter()
            .map(|user| user.identity.id())
            .collect::<BTreeSet<_>>(),
        BTreeSet::from([ALICE, mallory.id()])
    );
    assert_eq!(
        reparsed
            .subkeys()
            .iter()
            .map(|subkey| subkey.key_id())
            .collect::<BTreeSet<_>>(),
        BTreeSet::from([bound_id, unbound.key_id()])
    );

    Ok(())
}
